pub mod balance;
pub mod cashflow;
pub mod deta;
pub mod dicose;
pub mod informe;

use crate::content::ExtractedContent;
use crate::oracle::ClassificationOracle;
use crate::schema::{CompanyCategory, Document, DocumentType, OrganizationalContext};

/// Terminal verdict of a per-type validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_valid: bool,
    /// Present for invalid verdicts and for valid-with-advisory ones.
    pub message: Option<String>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn valid_with_advisory(message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            message: Some(message.into()),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Everything a validator may look at. Validators are pure decision trees
/// over this input plus the oracle's answers; they never mutate the store.
pub struct ValidationInput<'a> {
    pub content: &'a ExtractedContent,
    pub document_year: Option<i32>,
    pub context: &'a OrganizationalContext,
    /// Snapshot of currently-valid stored documents.
    pub existing: &'a [Document],
    pub reference_year: i32,
}

/// Concepts from `concepts` that the text does not mention.
pub fn missing_concepts<'a>(text: &str, concepts: &[&'a str]) -> Vec<&'a str> {
    concepts
        .iter()
        .filter(|concept| !text.contains(**concept))
        .copied()
        .collect()
}

/// Run the validator matching the classified type.
pub async fn run(
    document_type: DocumentType,
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    match document_type {
        DocumentType::Dicose => dicose::validate(input),
        DocumentType::Deta => deta::validate(input, oracle).await,
        DocumentType::FlujoDeFondos => cashflow::validate(input, oracle).await,
        DocumentType::Balance => balance::validate(input, oracle).await,
        DocumentType::InformeProfesional => informe::validate(input, oracle).await,
        DocumentType::Unrecognized => unrecognized(input.context.company_category),
    }
}

/// The expected-type list depends on the company category.
pub fn unrecognized(category: Option<CompanyCategory>) -> Verdict {
    let required = match category {
        Some(CompanyCategory::Agricultural) => {
            "Flujo de Fondos, Balance, Informe Profesional, DICOSE, or DETA"
        }
        Some(CompanyCategory::New) => "Balance (up to 3), Informe Profesional, or DICOSE",
        Some(CompanyCategory::Regular) | None => "Flujo de Fondos, Balance, or Informe Profesional",
    };

    Verdict::invalid(format!(
        "Document type not recognized. Please upload one of the following: {required}. \
         Ensure the document title and content clearly indicate the document type."
    ))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::content::{ExtractedContent, FileKind};
    use crate::oracle::{
        ClassificationOracle, DebtContext, DualOpinions, EquationFindings, ProjectionCoverage,
        ReportTier,
    };
    use crate::schema::{CompanyCategory, Document, DocumentType, OrganizationalContext};

    pub fn text_content(text: &str) -> ExtractedContent {
        ExtractedContent {
            text: text.to_lowercase(),
            extension: "txt".to_string(),
            kind: FileKind::Text,
        }
    }

    pub fn context(category: Option<CompanyCategory>) -> OrganizationalContext {
        OrganizationalContext {
            company_category: category,
            ..OrganizationalContext::default()
        }
    }

    pub fn stored_doc(
        document_type: DocumentType,
        year: Option<i32>,
        category: Option<CompanyCategory>,
    ) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: "stored.txt".to_string(),
            locator: "blob://stored".to_string(),
            uploaded_at: Utc::now(),
            is_valid: true,
            validation_message: None,
            document_type,
            company_category: category,
            document_year: year,
        }
    }

    /// Oracle with scripted answers.
    pub struct StubOracle {
        pub tier: ReportTier,
        pub equation: EquationFindings,
        pub opinions: DualOpinions,
        pub coverage: ProjectionCoverage,
    }

    impl Default for StubOracle {
        fn default() -> Self {
            Self {
                tier: ReportTier::Indeterminate,
                equation: EquationFindings::default(),
                opinions: DualOpinions::default(),
                coverage: ProjectionCoverage::default(),
            }
        }
    }

    #[async_trait]
    impl ClassificationOracle for StubOracle {
        async fn classify_report_tier(&self, _text: &str, _debt: &DebtContext) -> ReportTier {
            self.tier
        }

        async fn check_accounting_equation(&self, _text: &str) -> EquationFindings {
            self.equation.clone()
        }

        async fn check_dual_opinions(&self, _text: &str) -> DualOpinions {
            self.opinions
        }

        async fn check_projection_coverage(&self, _text: &str) -> ProjectionCoverage {
            self.coverage
        }
    }
}
