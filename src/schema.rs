use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of document types the pipeline can assign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum DocumentType {
    /// Projected cash-flow statement.
    FlujoDeFondos,
    /// Financial statement (balance sheet).
    Balance,
    /// Accountant's report, tiered by assurance level.
    InformeProfesional,
    /// Agricultural livestock registry declaration.
    Dicose,
    /// Agricultural technical/credit declaration with dual opinions.
    Deta,
    Unrecognized,
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::FlujoDeFondos => "Flujo de Fondos",
            DocumentType::Balance => "Balance",
            DocumentType::InformeProfesional => "Informe Profesional",
            DocumentType::Dicose => "DICOSE",
            DocumentType::Deta => "DETA",
            DocumentType::Unrecognized => "Unrecognized",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CompanyCategory {
    Regular,
    Agricultural,
    New,
}

/// One validated or rejected submission.
///
/// Documents are immutable once created: revalidating the same upload
/// produces a new `Document` that may supersede this one in the store, it
/// never mutates an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Original filename as uploaded.
    pub name: String,
    /// Opaque reference to the stored bytes.
    pub locator: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_valid: bool,
    /// Set whenever `is_valid` is false, or for a valid document that
    /// carries an advisory note.
    pub validation_message: Option<String>,
    pub document_type: DocumentType,
    pub company_category: Option<CompanyCategory>,
    pub document_year: Option<i32>,
}

impl Document {
    /// Grouping key used exclusively by the upsert/replace policy.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::derive(self.document_type, self.company_category, self.document_year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub document_type: DocumentType,
    pub company_category: Option<CompanyCategory>,
    pub document_year: Option<i32>,
}

impl IdentityKey {
    /// The year participates only for Balance and DICOSE documents of
    /// agricultural or new companies, where per-year uniqueness matters.
    pub fn derive(
        document_type: DocumentType,
        company_category: Option<CompanyCategory>,
        document_year: Option<i32>,
    ) -> Self {
        let year_scoped = matches!(
            document_type,
            DocumentType::Balance | DocumentType::Dicose
        ) && matches!(
            company_category,
            Some(CompanyCategory::Agricultural) | Some(CompanyCategory::New)
        );

        Self {
            document_type,
            company_category,
            document_year: if year_scoped { document_year } else { None },
        }
    }
}

/// Process-wide mutable configuration, not attached to any single document.
///
/// Changing the category clears neither debt field nor any stored document;
/// it only changes which documents are considered required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationalContext {
    pub company_category: Option<CompanyCategory>,
    /// Declared maximum debt, in UYU.
    pub max_debt_amount: Option<f64>,
    pub max_debt_term_years: Option<u32>,
}

impl OrganizationalContext {
    pub fn set_company_category(&mut self, category: Option<CompanyCategory>) {
        self.company_category = category;
    }

    /// Non-finite or negative inputs reset the amount to unset rather than
    /// erroring.
    pub fn set_max_debt_amount(&mut self, amount: f64) {
        self.max_debt_amount = if amount.is_finite() && amount >= 0.0 {
            Some(amount)
        } else {
            None
        };
    }

    /// Negative inputs reset the term to unset rather than erroring.
    pub fn set_max_debt_term_years(&mut self, years: i64) {
        self.max_debt_term_years = u32::try_from(years).ok();
    }

    pub fn apply(&mut self, update: &ContextUpdate) {
        if let Some(category) = update.company_category {
            self.set_company_category(Some(category));
        }
        if let Some(amount) = update.max_debt_amount {
            self.set_max_debt_amount(amount);
        }
        if let Some(years) = update.max_debt_term_years {
            self.set_max_debt_term_years(years);
        }
    }
}

/// Partial context update applied through the boundary API. Absent fields
/// leave the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextUpdate {
    pub company_category: Option<CompanyCategory>,
    pub max_debt_amount: Option<f64>,
    pub max_debt_term_years: Option<i64>,
}
