use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Assurance tier of an accountant's report, ordered from weakest to
/// strongest. `Indeterminate` means the oracle could not decide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ReportTier {
    #[schemars(description = "A compilation report: figures assembled without assurance")]
    Compilation,
    #[schemars(description = "A limited review: analytical procedures, moderate assurance")]
    LimitedReview,
    #[schemars(description = "A full audit: highest assurance level")]
    Audit,
    #[schemars(description = "The document's assurance tier cannot be determined")]
    Indeterminate,
}

impl ReportTier {
    /// Rank within the assurance ladder; `None` for Indeterminate.
    pub fn rank(&self) -> Option<u8> {
        match self {
            ReportTier::Compilation => Some(0),
            ReportTier::LimitedReview => Some(1),
            ReportTier::Audit => Some(2),
            ReportTier::Indeterminate => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportTier::Compilation => "Compilation",
            ReportTier::LimitedReview => "Limited Review",
            ReportTier::Audit => "Audit",
            ReportTier::Indeterminate => "Indeterminate",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OpinionPresence {
    Present,
    Absent,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

impl Confidence {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Confidence::High | Confidence::Medium)
    }
}

/// Figures extracted from a balance document.
///
/// The oracle reports its own difference and verdict, but consumers must
/// recompute the difference from the extracted figures: an inconsistent
/// response claiming the equation holds while its own numbers disagree is
/// overridden by the recomputation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EquationFindings {
    #[schemars(description = "Total assets, if stated in the document")]
    pub assets: Option<f64>,
    #[schemars(description = "Total liabilities, if stated in the document")]
    pub liabilities: Option<f64>,
    #[schemars(description = "Total equity, if stated in the document")]
    pub equity: Option<f64>,
    #[schemars(description = "The difference assets - (liabilities + equity) as computed by the classifier")]
    pub claimed_difference: Option<f64>,
    #[schemars(description = "Whether the classifier believes the accounting equation holds")]
    pub claimed_balanced: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct DualOpinions {
    #[schemars(description = "Presence of an opinion on the projected cashflow")]
    pub cashflow_opinion: OpinionPresence,
    #[schemars(description = "Presence of an overall opinion on the credit application")]
    pub credit_opinion: OpinionPresence,
}

impl Default for DualOpinions {
    fn default() -> Self {
        Self {
            cashflow_opinion: OpinionPresence::Unknown,
            credit_opinion: OpinionPresence::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionCoverage {
    #[schemars(description = "Final calendar year the projection explicitly covers")]
    pub final_year: Option<i32>,
    #[schemars(description = "Projection duration in years, when stated as a duration")]
    pub duration_years: Option<u32>,
    #[schemars(description = "How confident the classifier is in the coverage reading")]
    pub confidence: Confidence,
}

impl Default for ProjectionCoverage {
    fn default() -> Self {
        Self {
            final_year: None,
            duration_years: None,
            confidence: Confidence::None,
        }
    }
}

/// Debt configuration handed to the tier classifier for context.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DebtContext {
    pub max_debt_amount: Option<f64>,
    pub max_debt_term_years: Option<u32>,
}

/// External fuzzy-classification and extraction capability consulted by the
/// validators.
///
/// Every call is infallible at this boundary: implementations degrade
/// transport or credential failures into `Unknown`/`Indeterminate` results
/// instead of propagating, so an unreachable service routes through the
/// normal invalid-document path and never crashes the pipeline.
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    async fn classify_report_tier(&self, text: &str, debt: &DebtContext) -> ReportTier;

    async fn check_accounting_equation(&self, text: &str) -> EquationFindings;

    async fn check_dual_opinions(&self, text: &str) -> DualOpinions;

    async fn check_projection_coverage(&self, text: &str) -> ProjectionCoverage;
}

/// Oracle that knows nothing: every answer is the degraded default. Useful
/// for wiring the pipeline without the `gemini` feature.
pub struct NullOracle;

#[async_trait]
impl ClassificationOracle for NullOracle {
    async fn classify_report_tier(&self, _text: &str, _debt: &DebtContext) -> ReportTier {
        ReportTier::Indeterminate
    }

    async fn check_accounting_equation(&self, _text: &str) -> EquationFindings {
        EquationFindings::default()
    }

    async fn check_dual_opinions(&self, _text: &str) -> DualOpinions {
        DualOpinions::default()
    }

    async fn check_projection_coverage(&self, _text: &str) -> ProjectionCoverage {
        ProjectionCoverage::default()
    }
}
