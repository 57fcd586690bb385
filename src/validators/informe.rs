use super::{missing_concepts, ValidationInput, Verdict};
use crate::oracle::{ClassificationOracle, DebtContext, ReportTier};

const MIN_TEXT_LENGTH: usize = 50;

const REQUIRED_CONCEPTS: &[&str] = &["certified", "declaration", "accountant"];

/// Debt thresholds (UYU) mapping to the minimum acceptable assurance tier.
const LIMITED_REVIEW_THRESHOLD: f64 = 900_000.0;
const AUDIT_THRESHOLD: f64 = 2_400_000.0;

/// Minimum assurance tier an accountant report must reach for the declared
/// maximum debt.
pub fn required_tier(max_debt_amount: f64) -> ReportTier {
    if max_debt_amount < LIMITED_REVIEW_THRESHOLD {
        ReportTier::Compilation
    } else if max_debt_amount < AUDIT_THRESHOLD {
        ReportTier::LimitedReview
    } else {
        ReportTier::Audit
    }
}

/// Accountant reports are tiered by the oracle, compared against the debt
/// threshold ladder, then checked for certification language.
pub(crate) async fn validate(
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    let debt = DebtContext {
        max_debt_amount: input.context.max_debt_amount,
        max_debt_term_years: input.context.max_debt_term_years,
    };
    let tier = oracle.classify_report_tier(&input.content.text, &debt).await;

    let Some(tier_rank) = tier.rank() else {
        return Verdict::invalid(
            "Could not determine the assurance tier of the accountant report. Please flag \
             the document for manual review.",
        );
    };

    let Some(amount) = input.context.max_debt_amount else {
        return Verdict::invalid(
            "A maximum debt amount must be configured before accountant reports can be \
             validated. Please set the declared maximum debt first.",
        );
    };

    let required = required_tier(amount);
    if Some(tier_rank) < required.rank() {
        return Verdict::invalid(format!(
            "An accountant report with at least {} assurance is required for a declared \
             maximum debt of {amount:.2} UYU, but this document is a {}.",
            required.label(),
            tier.label()
        ));
    }

    let missing = missing_concepts(&input.content.text, REQUIRED_CONCEPTS);
    if missing.len() > 1 {
        return Verdict::invalid(format!(
            "Accountant report is missing required elements: {}. Please ensure the \
             document is properly certified by a qualified accountant.",
            missing.join(", ")
        ));
    }

    if input.content.is_text() && input.content.text.len() < MIN_TEXT_LENGTH {
        return Verdict::invalid(
            "Accountant report appears to be incomplete. Please provide a complete report \
             from a certified accountant.",
        );
    }

    Verdict::valid()
}
