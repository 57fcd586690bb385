use super::{missing_concepts, ValidationInput, Verdict};
use crate::consistency::year_conflicts;
use crate::oracle::ClassificationOracle;
use crate::schema::{CompanyCategory, DocumentType};

const MIN_TEXT_LENGTH: usize = 150;

const REQUIRED_CONCEPTS: &[&str] = &["assets", "liabilities", "income", "equity"];

/// Tolerance below which the accounting equation is considered satisfied.
const EQUATION_TOLERANCE: f64 = 0.01;

/// Balance sheets are checked structurally, then against the accounting
/// equation using figures extracted by the oracle, then for year agreement
/// with any DICOSE documents on file.
pub(crate) async fn validate(
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    let missing = missing_concepts(&input.content.text, REQUIRED_CONCEPTS);
    if missing.len() > 2 {
        return Verdict::invalid(format!(
            "Balance is missing key elements: {}. Please ensure the document includes \
             assets, liabilities, income, and equity.",
            missing.join(", ")
        ));
    }

    if input.content.is_text() && input.content.text.len() < MIN_TEXT_LENGTH {
        return Verdict::invalid(
            "Balance appears to be incomplete. Please provide a comprehensive financial \
             statement.",
        );
    }

    let mut verdict = equation_verdict(input, oracle).await;

    // Year agreement with DICOSE documents overrides a passing equation.
    if matches!(
        input.context.company_category,
        Some(CompanyCategory::Agricultural) | Some(CompanyCategory::New)
    ) {
        if let Some(year) = input.document_year {
            if let Some(conflicting) = year_conflicts(year, input.existing, &[DocumentType::Dicose])
            {
                let years = conflicting
                    .iter()
                    .map(|conflict| conflict.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                verdict = Verdict::invalid(format!(
                    "Balance year ({year}) does not match existing DICOSE documents. Year \
                     mismatch detected. Found documents for years: {years}. All balance and \
                     DICOSE documents must cover the same year."
                ));
            }
        }
    }

    verdict
}

/// The difference is recomputed from the extracted figures; the oracle's own
/// claimed difference and verdict are ignored, so a response asserting the
/// equation holds while its numbers disagree is still rejected.
async fn equation_verdict(
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    let findings = oracle.check_accounting_equation(&input.content.text).await;

    match (findings.assets, findings.liabilities, findings.equity) {
        (Some(assets), Some(liabilities), Some(equity)) => {
            let difference = assets - (liabilities + equity);
            if difference.abs() < EQUATION_TOLERANCE {
                Verdict::valid_with_advisory(format!(
                    "Balance verified: assets {assets:.2} = liabilities {liabilities:.2} + \
                     equity {equity:.2}."
                ))
            } else {
                Verdict::invalid(format!(
                    "Balance does not satisfy the accounting equation: assets {assets:.2}, \
                     liabilities {liabilities:.2}, equity {equity:.2}, difference \
                     {difference:.2}. Please review the figures."
                ))
            }
        }
        _ => Verdict::invalid(
            "Could not extract assets, liabilities, and equity figures from the balance \
             document. Please flag the document for manual review.",
        ),
    }
}
