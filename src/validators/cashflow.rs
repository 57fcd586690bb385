use log::debug;

use super::{missing_concepts, ValidationInput, Verdict};
use crate::oracle::ClassificationOracle;

const MIN_TEXT_LENGTH: usize = 100;

/// Activity sections a projected cashflow must mention.
const REQUIRED_CONCEPTS: &[&str] = &["operating", "investing", "financing", "cash"];

/// Projected cashflows are checked structurally, then for coverage: the
/// projection horizon must reach at least as far as the declared maximum
/// debt term.
pub(crate) async fn validate(
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    let missing = missing_concepts(&input.content.text, REQUIRED_CONCEPTS);
    if missing.len() > 2 {
        return Verdict::invalid(format!(
            "Cashflow projection is missing key elements: {}. Please ensure the document \
             includes operating, investing, and financing activities.",
            missing.join(", ")
        ));
    }

    if input.content.is_text() && input.content.text.len() < MIN_TEXT_LENGTH {
        return Verdict::invalid(
            "Cashflow projection appears to be incomplete. Please provide a detailed \
             projected cashflow statement.",
        );
    }

    let term_years = match input.context.max_debt_term_years {
        Some(term) if term > 0 => term,
        _ => {
            debug!("coverage check skipped: no maximum debt term configured");
            return Verdict::valid();
        }
    };

    let coverage = oracle.check_projection_coverage(&input.content.text).await;
    let coverage_year = coverage
        .final_year
        .or_else(|| {
            coverage
                .duration_years
                .map(|duration| input.reference_year + duration as i32)
        })
        .filter(|_| coverage.confidence.is_reliable());

    let Some(coverage_year) = coverage_year else {
        return Verdict::invalid(
            "Could not determine how many years the cashflow projection covers. Please \
             state the projection horizon explicitly.",
        );
    };

    let required_year = input.reference_year + term_years as i32;
    if coverage_year < required_year {
        return Verdict::invalid(format!(
            "Cashflow projection covers up to {coverage_year}, but the declared maximum \
             debt term requires coverage through {required_year}. Please extend the \
             projection."
        ));
    }

    Verdict::valid_with_advisory(format!(
        "Cashflow projection covers through {coverage_year}, meeting the required horizon \
         of {required_year}."
    ))
}
