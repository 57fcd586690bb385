use super::{ValidationInput, Verdict};
use crate::oracle::{ClassificationOracle, OpinionPresence};
use crate::schema::CompanyCategory;

const MIN_TEXT_LENGTH: usize = 100;

const INCOMPLETE_MESSAGE: &str =
    "DETA document appears to be incomplete. Please provide a comprehensive DETA \
     declaration with detailed opinions on both the cashflow and credit application.";

/// DETA declarations require two professional opinions: one on the projected
/// cashflow and one on the overall credit application. Their presence is a
/// fuzzy judgement delegated to the oracle.
pub(crate) async fn validate(
    input: &ValidationInput<'_>,
    oracle: &dyn ClassificationOracle,
) -> Verdict {
    if input.context.company_category != Some(CompanyCategory::Agricultural) {
        return Verdict::invalid(
            "DETA documents are only required for agricultural companies. Please select \
             the correct company type.",
        );
    }

    let opinions = oracle.check_dual_opinions(&input.content.text).await;

    let opinion_failure = match (opinions.cashflow_opinion, opinions.credit_opinion) {
        (OpinionPresence::Unknown, _) | (_, OpinionPresence::Unknown) => Some(
            "Could not determine whether the DETA document contains the required opinions. \
             Please flag the document for manual review."
                .to_string(),
        ),
        (OpinionPresence::Absent, OpinionPresence::Absent) => Some(
            "DETA document must include both an opinion on the projected cashflow and an \
             overall opinion on the credit application. Both opinions are missing."
                .to_string(),
        ),
        (OpinionPresence::Absent, OpinionPresence::Present) => Some(
            "DETA document is missing an opinion on the projected cashflow. Please include \
             an assessment of the cashflow projections."
                .to_string(),
        ),
        (OpinionPresence::Present, OpinionPresence::Absent) => Some(
            "DETA document is missing an overall opinion on the credit application. Please \
             include a final recommendation or assessment."
                .to_string(),
        ),
        (OpinionPresence::Present, OpinionPresence::Present) => None,
    };

    let too_short = input.content.is_text() && input.content.text.len() < MIN_TEXT_LENGTH;

    // The length problem never overrides the opinion verdict, it is appended
    // as a supplementary reason.
    match (opinion_failure, too_short) {
        (None, false) => Verdict::valid(),
        (None, true) => Verdict::invalid(INCOMPLETE_MESSAGE),
        (Some(message), false) => Verdict::invalid(message),
        (Some(message), true) => Verdict::invalid(format!("{message} {INCOMPLETE_MESSAGE}")),
    }
}
