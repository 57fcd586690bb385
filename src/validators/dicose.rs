use super::{ValidationInput, Verdict};
use crate::consistency::year_conflicts;
use crate::schema::{CompanyCategory, DocumentType};

const MIN_TEXT_LENGTH: usize = 50;

/// DICOSE registry declarations: agricultural and new companies only, must
/// carry a year, and that year has to line up with the balance documents
/// already on file.
pub(crate) fn validate(input: &ValidationInput<'_>) -> Verdict {
    if !matches!(
        input.context.company_category,
        Some(CompanyCategory::Agricultural) | Some(CompanyCategory::New)
    ) {
        return Verdict::invalid(
            "DICOSE documents are only required for agricultural companies and new companies. \
             Please select the correct company type.",
        );
    }

    let Some(year) = input.document_year else {
        return Verdict::invalid(
            "DICOSE document must include a specific year. Please ensure the document \
             clearly indicates the year it corresponds to.",
        );
    };

    if input.content.is_text() && input.content.text.len() < MIN_TEXT_LENGTH {
        return Verdict::invalid(
            "DICOSE document appears to be incomplete. Please provide a complete DICOSE \
             registration document.",
        );
    }

    if let Some(conflicting) = year_conflicts(
        year,
        input.existing,
        &[DocumentType::Balance, DocumentType::Dicose],
    ) {
        let years = conflicting
            .iter()
            .map(|conflict| conflict.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Verdict::invalid(format!(
            "DICOSE year ({year}) does not match existing balance documents. Year mismatch \
             detected. Found documents for years: {years}. All balance and DICOSE documents \
             must cover the same year."
        ));
    }

    Verdict::valid()
}
