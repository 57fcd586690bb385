use crate::schema::{CompanyCategory, Document, DocumentType};

/// Result of a cross-document year reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearConsistency {
    pub consistent: bool,
    /// Distinct years found, sorted ascending.
    pub years: Vec<i32>,
    /// The agreed year, when exactly one distinct year exists.
    pub expected_year: Option<i32>,
}

/// Collect the distinct years of currently-valid documents of the given
/// types. Evaluated fresh against the current store snapshot on every call;
/// more than one distinct year is an inconsistency.
pub fn year_consistency(documents: &[Document], types: &[DocumentType]) -> YearConsistency {
    let mut years: Vec<i32> = documents
        .iter()
        .filter(|doc| doc.is_valid && types.contains(&doc.document_type))
        .filter_map(|doc| doc.document_year)
        .collect();
    years.sort_unstable();
    years.dedup();

    YearConsistency {
        consistent: years.len() <= 1,
        expected_year: if years.len() == 1 { Some(years[0]) } else { None },
        years,
    }
}

/// Join a candidate year with the years of existing valid documents of the
/// given types. Returns the conflicting year set (sorted) when the union
/// holds more than one distinct year.
pub fn year_conflicts(
    candidate_year: i32,
    documents: &[Document],
    types: &[DocumentType],
) -> Option<Vec<i32>> {
    let mut years = year_consistency(documents, types).years;
    years.push(candidate_year);
    years.sort_unstable();
    years.dedup();

    if years.len() > 1 {
        Some(years)
    } else {
        None
    }
}

/// Balance documents a new company may hold.
pub const NEW_COMPANY_BALANCE_QUOTA: usize = 3;

/// What the store should do with a freshly validated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertDecision {
    /// No entry at the key; persist the valid document.
    Insert,
    /// Replace the entry at the key (valid over anything, or
    /// last-invalid-wins so the most recent error surfaces).
    Replace,
    /// New invalid, existing valid: leave the store untouched.
    KeepExisting,
    /// First invalid at this key: reported to the caller and kept in the
    /// rejection slot, not in the primary collection.
    RecordRejection,
    /// A valid Balance for a new company beyond the per-company quota.
    QuotaExceeded,
}

/// Keyed upsert/replace policy, as a pure decision table.
///
/// `valid_balance_count` is the number of valid Balance documents currently
/// stored, used for the new-company quota. The quota is checked before the
/// replace rules: a structurally sound fourth Balance is still rejected.
pub fn plan_upsert(
    candidate: &Document,
    existing: Option<&Document>,
    valid_balance_count: usize,
) -> UpsertDecision {
    if candidate.is_valid
        && candidate.document_type == DocumentType::Balance
        && candidate.company_category == Some(CompanyCategory::New)
        && valid_balance_count >= NEW_COMPANY_BALANCE_QUOTA
    {
        return UpsertDecision::QuotaExceeded;
    }

    match existing {
        Some(_) if candidate.is_valid => UpsertDecision::Replace,
        Some(existing) if !existing.is_valid => UpsertDecision::Replace,
        Some(_) => UpsertDecision::KeepExisting,
        None if candidate.is_valid => UpsertDecision::Insert,
        None => UpsertDecision::RecordRejection,
    }
}

pub fn quota_exceeded_message() -> String {
    "New companies can only upload up to 3 balance documents. \
     You have already uploaded the maximum number."
        .to_string()
}
