use regex::Regex;
use std::sync::OnceLock;

/// Lower bound of the plausible year window. Older statements are treated as
/// stray prose years, not the declared document year.
const EARLIEST_PLAUSIBLE_YEAR: i32 = 2020;

/// How far into the future a projection may reasonably claim coverage.
const MAX_PROJECTION_HORIZON: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMode {
    /// Anchor to the most recent past year mentioned.
    Historical,
    /// Anchor to the furthest future year claimed, for later comparison
    /// against a required coverage horizon.
    Projection,
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(20\d{2})\b").expect("valid year pattern"))
}

/// Probe a single text source for 4-digit year tokens.
pub fn year_tokens(input: &str) -> Vec<i32> {
    year_pattern()
        .find_iter(input)
        .filter_map(|token| token.as_str().parse().ok())
        .collect()
}

/// Scan content and filename for a document year.
///
/// Historical mode keeps candidates within `[2020, reference_year]` and picks
/// the maximum: the most recent declared year wins on ambiguity. Projection
/// mode widens the window to `reference_year + 20` and prefers the latest
/// candidate at or after `reference_year` (a genuine future projection year),
/// falling back to the latest candidate of any year.
pub fn extract_year(
    text: &str,
    filename: &str,
    mode: YearMode,
    reference_year: i32,
) -> Option<i32> {
    let mut candidates: Vec<i32> = year_tokens(text);
    candidates.extend(year_tokens(filename));

    let upper_bound = match mode {
        YearMode::Historical => reference_year,
        YearMode::Projection => reference_year + MAX_PROJECTION_HORIZON,
    };
    candidates.retain(|year| (EARLIEST_PLAUSIBLE_YEAR..=upper_bound).contains(year));

    match mode {
        YearMode::Historical => candidates.into_iter().max(),
        YearMode::Projection => {
            let future = candidates
                .iter()
                .copied()
                .filter(|year| *year >= reference_year)
                .max();
            future.or_else(|| candidates.into_iter().max())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_mode_picks_most_recent_past_year() {
        let year = extract_year(
            "statement covering 2021 with comparatives from 2022",
            "balance.txt",
            YearMode::Historical,
            2024,
        );
        assert_eq!(year, Some(2022));
    }

    #[test]
    fn test_historical_mode_excludes_out_of_window_years() {
        let year = extract_year(
            "figures from 2019 and projections to 2031",
            "statement.txt",
            YearMode::Historical,
            2024,
        );
        assert_eq!(year, None);
    }

    #[test]
    fn test_projection_mode_prefers_future_year() {
        let year = extract_year(
            "figures from 2019 and projections to 2031",
            "cashflow.txt",
            YearMode::Projection,
            2024,
        );
        assert_eq!(year, Some(2031));
    }

    #[test]
    fn test_projection_mode_falls_back_to_latest_candidate() {
        let year = extract_year(
            "projection prepared during 2022, base year 2021",
            "cashflow.txt",
            YearMode::Projection,
            2024,
        );
        assert_eq!(year, Some(2022));
    }

    #[test]
    fn test_filename_is_scanned_too() {
        let year = extract_year(
            "no year in the body",
            "dicose-2023.pdf",
            YearMode::Historical,
            2024,
        );
        assert_eq!(year, Some(2023));
    }

    #[test]
    fn test_absent_when_no_tokens_match() {
        assert_eq!(
            extract_year("no years here", "plain.txt", YearMode::Historical, 2024),
            None
        );
        assert_eq!(
            extract_year("no years here", "plain.txt", YearMode::Projection, 2024),
            None
        );
    }
}
