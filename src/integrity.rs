use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Extensions subject to the binary structural-integrity gate.
pub const PAGE_DESCRIPTION_EXTENSIONS: &[&str] = &["pdf"];

pub fn is_page_description(extension: &str) -> bool {
    PAGE_DESCRIPTION_EXTENSIONS.contains(&extension)
}

/// Replaceable structural-integrity check for binary page-description
/// formats, run after all content checks pass.
///
/// The stock policy emulates unreliable binary validation with a seedable
/// random rejection; tests inject [`AlwaysPass`] to stay deterministic.
pub trait IntegrityPolicy: Send + Sync {
    /// `true` when the file is considered structurally sound.
    fn passes(&self, extension: &str) -> bool;
}

/// Rejects a fixed fraction of inspected files, driven by a seedable RNG.
pub struct RandomRejection {
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomRejection {
    pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

    pub fn new() -> Self {
        Self {
            failure_rate: Self::DEFAULT_FAILURE_RATE,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64, failure_rate: f64) -> Self {
        Self {
            failure_rate,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomRejection {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityPolicy for RandomRejection {
    fn passes(&self, _extension: &str) -> bool {
        let mut rng = self.rng.lock().expect("integrity rng lock");
        rng.gen::<f64>() >= self.failure_rate
    }
}

pub struct AlwaysPass;

impl IntegrityPolicy for AlwaysPass {
    fn passes(&self, _extension: &str) -> bool {
        true
    }
}

pub fn corruption_message(type_label: &str) -> String {
    format!("{type_label} PDF file appears to be corrupted or improperly formatted.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_policy_is_reproducible() {
        let first = RandomRejection::seeded(42, 0.5);
        let second = RandomRejection::seeded(42, 0.5);

        let first_run: Vec<bool> = (0..16).map(|_| first.passes("pdf")).collect();
        let second_run: Vec<bool> = (0..16).map(|_| second.passes("pdf")).collect();
        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_zero_failure_rate_always_passes() {
        let policy = RandomRejection::seeded(7, 0.0);
        assert!((0..32).all(|_| policy.passes("pdf")));
    }

    #[test]
    fn test_unit_failure_rate_always_rejects() {
        let policy = RandomRejection::seeded(7, 1.0);
        assert!((0..32).all(|_| !policy.passes("pdf")));
    }

    #[test]
    fn test_page_description_detection() {
        assert!(is_page_description("pdf"));
        assert!(!is_page_description("txt"));
        assert!(!is_page_description("docx"));
    }
}
