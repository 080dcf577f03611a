use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScoringError;

/// Attempt-scoring settings. Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of weakest phoneme labels handed to story generation.
    pub top_n: usize,
    /// Inclusive bounds of the random count given to padding labels.
    pub padding_count_min: u32,
    pub padding_count_max: u32,
    /// Fixed seed for padding draws; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// JSON object of `symbol -> label` overrides merged onto the built-in table.
    pub labels_path: Option<String>,
    /// Labels eligible for padding. Defaults to every non-empty label of the table.
    pub vocabulary: Option<Vec<String>>,
    pub target_phonemes_path: String,
}

impl ScoringConfig {
    pub const DEFAULT_TOP_N: usize = 5;
    pub const DEFAULT_PADDING_COUNT_MIN: u32 = 1;
    pub const DEFAULT_PADDING_COUNT_MAX: u32 = 10;
    pub const DEFAULT_TARGET_PHONEMES_FILE: &'static str = "phonemes.txt";

    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::io("read scoring config", e))?;
        serde_json::from_str(&data).map_err(|e| ScoringError::json("parse scoring config", e))
    }

    pub fn padding_counts(&self) -> RangeInclusive<u32> {
        self.padding_count_min..=self.padding_count_max
    }

    pub(crate) fn validate(&self) -> Result<(), ScoringError> {
        if self.top_n == 0 {
            return Err(ScoringError::invalid_input("top_n must be >= 1"));
        }
        if self.padding_count_min == 0 || self.padding_count_min > self.padding_count_max {
            return Err(ScoringError::invalid_input(format!(
                "padding count range {}..={} is empty or includes zero",
                self.padding_count_min, self.padding_count_max
            )));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_n: Self::DEFAULT_TOP_N,
            padding_count_min: Self::DEFAULT_PADDING_COUNT_MIN,
            padding_count_max: Self::DEFAULT_PADDING_COUNT_MAX,
            rng_seed: None,
            labels_path: None,
            vocabulary: None,
            target_phonemes_path: Self::DEFAULT_TARGET_PHONEMES_FILE.to_string(),
        }
    }
}
