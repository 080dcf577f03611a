use std::collections::BTreeMap;
use std::path::Path;

use crate::alignment::phonemes::PhonemeLabels;
use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::defaults::{DefaultTextNormalizer, LevenshteinAligner};
use crate::pipeline::runtime::{ReadingScorer, ReadingScorerParts};
use crate::pipeline::traits::{SequenceAligner, TextNormalizer};

pub struct ReadingScorerBuilder {
    config: ScoringConfig,
    labels: Option<PhonemeLabels>,
    text_normalizer: Option<Box<dyn TextNormalizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
}

impl ReadingScorerBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            labels: None,
            text_normalizer: None,
            sequence_aligner: None,
        }
    }

    /// Replaces the built-in label table. `labels_path` overrides from the
    /// config are still applied on top.
    pub fn with_labels(mut self, labels: PhonemeLabels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_text_normalizer(mut self, text_normalizer: Box<dyn TextNormalizer>) -> Self {
        self.text_normalizer = Some(text_normalizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn build(self) -> Result<ReadingScorer, ScoringError> {
        self.config.validate()?;

        let mut labels = self.labels.unwrap_or_default();
        if let Some(path) = self.config.labels_path.as_deref() {
            labels = labels.with_overrides(load_label_overrides(Path::new(path))?);
        }

        let vocabulary = match self.config.vocabulary.as_ref() {
            Some(vocabulary) => vocabulary.clone(),
            None => labels.vocabulary(),
        };
        if vocabulary.len() < self.config.top_n {
            tracing::warn!(
                vocabulary = vocabulary.len(),
                top_n = self.config.top_n,
                "builder: padding vocabulary smaller than top_n"
            );
        }

        Ok(ReadingScorer::from_parts(ReadingScorerParts {
            config: self.config,
            labels,
            vocabulary,
            text_normalizer: self
                .text_normalizer
                .unwrap_or_else(|| Box::new(DefaultTextNormalizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(LevenshteinAligner)),
        }))
    }
}

fn load_label_overrides(path: &Path) -> Result<BTreeMap<String, String>, ScoringError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| ScoringError::io("read phoneme labels", e))?;
    let raw: BTreeMap<String, String> = serde_json::from_str(&data)
        .map_err(|e| ScoringError::json("parse phoneme labels", e))?;

    Ok(raw
        .into_iter()
        .filter(|(symbol, _)| !symbol.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignmentOp, Paragraph, Token};

    struct NoOpAligner;

    impl SequenceAligner for NoOpAligner {
        fn align(&self, _reference: &[Token], _hypothesis: &[Token]) -> Vec<AlignmentOp> {
            Vec::new()
        }
    }

    #[test]
    fn builder_defaults() {
        let builder = ReadingScorerBuilder::new(ScoringConfig::default());
        assert!(builder.labels.is_none());
        assert!(builder.sequence_aligner.is_none());
        let scorer = builder.build().expect("build should succeed");
        assert_eq!(scorer.vocabulary(), PhonemeLabels::default().vocabulary());
        assert_eq!(scorer.labels().label("ʃ"), "sh");
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = ScoringConfig {
            top_n: 0,
            ..ScoringConfig::default()
        };
        let result = ReadingScorerBuilder::new(config).build();
        assert!(matches!(result, Err(ScoringError::InvalidInput { .. })));
    }

    #[test]
    fn builder_uses_custom_aligner() {
        let scorer = ReadingScorerBuilder::new(ScoringConfig::default())
            .with_sequence_aligner(Box::new(NoOpAligner))
            .build()
            .expect("build should succeed");
        let scored =
            scorer.score_paragraphs(&["the cat".to_string()], &[Paragraph::from("the cat")]);
        assert!(scored.paragraphs[0].ops.is_empty());
        assert_eq!(scored.accuracy, 0.0);
    }

    #[test]
    fn build_applies_label_overrides_from_file() {
        let path = std::env::temp_dir().join("reading_coach_builder_labels.json");
        std::fs::write(&path, r#"{"ə": "uh", "ɹ": "r", "": "ignored"}"#).expect("write labels");
        let config = ScoringConfig {
            labels_path: Some(path.to_string_lossy().to_string()),
            ..ScoringConfig::default()
        };
        let scorer = ReadingScorerBuilder::new(config)
            .build()
            .expect("build should succeed");
        assert_eq!(scorer.labels().label("ə"), "uh");
        assert_eq!(scorer.labels().label("ɹ"), "r");
        assert_eq!(scorer.labels().len(), PhonemeLabels::default().len() + 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn build_fails_on_missing_labels_file() {
        let config = ScoringConfig {
            labels_path: Some("/nonexistent/labels.json".to_string()),
            ..ScoringConfig::default()
        };
        let result = ReadingScorerBuilder::new(config).build();
        assert!(matches!(result, Err(ScoringError::Io { .. })));
    }

    #[test]
    fn build_fails_on_malformed_labels_file() {
        let path = std::env::temp_dir().join("reading_coach_builder_labels_bad.json");
        std::fs::write(&path, r#"["not", "a", "map"]"#).expect("write labels");
        let config = ScoringConfig {
            labels_path: Some(path.to_string_lossy().to_string()),
            ..ScoringConfig::default()
        };
        let result = ReadingScorerBuilder::new(config).build();
        assert!(matches!(result, Err(ScoringError::Json { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn configured_vocabulary_wins_over_label_table() {
        let config = ScoringConfig {
            vocabulary: Some(vec!["sh".to_string(), "ch".to_string()]),
            ..ScoringConfig::default()
        };
        let scorer = ReadingScorerBuilder::new(config)
            .build()
            .expect("build should succeed");
        assert_eq!(scorer.vocabulary(), ["sh", "ch"]);
    }
}
