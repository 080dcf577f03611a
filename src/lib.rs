pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::mispronunciation::{detect, detect_with, DetectionOutcome, PhonemeDetection};
pub use alignment::mistakes::{rank, rank_with, write_target_phonemes, MistakeTally};
pub use alignment::phonemes::PhonemeLabels;
pub use alignment::report::{AttemptReport, ParagraphFeedback, Report};
pub use alignment::scoring::{check_missing_words, score_paragraphs, score_paragraphs_with};
pub use config::ScoringConfig;
pub use error::ScoringError;
pub use pipeline::builder::ReadingScorerBuilder;
pub use pipeline::runtime::ReadingScorer;
pub use pipeline::traits::{SequenceAligner, TextNormalizer};
pub use types::{AlignmentOp, AttemptInput, MissingWords, Paragraph, ScoredParagraphs, Span};
