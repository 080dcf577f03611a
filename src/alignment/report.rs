use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::alignment::mispronunciation::DetectionOutcome;
use crate::alignment::mistakes::{MistakeTally, ParagraphMistake};
use crate::types::{
    MissingWords, ParagraphResult, ParagraphStatus, ScoredParagraphs, Span, WordEncoding,
};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub attempt: AttemptReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub attempt_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_phonemes_path: Option<String>,
    pub paragraph_count: usize,
}

/// Everything the reading UI and the story generator need from one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub result: Vec<Vec<Span>>,
    pub stats: AttemptStats,
    pub mispronunciations: Vec<ParagraphFeedback>,
    pub mistakes: MistakeTally,
    pub mistakes_per_paragraph: Vec<ParagraphMistake>,
    pub missing_words: Vec<MissingWords>,
    pub target_phonemes: Vec<String>,
    pub paragraphs: Vec<ParagraphDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptStats {
    pub accuracy: f64,
    pub scored_paragraphs: u32,
    pub excluded_paragraphs: u32,
    pub checked_paragraphs: u32,
    pub mispronunciation_count: u32,
}

/// Pronunciation feedback for one paragraph slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphFeedback {
    /// Detection did not run: word counts differed, no speech, or no phoneme data.
    Skipped,
    Checked(DetectionOutcome),
}

impl ParagraphFeedback {
    pub fn outcome(&self) -> Option<&DetectionOutcome> {
        match self {
            Self::Skipped => None,
            Self::Checked(outcome) => Some(outcome),
        }
    }
}

/// `[]` when skipped, otherwise the outcome's own event list.
impl Serialize for ParagraphFeedback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Skipped => serializer.serialize_seq(Some(0))?.end(),
            Self::Checked(outcome) => outcome.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphDetail {
    pub status: ParagraphStatus,
    pub accuracy: Option<f64>,
    pub correct_words: u32,
    pub reference_words: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audit: Vec<WordEncoding>,
}

pub fn compute_attempt_report(
    scored: ScoredParagraphs,
    feedback: Vec<ParagraphFeedback>,
    mistakes: MistakeTally,
    mistakes_per_paragraph: Vec<ParagraphMistake>,
    target_phonemes: Vec<String>,
) -> AttemptReport {
    let stats = compute_attempt_stats(&scored, &feedback);
    let paragraphs = scored
        .paragraphs
        .iter()
        .enumerate()
        .map(|(i, paragraph)| paragraph_detail(paragraph, feedback.get(i)))
        .collect();
    let missing_words = scored
        .paragraphs
        .iter()
        .map(|paragraph| paragraph.missing_words)
        .collect();
    let result = scored
        .paragraphs
        .into_iter()
        .map(|paragraph| paragraph.spans)
        .collect();

    AttemptReport {
        result,
        stats,
        mispronunciations: feedback,
        mistakes,
        mistakes_per_paragraph,
        missing_words,
        target_phonemes,
        paragraphs,
    }
}

pub fn compute_attempt_stats(
    scored: &ScoredParagraphs,
    feedback: &[ParagraphFeedback],
) -> AttemptStats {
    let scored_paragraphs = scored
        .paragraphs
        .iter()
        .filter(|paragraph| paragraph.counts_toward_accuracy())
        .count();
    let checked: Vec<&DetectionOutcome> = feedback
        .iter()
        .filter_map(ParagraphFeedback::outcome)
        .collect();
    let mispronunciation_count = checked
        .iter()
        .filter_map(|outcome| outcome.detection())
        .map(|detection| detection.events().count())
        .sum::<usize>();

    AttemptStats {
        accuracy: scored.accuracy,
        scored_paragraphs: to_u32(scored_paragraphs),
        excluded_paragraphs: to_u32(scored.paragraphs.len() - scored_paragraphs),
        checked_paragraphs: to_u32(checked.len()),
        mispronunciation_count: to_u32(mispronunciation_count),
    }
}

fn paragraph_detail(
    paragraph: &ParagraphResult,
    feedback: Option<&ParagraphFeedback>,
) -> ParagraphDetail {
    let audit = feedback
        .and_then(ParagraphFeedback::outcome)
        .and_then(DetectionOutcome::detection)
        .map(|detection| detection.encodings())
        .unwrap_or_default();
    ParagraphDetail {
        status: paragraph.status,
        accuracy: paragraph.accuracy,
        correct_words: to_u32(paragraph.correct_words),
        reference_words: to_u32(paragraph.reference_words),
        audit,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
