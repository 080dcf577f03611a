use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Smallest comparable unit in an alignment: a normalized word or a phoneme symbol.
pub type Token = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Match,
    Substitution,
    Insertion,
    Deletion,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Substitution => "substitution",
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
        }
    }
}

/// One step of an edit-distance alignment.
///
/// `reference_index` is the position in the reference sequence the op is
/// attached to. Insertions carry the index of the next reference token, so a
/// trailing insertion points one past the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AlignmentOp<T = Token> {
    Match {
        reference: T,
        hypothesis: T,
        reference_index: usize,
    },
    Substitution {
        reference: T,
        hypothesis: T,
        reference_index: usize,
    },
    Insertion {
        hypothesis: T,
        reference_index: usize,
    },
    Deletion {
        reference: T,
        reference_index: usize,
    },
}

impl<T> AlignmentOp<T> {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Match { .. } => OpKind::Match,
            Self::Substitution { .. } => OpKind::Substitution,
            Self::Insertion { .. } => OpKind::Insertion,
            Self::Deletion { .. } => OpKind::Deletion,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    pub fn reference(&self) -> Option<&T> {
        match self {
            Self::Match { reference, .. }
            | Self::Substitution { reference, .. }
            | Self::Deletion { reference, .. } => Some(reference),
            Self::Insertion { .. } => None,
        }
    }

    pub fn hypothesis(&self) -> Option<&T> {
        match self {
            Self::Match { hypothesis, .. }
            | Self::Substitution { hypothesis, .. }
            | Self::Insertion { hypothesis, .. } => Some(hypothesis),
            Self::Deletion { .. } => None,
        }
    }

    pub fn reference_index(&self) -> usize {
        match self {
            Self::Match {
                reference_index, ..
            }
            | Self::Substitution {
                reference_index, ..
            }
            | Self::Insertion {
                reference_index, ..
            }
            | Self::Deletion {
                reference_index, ..
            } => *reference_index,
        }
    }
}

/// A transcript slot. `Empty` means upstream voice activity detection found no
/// speech for the paragraph.
///
/// At the JSON boundary `null` and the legacy `"empty"` marker both decode to
/// `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Paragraph {
    Present(String),
    Empty,
}

impl Paragraph {
    pub const LEGACY_EMPTY_MARKER: &'static str = "empty";

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Option<String>> for Paragraph {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) if text != Self::LEGACY_EMPTY_MARKER => Self::Present(text),
            _ => Self::Empty,
        }
    }
}

impl From<Paragraph> for Option<String> {
    fn from(value: Paragraph) -> Self {
        match value {
            Paragraph::Present(text) => Some(text),
            Paragraph::Empty => None,
        }
    }
}

impl From<&str> for Paragraph {
    fn from(value: &str) -> Self {
        Self::from(Some(value.to_string()))
    }
}

/// Word-count comparison between a reference paragraph and its transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingWords {
    /// Reference has more words than the transcript.
    ReferenceLonger,
    Equal,
    /// Transcript has more words than the reference.
    HypothesisLonger,
}

impl MissingWords {
    pub fn as_i8(self) -> i8 {
        match self {
            Self::ReferenceLonger => -1,
            Self::Equal => 0,
            Self::HypothesisLonger => 1,
        }
    }
}

impl Serialize for MissingWords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Correct,
    Incorrect,
}

/// Display span for one aligned word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SpanKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStatus {
    Scored,
    NoSpeech,
    /// No transcript slot existed for this reference paragraph.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphResult {
    pub status: ParagraphStatus,
    pub ops: Vec<AlignmentOp>,
    pub spans: Vec<Span>,
    pub correct_words: usize,
    pub reference_words: usize,
    /// `None` when the paragraph is excluded from the aggregate.
    pub accuracy: Option<f64>,
    pub missing_words: MissingWords,
}

impl ParagraphResult {
    pub fn counts_toward_accuracy(&self) -> bool {
        self.status == ParagraphStatus::Scored
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredParagraphs {
    pub paragraphs: Vec<ParagraphResult>,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MispronunciationKind {
    Substitution,
    Deletion,
    Insertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MispronunciationEvent {
    #[serde(rename = "type")]
    pub kind: MispronunciationKind,
    pub message: String,
    /// Word index inside the paragraph.
    pub index: usize,
}

/// Phoneme label to the word indices where it was mispronounced, in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTally {
    entries: Vec<(String, Vec<usize>)>,
}

impl LabelTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &str, word_index: usize) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, indices)) => indices.push(word_index),
            None => self.entries.push((label.to_string(), vec![word_index])),
        }
    }

    pub fn merge(&mut self, other: &LabelTally) {
        for (label, indices) in &other.entries {
            for &index in indices {
                self.push(label, index);
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, indices)| indices.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.entries
            .iter()
            .map(|(label, indices)| (label.as_str(), indices.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LabelTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, indices) in &self.entries {
            map.serialize_entry(label, indices)?;
        }
        map.end()
    }
}

/// Compact audit trail of one word's phoneme alignment, e.g.
/// `reference = "-k-a-t"`, `predicted = "-match:k-substitution:e-match:t"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordEncoding {
    pub reference: String,
    pub predicted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordMispronunciationResult {
    pub index: usize,
    pub word: String,
    pub ops: Vec<AlignmentOp>,
    pub events: Vec<MispronunciationEvent>,
    pub tally: LabelTally,
    pub encoding: WordEncoding,
}

/// Per-word phoneme sequences for one paragraph, either already split or as
/// the raw decoded string (words separated by whitespace).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PhonemeTranscript {
    Words(Vec<Vec<Token>>),
    Decoded(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParagraphPhonemes {
    pub reference: PhonemeTranscript,
    pub predicted: PhonemeTranscript,
}

/// One read-aloud attempt as handed over by the recognition stages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttemptInput {
    pub story: Vec<String>,
    pub transcripts: Vec<Paragraph>,
    #[serde(default)]
    pub phonemes: Vec<Option<ParagraphPhonemes>>,
}
