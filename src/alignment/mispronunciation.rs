use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

use crate::alignment::phonemes::PhonemeLabels;
use crate::pipeline::defaults::LevenshteinAligner;
use crate::pipeline::traits::SequenceAligner;
use crate::types::{
    AlignmentOp, LabelTally, MispronunciationEvent, MispronunciationKind, Token, WordEncoding,
    WordMispronunciationResult,
};

/// Result of running detection over one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    Detected(PhonemeDetection),
    /// Fewer predicted words than reference words: the positional word
    /// correspondence cannot hold, so nothing is reported for the paragraph.
    Malformed {
        reference_words: usize,
        predicted_words: usize,
    },
}

impl DetectionOutcome {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    pub fn detection(&self) -> Option<&PhonemeDetection> {
        match self {
            Self::Detected(detection) => Some(detection),
            Self::Malformed { .. } => None,
        }
    }

    /// Merged label tally; empty when malformed.
    pub fn tally(&self) -> LabelTally {
        self.detection()
            .map(PhonemeDetection::tally)
            .unwrap_or_default()
    }
}

/// Serializes as the event list, or `[{"message": "error"}]` when malformed.
impl Serialize for DetectionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Detected(detection) => {
                let mut seq = serializer.serialize_seq(None)?;
                for event in detection.events() {
                    seq.serialize_element(event)?;
                }
                seq.end()
            }
            Self::Malformed { .. } => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&ErrorMarker)?;
                seq.end()
            }
        }
    }
}

pub(crate) struct ErrorMarker;

impl Serialize for ErrorMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("message", "error")?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhonemeDetection {
    pub words: Vec<WordMispronunciationResult>,
}

impl PhonemeDetection {
    pub fn events(&self) -> impl Iterator<Item = &MispronunciationEvent> {
        self.words.iter().flat_map(|word| word.events.iter())
    }

    pub fn tally(&self) -> LabelTally {
        let mut tally = LabelTally::new();
        for word in &self.words {
            tally.merge(&word.tally);
        }
        tally
    }

    pub fn encodings(&self) -> Vec<WordEncoding> {
        self.words.iter().map(|word| word.encoding.clone()).collect()
    }
}

/// Detection with the built-in label table and Levenshtein aligner.
pub fn detect(
    reference_per_word: &[Vec<Token>],
    predicted_per_word: &[Vec<Token>],
    original_words: &[&str],
) -> DetectionOutcome {
    detect_with(
        reference_per_word,
        predicted_per_word,
        original_words,
        &PhonemeLabels::default(),
        &LevenshteinAligner,
    )
}

/// Aligns each reference word's phonemes with the predicted phonemes of the
/// word at the same position and reports every divergence.
///
/// A word with no reference or no predicted phonemes (recognition produced
/// nothing for it) yields no ops. Predicted words past the reference length are ignored.
pub fn detect_with(
    reference_per_word: &[Vec<Token>],
    predicted_per_word: &[Vec<Token>],
    original_words: &[&str],
    labels: &PhonemeLabels,
    aligner: &dyn SequenceAligner,
) -> DetectionOutcome {
    if reference_per_word.len() > predicted_per_word.len() {
        tracing::warn!(
            reference_words = reference_per_word.len(),
            predicted_words = predicted_per_word.len(),
            "mispronunciation: fewer predicted words than reference words; skipping paragraph"
        );
        return DetectionOutcome::Malformed {
            reference_words: reference_per_word.len(),
            predicted_words: predicted_per_word.len(),
        };
    }
    if original_words.len() < reference_per_word.len() {
        tracing::warn!(
            original_words = original_words.len(),
            reference_words = reference_per_word.len(),
            "mispronunciation: reference text has fewer words than its phoneme list"
        );
    }

    let words = reference_per_word
        .iter()
        .zip(predicted_per_word)
        .enumerate()
        .map(|(index, (reference, predicted))| {
            let word = original_words.get(index).copied().unwrap_or_default();
            if reference.is_empty() || predicted.is_empty() {
                tracing::debug!(
                    index,
                    word,
                    reference_phonemes = reference.len(),
                    predicted_phonemes = predicted.len(),
                    "mispronunciation: no phonemes recognized for word"
                );
                return WordMispronunciationResult {
                    index,
                    word: word.to_string(),
                    ops: Vec::new(),
                    events: Vec::new(),
                    tally: LabelTally::new(),
                    encoding: WordEncoding::default(),
                };
            }
            let ops = aligner.align(reference, predicted);
            describe_word(index, word, ops, labels)
        })
        .collect();

    DetectionOutcome::Detected(PhonemeDetection { words })
}

fn describe_word(
    index: usize,
    word: &str,
    ops: Vec<AlignmentOp>,
    labels: &PhonemeLabels,
) -> WordMispronunciationResult {
    let mut events = Vec::new();
    let mut tally = LabelTally::new();
    let mut encoding = WordEncoding::default();

    for op in &ops {
        let reference_label = op.reference().map(|s| labels.label(s)).unwrap_or("");
        let predicted_label = op.hypothesis().map(|s| labels.label(s)).unwrap_or("");

        encoding.reference.push('-');
        encoding.reference.push_str(reference_label);
        encoding.predicted.push('-');
        encoding.predicted.push_str(op.kind().as_str());
        encoding.predicted.push(':');
        encoding.predicted.push_str(match op {
            AlignmentOp::Deletion { .. } => reference_label,
            _ => predicted_label,
        });

        let (kind, tally_label, message) = match op {
            AlignmentOp::Match { .. } => continue,
            AlignmentOp::Substitution {
                reference,
                hypothesis,
                ..
            } => {
                let expected = shown(reference_label, reference);
                let got = shown(predicted_label, hypothesis);
                (
                    MispronunciationKind::Substitution,
                    reference_label,
                    format!(
                        "You pronounced the \"{expected}\" sound in \"{word}\" incorrectly (expected \"{expected}\", got \"{got}\")."
                    ),
                )
            }
            AlignmentOp::Deletion { reference, .. } => (
                MispronunciationKind::Deletion,
                reference_label,
                format!(
                    "You missed the \"{}\" sound in \"{word}\".",
                    shown(reference_label, reference)
                ),
            ),
            AlignmentOp::Insertion { hypothesis, .. } => (
                MispronunciationKind::Insertion,
                predicted_label,
                format!(
                    "You added the \"{}\" sound in \"{word}\".",
                    shown(predicted_label, hypothesis)
                ),
            ),
        };

        tracing::debug!(
            index,
            word,
            kind = op.kind().as_str(),
            label = tally_label,
            "mispronunciation: divergence"
        );
        if !tally_label.is_empty() {
            tally.push(tally_label, index);
        }
        events.push(MispronunciationEvent {
            kind,
            message,
            index,
        });
    }

    WordMispronunciationResult {
        index,
        word: word.to_string(),
        ops,
        events,
        tally,
        encoding,
    }
}

/// Label to show the reader; falls back to the raw symbol when unlabeled.
fn shown<'a>(label: &'a str, symbol: &'a str) -> &'a str {
    if label.is_empty() {
        symbol
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpKind;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vowel_substitution_is_tallied_under_reference_label() {
        let outcome = detect(&[toks(&["k", "æ", "t"])], &[toks(&["k", "ɛ", "t"])], &["cat"]);
        let detection = outcome.detection().expect("detected");
        let word = &detection.words[0];

        let kinds: Vec<OpKind> = word.ops.iter().map(AlignmentOp::kind).collect();
        assert_eq!(kinds, [OpKind::Match, OpKind::Substitution, OpKind::Match]);
        assert_eq!(word.ops[1].reference_index(), 1);

        assert_eq!(word.events.len(), 1);
        assert_eq!(word.events[0].kind, MispronunciationKind::Substitution);
        assert_eq!(word.events[0].index, 0);
        assert_eq!(
            word.events[0].message,
            "You pronounced the \"a\" sound in \"cat\" incorrectly (expected \"a\", got \"e\")."
        );
        assert_eq!(outcome.tally().get("a"), Some(&[0][..]));
    }

    #[test]
    fn deletion_and_insertion_messages() {
        let outcome = detect(
            &[toks(&["s", "t", "ɑ", "p"]), toks(&["k", "æ", "t"])],
            &[toks(&["s", "ɑ", "p"]), toks(&["k", "æ", "t", "s"])],
            &["stop", "cat"],
        );
        let detection = outcome.detection().expect("detected");
        let events: Vec<&MispronunciationEvent> = detection.events().collect();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].kind, MispronunciationKind::Deletion);
        assert_eq!(events[0].message, "You missed the \"t\" sound in \"stop\".");
        assert_eq!(events[0].index, 0);

        assert_eq!(events[1].kind, MispronunciationKind::Insertion);
        assert_eq!(events[1].message, "You added the \"s\" sound in \"cat\".");
        assert_eq!(events[1].index, 1);

        let tally = outcome.tally();
        assert_eq!(tally.get("t"), Some(&[0][..]));
        assert_eq!(tally.get("s"), Some(&[1][..]));
    }

    #[test]
    fn too_few_predicted_words_is_malformed_with_empty_tally() {
        let outcome = detect(
            &[toks(&["k", "æ", "t"]), toks(&["s", "æ", "t"])],
            &[toks(&["k", "æ", "t"])],
            &["cat", "sat"],
        );
        assert!(outcome.is_malformed());
        assert!(outcome.tally().is_empty());
        let json = serde_json::to_string(&outcome).expect("serialize");
        assert_eq!(json, r#"[{"message":"error"}]"#);
    }

    #[test]
    fn word_without_reference_phonemes_has_no_ops() {
        let outcome = detect(&[Vec::new()], &[toks(&["k", "æ", "t"])], &["cat"]);
        let detection = outcome.detection().expect("detected");
        assert!(detection.words[0].ops.is_empty());
        assert!(detection.words[0].events.is_empty());
        assert!(outcome.tally().is_empty());
    }

    #[test]
    fn word_without_predicted_phonemes_has_no_ops() {
        let outcome = detect(
            &[toks(&["k", "æ", "t"]), toks(&["s", "æ", "t"])],
            &[Vec::new(), toks(&["s", "ɛ", "t"])],
            &["cat", "sat"],
        );
        let detection = outcome.detection().expect("detected");
        assert!(detection.words[0].ops.is_empty());
        assert!(detection.words[0].events.is_empty());
        assert_eq!(detection.events().count(), 1);
        assert_eq!(outcome.tally().get("a"), Some(&[1][..]));
        assert!(outcome.tally().get("k").is_none());
    }

    #[test]
    fn extra_predicted_words_are_ignored() {
        let outcome = detect(
            &[toks(&["k", "æ", "t"])],
            &[toks(&["k", "æ", "t"]), toks(&["s", "æ", "t"])],
            &["cat"],
        );
        let detection = outcome.detection().expect("detected");
        assert_eq!(detection.words.len(), 1);
        assert_eq!(detection.events().count(), 0);
    }

    #[test]
    fn encoding_pairs_labels_with_op_tags() {
        let outcome = detect(&[toks(&["k", "æ", "t"])], &[toks(&["k", "ɛ"])], &["cat"]);
        let encodings = outcome.detection().expect("detected").encodings();
        assert_eq!(encodings[0].reference, "-k-a-t");
        // The backtrace substitutes the final phoneme before considering a
        // deletion there, so the missing sound is attributed to "æ".
        assert_eq!(encodings[0].predicted, "-match:k-deletion:a-substitution:e");
    }

    #[test]
    fn unlabeled_symbols_are_reported_but_not_tallied() {
        let outcome = detect(&[toks(&["ˈ", "k", "æ"])], &[toks(&["k", "æ"])], &["ca"]);
        let detection = outcome.detection().expect("detected");
        let events: Vec<&MispronunciationEvent> = detection.events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "You missed the \"ˈ\" sound in \"ca\".");
        assert!(outcome.tally().is_empty());
    }

    #[test]
    fn missing_original_word_falls_back_to_empty() {
        let outcome = detect(&[toks(&["k"]), toks(&["æ"])], &[toks(&["k"]), toks(&["ɛ"])], &["k"]);
        let detection = outcome.detection().expect("detected");
        assert_eq!(detection.words[1].word, "");
        assert_eq!(detection.words[1].events.len(), 1);
    }

    #[test]
    fn repeated_label_collects_every_word_index() {
        let outcome = detect(
            &[toks(&["ʃ", "ɪ", "p"]), toks(&["f", "ɪ", "ʃ"])],
            &[toks(&["s", "ɪ", "p"]), toks(&["f", "ɪ", "s"])],
            &["ship", "fish"],
        );
        assert_eq!(outcome.tally().get("sh"), Some(&[0, 1][..]));
    }
}
