use std::cmp::Ordering;

use crate::alignment::normalize::raw_word_count;
use crate::pipeline::defaults::{DefaultTextNormalizer, LevenshteinAligner};
use crate::pipeline::traits::{SequenceAligner, TextNormalizer};
use crate::types::{
    AlignmentOp, MissingWords, Paragraph, ParagraphResult, ParagraphStatus, ScoredParagraphs,
    Span, SpanKind,
};

/// Word-level scoring with the default normalizer and aligner.
pub fn score_paragraphs(reference: &[String], hypothesis: &[Paragraph]) -> ScoredParagraphs {
    score_paragraphs_with(
        reference,
        hypothesis,
        &DefaultTextNormalizer,
        &LevenshteinAligner,
    )
}

/// Scores every reference paragraph against the transcript in the same slot.
///
/// The output always has one entry per reference paragraph. Slots without a
/// transcript are `Malformed`, `Paragraph::Empty` transcripts are `NoSpeech`;
/// both are left out of the overall accuracy.
pub fn score_paragraphs_with(
    reference: &[String],
    hypothesis: &[Paragraph],
    normalizer: &dyn TextNormalizer,
    aligner: &dyn SequenceAligner,
) -> ScoredParagraphs {
    if reference.len() != hypothesis.len() {
        tracing::warn!(
            reference_paragraphs = reference.len(),
            hypothesis_paragraphs = hypothesis.len(),
            "scoring: paragraph count mismatch"
        );
    }

    let missing = check_missing_words(reference, hypothesis);
    let mut correct_total = 0usize;
    let mut reference_total = 0usize;
    let mut paragraphs = Vec::with_capacity(reference.len());

    for (i, reference_text) in reference.iter().enumerate() {
        let reference_words = normalizer.normalize(reference_text);
        let excluded = |status| ParagraphResult {
            status,
            ops: Vec::new(),
            spans: Vec::new(),
            correct_words: 0,
            reference_words: reference_words.len(),
            accuracy: None,
            missing_words: missing[i],
        };

        let transcript = match hypothesis.get(i) {
            None => {
                paragraphs.push(excluded(ParagraphStatus::Malformed));
                continue;
            }
            Some(Paragraph::Empty) => {
                tracing::debug!(paragraph = i, "scoring: no speech detected");
                paragraphs.push(excluded(ParagraphStatus::NoSpeech));
                continue;
            }
            Some(Paragraph::Present(text)) => text,
        };

        let hypothesis_words = normalizer.normalize(transcript);
        let ops = aligner.align(&reference_words, &hypothesis_words);
        let correct_words = ops.iter().filter(|op| op.is_match()).count();
        let accuracy = ratio(correct_words, reference_words.len());

        tracing::debug!(
            paragraph = i,
            correct_words,
            reference_words = reference_words.len(),
            hypothesis_words = hypothesis_words.len(),
            accuracy = format!("{accuracy:.3}"),
            "scoring: paragraph aligned"
        );

        correct_total += correct_words;
        reference_total += reference_words.len();
        paragraphs.push(ParagraphResult {
            status: ParagraphStatus::Scored,
            spans: spans_for(&ops),
            ops,
            correct_words,
            reference_words: reference_words.len(),
            accuracy: Some(accuracy),
            missing_words: missing[i],
        });
    }

    ScoredParagraphs {
        paragraphs,
        accuracy: ratio(correct_total, reference_total),
    }
}

/// Per-slot word-count comparison, independent of any alignment.
///
/// Counts come from [`raw_word_count`]; an empty or absent transcript counts
/// as zero words.
pub fn check_missing_words(reference: &[String], hypothesis: &[Paragraph]) -> Vec<MissingWords> {
    reference
        .iter()
        .enumerate()
        .map(|(i, reference_text)| {
            let spoken = hypothesis
                .get(i)
                .and_then(Paragraph::as_text)
                .map(raw_word_count)
                .unwrap_or(0);
            match raw_word_count(reference_text).cmp(&spoken) {
                Ordering::Greater => MissingWords::ReferenceLonger,
                Ordering::Less => MissingWords::HypothesisLonger,
                Ordering::Equal => MissingWords::Equal,
            }
        })
        .collect()
}

/// Display spans: matches are correct, everything else incorrect. Deleted
/// words show the reference word that was skipped.
pub fn spans_for(ops: &[AlignmentOp]) -> Vec<Span> {
    ops.iter()
        .map(|op| match op {
            AlignmentOp::Match { hypothesis, .. } => Span {
                text: hypothesis.clone(),
                kind: SpanKind::Correct,
            },
            AlignmentOp::Substitution { hypothesis, .. }
            | AlignmentOp::Insertion { hypothesis, .. } => Span {
                text: hypothesis.clone(),
                kind: SpanKind::Incorrect,
            },
            AlignmentOp::Deletion { reference, .. } => Span {
                text: reference.clone(),
                kind: SpanKind::Incorrect,
            },
        })
        .collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
