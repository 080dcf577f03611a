use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::alignment::mispronunciation::{detect_with, DetectionOutcome};
use crate::alignment::mistakes::{rank_with, write_target_phonemes, MistakeTally};
use crate::alignment::phonemes::PhonemeLabels;
use crate::alignment::report::{compute_attempt_report, AttemptReport, ParagraphFeedback};
use crate::alignment::scoring::score_paragraphs_with;
use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::traits::{SequenceAligner, TextNormalizer};
use crate::types::{
    AttemptInput, MissingWords, Paragraph, ParagraphPhonemes, ParagraphStatus, PhonemeTranscript,
    ScoredParagraphs, Token,
};

/// Scores read-aloud attempts against their story.
///
/// Built once by [`crate::ReadingScorerBuilder`] and shared by reference; every
/// call owns its own tally and RNG.
pub struct ReadingScorer {
    config: ScoringConfig,
    labels: PhonemeLabels,
    vocabulary: Vec<String>,
    text_normalizer: Box<dyn TextNormalizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
}

pub(crate) struct ReadingScorerParts {
    pub config: ScoringConfig,
    pub labels: PhonemeLabels,
    pub vocabulary: Vec<String>,
    pub text_normalizer: Box<dyn TextNormalizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
}

impl ReadingScorer {
    pub(crate) fn from_parts(parts: ReadingScorerParts) -> Self {
        Self {
            config: parts.config,
            labels: parts.labels,
            vocabulary: parts.vocabulary,
            text_normalizer: parts.text_normalizer,
            sequence_aligner: parts.sequence_aligner,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn labels(&self) -> &PhonemeLabels {
        &self.labels
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn score_paragraphs(&self, story: &[String], transcripts: &[Paragraph]) -> ScoredParagraphs {
        score_paragraphs_with(
            story,
            transcripts,
            self.text_normalizer.as_ref(),
            self.sequence_aligner.as_ref(),
        )
    }

    pub fn detect(
        &self,
        reference_per_word: &[Vec<Token>],
        predicted_per_word: &[Vec<Token>],
        original_words: &[&str],
    ) -> DetectionOutcome {
        detect_with(
            reference_per_word,
            predicted_per_word,
            original_words,
            &self.labels,
            self.sequence_aligner.as_ref(),
        )
    }

    pub fn rank<R: Rng + ?Sized>(&self, tally: &MistakeTally, rng: &mut R) -> Vec<String> {
        rank_with(
            tally,
            &self.vocabulary,
            self.config.top_n,
            self.config.padding_counts(),
            rng,
        )
    }

    /// Scores one attempt, seeding padding draws from `rng_seed` when set.
    pub fn score_attempt(&self, input: &AttemptInput) -> AttemptReport {
        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.score_attempt_with_rng(input, &mut rng)
    }

    /// Word scoring for every paragraph, phoneme checks where the word counts
    /// line up, then the ranked weakest labels.
    pub fn score_attempt_with_rng<R: Rng + ?Sized>(
        &self,
        input: &AttemptInput,
        rng: &mut R,
    ) -> AttemptReport {
        let scored = self.score_paragraphs(&input.story, &input.transcripts);

        let mut tally = MistakeTally::new();
        let mut mistakes_per_paragraph = Vec::new();
        let mut feedback = Vec::with_capacity(scored.paragraphs.len());

        for (i, paragraph) in scored.paragraphs.iter().enumerate() {
            let phonemes = input.phonemes.get(i).and_then(Option::as_ref);
            let eligible = paragraph.status == ParagraphStatus::Scored
                && paragraph.missing_words == MissingWords::Equal;
            let Some(phonemes) = phonemes.filter(|_| eligible) else {
                tracing::debug!(
                    paragraph = i,
                    status = ?paragraph.status,
                    missing_words = paragraph.missing_words.as_i8(),
                    has_phonemes = phonemes.is_some(),
                    "scorer: phoneme check skipped"
                );
                feedback.push(ParagraphFeedback::Skipped);
                continue;
            };

            let outcome = self.detect_paragraph(&input.story[i], phonemes);
            mistakes_per_paragraph.extend(tally.record(i, &outcome.tally()));
            feedback.push(ParagraphFeedback::Checked(outcome));
        }

        let target_phonemes = self.rank(&tally, rng);
        let report = compute_attempt_report(
            scored,
            feedback,
            tally,
            mistakes_per_paragraph,
            target_phonemes,
        );

        tracing::info!(
            accuracy = report.stats.accuracy,
            scored_paragraphs = report.stats.scored_paragraphs,
            checked_paragraphs = report.stats.checked_paragraphs,
            mispronunciations = report.stats.mispronunciation_count,
            target_phonemes = %report.target_phonemes.join(" "),
            "scorer: attempt scored"
        );
        report
    }

    /// Writes the report's ranked labels to `path`, or to the configured
    /// target phoneme file.
    pub fn persist_target_phonemes(
        &self,
        report: &AttemptReport,
        path: Option<&Path>,
    ) -> Result<PathBuf, ScoringError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.target_phonemes_path));
        write_target_phonemes(&path, &report.target_phonemes)?;
        Ok(path)
    }

    fn detect_paragraph(&self, story_text: &str, phonemes: &ParagraphPhonemes) -> DetectionOutcome {
        let reference = self.phoneme_words(&phonemes.reference);
        let predicted = self.phoneme_words(&phonemes.predicted);
        let words: Vec<&str> = story_text.split_whitespace().collect();
        self.detect(&reference, &predicted, &words)
    }

    fn phoneme_words(&self, transcript: &PhonemeTranscript) -> Vec<Vec<Token>> {
        match transcript {
            PhonemeTranscript::Words(words) => words.clone(),
            PhonemeTranscript::Decoded(decoded) => self.labels.split_phoneme_words(decoded),
        }
    }
}
