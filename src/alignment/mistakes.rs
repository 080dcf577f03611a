use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::types::LabelTally;

/// Mistake count per phoneme label across one reading attempt, in
/// first-recorded order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MistakeTally {
    entries: Vec<(String, u32)>,
}

/// One `[label, word_index, paragraph_index]` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphMistake(pub String, pub usize, pub usize);

impl MistakeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, count: u32) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, total)) => *total += count,
            None => self.entries.push((label.to_string(), count)),
        }
    }

    /// Folds one paragraph's label tally in and returns its flattened rows.
    pub fn record(&mut self, paragraph_index: usize, tally: &LabelTally) -> Vec<ParagraphMistake> {
        let mut rows = Vec::new();
        for (label, word_indices) in tally.iter() {
            for &word_index in word_indices {
                rows.push(ParagraphMistake(label.to_string(), word_index, paragraph_index));
            }
            self.add(label, word_indices.len() as u32);
        }
        rows
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, u32)> for MistakeTally {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (label, count) in iter {
            tally.add(label, count);
        }
        tally
    }
}

impl Serialize for MistakeTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// The five weakest labels, padding with random vocabulary entries when the
/// learner made mistakes on fewer than five sounds.
pub fn rank<R: Rng + ?Sized>(
    tally: &MistakeTally,
    vocabulary: &[String],
    rng: &mut R,
) -> Vec<String> {
    rank_with(
        tally,
        vocabulary,
        ScoringConfig::DEFAULT_TOP_N,
        ScoringConfig::DEFAULT_PADDING_COUNT_MIN..=ScoringConfig::DEFAULT_PADDING_COUNT_MAX,
        rng,
    )
}

/// Picks `top_n` labels by repeated greedy maximum over the tally.
///
/// While the tally has fewer than `top_n` labels, vocabulary labels not yet
/// present are sampled and given a count drawn from `padding_counts`. Ties go
/// to the entry seen first, so recorded mistakes beat padding of equal count.
/// The output is shorter than `top_n` only when tally and vocabulary together
/// hold fewer distinct labels.
pub fn rank_with<R: Rng + ?Sized>(
    tally: &MistakeTally,
    vocabulary: &[String],
    top_n: usize,
    padding_counts: RangeInclusive<u32>,
    rng: &mut R,
) -> Vec<String> {
    let mut candidates: Vec<(String, u32)> = tally
        .iter()
        .filter(|(label, _)| !label.is_empty())
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    if candidates.len() < top_n {
        let mut pool: Vec<&String> = Vec::new();
        for label in vocabulary {
            if label.is_empty()
                || candidates.iter().any(|(l, _)| l == label)
                || pool.contains(&label)
            {
                continue;
            }
            pool.push(label);
        }
        let needed = top_n - candidates.len();
        if pool.len() < needed {
            tracing::warn!(
                available = candidates.len() + pool.len(),
                top_n,
                "mistakes: vocabulary exhausted; ranking fewer labels"
            );
        }
        for label in pool.choose_multiple(rng, needed).copied().collect::<Vec<_>>() {
            let count = rng.gen_range(padding_counts.clone());
            tracing::debug!(label = label.as_str(), count, "mistakes: padding label");
            candidates.push((label.clone(), count));
        }
    }

    let mut ranked = Vec::with_capacity(top_n.min(candidates.len()));
    while ranked.len() < top_n && !candidates.is_empty() {
        let mut best = 0usize;
        for (i, (_, count)) in candidates.iter().enumerate() {
            if *count > candidates[best].1 {
                best = i;
            }
        }
        ranked.push(candidates.remove(best).0);
    }
    ranked
}

/// Replaces `path` with one line of space-separated labels.
///
/// The line is written to a temporary file in the same directory and renamed
/// over the target, so a concurrent reader sees the old or the new list.
pub fn write_target_phonemes(path: &Path, labels: &[String]) -> Result<(), ScoringError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| ScoringError::io("create target phonemes directory", e))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ScoringError::io("create temporary target phonemes file", e))?;
    file.write_all(labels.join(" ").as_bytes())
        .map_err(|e| ScoringError::io("write target phonemes", e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ScoringError::io("sync target phonemes", e))?;
    file.persist(path)
        .map_err(|e| ScoringError::persist("target phonemes file", e))?;

    tracing::info!(path = %path.display(), labels = %labels.join(" "), "mistakes: target phonemes written");
    Ok(())
}

/// Reads back a target phoneme file.
pub fn read_target_phonemes(path: &Path) -> Result<Vec<String>, ScoringError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| ScoringError::io("read target phonemes", e))?;
    Ok(data.split_whitespace().map(str::to_string).collect())
}
