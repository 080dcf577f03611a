use std::collections::{BTreeMap, HashMap};

use crate::types::Token;

/// Built-in IPA symbol to pronounceable English approximation.
///
/// Stress and syllable markers map to the empty label.
const DEFAULT_LABELS: &[(&str, &str)] = &[
    // vowels
    ("a", "a"),
    ("ə", "a"),
    ("ʌ", "uh"),
    ("æ", "a"),
    ("ɑ", "ah"),
    ("e", "e"),
    ("ɛ", "e"),
    ("ɪ", "i"),
    ("i", "ee"),
    ("ɒ", "o"),
    ("ɔ", "aw"),
    ("ʊ", "oo"),
    ("u", "oo"),
    ("ɜ", "er"),
    // diphthongs
    ("aɪ", "i"),
    ("aʊ", "ow"),
    ("eɪ", "ay"),
    ("oʊ", "oh"),
    ("ɔɪ", "oy"),
    ("ɪə", "eer"),
    ("eə", "air"),
    ("ʊə", "oor"),
    // consonants
    ("b", "b"),
    ("d", "d"),
    ("f", "f"),
    ("g", "g"),
    ("h", "h"),
    ("j", "y"),
    ("k", "k"),
    ("l", "l"),
    ("m", "m"),
    ("n", "n"),
    ("p", "p"),
    ("r", "r"),
    ("s", "s"),
    ("t", "t"),
    ("v", "v"),
    ("w", "w"),
    ("z", "z"),
    ("θ", "th"),
    ("ð", "th"),
    ("ʃ", "sh"),
    ("ʒ", "zh"),
    ("ŋ", "ng"),
    ("tʃ", "ch"),
    ("dʒ", "j"),
    ("ʍ", "wh"),
    ("ʔ", ""),
    ("ɾ", "tt"),
    // tie-bar affricates
    ("d͡ʒ", "j"),
    ("t͡ʃ", "ch"),
    ("t͡s", "ts"),
    ("d͡z", "dz"),
    // markers
    ("ˈ", ""),
    ("ˌ", ""),
    (".", ""),
    ("!", ""),
    // South African English approximations
    ("x", "gh"),
    ("r̩", "r"),
    ("l̩", "l"),
    ("m̩", "m"),
    ("n̩", "n"),
];

/// Phoneme symbol table: label lookup plus greedy splitting of decoded
/// phoneme strings.
#[derive(Debug, Clone)]
pub struct PhonemeLabels {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    /// Symbols ordered by descending char count, table order within a length.
    longest_first: Vec<String>,
}

impl Default for PhonemeLabels {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_LABELS
                .iter()
                .map(|&(symbol, label)| (symbol.to_string(), label.to_string())),
        )
    }
}

impl PhonemeLabels {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut labels = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            longest_first: Vec::new(),
        };
        for (symbol, label) in entries {
            labels.insert(symbol, label);
        }
        labels.reindex();
        labels
    }

    /// Returns a copy of `self` with `overrides` applied: existing symbols get
    /// the new label, unknown symbols are appended in key order.
    pub fn with_overrides(&self, overrides: BTreeMap<String, String>) -> Self {
        let mut labels = self.clone();
        for (symbol, label) in overrides {
            labels.insert(symbol, label);
        }
        labels.reindex();
        labels
    }

    /// Human-readable label for `symbol`; unmapped symbols give `""`.
    pub fn label(&self, symbol: &str) -> &str {
        self.index
            .get(symbol)
            .map(|&i| self.entries[i].1.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct non-empty labels in table order.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (_, label) in &self.entries {
            if !label.is_empty() && !out.iter().any(|seen| seen == label) {
                out.push(label.clone());
            }
        }
        out
    }

    /// Splits one undelimited phoneme word into table symbols, longest match
    /// first. Characters that start no known symbol are skipped.
    pub fn split_phoneme_string(&self, phonemes: &str) -> Vec<Token> {
        let mut out = Vec::new();
        let mut rest = phonemes;
        while let Some(c) = rest.chars().next() {
            match self
                .longest_first
                .iter()
                .find(|symbol| rest.starts_with(symbol.as_str()))
            {
                Some(symbol) => {
                    out.push(symbol.clone());
                    rest = &rest[symbol.len()..];
                }
                None => {
                    tracing::debug!(skipped = %c, "phonemes: no symbol starts here");
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        out
    }

    /// Splits a decoded utterance into per-word symbol lists, using
    /// whitespace as the word boundary.
    pub fn split_phoneme_words(&self, phonemes: &str) -> Vec<Vec<Token>> {
        phonemes
            .split_whitespace()
            .map(|word| self.split_phoneme_string(word))
            .collect()
    }

    fn insert(&mut self, symbol: String, label: String) {
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((symbol, label)),
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (symbol, _))| (symbol.clone(), i))
            .collect();
        let mut symbols: Vec<String> = self
            .entries
            .iter()
            .map(|(symbol, _)| symbol.clone())
            .filter(|symbol| !symbol.is_empty())
            .collect();
        // Stable sort keeps table order between symbols of equal length.
        symbols.sort_by_key(|symbol| std::cmp::Reverse(symbol.chars().count()));
        self.longest_first = symbols;
    }
}
