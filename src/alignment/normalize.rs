use crate::types::Token;

/// Canonical word tokens for alignment.
///
/// ASCII letters are lower-cased; ASCII characters other than letters, digits,
/// whitespace and apostrophes are dropped. Non-ASCII characters pass through
/// untouched. The result is stable under re-normalization of its own join.
pub fn normalize(text: &str) -> Vec<Token> {
    let cleaned: String = text
        .chars()
        .filter(|&c| {
            !c.is_ascii() || c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == '\''
        })
        .map(|c| c.to_ascii_lowercase())
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Word count used by the missing-words heuristic: every whitespace-separated
/// token counts, including stray punctuation.
pub fn raw_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_produces_no_tokens() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t ").is_empty());
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("The Cat, sat."), ["the", "cat", "sat"]);
        assert_eq!(normalize("\"Hello!\" she said..."), ["hello", "she", "said"]);
    }

    #[test]
    fn keeps_apostrophes_and_digits() {
        assert_eq!(normalize("Don't eat 3 cakes"), ["don't", "eat", "3", "cakes"]);
    }

    #[test]
    fn punctuation_only_word_disappears() {
        assert_eq!(normalize("wait -- what"), ["wait", "what"]);
    }

    #[test]
    fn hyphenated_words_are_joined() {
        assert_eq!(normalize("ice-cream"), ["icecream"]);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(normalize("Café NAÏVE"), ["café", "naÏve"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        for text in [
            "The quick, brown fox!",
            "  spaced   out  ",
            "It's 4 o'clock; TIME to go?",
            "Ünïcödé — dash",
        ] {
            let once = normalize(text);
            let twice = normalize(&once.join(" "));
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn raw_word_count_counts_every_whitespace_token() {
        assert_eq!(raw_word_count("The cat sat."), 3);
        assert_eq!(raw_word_count("The cat , sat"), 4);
        assert_eq!(raw_word_count("the cat sat ."), 4);
        assert_eq!(raw_word_count("Wait - what?"), 3);
        assert_eq!(raw_word_count(""), 0);
    }
}
