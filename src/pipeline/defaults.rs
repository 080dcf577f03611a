use crate::alignment::levenshtein::align;
use crate::alignment::normalize::normalize;
use crate::pipeline::traits::{SequenceAligner, TextNormalizer};
use crate::types::{AlignmentOp, Token};

pub struct DefaultTextNormalizer;

impl TextNormalizer for DefaultTextNormalizer {
    fn normalize(&self, text: &str) -> Vec<Token> {
        normalize(text)
    }
}

pub struct LevenshteinAligner;

impl SequenceAligner for LevenshteinAligner {
    fn align(&self, reference: &[Token], hypothesis: &[Token]) -> Vec<AlignmentOp> {
        align(reference, hypothesis)
    }
}
