use crate::types::{AlignmentOp, Token};

pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Vec<Token>;
}

pub trait SequenceAligner: Send + Sync {
    fn align(&self, reference: &[Token], hypothesis: &[Token]) -> Vec<AlignmentOp>;
}
