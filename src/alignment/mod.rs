pub mod levenshtein;
pub mod mispronunciation;
pub mod mistakes;
pub mod normalize;
pub mod phonemes;
pub mod report;
pub mod scoring;
