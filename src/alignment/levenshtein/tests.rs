use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{align, distance, edit_distance};
use crate::types::{AlignmentOp, OpKind};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn kinds(ops: &[AlignmentOp]) -> Vec<OpKind> {
    ops.iter().map(AlignmentOp::kind).collect()
}

fn reference_side(ops: &[AlignmentOp]) -> Vec<String> {
    ops.iter().filter_map(|op| op.reference().cloned()).collect()
}

fn hypothesis_side(ops: &[AlignmentOp]) -> Vec<String> {
    ops.iter().filter_map(|op| op.hypothesis().cloned()).collect()
}

/// Two-row Levenshtein used as an independent oracle.
fn oracle_distance(a: &[String], b: &[String]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let sub = prev[j] + usize::from(x != y);
            curr[j + 1] = sub.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn random_sequence(rng: &mut StdRng, max_len: usize) -> Vec<String> {
    const ALPHABET: [&str; 4] = ["k", "æ", "t", "ʃ"];
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())].to_string())
        .collect()
}

#[test]
fn both_empty_yields_no_ops() {
    let ops = align::<String>(&[], &[]);
    assert!(ops.is_empty());
}

#[test]
fn empty_reference_yields_all_insertions() {
    let ops = align(&[], &toks(&["a", "b"]));
    assert_eq!(kinds(&ops), [OpKind::Insertion, OpKind::Insertion]);
    assert!(ops.iter().all(|op| op.reference_index() == 0));
}

#[test]
fn empty_hypothesis_yields_all_deletions() {
    let ops = align(&toks(&["a", "b", "c"]), &[]);
    assert_eq!(kinds(&ops), [OpKind::Deletion, OpKind::Deletion, OpKind::Deletion]);
    let indices: Vec<usize> = ops.iter().map(AlignmentOp::reference_index).collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn identical_sequences_are_all_matches() {
    let seq = toks(&["the", "cat", "sat"]);
    let ops = align(&seq, &seq);
    assert_eq!(ops.len(), 3);
    assert!(ops.iter().all(AlignmentOp::is_match));
    assert_eq!(edit_distance(&ops), 0);
}

#[test]
fn tie_prefers_substitution_over_deletion_and_insertion() {
    let ops = align(&toks(&["a", "b"]), &toks(&["a", "x"]));
    assert_eq!(
        ops,
        vec![
            AlignmentOp::Match {
                reference: "a".to_string(),
                hypothesis: "a".to_string(),
                reference_index: 0,
            },
            AlignmentOp::Substitution {
                reference: "b".to_string(),
                hypothesis: "x".to_string(),
                reference_index: 1,
            },
        ]
    );
}

#[test]
fn tie_prefers_deletion_over_insertion() {
    // The equal trailing tokens are matched first, leaving the deletion in front.
    let ops = align(&toks(&["a", "b"]), &toks(&["b"]));
    assert_eq!(kinds(&ops), [OpKind::Deletion, OpKind::Match]);

    // dp[1][2] can be reached from above-left (+1) or from the left (+1):
    // substitution wins, leaving an insertion at the front.
    let ops = align(&toks(&["a"]), &toks(&["b", "c"]));
    assert_eq!(kinds(&ops), [OpKind::Insertion, OpKind::Substitution]);
}

#[test]
fn trailing_insertion_points_past_reference_end() {
    let ops = align(&toks(&["the", "cat"]), &toks(&["the", "cat", "down"]));
    assert_eq!(
        ops.last(),
        Some(&AlignmentOp::Insertion {
            hypothesis: "down".to_string(),
            reference_index: 2,
        })
    );
}

#[test]
fn middle_deletion_is_reported_at_reference_position() {
    let ops = align(&toks(&["the", "big", "cat"]), &toks(&["the", "cat"]));
    assert_eq!(kinds(&ops), [OpKind::Match, OpKind::Deletion, OpKind::Match]);
    assert_eq!(ops[1].reference_index(), 1);
    assert_eq!(ops[1].reference().map(String::as_str), Some("big"));
}

#[test]
fn works_over_characters() {
    let a: Vec<char> = "kitten".chars().collect();
    let b: Vec<char> = "sitting".chars().collect();
    let ops = align(&a, &b);
    assert_eq!(edit_distance(&ops), 3);
    assert_eq!(distance(&a, &b), 3);
}

#[test]
fn random_pairs_round_trip_and_match_oracle_distance() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let a = random_sequence(&mut rng, 7);
        let b = random_sequence(&mut rng, 7);
        let ops = align(&a, &b);

        assert_eq!(reference_side(&ops), a, "reference not reconstructed");
        assert_eq!(hypothesis_side(&ops), b, "hypothesis not reconstructed");
        assert_eq!(edit_distance(&ops), oracle_distance(&a, &b));
        assert_eq!(distance(&a, &b), oracle_distance(&a, &b));

        let self_ops = align(&a, &a);
        assert!(self_ops.iter().all(AlignmentOp::is_match));
    }
}

#[test]
fn reference_indices_are_monotonic() {
    let ops = align(&toks(&["k", "æ", "t", "s"]), &toks(&["k", "ɛ", "ɛ", "t"]));
    let indices: Vec<usize> = ops.iter().map(AlignmentOp::reference_index).collect();
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
}
