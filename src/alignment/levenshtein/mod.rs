use crate::types::AlignmentOp;

#[cfg(test)]
mod tests;

/// Unit-cost Levenshtein alignment of `hypothesis` against `reference`.
///
/// The backtrace walks from `dp[n][m]` to `dp[0][0]` and, when several
/// predecessors reach the cell at minimum cost, prefers in order:
/// 1. equal tokens on the diagonal (match)
/// 2. the diagonal at cost + 1 (substitution)
/// 3. the cell above (deletion of a reference token)
/// 4. the cell to the left (insertion of a hypothesis token)
///
/// Downstream mistake attribution depends on this order.
pub fn align<T: PartialEq + Clone>(reference: &[T], hypothesis: &[T]) -> Vec<AlignmentOp<T>> {
    let n = reference.len();
    let m = hypothesis.len();
    if n == 0 && m == 0 {
        return Vec::new();
    }

    let dp = CostTable::fill(reference, hypothesis);

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let here = dp.get(i, j);
        if i > 0 && j > 0 && reference[i - 1] == hypothesis[j - 1] {
            ops.push(AlignmentOp::Match {
                reference: reference[i - 1].clone(),
                hypothesis: hypothesis[j - 1].clone(),
                reference_index: i - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && here == dp.get(i - 1, j - 1) + 1 {
            ops.push(AlignmentOp::Substitution {
                reference: reference[i - 1].clone(),
                hypothesis: hypothesis[j - 1].clone(),
                reference_index: i - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && here == dp.get(i - 1, j) + 1 {
            ops.push(AlignmentOp::Deletion {
                reference: reference[i - 1].clone(),
                reference_index: i - 1,
            });
            i -= 1;
        } else {
            debug_assert!(j > 0, "backtrace left the cost table");
            ops.push(AlignmentOp::Insertion {
                hypothesis: hypothesis[j - 1].clone(),
                reference_index: i,
            });
            j -= 1;
        }
    }
    ops.reverse();
    ops
}

/// Number of non-match ops, i.e. the edit distance realised by `ops`.
pub fn edit_distance<T>(ops: &[AlignmentOp<T>]) -> usize {
    ops.iter().filter(|op| !op.is_match()).count()
}

/// Levenshtein distance without recovering the alignment.
pub fn distance<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> usize {
    CostTable::fill(reference, hypothesis).get(reference.len(), hypothesis.len())
}

/// Row-major `(n + 1) x (m + 1)` edit-distance table.
struct CostTable {
    cells: Vec<usize>,
    width: usize,
}

impl CostTable {
    fn fill<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Self {
        let n = reference.len();
        let m = hypothesis.len();
        let width = m + 1;
        let mut cells = vec![0usize; (n + 1) * width];

        for i in 0..=n {
            cells[i * width] = i;
        }
        for (j, cell) in cells.iter_mut().enumerate().take(width) {
            *cell = j;
        }

        for i in 1..=n {
            let row = i * width;
            let prev_row = (i - 1) * width;
            for j in 1..=m {
                let cost = usize::from(reference[i - 1] != hypothesis[j - 1]);
                cells[row + j] = (cells[prev_row + j] + 1)
                    .min(cells[row + j - 1] + 1)
                    .min(cells[prev_row + j - 1] + cost);
            }
        }

        Self { cells, width }
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }
}
