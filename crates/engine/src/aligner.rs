//! Sequence Aligner
//!
//! Consumes one ordered, depth-first-flattened step sequence per column and
//! produces a position-aligned [`ComparisonMatrix`]. The alignment is a
//! bounded, deterministic, greedy forward scan, not an edit-distance solver:
//!
//! 1. Each column keeps a cursor; its *front* is the first unconsumed step.
//! 2. Rows are anchored on the column whose front sits at the lowest
//!    position. When several columns tie, a column whose front can no longer
//!    match anything in the other columns' remainders wins (it gets its
//!    isolated row first); remaining ties go to the lowest column index.
//! 3. Every other column contributes its front to the row only when that
//!    front's comparison key equals the anchor key; otherwise it gets a
//!    placeholder cell and its cursor stays put.
//!
//! The comparison key is the step name plus the merge hash of the nearest
//! compound ancestor. A step without usable metaInfo degrades to name-only
//! equality instead of failing the alignment.

use std::collections::HashMap;

use stepdiff_common::StepRecord;
use tracing::debug;

use crate::matrix::{CompareCell, CompareRow, ComparisonMatrix};

/// One ordered step sequence to be aligned as a matrix column
#[derive(Debug, Clone)]
pub struct ColumnInput {
    pub column_key: String,
    pub steps: Vec<StepRecord>,
}

/// Comparison key: step name plus optional merge hash
#[derive(Debug, Clone, PartialEq, Eq)]
struct StepKey<'a> {
    name: &'a str,
    merge: Option<&'a str>,
}

impl<'a> StepKey<'a> {
    fn of(step: &'a StepRecord) -> Self {
        Self {
            name: &step.name,
            merge: step.merge_hash(),
        }
    }

    /// Keys match on name; the merge hash participates only when both sides
    /// carry one (missing metaInfo degrades to name-only equality).
    fn matches(&self, other: &StepKey<'_>) -> bool {
        if self.name != other.name {
            return false;
        }
        match (self.merge, other.merge) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Count of unconsumed steps sharing one name, split by merge hash
#[derive(Debug, Default)]
struct NameBucket {
    total: usize,
    without_merge: usize,
    by_merge: HashMap<String, usize>,
}

/// Per-column index of unconsumed step keys, kept in sync with the cursors
/// so the anchor tie-break stays O(1) per probe.
#[derive(Debug, Default)]
struct RemainingIndex {
    by_name: HashMap<String, NameBucket>,
}

impl RemainingIndex {
    fn from_steps(steps: &[StepRecord]) -> Self {
        let mut index = Self::default();
        for step in steps {
            let bucket = index.by_name.entry(step.name.clone()).or_default();
            bucket.total += 1;
            match step.merge_hash() {
                Some(hash) => *bucket.by_merge.entry(hash.to_string()).or_default() += 1,
                None => bucket.without_merge += 1,
            }
        }
        index
    }

    fn contains_match(&self, key: &StepKey<'_>) -> bool {
        let Some(bucket) = self.by_name.get(key.name) else {
            return false;
        };
        match key.merge {
            None => bucket.total > 0,
            Some(hash) => {
                bucket.without_merge > 0
                    || bucket.by_merge.get(hash).copied().unwrap_or(0) > 0
            }
        }
    }

    fn consume(&mut self, step: &StepRecord) {
        if let Some(bucket) = self.by_name.get_mut(&step.name) {
            bucket.total = bucket.total.saturating_sub(1);
            match step.merge_hash() {
                Some(hash) => {
                    if let Some(count) = bucket.by_merge.get_mut(hash) {
                        *count = count.saturating_sub(1);
                    }
                }
                None => bucket.without_merge = bucket.without_merge.saturating_sub(1),
            }
        }
    }
}

/// Align one ordered step sequence per column into a fixed-width matrix.
///
/// Every input step ends up in exactly one cell; columns with zero steps
/// still occupy their slot in every row as placeholder cells.
pub fn align(columns: Vec<ColumnInput>) -> ComparisonMatrix {
    let keys: Vec<String> = columns.iter().map(|c| c.column_key.clone()).collect();
    let seqs: Vec<Vec<StepRecord>> = columns.into_iter().map(|c| c.steps).collect();
    let width = seqs.len();

    let mut remaining: Vec<RemainingIndex> =
        seqs.iter().map(|s| RemainingIndex::from_steps(s)).collect();
    let mut cursors = vec![0usize; width];
    let mut rows: Vec<CompareRow> = Vec::new();

    loop {
        let min_pos = (0..width)
            .filter(|&c| cursors[c] < seqs[c].len())
            .map(|c| cursors[c])
            .min();
        let Some(min_pos) = min_pos else {
            break;
        };

        let candidates: Vec<usize> = (0..width)
            .filter(|&c| cursors[c] < seqs[c].len() && cursors[c] == min_pos)
            .collect();

        // A front that cannot match anything in any other column anchors its
        // own isolated row before fronts that may still pair up later.
        let anchor = candidates
            .iter()
            .copied()
            .find(|&c| {
                let key = StepKey::of(&seqs[c][cursors[c]]);
                !(0..width).any(|other| other != c && remaining[other].contains_match(&key))
            })
            .unwrap_or(candidates[0]);

        let row_idx = rows.len();
        let anchor_step = &seqs[anchor][cursors[anchor]];
        let anchor_key = StepKey::of(anchor_step);

        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            let front = seqs[col].get(cursors[col]);
            let take = col == anchor
                || front.map_or(false, |step| StepKey::of(step).matches(&anchor_key));
            match (take, front) {
                (true, Some(step)) => {
                    let step = step.clone();
                    remaining[col].consume(&step);
                    cursors[col] += 1;
                    cells.push(CompareCell::populated(&keys[col], row_idx, col, step));
                }
                _ => cells.push(CompareCell::empty(&keys[col], row_idx, col)),
            }
        }

        if cells.iter().filter(|c| c.is_populated()).count() >= 2 {
            for cell in &mut cells {
                if cell.is_populated() {
                    cell.matched = true;
                }
            }
        }
        rows.push(CompareRow { cells });
    }

    debug!(columns = width, rows = rows.len(), "aligned step sequences");
    ComparisonMatrix { columns: keys, rows }
}
