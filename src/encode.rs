//! Fixed-width feature encoding of tree nodes
//!
//! Each node becomes one row of `poscount` location ids and one row of
//! `poscount` values, aligned position by position with the node's path from
//! the root. Short paths are padded with id 0 / value 0.0.
//!
//! A location missing from the index encodes as id 0 **and** value 0.0, even
//! when the observed value was non-zero. Values are only ever emitted under a
//! known location slot.

use crate::tree::{ExecutionTree, LocationIndex, Observation, PAD_ID};
use ndarray::{Array2, ArrayViewMut1, Axis};

/// Model inputs and targets, one row per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    /// Location ids, shape `(samples, poscount)`
    pub locs: Array2<u64>,
    /// Observed values, shape `(samples, poscount)`
    pub vals: Array2<f64>,
    /// `true` iff the sample reaches success
    pub labels: Vec<bool>,
}

impl EncodedFeatures {
    /// Zero samples of the given width.
    pub fn empty(poscount: usize) -> Self {
        Self {
            locs: Array2::zeros((0, poscount)),
            vals: Array2::zeros((0, poscount)),
            labels: Vec::new(),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Padding width of every row.
    pub fn poscount(&self) -> usize {
        self.locs.ncols()
    }

    /// Labels as `0.0` / `1.0` targets.
    pub fn targets(&self) -> Vec<f64> {
        self.labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect()
    }

    /// The given rows, in the given order, as a new feature set.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            locs: self.locs.select(Axis(0), rows),
            vals: self.vals.select(Axis(0), rows),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }
}

/// Encode every node of `tree`, in [`ExecutionTree::preorder_dfs`] order.
///
/// Pure with respect to the tree: nothing is registered or mutated.
pub fn encode(tree: &ExecutionTree, poscount: usize, locidx: &LocationIndex) -> EncodedFeatures {
    let rows = tree.len();
    let mut features = EncodedFeatures {
        locs: Array2::zeros((rows, poscount)),
        vals: Array2::zeros((rows, poscount)),
        labels: Vec::with_capacity(rows),
    };

    for (row, node) in tree.preorder_dfs().enumerate() {
        let path = tree.logseq(node.id());
        fill_row(
            path.into_iter(),
            locidx,
            features.locs.row_mut(row),
            features.vals.row_mut(row),
        );
        features.labels.push(node.reaches_success());
    }

    features
}

/// Encode one complete run as a single row, truncated or padded to `poscount`.
pub fn encode_run(
    observations: &[Observation],
    poscount: usize,
    locidx: &LocationIndex,
    succeeded: bool,
) -> EncodedFeatures {
    let mut features = EncodedFeatures {
        locs: Array2::zeros((1, poscount)),
        vals: Array2::zeros((1, poscount)),
        labels: vec![succeeded],
    };
    fill_row(observations.iter(), locidx, features.locs.row_mut(0), features.vals.row_mut(0));
    features
}

/// Encode several labelled runs, one row each.
pub fn encode_runs<'a, I>(runs: I, poscount: usize, locidx: &LocationIndex) -> EncodedFeatures
where
    I: IntoIterator<Item = (&'a [Observation], bool)>,
{
    let runs: Vec<_> = runs.into_iter().collect();
    let mut features = EncodedFeatures {
        locs: Array2::zeros((runs.len(), poscount)),
        vals: Array2::zeros((runs.len(), poscount)),
        labels: Vec::with_capacity(runs.len()),
    };
    for (row, (observations, succeeded)) in runs.into_iter().enumerate() {
        fill_row(
            observations.iter(),
            locidx,
            features.locs.row_mut(row),
            features.vals.row_mut(row),
        );
        features.labels.push(succeeded);
    }
    features
}

fn fill_row<'a>(
    path: impl Iterator<Item = &'a Observation>,
    locidx: &LocationIndex,
    mut locs: ArrayViewMut1<'_, u64>,
    mut vals: ArrayViewMut1<'_, f64>,
) {
    let width = locs.len();
    for (p, observation) in path.take(width).enumerate() {
        match locidx.get_index(&observation.location) {
            Some(id) => {
                locs[p] = id;
                vals[p] = observation.value;
            }
            None => {
                locs[p] = PAD_ID;
                vals[p] = 0.0;
            }
        }
    }
}
