use anomaly_core::Result;
use tracing::debug;

use crate::metrics::{validate_binary_inputs, ConfusionMatrix};

pub const CUTOFF_STEP: f64 = 0.01;
pub const CUTOFF_COUNT: usize = 100;

/// Cutoffs `0.00, 0.01, ..., 0.99` in ascending order.
pub fn cutoff_grid() -> Vec<f64> {
    (0..CUTOFF_COUNT).map(|i| i as f64 * CUTOFF_STEP).collect()
}

/// Outcome of sweeping the cutoff grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSearch {
    /// Position of the winning cutoff in the grid.
    pub index: usize,
    pub cutoff: f64,
    pub f1: f64,
    /// `(cutoff, f1)` for every grid point.
    pub curve: Vec<(f64, f64)>,
}

/// Sweep the cutoff grid and keep the cutoff with the highest F1.
///
/// Predictions are `score > cutoff`. Ties keep the earliest (smallest)
/// cutoff, so a sweep where every F1 is 0 returns 0.00.
pub fn search_max_fscore(labels: &[u8], scores: &[f64]) -> Result<ThresholdSearch> {
    validate_binary_inputs(labels, scores)?;

    let mut curve = Vec::with_capacity(CUTOFF_COUNT);
    let mut best_idx = 0;
    let mut best_f1 = f64::NEG_INFINITY;

    for (idx, cutoff) in cutoff_grid().into_iter().enumerate() {
        let f1 = ConfusionMatrix::at_cutoff(labels, scores, cutoff)?.f1();
        if f1 > best_f1 {
            best_f1 = f1;
            best_idx = idx;
        }
        curve.push((cutoff, f1));
    }

    let cutoff = curve[best_idx].0;
    debug!(
        "Best F1 cutoff: {:.2} (f1={:.4}, samples={})",
        cutoff,
        best_f1,
        labels.len()
    );

    Ok(ThresholdSearch {
        index: best_idx,
        cutoff,
        f1: best_f1,
        curve,
    })
}

/// Cutoff from the grid that maximizes F1.
pub fn find_max_fscore(labels: &[u8], scores: &[f64]) -> Result<f64> {
    Ok(search_max_fscore(labels, scores)?.cutoff)
}
