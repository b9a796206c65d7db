//! Binary classification metrics.
//!
//! Label 1 is the positive class throughout. Ratios with a zero denominator
//! are reported as 0 rather than raising.

use anomaly_core::{EvalError, Result};
use ndarray::Array2;

pub const NUM_CLASSES: usize = 2;

/// Check that labels and scores line up and labels are 0/1.
///
/// NaN scores pass: `NaN > cutoff` is false, so they count as negative
/// predictions.
pub fn validate_binary_inputs(labels: &[u8], scores: &[f64]) -> Result<()> {
    if labels.is_empty() {
        return Err(EvalError::InvalidInput("empty input".into()));
    }
    if labels.len() != scores.len() {
        return Err(EvalError::InvalidInput(format!(
            "labels length {} != scores length {}",
            labels.len(),
            scores.len()
        )));
    }
    validate_labels(labels)
}

fn validate_labels(labels: &[u8]) -> Result<()> {
    if let Some(pos) = labels.iter().position(|&l| l > 1) {
        return Err(EvalError::InvalidInput(format!(
            "label {} at index {} is not binary",
            labels[pos], pos
        )));
    }
    Ok(())
}

/// `score > cutoff` as 0/1 predictions.
pub fn binarize(scores: &[f64], cutoff: f64) -> Vec<u8> {
    scores.iter().map(|&s| u8::from(s > cutoff)).collect()
}

/// 2x2 confusion matrix. Rows are true labels, columns predictions,
/// class 0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[u8], predicted: &[u8]) -> Result<Self> {
        if labels.is_empty() {
            return Err(EvalError::InvalidInput("empty input".into()));
        }
        if labels.len() != predicted.len() {
            return Err(EvalError::InvalidInput(format!(
                "labels length {} != predictions length {}",
                labels.len(),
                predicted.len()
            )));
        }
        validate_labels(labels)?;
        validate_labels(predicted)?;

        let mut counts = Array2::<usize>::zeros((NUM_CLASSES, NUM_CLASSES));
        for (&actual, &pred) in labels.iter().zip(predicted) {
            counts[(actual as usize, pred as usize)] += 1;
        }
        Ok(Self { counts })
    }

    /// Confusion matrix of `labels` against `scores > cutoff`.
    pub fn at_cutoff(labels: &[u8], scores: &[f64], cutoff: f64) -> Result<Self> {
        validate_binary_inputs(labels, scores)?;
        let mut counts = Array2::<usize>::zeros((NUM_CLASSES, NUM_CLASSES));
        for (&actual, &score) in labels.iter().zip(scores) {
            counts[(actual as usize, usize::from(score > cutoff))] += 1;
        }
        Ok(Self { counts })
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[(actual, predicted)]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[(1, 1)]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[(0, 1)]
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[(0, 0)]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[(1, 0)]
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_positives(),
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_negatives(),
        )
    }

    /// F1 for the positive class, 0 when there are no true positives.
    pub fn f1(&self) -> f64 {
        let tp = self.true_positives();
        ratio(
            2 * tp,
            2 * tp + self.false_positives() + self.false_negatives(),
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn f1_score(labels: &[u8], predicted: &[u8]) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(labels, predicted)?.f1())
}

// ---------------------------------------------------------------------------
// ROC Curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RocPoint {
    /// Scores at or above this value are predicted positive.
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone)]
pub struct RocCurve {
    /// From (0, 0) to (1, 1), one point per distinct score.
    pub points: Vec<RocPoint>,
    /// Area under the curve (trapezoidal rule).
    pub auc: f64,
}

impl RocCurve {
    pub fn fpr(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.fpr).collect()
    }

    pub fn tpr(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.tpr).collect()
    }
}

/// ROC curve of `scores` against binary `labels`.
///
/// Needs at least one positive and one negative label, otherwise one of
/// the rates is undefined. NaN scores cannot be ranked and are rejected.
pub fn roc_curve(labels: &[u8], scores: &[f64]) -> Result<RocCurve> {
    validate_binary_inputs(labels, scores)?;
    if let Some(pos) = scores.iter().position(|s| s.is_nan()) {
        return Err(EvalError::InvalidInput(format!("score at index {} is NaN", pos)));
    }

    let total_pos = labels.iter().filter(|&&l| l == 1).count();
    let total_neg = labels.len() - total_pos;
    if total_pos == 0 {
        return Err(EvalError::InvalidInput("no positive samples".into()));
    }
    if total_neg == 0 {
        return Err(EvalError::InvalidInput("no negative samples".into()));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let p = total_pos as f64;
    let n = total_neg as f64;

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        // Samples sharing a score move the curve together
        let current = scores[order[i]];
        while i < order.len() && scores[order[i]] == current {
            if labels[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold: current,
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
        });
    }

    let auc = trapezoidal_auc(&points);
    Ok(RocCurve { points, auc })
}

pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Result<f64> {
    Ok(roc_curve(labels, scores)?.auc)
}

fn trapezoidal_auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr).abs() * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}
