// Evaluation side of the candlestick event classifier:
// metrics, best-F1 threshold search and model capabilities.

pub mod base;
pub mod evaluation_helpers;
pub mod metrics;

pub use base::{FeatureImportance, FeatureImportances, SavedImportances};
pub use evaluation_helpers::{
    cutoff_grid, find_max_fscore, search_max_fscore, ThresholdSearch, CUTOFF_COUNT, CUTOFF_STEP,
};
pub use metrics::{
    binarize, f1_score, roc_auc, roc_curve, ConfusionMatrix, RocCurve, RocPoint,
};
