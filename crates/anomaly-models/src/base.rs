// Model capabilities consumed by the evaluation helpers
//
// This module provides:
// - FeatureImportance: capability trait for models exposing per-feature scores
// - FeatureImportances: scores aligned with training column names, sorted for display
// - SavedImportances: importances persisted next to a trained model

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use tracing::*;

// ============================================================================
// FEATURE IMPORTANCE CAPABILITY
// ============================================================================

/// Any fitted model able to report one importance score per training feature.
///
/// Scores must be in the same order as the columns the model was trained on.
pub trait FeatureImportance {
    fn name(&self) -> &str {
        "model"
    }

    fn feature_importance(&self) -> Result<Vec<f64>>;
}

impl<T: FeatureImportance + ?Sized> FeatureImportance for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn feature_importance(&self) -> Result<Vec<f64>> {
        (**self).feature_importance()
    }
}

// ============================================================================
// ALIGNED IMPORTANCE TABLE
// ============================================================================

/// Importance scores keyed by feature name, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportances {
    entries: Vec<(String, f64)>,
}

impl FeatureImportances {
    /// Pair `values` with `names` and sort descending.
    ///
    /// NaN scores sink to the end; equal scores keep column order.
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            bail!(
                "model reports {} importances but training data has {} columns",
                values.len(),
                names.len()
            );
        }
        let mut entries: Vec<(String, f64)> = names.into_iter().zip(values).collect();
        entries.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.1.total_cmp(&a.1),
        });
        Ok(Self { entries })
    }

    pub fn from_model<M: FeatureImportance + ?Sized>(model: &M, columns: &[String]) -> Result<Self> {
        let values = model
            .feature_importance()
            .with_context(|| format!("{}: feature importances unavailable", model.name()))?;
        debug!("{}: {} feature importances", model.name(), values.len());
        Self::new(columns.to_vec(), values)
    }

    /// Align the model's importances with the columns of its training frame.
    pub fn from_training_frame<M: FeatureImportance + ?Sized>(model: &M, x_train: &DataFrame) -> Result<Self> {
        Self::from_model(model, &column_names(x_train))
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect()
}

// ============================================================================
// PERSISTED IMPORTANCES
// ============================================================================

/// Importances exported by a training run, stored as YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedImportances {
    #[serde(default = "default_model_name")]
    pub model: String,
    pub importances: Vec<f64>,
}

fn default_model_name() -> String {
    "model".to_string()
}

impl SavedImportances {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read importances: {}", path.display()))?;
        let saved: SavedImportances = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse importances: {}", path.display()))?;
        info!(
            "Loaded {} importances for {} from {}",
            saved.importances.len(),
            saved.model,
            path.display()
        );
        Ok(saved)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write importances: {}", path.display()))?;
        Ok(())
    }
}

impl FeatureImportance for SavedImportances {
    fn name(&self) -> &str {
        &self.model
    }

    fn feature_importance(&self) -> Result<Vec<f64>> {
        Ok(self.importances.clone())
    }
}
