// Configuration structures for the candlestick event evaluation toolkit

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Column names expected in candle and prediction tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub event_time: String,
    pub window_start: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub target: String,
    pub label: String,
    pub score: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            event_time: "event_time".to_string(),
            window_start: "t_start".to_string(),
            open: "open_price".to_string(),
            high: "high_price".to_string(),
            low: "low_price".to_string(),
            close: "close_price".to_string(),
            target: "target".to_string(),
            label: "y_true".to_string(),
            score: "y_score".to_string(),
        }
    }
}

/// Figure sizes, labels and the directory shown figures land in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub confusion_width: u32,
    pub confusion_height: u32,
    pub display_dir: PathBuf,
    pub model_label: String,
    pub class_names: [String; 2],
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            // 8x5 inches at 100 dpi
            confusion_width: 800,
            confusion_height: 500,
            display_dir: PathBuf::from("figures"),
            model_label: "CatBoost".to_string(),
            class_names: ["Non-event".to_string(), "event".to_string()],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub log_dir: PathBuf,
    pub log_file: String,
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_dir: PathBuf::from("logs"),
            log_file: "anomaly_eval.log".to_string(),
            file_output: false,
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub columns: ColumnsConfig,
    pub plots: PlotConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from YAML config file
    pub fn from_yaml(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml_ng::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from environment variable CONFIG_FILE or default config.yaml
    pub fn load() -> anyhow::Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yaml".to_string());
        Self::from_yaml(&config_file)
    }

    /// Load settings, falling back to defaults when no config file exists
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yaml".to_string());
        if std::path::Path::new(&config_file).exists() {
            Self::from_yaml(&config_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings with environment variable overrides
    pub fn load_with_env() -> anyhow::Result<Self> {
        let mut settings = Self::load_or_default()?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("ANOMALY_EVAL_DISPLAY_DIR") {
            if !dir.is_empty() {
                self.plots.display_dir = PathBuf::from(dir);
            }
        }

        if let Ok(label) = std::env::var("ANOMALY_EVAL_MODEL_LABEL") {
            if !label.is_empty() {
                self.plots.model_label = label;
            }
        }
    }

    /// Save settings to YAML file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
