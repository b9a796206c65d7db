pub mod config;
pub mod domain;
pub mod logging;

pub use config::{ColumnsConfig, LoggingConfig, PlotConfig, Settings};
pub use domain::errors::{EvalError, Result};
