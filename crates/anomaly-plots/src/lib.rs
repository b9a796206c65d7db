//! Figures for evaluating a candlestick event classifier.
//!
//! Every `plot_*` function returns its own [`Figure`]; nothing is drawn until
//! the figure is saved or handed to a [`FigureViewer`].

pub mod candlestick;
pub mod confusion;
pub mod figure;
pub mod importance;
pub mod roc;
pub mod viewer;

pub use candlestick::{plot_candlestick, plot_candlestick_anomaly, ANOMALY_FILE_NAME};
pub use confusion::plot_confusion_matrix;
pub use figure::{Figure, FigureBody};
pub use importance::plot_feature_importances;
pub use roc::plot_roc_curve;
pub use viewer::{FigureViewer, NullViewer, SvgDirectoryViewer};
