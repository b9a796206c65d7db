// Integration tests for figure construction and rendering

use std::cell::RefCell;

use anomaly_core::{ColumnsConfig, PlotConfig};
use anomaly_data::CandleFrame;
use anomaly_models::{FeatureImportance, SavedImportances};
use anomaly_plots::{
    plot_candlestick, plot_candlestick_anomaly, plot_confusion_matrix, plot_feature_importances, plot_roc_curve,
    Figure, FigureBody, FigureViewer, NullViewer, SvgDirectoryViewer, ANOMALY_FILE_NAME,
};
use polars::prelude::*;

fn synthetic_frame(rows: usize) -> CandleFrame {
    let timestamps: Vec<i64> = (0..rows as i64).map(|i| 1_700_000_000_000 + i * 60_000).collect();
    let open: Vec<f64> = (0..rows).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
    let close: Vec<f64> = open.iter().enumerate().map(|(i, o)| o + if i % 2 == 0 { 0.8 } else { -0.8 }).collect();
    let high: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.max(*c) + 0.5).collect();
    let low: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.min(*c) - 0.5).collect();
    let target: Vec<i64> = (0..rows).map(|i| i64::from(i % 4 == 1)).collect();
    CandleFrame {
        timestamps,
        open,
        high,
        low,
        close,
        target: Some(target),
    }
}

/// Keeps every shown figure for inspection.
#[derive(Default)]
struct RecordingViewer {
    shown: RefCell<Vec<Figure>>,
}

impl FigureViewer for RecordingViewer {
    fn show(&self, figure: &Figure) -> anyhow::Result<()> {
        self.shown.borrow_mut().push(figure.clone());
        Ok(())
    }
}

#[test]
fn test_anomaly_overlay_uses_only_window_rows() {
    let frame = synthetic_frame(100);
    let dir = tempfile::tempdir().unwrap();
    let viewer = RecordingViewer::default();

    let (figure, path) =
        plot_candlestick_anomaly(&frame, dir.path(), 10, 20, &PlotConfig::default(), &viewer).unwrap();

    let FigureBody::Candlestick(chart) = &figure.body else {
        panic!("expected a candlestick figure");
    };
    assert_eq!(chart.frame.len(), 10);
    assert_eq!(chart.frame.timestamps[0], frame.timestamps[10]);
    assert_eq!(chart.frame.timestamps[9], frame.timestamps[19]);

    // rows 13 and 17 are the flagged rows inside [10, 20)
    let expected: Vec<(i64, f64)> = [13usize, 17]
        .iter()
        .map(|&i| (frame.timestamps[i], frame.open[i]))
        .collect();
    assert_eq!(chart.markers, expected);

    assert_eq!(viewer.shown.borrow().len(), 1);
    assert_eq!(path, dir.path().join("candlestick.png"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn test_anomaly_overlay_requires_output_dir() {
    let frame = synthetic_frame(30);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let result = plot_candlestick_anomaly(&frame, &missing, 0, 10, &PlotConfig::default(), &NullViewer);
    assert!(result.is_err());
    assert!(!missing.join(ANOMALY_FILE_NAME).exists());
}

#[test]
fn test_anomaly_overlay_empty_window_still_renders() {
    let frame = synthetic_frame(20);
    let dir = tempfile::tempdir().unwrap();
    let (figure, path) =
        plot_candlestick_anomaly(&frame, dir.path(), 15, 5, &PlotConfig::default(), &NullViewer).unwrap();
    let FigureBody::Candlestick(chart) = &figure.body else {
        panic!("expected a candlestick figure");
    };
    assert!(chart.frame.is_empty());
    assert!(chart.markers.is_empty());
    assert!(path.exists());
}

#[test]
fn test_candlestick_from_parquet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("candles.parquet");
    let frame = synthetic_frame(40);
    let mut df = df!(
        "event_time" => frame.timestamps.clone(),
        "open_price" => frame.open.clone(),
        "high_price" => frame.high.clone(),
        "low_price" => frame.low.clone(),
        "close_price" => frame.close.clone()
    )
    .unwrap();
    let mut file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(&mut file).finish(&mut df).unwrap();

    let loaded = anomaly_data::load_candles(&path, "event_time", &ColumnsConfig::default()).unwrap();
    let figure = plot_candlestick(&loaded, &PlotConfig::default());
    let svg = figure.to_svg_string().unwrap();
    assert!(svg.contains("Candlestick"));
    assert!(svg.contains("event_time"));
}

#[test]
fn test_roc_figure_labels() {
    let labels = [0u8, 0, 1, 1, 0, 1];
    let scores = [0.1, 0.35, 0.4, 0.8, 0.7, 0.9];
    let figure = plot_roc_curve(&labels, &scores, &PlotConfig::default()).unwrap();
    let svg = figure.to_svg_string().unwrap();
    assert!(svg.contains("No Skill"));
    assert!(svg.contains("CatBoost"));
    assert!(svg.contains("False Positive Rate"));
    assert!(svg.contains("True Positive Rate"));
}

#[test]
fn test_roc_figure_needs_both_classes() {
    assert!(plot_roc_curve(&[1, 1], &[0.3, 0.6], &PlotConfig::default()).is_err());
}

#[test]
fn test_nan_scores_split_roc_from_confusion() {
    let labels = [0u8, 1, 1];
    let scores = [0.1, f64::NAN, 0.9];
    let config = PlotConfig::default();
    assert!(plot_roc_curve(&labels, &scores, &config).is_err());

    let figure = plot_confusion_matrix(&labels, &scores, 0.5, &config).unwrap();
    let FigureBody::Confusion(chart) = &figure.body else {
        panic!("expected a confusion figure");
    };
    assert_eq!(chart.matrix.get(1, 0), 1);
    assert_eq!(chart.matrix.get(1, 1), 1);
}

#[test]
fn test_confusion_figure() {
    let labels = [0u8, 0, 0, 1, 1];
    let scores = [0.1, 0.6, 0.2, 0.7, 0.3];
    let config = PlotConfig::default();
    let figure = plot_confusion_matrix(&labels, &scores, 0.5, &config).unwrap();
    assert_eq!((figure.width, figure.height), (800, 500));

    let FigureBody::Confusion(chart) = &figure.body else {
        panic!("expected a confusion figure");
    };
    assert_eq!(chart.matrix.get(0, 0), 2);
    assert_eq!(chart.matrix.get(0, 1), 1);
    assert_eq!(chart.matrix.get(1, 0), 1);
    assert_eq!(chart.matrix.get(1, 1), 1);

    let svg = figure.to_svg_string().unwrap();
    assert!(svg.contains("Confusion matrix (cutoff 0.50)"));
    assert!(svg.contains("Predicted label"));
    assert!(svg.contains("True label"));
    assert!(svg.contains("Non-event"));
}

#[test]
fn test_feature_importance_figure() {
    let model = SavedImportances {
        model: "catboost".to_string(),
        importances: vec![0.2, 3.5, 1.0],
    };
    let columns = vec!["rsi".to_string(), "volume".to_string(), "atr".to_string()];
    let figure = plot_feature_importances(&model, &columns, &PlotConfig::default()).unwrap();

    let FigureBody::Importance(chart) = &figure.body else {
        panic!("expected an importance figure");
    };
    assert_eq!(chart.importances.names(), vec!["volume", "atr", "rsi"]);

    let svg = figure.to_svg_string().unwrap();
    assert!(svg.contains("Feature importances"));
    assert!(svg.contains("volume"));
}

#[test]
fn test_feature_importance_mismatch() {
    struct TwoFeatures;
    impl FeatureImportance for TwoFeatures {
        fn feature_importance(&self) -> anyhow::Result<Vec<f64>> {
            Ok(vec![1.0, 2.0])
        }
    }
    let columns = vec!["a".to_string()];
    assert!(plot_feature_importances(&TwoFeatures, &columns, &PlotConfig::default()).is_err());
}

#[test]
fn test_svg_viewer_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let viewer = SvgDirectoryViewer::new(dir.path().join("shown"));
    let config = PlotConfig::default();

    plot_candlestick(&synthetic_frame(12), &config).show(&viewer).unwrap();
    plot_roc_curve(&[0, 1], &[0.2, 0.9], &config).unwrap().show(&viewer).unwrap();

    assert_eq!(viewer.shown(), 2);
    assert!(viewer.dir().join("000-candlestick.svg").exists());
    assert!(viewer.dir().join("001-roc-curve.svg").exists());
}

#[test]
fn test_figures_are_independent() {
    let config = PlotConfig::default();
    let first = plot_candlestick(&synthetic_frame(10), &config);
    let before = first.to_svg_string().unwrap();
    let _second = plot_confusion_matrix(&[0, 1], &[0.2, 0.9], 0.5, &config)
        .unwrap()
        .to_svg_string()
        .unwrap();
    assert_eq!(first.to_svg_string().unwrap(), before);
}

#[test]
fn test_save_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let figure = plot_candlestick(&synthetic_frame(8), &PlotConfig::default());
    figure.save(&dir.path().join("c.svg")).unwrap();
    figure.save(&dir.path().join("c.png")).unwrap();
    assert!(dir.path().join("c.svg").exists());
    assert!(dir.path().join("c.png").exists());
    assert!(figure.save(&dir.path().join("c.gif")).is_err());
}
