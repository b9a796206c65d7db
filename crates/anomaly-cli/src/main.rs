use std::path::{Path, PathBuf};

use anomaly_core::Settings;
use anomaly_models::SavedImportances;
use anomaly_plots::{Figure, FigureBody, FigureViewer, SvgDirectoryViewer};
use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_help();
        return Ok(());
    }
    let rest = &args[2..];
    let mut settings = load_settings(rest)?;
    if rest.iter().any(|a| a == "-v" || a == "--verbose") {
        settings.logging.verbose = true;
    }
    let _log_guard = anomaly_core::logging::init_logging(&settings.logging)?;

    match args[1].as_str() {
        "candles" => cmd_candles(rest, &settings),
        "anomaly" => cmd_anomaly(rest, &settings),
        "roc" => cmd_roc(rest, &settings),
        "threshold" => cmd_threshold(rest, &settings),
        "confusion" => cmd_confusion(rest, &settings),
        "importance" => cmd_importance(rest, &settings),
        _ => {
            print_help();
            Ok(())
        }
    }
}

fn cmd_candles(args: &[String], settings: &Settings) -> Result<()> {
    let input = require_flag(args, "--input")?;
    let frame = anomaly_data::load_candles(&input, &settings.columns.event_time, &settings.columns)?;
    let figure = anomaly_plots::plot_candlestick(&frame, &settings.plots);
    println!("Candlestick {} rows={}", input, frame.len());
    finish(&figure, args, settings)
}

fn cmd_anomaly(args: &[String], settings: &Settings) -> Result<()> {
    let input = require_flag(args, "--input")?;
    let output_dir = parse_flag(args, "--output-dir").unwrap_or_else(|| ".".to_string());
    let left: usize = parse_number(args, "--left")?.unwrap_or(0);

    let frame = anomaly_data::load_candles(&input, &settings.columns.window_start, &settings.columns)?;
    let right: usize = parse_number(args, "--right")?.unwrap_or(frame.len());

    let viewer = SvgDirectoryViewer::new(&settings.plots.display_dir);
    let (figure, path) = anomaly_plots::plot_candlestick_anomaly(
        &frame,
        Path::new(&output_dir),
        left,
        right,
        &settings.plots,
        &viewer,
    )?;
    let (candles, markers) = match &figure.body {
        FigureBody::Candlestick(chart) => (chart.frame.len(), chart.markers.len()),
        _ => (0, 0),
    };
    println!(
        "Anomaly rows [{}, {}) candles={} flagged={} out={}",
        left,
        right,
        candles,
        markers,
        path.display()
    );
    Ok(())
}

fn cmd_roc(args: &[String], settings: &Settings) -> Result<()> {
    let input = require_flag(args, "--input")?;
    let samples = anomaly_data::load_samples(&input, &settings.columns)?;
    let figure = anomaly_plots::plot_roc_curve(&samples.labels, &samples.scores, &settings.plots)?;
    let auc = anomaly_models::roc_auc(&samples.labels, &samples.scores)?;
    println!("ROC {} samples={} auc={:.4}", input, samples.len(), auc);
    finish(&figure, args, settings)
}

fn cmd_threshold(args: &[String], settings: &Settings) -> Result<()> {
    let input = require_flag(args, "--input")?;
    let samples = anomaly_data::load_samples(&input, &settings.columns)?;
    let search = anomaly_models::search_max_fscore(&samples.labels, &samples.scores)?;
    println!(
        "Threshold {} samples={} cutoff={:.2} f1={:.4}",
        input,
        samples.len(),
        search.cutoff,
        search.f1
    );
    Ok(())
}

fn cmd_confusion(args: &[String], settings: &Settings) -> Result<()> {
    let input = require_flag(args, "--input")?;
    let samples = anomaly_data::load_samples(&input, &settings.columns)?;
    let cutoff = match parse_number::<f64>(args, "--cutoff")? {
        Some(c) => c,
        None => anomaly_models::find_max_fscore(&samples.labels, &samples.scores)?,
    };
    let figure =
        anomaly_plots::plot_confusion_matrix(&samples.labels, &samples.scores, cutoff, &settings.plots)?;
    println!("Confusion {} samples={} cutoff={:.2}", input, samples.len(), cutoff);
    finish(&figure, args, settings)
}

fn cmd_importance(args: &[String], settings: &Settings) -> Result<()> {
    let model_path = require_flag(args, "--model")?;
    let train_path = require_flag(args, "--train")?;

    let model = SavedImportances::load(Path::new(&model_path))?;
    let x_train = anomaly_data::read_table(&train_path)?;
    let columns = anomaly_models::base::column_names(&x_train);
    let figure = anomaly_plots::plot_feature_importances(&model, &columns, &settings.plots)?;
    println!("Importances {} features={}", model.model, columns.len());
    finish(&figure, args, settings)
}

/// Save to `--out` when given, otherwise show in the display directory.
fn finish(figure: &Figure, args: &[String], settings: &Settings) -> Result<()> {
    match parse_flag(args, "--out") {
        Some(out) => {
            let out = PathBuf::from(out);
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            figure.save(&out)?;
            println!("Saved {}", out.display());
        }
        None => {
            let viewer = SvgDirectoryViewer::new(&settings.plots.display_dir);
            viewer.show(figure)?;
            println!("Shown in {}", viewer.dir().display());
        }
    }
    Ok(())
}

fn load_settings(args: &[String]) -> Result<Settings> {
    match parse_flag(args, "--config") {
        Some(path) => {
            let mut settings = Settings::from_yaml(&path)
                .with_context(|| format!("failed to load config {}", path))?;
            settings.apply_env_overrides();
            Ok(settings)
        }
        None => Settings::load_with_env(),
    }
}

fn require_flag(args: &[String], name: &str) -> Result<String> {
    parse_flag(args, name).ok_or_else(|| anyhow::anyhow!("missing required flag {}", name))
}

fn parse_number<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>> {
    match parse_flag(args, name) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("invalid value for {}: {}", name, v)),
        None => Ok(None),
    }
}

fn parse_flag(args: &[String], name: &str) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == name {
            return iter.next().cloned();
        }
    }
    None
}

fn print_help() {
    println!("anomaly-cli");
    println!("  candles --input candles.parquet [--out candles.png]");
    println!("  anomaly --input windows.parquet --output-dir out --left 10 --right 20");
    println!("  roc --input predictions.csv [--out roc.svg]");
    println!("  threshold --input predictions.csv");
    println!("  confusion --input predictions.csv [--cutoff 0.4] [--out cm.png]");
    println!("  importance --model importances.yaml --train x_train.parquet [--out fi.png]");
    println!("  common: --config config.yaml -v (logging.file_output in the config adds a JSON log file)");
}
