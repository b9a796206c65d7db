use std::path::{Path, PathBuf};

use anomaly_core::PlotConfig;
use anomaly_data::{format_timestamp, CandleFrame};
use anyhow::{bail, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::figure::{Figure, FigureBody};
use crate::viewer::FigureViewer;

/// File written by [`plot_candlestick_anomaly`] into the output directory.
pub const ANOMALY_FILE_NAME: &str = "candlestick.png";

const DEFAULT_BAR_SPACING_MS: i64 = 60_000;

#[derive(Debug, Clone)]
pub struct CandlestickChart {
    pub frame: CandleFrame,
    pub time_label: String,
    /// `(timestamp, open)` markers drawn over the candles.
    pub markers: Vec<(i64, f64)>,
}

impl CandlestickChart {
    pub(crate) fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let (x_min, x_max) = self.x_range();
        let (y_min, y_max) = self.y_range();

        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(title, ("sans-serif", 22))
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|x| format_timestamp(*x as i64))
            .x_desc(self.time_label.as_str())
            .y_desc("Price")
            .draw()?;

        let n = self.frame.len().max(1) as u32;
        let plot_width = chart.plotting_area().dim_in_pixel().0;
        let candle_width = (plot_width * 3 / (n * 5)).clamp(1, 15);

        chart.draw_series(self.frame.candles().map(|c| {
            CandleStick::new(
                c.timestamp as f64,
                c.open,
                c.high,
                c.low,
                c.close,
                GREEN.filled(),
                RED.filled(),
                candle_width,
            )
        }))?;

        if !self.markers.is_empty() {
            chart
                .draw_series(
                    self.markers
                        .iter()
                        .map(|&(t, price)| Circle::new((t as f64, price), 5, BLUE.filled())),
                )?
                .label("target = 1")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.filled()));

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        Ok(())
    }

    fn x_range(&self) -> (f64, f64) {
        let Some((t0, t1)) = self.frame.time_range() else {
            return (0.0, DEFAULT_BAR_SPACING_MS as f64);
        };
        let n = self.frame.len() as i64;
        let spacing = if n >= 2 && t1 > t0 {
            (t1 - t0) / (n - 1)
        } else {
            DEFAULT_BAR_SPACING_MS
        };
        let pad = (spacing / 2).max(1);
        ((t0 - pad) as f64, (t1 + pad) as f64)
    }

    fn y_range(&self) -> (f64, f64) {
        let Some((lo, hi)) = self.frame.price_range() else {
            return (0.0, 1.0);
        };
        let margin = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
        (lo - margin, hi + margin)
    }
}

/// Candlestick chart of the whole frame, x axis taken from its timestamps.
pub fn plot_candlestick(frame: &CandleFrame, config: &PlotConfig) -> Figure {
    debug!("Building candlestick figure: rows={}", frame.len());
    Figure::new(
        "Candlestick",
        (config.width, config.height),
        FigureBody::Candlestick(CandlestickChart {
            frame: frame.clone(),
            time_label: "event_time".to_string(),
            markers: Vec::new(),
        }),
    )
}

/// Candlesticks for rows `[left, right)` with a marker at the open price of
/// every row flagged `target == 1`.
///
/// The figure is shown through `viewer`, then written to
/// `output_dir/candlestick.png`. Returns the figure and the written path.
pub fn plot_candlestick_anomaly(
    frame: &CandleFrame,
    output_dir: &Path,
    left: usize,
    right: usize,
    config: &PlotConfig,
    viewer: &dyn FigureViewer,
) -> Result<(Figure, PathBuf)> {
    if !output_dir.is_dir() {
        bail!("output directory does not exist: {}", output_dir.display());
    }

    let window = frame.slice(left, right);
    let markers = window.anomaly_points();
    debug!(
        "Building anomaly figure: rows [{}, {}) -> {} candles, {} flagged",
        left,
        right,
        window.len(),
        markers.len()
    );

    let figure = Figure::new(
        "Candlestick anomalies",
        (config.width, config.height),
        FigureBody::Candlestick(CandlestickChart {
            frame: window,
            time_label: "t_start".to_string(),
            markers,
        }),
    );

    figure.show(viewer)?;

    let path = output_dir.join(ANOMALY_FILE_NAME);
    figure.save_png(&path)?;
    Ok((figure, path))
}
