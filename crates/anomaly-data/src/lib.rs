use std::path::Path;

use anomaly_core::ColumnsConfig;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use tracing::{debug, warn};

/// One OHLC row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Column-oriented OHLC series with an optional event `target` flag.
///
/// Timestamps are epoch milliseconds. Frames are never mutated; `slice`
/// returns a new frame.
#[derive(Debug, Clone, Default)]
pub struct CandleFrame {
    pub timestamps: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub target: Option<Vec<i64>>,
}

impl CandleFrame {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Build a frame from the named columns of `df`.
    ///
    /// `time_column` picks the x axis (`event_time` for plain candles,
    /// `t_start` for anomaly windows). The target column is optional.
    pub fn from_dataframe(df: &DataFrame, time_column: &str, columns: &ColumnsConfig) -> Result<Self> {
        let time = find_series(df, &[time_column])
            .with_context(|| format!("missing time column '{}'", time_column))?;
        let open = find_series(df, &[columns.open.as_str()])
            .with_context(|| format!("missing open column '{}'", columns.open))?;
        let high = find_series(df, &[columns.high.as_str()])
            .with_context(|| format!("missing high column '{}'", columns.high))?;
        let low = find_series(df, &[columns.low.as_str()])
            .with_context(|| format!("missing low column '{}'", columns.low))?;
        let close = find_series(df, &[columns.close.as_str()])
            .with_context(|| format!("missing close column '{}'", columns.close))?;
        let target = find_series(df, &[columns.target.as_str()]);

        let timestamps = series_to_epoch_ms(&time)?;
        let target = match target {
            Some(ref series) => Some(series_to_i64(series)?),
            None => None,
        };

        let frame = Self {
            timestamps,
            open: series_to_f64(&open)?,
            high: series_to_f64(&high)?,
            low: series_to_f64(&low)?,
            close: series_to_f64(&close)?,
            target,
        };
        frame.validate()?;

        if !is_sorted_timestamps(&frame.timestamps) {
            warn!("{}: timestamps are not monotonically increasing", time_column);
        }
        debug!("Loaded candle frame: rows={} time={}", frame.len(), time_column);
        Ok(frame)
    }

    fn validate(&self) -> Result<()> {
        let n = self.close.len();
        if self.open.len() != n || self.high.len() != n || self.low.len() != n {
            bail!("OHLC columns have mismatched lengths");
        }
        if self.timestamps.len() != n {
            bail!("timestamp column length does not match OHLC length");
        }
        if let Some(ref target) = self.target {
            if target.len() != n {
                bail!("target column length does not match OHLC length");
            }
        }
        Ok(())
    }

    /// Positional slice of rows `[left, right)`.
    ///
    /// Bounds are clamped to the frame; `left >= right` gives an empty frame.
    pub fn slice(&self, left: usize, right: usize) -> Self {
        let end = right.min(self.len());
        let start = left.min(end);
        Self {
            timestamps: self.timestamps[start..end].to_vec(),
            open: self.open[start..end].to_vec(),
            high: self.high[start..end].to_vec(),
            low: self.low[start..end].to_vec(),
            close: self.close[start..end].to_vec(),
            target: self.target.as_ref().map(|t| t[start..end].to_vec()),
        }
    }

    pub fn candle(&self, idx: usize) -> Option<Candle> {
        if idx >= self.len() {
            return None;
        }
        Some(Candle {
            timestamp: self.timestamps[idx],
            open: self.open[idx],
            high: self.high[idx],
            low: self.low[idx],
            close: self.close[idx],
        })
    }

    pub fn candles(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).filter_map(move |i| self.candle(i))
    }

    /// Row indices whose target flag equals 1.
    pub fn anomaly_indices(&self) -> Vec<usize> {
        match self.target {
            Some(ref target) => target
                .iter()
                .enumerate()
                .filter(|(_, &flag)| flag == 1)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }

    /// `(timestamp, open)` for every flagged row.
    pub fn anomaly_points(&self) -> Vec<(i64, f64)> {
        self.anomaly_indices()
            .into_iter()
            .map(|i| (self.timestamps[i], self.open[i]))
            .collect()
    }

    pub fn time_range(&self) -> Option<(i64, i64)> {
        let min = self.timestamps.iter().min()?;
        let max = self.timestamps.iter().max()?;
        Some((*min, *max))
    }

    /// Lowest low and highest high, ignoring non-finite prices.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let lo = self
            .low
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::INFINITY, f64::min);
        let hi = self
            .high
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            Some((lo, hi))
        } else {
            None
        }
    }
}

/// Ground-truth binary labels and predicted scores, aligned by position.
#[derive(Debug, Clone, Default)]
pub struct LabeledSamples {
    pub labels: Vec<u8>,
    pub scores: Vec<f64>,
}

impl LabeledSamples {
    pub fn new(labels: Vec<u8>, scores: Vec<f64>) -> Result<Self> {
        if labels.len() != scores.len() {
            bail!(
                "labels length {} != scores length {}",
                labels.len(),
                scores.len()
            );
        }
        Ok(Self { labels, scores })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn from_dataframe(df: &DataFrame, label_column: &str, score_column: &str) -> Result<Self> {
        let labels = find_series(df, &[label_column])
            .with_context(|| format!("missing label column '{}'", label_column))?;
        let scores = find_series(df, &[score_column])
            .with_context(|| format!("missing score column '{}'", score_column))?;

        let casted = labels.cast(&DataType::Int64)?;
        let chunked = casted.i64().context("label cast to i64 failed")?;
        let mut out_labels = Vec::with_capacity(chunked.len());
        for (row, value) in chunked.into_iter().enumerate() {
            match value {
                Some(0) => out_labels.push(0u8),
                Some(1) => out_labels.push(1u8),
                Some(other) => bail!("row {}: label {} is not binary", row, other),
                None => bail!("row {}: label is null", row),
            }
        }

        let casted = scores.cast(&DataType::Float64)?;
        let chunked = casted.f64().context("score cast to f64 failed")?;
        let mut out_scores = Vec::with_capacity(chunked.len());
        for (row, value) in chunked.into_iter().enumerate() {
            match value {
                Some(v) => out_scores.push(v),
                None => bail!("row {}: score is null", row),
            }
        }

        Self::new(out_labels, out_scores)
    }
}

fn is_sorted_timestamps(ts: &[i64]) -> bool {
    ts.windows(2).all(|w| w[0] <= w[1])
}

fn series_to_f64(series: &Series) -> Result<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    let chunked = casted.f64().context("series cast to f64 failed")?;
    Ok(chunked.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn series_to_i64(series: &Series) -> Result<Vec<i64>> {
    let casted = series.cast(&DataType::Int64)?;
    let chunked = casted.i64().context("series cast to i64 failed")?;
    Ok(chunked.into_iter().map(|v| v.unwrap_or(0)).collect())
}

/// Timestamps as epoch milliseconds, whatever the stored representation.
fn series_to_epoch_ms(series: &Series) -> Result<Vec<i64>> {
    let (physical, scale) = match series.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => (series.clone(), Scale::Div(1_000_000)),
        DataType::Datetime(TimeUnit::Microseconds, _) => (series.clone(), Scale::Div(1_000)),
        DataType::Datetime(TimeUnit::Milliseconds, _) => (series.clone(), Scale::Div(1)),
        DataType::Date => (series.cast(&DataType::Int32)?, Scale::Mul(86_400_000)),
        DataType::String => (
            series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .with_context(|| format!("column '{}' is not a parseable datetime", series.name()))?,
            Scale::Div(1),
        ),
        _ => (series.clone(), Scale::Div(1)),
    };

    let casted = physical.cast(&DataType::Int64)?;
    let chunked = casted.i64().context("timestamp cast to i64 failed")?;
    let mut out = Vec::with_capacity(chunked.len());
    for (row, value) in chunked.into_iter().enumerate() {
        let Some(v) = value else {
            bail!("row {}: timestamp is null", row);
        };
        out.push(match scale {
            Scale::Div(d) => v.div_euclid(d),
            Scale::Mul(m) => v * m,
        });
    }
    Ok(out)
}

#[derive(Clone, Copy)]
enum Scale {
    Div(i64),
    Mul(i64),
}

fn find_series(df: &DataFrame, candidates: &[&str]) -> Option<Series> {
    for candidate in candidates {
        if let Ok(col) = df.column(candidate) {
            return Some(col.as_materialized_series().clone());
        }
    }
    for name in df.get_column_names() {
        let lower = name.to_ascii_lowercase();
        if candidates.iter().any(|c| lower == c.to_ascii_lowercase()) {
            return df
                .column(name.as_str())
                .ok()
                .map(|col| col.as_materialized_series().clone());
        }
    }
    None
}

/// Read a parquet or CSV table, picked by file extension.
pub fn read_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "parquet" | "pq" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open parquet file: {}", path.display()))?;
            Ok(ParquetReader::new(file).finish()?)
        }
        "csv" => {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .with_context(|| format!("failed to open csv file: {}", path.display()))?
                .finish()?;
            Ok(df)
        }
        _ => bail!("unsupported table format: {}", path.display()),
    }
}

pub fn load_candles(path: impl AsRef<Path>, time_column: &str, columns: &ColumnsConfig) -> Result<CandleFrame> {
    let df = read_table(&path)?;
    CandleFrame::from_dataframe(&df, time_column, columns)
        .with_context(|| format!("invalid candle table: {}", path.as_ref().display()))
}

pub fn load_samples(path: impl AsRef<Path>, columns: &ColumnsConfig) -> Result<LabeledSamples> {
    let df = read_table(&path)?;
    LabeledSamples::from_dataframe(&df, &columns.label, &columns.score)
        .with_context(|| format!("invalid prediction table: {}", path.as_ref().display()))
}

pub fn timestamp_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

pub fn format_timestamp(ms: i64) -> String {
    match timestamp_to_datetime(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}
