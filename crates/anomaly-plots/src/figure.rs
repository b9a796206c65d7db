use std::path::Path;

use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::candlestick::CandlestickChart;
use crate::confusion::ConfusionChart;
use crate::importance::ImportanceChart;
use crate::roc::RocChart;
use crate::viewer::FigureViewer;

/// What a figure draws.
#[derive(Debug, Clone)]
pub enum FigureBody {
    Candlestick(CandlestickChart),
    Roc(RocChart),
    Confusion(ConfusionChart),
    Importance(ImportanceChart),
}

/// A self-contained chart: owns its data and renders on demand.
///
/// Figures share no drawing state, so building one never affects another.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub body: FigureBody,
}

impl Figure {
    pub fn new(title: impl Into<String>, size: (u32, u32), body: FigureBody) -> Self {
        Self {
            title: title.into(),
            width: size.0,
            height: size.1,
            body,
        }
    }

    pub fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        match &self.body {
            FigureBody::Candlestick(chart) => chart.draw(root, &self.title),
            FigureBody::Roc(chart) => chart.draw(root, &self.title),
            FigureBody::Confusion(chart) => chart.draw(root, &self.title),
            FigureBody::Importance(chart) => chart.draw(root, &self.title),
        }
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        {
            let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
            self.draw(&root)?;
            root.present()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        info!("Saved figure '{}' to {}", self.title, path.display());
        Ok(())
    }

    pub fn save_svg(&self, path: &Path) -> Result<()> {
        {
            let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
            self.draw(&root)?;
            root.present()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        info!("Saved figure '{}' to {}", self.title, path.display());
        Ok(())
    }

    /// Save as PNG or SVG depending on the extension of `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => self.save_png(path),
            "svg" => self.save_svg(path),
            _ => bail!("unsupported image format: {}", path.display()),
        }
    }

    pub fn to_svg_string(&self) -> Result<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (self.width, self.height)).into_drawing_area();
            self.draw(&root)?;
            root.present()?;
        }
        Ok(buf)
    }

    pub fn show(&self, viewer: &dyn FigureViewer) -> Result<()> {
        viewer.show(self)
    }
}
