use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use tracing::info;

use crate::figure::Figure;

/// Where "shown" figures go.
pub trait FigureViewer {
    fn show(&self, figure: &Figure) -> Result<()>;
}

/// Writes every shown figure as an SVG into a display directory.
///
/// Files are numbered in show order: `000-candlestick.svg`, `001-roc-curve.svg`, ...
#[derive(Debug)]
pub struct SvgDirectoryViewer {
    dir: PathBuf,
    shown: AtomicUsize,
}

impl SvgDirectoryViewer {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            shown: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }
}

impl FigureViewer for SvgDirectoryViewer {
    fn show(&self, figure: &Figure) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create display dir {}", self.dir.display()))?;
        let n = self.shown.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("{:03}-{}.svg", n, slug(&figure.title)));
        figure.save_svg(&path)?;
        info!("Showing '{}' at {}", figure.title, path.display());
        Ok(())
    }
}

/// Discards figures.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullViewer;

impl FigureViewer for NullViewer {
    fn show(&self, _figure: &Figure) -> Result<()> {
        Ok(())
    }
}

fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "figure".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Confusion matrix"), "confusion-matrix");
        assert_eq!(slug("ROC curve (AUC)"), "roc-curve-auc");
        assert_eq!(slug("!!"), "figure");
    }
}
