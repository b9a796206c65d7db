use anomaly_core::PlotConfig;
use anomaly_models::ConfusionMatrix;
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::figure::{Figure, FigureBody};

// Ends of the blue color scale
const LIGHT_BLUE: (u8, u8, u8) = (247, 251, 255);
const DARK_BLUE: (u8, u8, u8) = (8, 48, 107);

#[derive(Debug, Clone)]
pub struct ConfusionChart {
    pub matrix: ConfusionMatrix,
    pub class_names: [String; 2],
    pub cutoff: f64,
}

impl ConfusionChart {
    pub(crate) fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let caption = format!("{} (cutoff {:.2})", title, self.cutoff);
        // Row r of the matrix spans y in [1 - r, 2 - r] so class 0 sits on top
        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(caption, ("sans-serif", 22))
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0.0f64..2.0f64, 0.0f64..2.0f64)?;

        let names = &self.class_names;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(5)
            .y_labels(5)
            .x_label_formatter(&|x| cell_label(*x, names, false))
            .y_label_formatter(&|y| cell_label(*y, names, true))
            .x_desc("Predicted label")
            .y_desc("True label")
            .draw()?;

        let max = self.matrix.max_count();
        let thresh = max as f64 / 2.0;

        chart.draw_series((0..2usize).flat_map(|row| {
            (0..2usize).map(move |col| (row, col))
        }).map(|(row, col)| {
            let count = self.matrix.get(row, col);
            let x0 = col as f64;
            let y0 = 1.0 - row as f64;
            Rectangle::new([(x0, y0), (x0 + 1.0, y0 + 1.0)], blue_scale(count, max).filled())
        }))?;

        for row in 0..2usize {
            for col in 0..2usize {
                let count = self.matrix.get(row, col);
                let color = if count as f64 > thresh { WHITE } else { BLACK };
                let style = ("sans-serif", 24)
                    .into_font()
                    .color(&color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                chart.draw_series(std::iter::once(Text::new(
                    count.to_string(),
                    (col as f64 + 0.5, 1.5 - row as f64),
                    style,
                )))?;
            }
        }

        Ok(())
    }
}

/// Class name for the tick at the center of a cell, blank elsewhere.
fn cell_label(v: f64, names: &[String; 2], rows: bool) -> String {
    let idx = if (v - 0.5).abs() < 1e-9 {
        0
    } else if (v - 1.5).abs() < 1e-9 {
        1
    } else {
        return String::new();
    };
    // Rows are drawn top-down
    let idx = if rows { 1 - idx } else { idx };
    names[idx].clone()
}

fn blue_scale(count: usize, max: usize) -> RGBColor {
    let t = if max == 0 {
        0.0
    } else {
        count as f64 / max as f64
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        lerp(LIGHT_BLUE.0, DARK_BLUE.0),
        lerp(LIGHT_BLUE.1, DARK_BLUE.1),
        lerp(LIGHT_BLUE.2, DARK_BLUE.2),
    )
}

/// Confusion matrix of `labels` against `scores > cutoff`.
pub fn plot_confusion_matrix(
    labels: &[u8],
    scores: &[f64],
    cutoff: f64,
    config: &PlotConfig,
) -> Result<Figure> {
    let matrix = ConfusionMatrix::at_cutoff(labels, scores, cutoff)?;
    Ok(Figure::new(
        "Confusion matrix",
        (config.confusion_width, config.confusion_height),
        FigureBody::Confusion(ConfusionChart {
            matrix,
            class_names: config.class_names.clone(),
            cutoff,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blue_scale_ends() {
        assert_eq!(blue_scale(0, 10), RGBColor(247, 251, 255));
        assert_eq!(blue_scale(10, 10), RGBColor(8, 48, 107));
        assert_eq!(blue_scale(0, 0), RGBColor(247, 251, 255));
    }

    #[test]
    fn test_cell_labels() {
        let names = ["Non-event".to_string(), "event".to_string()];
        assert_eq!(cell_label(0.5, &names, false), "Non-event");
        assert_eq!(cell_label(1.5, &names, false), "event");
        assert_eq!(cell_label(1.5, &names, true), "Non-event");
        assert_eq!(cell_label(1.0, &names, true), "");
    }
}
