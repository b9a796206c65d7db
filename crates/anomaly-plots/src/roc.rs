use anomaly_core::PlotConfig;
use anomaly_models::{roc_curve, RocCurve};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::figure::{Figure, FigureBody};

// Pixel sizes of the no-skill dashes
const DASH_LENGTH: u32 = 8;
const DASH_GAP: u32 = 6;

#[derive(Debug, Clone)]
pub struct RocChart {
    pub curve: RocCurve,
    pub model_label: String,
}

impl RocChart {
    pub(crate) fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let caption = format!("{} (AUC = {:.3})", title, self.curve.auc);
        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(caption, ("sans-serif", 22))
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.0f64)?;

        chart
            .configure_mesh()
            .x_desc("False Positive Rate")
            .y_desc("True Positive Rate")
            .draw()?;

        // No-skill reference: dashed y = x
        chart
            .draw_series(DashedLineSeries::new(
                vec![(0.0, 0.0), (1.0, 1.0)],
                DASH_LENGTH,
                DASH_GAP,
                BLUE.stroke_width(2),
            ))?
            .label("No Skill")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));

        let points: Vec<(f64, f64)> = self
            .curve
            .points
            .iter()
            .map(|p| (p.fpr, p.tpr))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), RED.stroke_width(2)))?
            .label(self.model_label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));
        chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 3, RED.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}

/// ROC curve of `scores` against `labels` with a no-skill diagonal.
pub fn plot_roc_curve(labels: &[u8], scores: &[f64], config: &PlotConfig) -> Result<Figure> {
    let curve = roc_curve(labels, scores)?;
    Ok(Figure::new(
        "ROC curve",
        (config.width, config.height),
        FigureBody::Roc(RocChart {
            curve,
            model_label: config.model_label.clone(),
        }),
    ))
}
