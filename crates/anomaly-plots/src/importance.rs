use anomaly_core::PlotConfig;
use anomaly_models::{FeatureImportance, FeatureImportances};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::figure::{Figure, FigureBody};

#[derive(Debug, Clone)]
pub struct ImportanceChart {
    pub importances: FeatureImportances,
}

impl ImportanceChart {
    pub(crate) fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let names = self.importances.names();
        let values: Vec<f64> = self
            .importances
            .values()
            .into_iter()
            .map(|v| if v.is_finite() { v } else { 0.0 })
            .collect();

        let lo = values.iter().copied().fold(0.0, f64::min);
        let hi = values.iter().copied().fold(0.0, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        let y_min = if lo < 0.0 { lo - span * 0.05 } else { 0.0 };
        let y_max = hi + span * 0.05;

        // Integer ranges include their end, so 0..n-1 gives one segment per bar
        let n = names.len().max(1) as i32;
        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(title, ("sans-serif", 22))
            .x_label_area_size(80)
            .y_label_area_size(60)
            .build_cartesian_2d((0..n - 1).into_segmented(), y_min..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len().max(1))
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => usize::try_from(*i)
                    .ok()
                    .and_then(|i| names.get(i))
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("Importance")
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(4)
                .data(values.iter().enumerate().map(|(i, &v)| (i as i32, v))),
        )?;

        Ok(())
    }
}

/// Bar chart of the model's importances, highest first.
///
/// `columns` are the training-data column names, in the order the model
/// saw them.
pub fn plot_feature_importances<M: FeatureImportance + ?Sized>(
    model: &M,
    columns: &[String],
    config: &PlotConfig,
) -> Result<Figure> {
    let importances = FeatureImportances::from_model(model, columns)?;
    Ok(Figure::new(
        "Feature importances",
        (config.width, config.height),
        FigureBody::Importance(ImportanceChart { importances }),
    ))
}
