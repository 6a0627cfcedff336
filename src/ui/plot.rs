use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use data_sweeper::data::model::Table;

use crate::color::series_colors;

// ---------------------------------------------------------------------------
// Bar chart of numeric columns
// ---------------------------------------------------------------------------

/// Plot the first `max_series` numeric columns as grouped bars, one group per
/// row. Missing cells leave a gap.
pub fn bar_chart(ui: &mut Ui, id: &str, table: &Table, max_series: usize) {
    let series: Vec<_> = table.numeric_columns().into_iter().take(max_series).collect();
    if series.is_empty() {
        ui.label("No numeric columns to plot.");
        return;
    }

    let n = series.len() as f64;
    let width = 0.8 / n;
    let colors = series_colors(series.len());

    Plot::new(id)
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (k, (col, color)) in series.iter().zip(colors).enumerate() {
                let offset = (k as f64 - (n - 1.0) / 2.0) * width;
                let bars: Vec<Bar> = col
                    .cells
                    .iter()
                    .enumerate()
                    .filter_map(|(row, cell)| {
                        cell.as_f64()
                            .map(|v| Bar::new(row as f64 + offset, v).width(width))
                    })
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(&col.name).color(color));
            }
        });
}
