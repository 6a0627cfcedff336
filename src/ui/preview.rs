use eframe::egui::{RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use data_sweeper::data::model::{Cell, Table};

const ROW_HEIGHT: f32 = 18.0;

/// Render the first `rows` rows of `table` as a striped grid.
pub fn preview_table(ui: &mut Ui, id: &str, table: &Table, rows: usize) {
    if table.n_cols() == 0 {
        ui.label("No columns.");
        return;
    }

    let head = table.head(rows);
    let columns = head.columns();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(GridColumn::auto().at_least(60.0), columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name).on_hover_text(col.kind().to_string());
                    });
                }
            })
            .body(|mut body| {
                for i in 0..head.n_rows() {
                    body.row(ROW_HEIGHT, |mut row| {
                        for cell in head.row(i) {
                            row.col(|ui: &mut Ui| {
                                match cell {
                                    Cell::Missing => ui.label(RichText::new("<NA>").weak()),
                                    other => ui.label(other.to_string()),
                                };
                            });
                        }
                    });
                }
            });
    });

    if table.n_rows() > rows {
        ui.label(RichText::new(format!("… {} more row(s)", table.n_rows() - rows)).weak());
    }
}
