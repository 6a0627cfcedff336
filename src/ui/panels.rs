use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use data_sweeper::data::export::ExportFormat;

use crate::state::{read_descriptor, save_result, AppState, FileSession};
use crate::ui::{plot, preview};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("{} file(s) open", state.sessions.len()));
        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if state.errors.is_empty() {
                ui.visuals().text_color()
            } else {
                Color32::RED
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – opened files
// ---------------------------------------------------------------------------

/// Render the list of opened files and the errors of the last upload.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if state.sessions.is_empty() {
        ui.label("No files opened.\nUse File → Open… or drop CSV / Excel files here.");
    }

    let mut close = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, session) in state.sessions.iter().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    let selected = state.active == Some(idx);
                    if ui.selectable_label(selected, &session.file.name).clicked() {
                        state.active = Some(idx);
                    }
                    if ui.small_button("✖").on_hover_text("Close").clicked() {
                        close = Some(idx);
                    }
                });
            }

            if !state.errors.is_empty() {
                ui.separator();
                ui.strong("Skipped");
                for err in &state.errors {
                    ui.label(RichText::new(err).color(Color32::RED));
                }
            }
        });

    if let Some(idx) = close {
        state.close_file(idx);
    }
}

// ---------------------------------------------------------------------------
// Central panel – one file
// ---------------------------------------------------------------------------

/// Render the active file: info, preview, cleaning, columns, chart, export.
pub fn file_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = state.active.and_then(|idx| state.sessions.get_mut(idx)) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV or Excel file to start  (File → Open…)");
        });
        return;
    };
    let settings = &state.settings;
    let name = session.file.name.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- File info ----
            ui.heading(&name);
            ui.label(format!(
                "Size: {:.1} KiB  •  {} rows × {} columns",
                session.file.size_kib(),
                session.table.n_rows(),
                session.table.n_cols()
            ));
            ui.add_space(6.0);

            ui.strong("Preview");
            preview::preview_table(ui, &name, &session.table, settings.preview_rows);
            ui.separator();

            cleaning_section(ui, session);
            ui.separator();

            columns_section(ui, session);
            ui.separator();

            ui.checkbox(&mut session.show_chart, "Show visualization");
            if session.show_chart {
                let chart_id = format!("chart_{name}");
                plot::bar_chart(ui, &chart_id, &session.selected_table(), settings.chart_columns);
            }
            ui.separator();

            conversion_section(ui, session, &mut state.status_message);
        });
}

fn cleaning_section(ui: &mut Ui, session: &mut FileSession) {
    ui.strong("Data cleaning");
    ui.checkbox(&mut session.cleaning_open, "Clean data");
    if session.cleaning_open {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Remove duplicates").clicked() {
                session.remove_duplicates();
            }
            if ui.button("Fill missing values").clicked() {
                session.fill_missing();
            }
        });
    }
    if let Some(notice) = &session.notice {
        ui.label(RichText::new(notice).italics());
    }
}

fn columns_section(ui: &mut Ui, session: &mut FileSession) {
    let header = format!(
        "Columns to convert  ({}/{})",
        session.selection.len(),
        session.table.n_cols()
    );

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(("columns", &session.file.name))
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    session.select_all();
                }
                if ui.small_button("None").clicked() {
                    session.select_none();
                }
            });

            let names = session.table.column_names();
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for name in &names {
                    let mut checked = session.is_selected(name);
                    if ui.checkbox(&mut checked, name).changed() {
                        session.toggle_column(name);
                    }
                }
            });

            if !session.selection.is_empty() {
                ui.label(
                    RichText::new(format!("Output order: {}", session.selection.join(", "))).weak(),
                );
            }
        });
}

fn conversion_section(ui: &mut Ui, session: &mut FileSession, status: &mut Option<String>) {
    ui.strong("Conversion options");
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Convert {} to:", session.file.name));
        for format in ExportFormat::ALL {
            ui.radio_value(&mut session.format, format, format.label());
        }
    });

    let label = format!("⬇ Save {} as {}…", session.file.name, session.format);
    if ui.button(label).clicked() {
        *status = Some(save_dialog(session));
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open tabular files")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(paths) = files {
        let mut descriptors = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            match read_descriptor(&path) {
                Ok(file) => descriptors.push(file),
                Err(e) => {
                    log::error!("Failed to read file: {e:#}");
                    unreadable.push(format!("Error: {e:#}"));
                }
            }
        }
        state.open_files(descriptors);
        state.errors.extend(unreadable);
    }
}

/// Convert the session and write it where the user chooses. Returns the
/// status line to show.
fn save_dialog(session: &FileSession) -> String {
    let result = match session.convert() {
        Ok(result) => result,
        Err(e) => {
            log::error!("Conversion of '{}' failed: {e}", session.file.name);
            return format!("Error: {e}");
        }
    };

    let ext = session.format.extension().trim_start_matches('.');
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(result.file_name.as_str())
        .add_filter(session.format.label(), &[ext])
        .save_file()
    else {
        return "Save cancelled".to_string();
    };

    match save_result(&result, &path) {
        Ok(()) => format!("Saved {}", path.display()),
        Err(e) => {
            log::error!("Failed to save file: {e:#}");
            format!("Error: {e:#}")
        }
    }
}
