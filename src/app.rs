use eframe::egui;

use data_sweeper::config::Settings;
use data_sweeper::data::model::FileDescriptor;

use crate::state::{read_descriptor, AppState};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    pub state: AppState,
}

impl DataSweeperApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }

    /// Files dropped onto the window are opened like uploads.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut files = Vec::with_capacity(dropped.len());
        let mut unreadable = Vec::new();
        for file in dropped {
            if let Some(bytes) = file.bytes {
                files.push(FileDescriptor::new(file.name, bytes.to_vec()));
            } else if let Some(path) = file.path {
                match read_descriptor(&path) {
                    Ok(descriptor) => files.push(descriptor),
                    Err(e) => {
                        log::error!("Failed to read dropped file: {e:#}");
                        unreadable.push(format!("Error: {e:#}"));
                    }
                }
            }
        }

        self.state.open_files(files);
        self.state.errors.extend(unreadable);
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: opened files ----
        egui::SidePanel::left("file_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::file_panel(ui, &mut self.state);
        });
    }
}
