use std::path::Path;

use anyhow::{Context, Result};

use data_sweeper::config::Settings;
use data_sweeper::data::clean;
use data_sweeper::data::export::{self, ConversionResult, ExportFormat};
use data_sweeper::data::loader;
use data_sweeper::data::model::{FileDescriptor, Table};
use data_sweeper::data::select;
use data_sweeper::SweepError;

// ---------------------------------------------------------------------------
// Per-file session
// ---------------------------------------------------------------------------

/// Everything the UI tracks for one opened file. Sessions share nothing, so
/// an action on one file never touches another.
pub struct FileSession {
    pub file: FileDescriptor,
    /// Loaded table with any cleaning applied so far.
    pub table: Table,
    /// Whether the cleaning controls are expanded.
    pub cleaning_open: bool,
    /// Selected columns in output order.
    pub selection: Vec<String>,
    pub show_chart: bool,
    pub format: ExportFormat,
    /// Feedback from the last action on this file.
    pub notice: Option<String>,
}

impl FileSession {
    pub fn new(file: FileDescriptor, table: Table, format: ExportFormat) -> Self {
        let selection = select::default_selection(&table);
        Self {
            file,
            table,
            cleaning_open: false,
            selection,
            show_chart: false,
            format,
            notice: None,
        }
    }

    pub fn remove_duplicates(&mut self) {
        let before = self.table.n_rows();
        self.table = clean::deduplicate(&self.table);
        let removed = before - self.table.n_rows();
        self.notice = Some(format!("Duplicates removed ({removed} row(s))"));
    }

    pub fn fill_missing(&mut self) {
        let before: usize = self.table.columns().iter().map(|c| c.missing_count()).sum();
        self.table = clean::impute_missing(&self.table);
        let after: usize = self.table.columns().iter().map(|c| c.missing_count()).sum();
        self.notice = Some(format!(
            "Missing values have been filled ({} cell(s))",
            before - after
        ));
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.selection.iter().any(|c| c == column)
    }

    /// Checking a column appends it to the selection; unchecking removes it.
    pub fn toggle_column(&mut self, column: &str) {
        if let Some(pos) = self.selection.iter().position(|c| c == column) {
            self.selection.remove(pos);
        } else {
            self.selection.push(column.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selection = select::default_selection(&self.table);
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// The table as it would be exported.
    pub fn selected_table(&self) -> Table {
        select::select(&self.table, self.selection.as_slice())
    }

    /// Recomputed on every request; results are never cached.
    pub fn convert(&self) -> Result<ConversionResult, SweepError> {
        export::export(&self.selected_table(), self.format, &self.file.name)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Opened files, in the order they were opened.
    pub sessions: Vec<FileSession>,

    /// Index into `sessions` of the file shown in the central panel.
    pub active: Option<usize>,

    /// Per-file errors from the last batch of opened files.
    pub errors: Vec<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sessions: Vec::new(),
            active: None,
            errors: Vec::new(),
            status_message: None,
        }
    }

    /// Load a batch of uploaded files. Files that fail are reported in
    /// `errors` and skipped; the rest are opened.
    pub fn open_files(&mut self, files: Vec<FileDescriptor>) {
        self.errors.clear();
        let mut opened = 0;

        for file in files {
            match loader::load_file(&file) {
                Ok(table) => {
                    self.add_session(file, table);
                    opened += 1;
                }
                Err(e) => {
                    log::warn!("Could not open '{}': {e}", file.name);
                    self.errors.push(format!("{}: {e}", file.name));
                }
            }
        }

        self.status_message = Some(format!(
            "Opened {opened} file(s), {} skipped",
            self.errors.len()
        ));
    }

    /// A file opened again under the same name replaces its old session.
    fn add_session(&mut self, file: FileDescriptor, table: Table) {
        let session = FileSession::new(file, table, self.settings.default_format);
        let idx = match self
            .sessions
            .iter()
            .position(|s| s.file.name == session.file.name)
        {
            Some(idx) => {
                self.sessions[idx] = session;
                idx
            }
            None => {
                self.sessions.push(session);
                self.sessions.len() - 1
            }
        };
        self.active = Some(idx);
    }

    pub fn close_file(&mut self, idx: usize) {
        if idx >= self.sessions.len() {
            return;
        }
        self.sessions.remove(idx);
        self.active = match self.active {
            _ if self.sessions.is_empty() => None,
            Some(a) if a > idx => Some(a - 1),
            Some(a) => Some(a.min(self.sessions.len() - 1)),
            None => None,
        };
    }
}

/// Read a file from disk into an upload descriptor.
pub fn read_descriptor(path: &Path) -> Result<FileDescriptor> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(FileDescriptor::new(name, bytes))
}

/// Write a conversion result to a chosen path.
pub fn save_result(result: &ConversionResult, path: &Path) -> Result<()> {
    std::fs::write(path, &result.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {} ({})", path.display(), result.mime_type);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(files: Vec<(&str, &str)>) -> AppState {
        let mut state = AppState::new(Settings::default());
        state.open_files(
            files
                .into_iter()
                .map(|(name, bytes)| FileDescriptor::new(name, bytes.as_bytes().to_vec()))
                .collect(),
        );
        state
    }

    #[test]
    fn unsupported_files_are_skipped() {
        let state = state_with(vec![("a.csv", "x\n1\n"), ("b.pdf", "%PDF"), ("c.csv", "y\n2\n")]);
        assert_eq!(state.sessions.len(), 2);
        assert_eq!(state.errors.len(), 1);
        assert!(state.errors[0].contains("Unsupported file type: .pdf"));
    }

    #[test]
    fn sessions_are_independent() {
        let mut state = state_with(vec![("a.csv", "x\n1\n1\n"), ("b.csv", "x\n1\n1\n")]);
        state.sessions[0].remove_duplicates();
        state.sessions[0].format = ExportFormat::Excel;
        assert_eq!(state.sessions[0].table.n_rows(), 1);
        assert_eq!(state.sessions[1].table.n_rows(), 2);
        assert_eq!(state.sessions[1].format, ExportFormat::Csv);
    }

    #[test]
    fn toggling_appends_to_selection() {
        let mut state = state_with(vec![("a.csv", "a,b,c\n1,2,3\n")]);
        let session = &mut state.sessions[0];
        session.toggle_column("a");
        session.toggle_column("a");
        assert_eq!(session.selection, vec!["b", "c", "a"]);
        assert_eq!(session.selected_table().column_names(), vec!["b", "c", "a"]);
    }

    #[test]
    fn closing_keeps_active_index_valid() {
        let mut state = state_with(vec![("a.csv", "x\n1\n"), ("b.csv", "x\n1\n")]);
        assert_eq!(state.active, Some(1));
        state.close_file(1);
        assert_eq!(state.active, Some(0));
        state.close_file(0);
        assert_eq!(state.active, None);
    }
}
