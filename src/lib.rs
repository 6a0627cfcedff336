//! Data Sweeper: convert tabular files between CSV and Excel with
//! optional cleaning and column selection.
//!
//! The [`data`] module is the conversion pipeline and has no UI
//! dependencies; the desktop front end in `main.rs` only calls into it.

pub mod config;
pub mod data;

pub use data::error::SweepError;
pub use data::export::{ConversionResult, ExportFormat};
pub use data::model::{Cell, Column, FileDescriptor, Table};
