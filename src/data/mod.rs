/// Data layer: cell model, loading, cleaning, column selection, export.
///
/// Architecture:
/// ```text
///   .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean   │  deduplicate rows, impute numeric means (both optional)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select  │  keep requested columns, in request order
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export  │  Table → CSV / XLSX bytes + file name + MIME type
///   └──────────┘
/// ```
///
/// [`pipeline`] strings the stages together for one file or a batch.

pub mod clean;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod select;
