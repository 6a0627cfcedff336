use thiserror::Error;

/// Every failure the conversion pipeline can report for a single file.
///
/// None of these are fatal: a batch reports the error for the offending
/// file and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// The file extension is not one of `.csv` / `.xlsx`.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The bytes could not be parsed as the declared format.
    #[error("Failed to parse file: {0}")]
    Parse(String),

    /// The table could not be encoded into the requested output format.
    #[error("Failed to serialize table: {0}")]
    Serialization(String),

    /// A table was built from ragged columns or duplicate names.
    #[error("Invalid table: {0}")]
    InvalidTable(String),
}

impl SweepError {
    pub fn parse(detail: impl std::fmt::Display) -> Self {
        SweepError::Parse(detail.to_string())
    }

    pub fn serialization(detail: impl std::fmt::Display) -> Self {
        SweepError::Serialization(detail.to_string())
    }
}
