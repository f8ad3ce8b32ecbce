use thiserror::Error;

/// Conditions surfaced to the user as plain text. None of them end the process.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Error processing file '{source_name}': {message}")]
    Ingestion {
        source_name: String,
        message: String,
    },

    #[error("Missing column {column}")]
    MissingColumn { column: String },

    #[error("No data loaded.")]
    NoData,
}

impl DashboardError {
    pub fn ingestion(source_name: &str, err: impl std::fmt::Display) -> Self {
        DashboardError::Ingestion {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
