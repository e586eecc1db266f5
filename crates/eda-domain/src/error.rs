//! Errores del dominio de datos (construcción y carga del dataset).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch { column: String, expected: usize, found: usize },

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("json error: {0}")]
    Json(String),
}

impl From<csv::Error> for DomainError {
    fn from(e: csv::Error) -> Self {
        DomainError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Json(e.to_string())
    }
}
