use crate::schema::StatementType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Statement type mismatch: configuration is '{found}' but '{expected}' was requested")]
    StatementTypeMismatch {
        expected: StatementType,
        found: StatementType,
    },

    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error("Workbook error: {0}")]
    WorkbookError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExtractionError {
    /// True for every failure caused by the configuration rather than the workbook.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError(_)
                | Self::StatementTypeMismatch { .. }
                | Self::InvalidCellReference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
