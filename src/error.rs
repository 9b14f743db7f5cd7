//! Error types for defect analysis.

use thiserror::Error;

/// Errors raised by the analytical core.
///
/// Ingestion and CLI layers wrap these in [`anyhow::Error`] through
/// [`crate::Result`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A defect code reached grading but is absent from the catalog.
    #[error("Unknown defect code: {0}")]
    UnknownCode(String),

    /// A category name outside `all`, `structural`, `operational`.
    #[error("Invalid defect category '{0}': expected all, structural, or operational")]
    InvalidCategory(String),

    /// A configuration value outside its allowed range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Which value is wrong and why
        message: String,
    },

    /// Matrix column count does not match the vocabulary it claims to index.
    #[error("Vocabulary mismatch: matrix has {columns} columns, vocabulary has {vocabulary} codes")]
    VocabularyMismatch {
        /// Columns in the supplied cells
        columns: usize,
        /// Codes in the supplied vocabulary
        vocabulary: usize,
    },

    /// A co-occurrence cell holding something other than 0 or 1.
    #[error("Non-binary cell {value} at row {row}, column {column}")]
    NonBinaryCell { row: usize, column: usize, value: u8 },

    /// Distance that is negative, NaN or infinite.
    #[error("Invalid distance {distance} for {defect_code} in inspection {inspection_id}")]
    InvalidDistance {
        inspection_id: String,
        defect_code: String,
        distance: f64,
    },
}

impl AnalysisError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::UnknownCode("ZZZ".to_string());
        assert_eq!(err.to_string(), "Unknown defect code: ZZZ");

        let err = AnalysisError::InvalidCategory("pipes".to_string());
        assert!(err.to_string().contains("'pipes'"));

        let err = AnalysisError::invalid_config("gap_threshold must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: gap_threshold must be > 0"
        );
    }
}
