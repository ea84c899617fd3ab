//! Error types for the bulk send simulator
//!
//! This module defines the errors that abort an operation. Per-record
//! delivery failures are not errors: they are captured in record state
//! (see [`FailureReason`](crate::types::FailureReason)) and in the batch
//! statistics.
//!
//! # Error Categories
//!
//! - **Format Errors**: input text that cannot become a batch
//! - **File I/O Errors**: file not found, permission denied, etc.
//! - **Output Errors**: the results report or template could not be written
//! - **Session Errors**: an operation that needs a loaded batch was called without one

use thiserror::Error;

/// Malformed or incomplete input text
///
/// Surfaced immediately to the caller. No partial batch is installed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Fewer than two non-empty lines (no header plus data)
    #[error("Input must contain a header row and at least one data row (found {found} non-empty line(s))")]
    TooFewLines {
        /// Number of non-empty lines found
        found: usize,
    },

    /// The header row lacks a required column for every input mode
    #[error("Missing required columns: expected either [name, phone, amount, invoice] or [customer name, customer number, pdf filename], found [{found}]")]
    MissingColumns {
        /// The normalized header columns that were present
        found: String,
    },

    /// The delimited text could not be read
    #[error("Malformed input{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Malformed {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the problem
        message: String,
    },
}

/// Main error type for the bulk send simulator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SenderError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// The input text was rejected by the parser
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The results report or template could not be written
    #[error("Failed to write output: {message}")]
    OutputError {
        /// Description of the write failure
        message: String,
    },

    /// An operation that needs a batch was invoked before one was loaded
    #[error("No batch loaded")]
    NoBatchLoaded,

    /// The async runtime could not be started
    #[error("Runtime error: {message}")]
    RuntimeError {
        /// Description of the runtime failure
        message: String,
    },
}

// Conversion from io::Error to SenderError
impl From<std::io::Error> for SenderError {
    fn from(error: std::io::Error) -> Self {
        SenderError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to FormatError
impl From<csv::Error> for FormatError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        FormatError::Malformed {
            line,
            message: error.to_string(),
        }
    }
}

impl SenderError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        SenderError::FileNotFound { path: path.into() }
    }

    /// Create an OutputError
    pub fn output(message: impl std::fmt::Display) -> Self {
        SenderError::OutputError {
            message: message.to_string(),
        }
    }

    /// Create a RuntimeError
    pub fn runtime(message: impl std::fmt::Display) -> Self {
        SenderError::RuntimeError {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_not_found(
        SenderError::FileNotFound { path: "customers.csv".to_string() },
        "File not found: customers.csv"
    )]
    #[case::io_error(
        SenderError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::too_few_lines(
        SenderError::Format(FormatError::TooFewLines { found: 1 }),
        "Input must contain a header row and at least one data row (found 1 non-empty line(s))"
    )]
    #[case::malformed_with_line(
        SenderError::Format(FormatError::Malformed { line: Some(3), message: "bad quote".to_string() }),
        "Malformed input at line 3: bad quote"
    )]
    #[case::malformed_without_line(
        SenderError::Format(FormatError::Malformed { line: None, message: "bad quote".to_string() }),
        "Malformed input: bad quote"
    )]
    #[case::no_batch(SenderError::NoBatchLoaded, "No batch loaded")]
    #[case::output(SenderError::output("disk full"), "Failed to write output: disk full")]
    fn test_error_display(#[case] error: SenderError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_missing_columns_lists_both_modes() {
        let error = FormatError::MissingColumns {
            found: "name, phone".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("name, phone, amount, invoice"));
        assert!(text.contains("customer name, customer number, pdf filename"));
        assert!(text.ends_with("found [name, phone]"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: SenderError = io_error.into();
        assert!(matches!(error, SenderError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
