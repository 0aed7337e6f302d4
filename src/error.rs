//! Error handling for the datasweeper pipeline.
//!
//! Every error a pipeline stage can raise is scoped to a single uploaded file.
//! The session records it against that file and keeps going with the rest of
//! the batch.
//!
//! ```
//! use datasweeper::error::SweeperError;
//!
//! fn describe(err: &SweeperError) -> String {
//!     match err {
//!         SweeperError::UnsupportedFormat { file, extension } => {
//!             format!("{file}: .{extension} files are not supported")
//!         }
//!         SweeperError::Parse { file, .. } => format!("{file} could not be read"),
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result whose error converts
//! into [`SweeperError`]:
//!
//! ```no_run
//! use datasweeper::error::ResultExt as _;
//!
//! fn read(path: &str) -> datasweeper::error::Result<Vec<u8>> {
//!     std::fs::read(path).context("Failed to read upload")
//! }
//! ```

use crate::pipeline::FileId;
use std::fmt;

/// Main error type for datasweeper operations.
#[derive(Debug)]
pub enum SweeperError {
    /// The file extension is not one of the supported tabular formats.
    UnsupportedFormat { file: String, extension: String },

    /// The file content does not match its detected format.
    Parse { file: String, message: String },

    /// Serialising a table to the target format failed.
    Export { file: String, message: String },

    /// No file with this id exists in the session.
    UnknownFile(FileId),

    /// I/O errors (reading uploads, writing artifacts)
    Io(std::io::Error),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl SweeperError {
    pub fn parse(file: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.to_string(),
        }
    }

    pub fn export(file: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Export {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Name of the file this error belongs to, when it is file-scoped.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFormat { file, .. }
            | Self::Parse { file, .. }
            | Self::Export { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl fmt::Display for SweeperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { file, extension } => {
                if extension.is_empty() {
                    write!(f, "Unsupported file type for {file}: no extension")
                } else {
                    write!(f, "Unsupported file type for {file}: .{extension}")
                }
            }
            Self::Parse { file, message } => write!(f, "Failed to parse {file}: {message}"),
            Self::Export { file, message } => write!(f, "Failed to export {file}: {message}"),
            Self::UnknownFile(id) => write!(f, "No uploaded file with id {id}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SweeperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SweeperError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for SweeperError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for SweeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for SweeperError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Other(format!("Data processing error: {err}"))
    }
}

/// Result type alias for datasweeper operations.
pub type Result<T> = std::result::Result<T, SweeperError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SweeperError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: SweeperError = e.into();
            SweeperError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: SweeperError = e.into();
            SweeperError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let err = SweeperError::UnsupportedFormat {
            file: "notes.txt".to_owned(),
            extension: "txt".to_owned(),
        };
        assert_eq!(err.to_string(), "Unsupported file type for notes.txt: .txt");
        assert_eq!(err.file(), Some("notes.txt"));

        let err = SweeperError::UnsupportedFormat {
            file: "README".to_owned(),
            extension: String::new(),
        };
        assert_eq!(err.to_string(), "Unsupported file type for README: no extension");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = SweeperError::parse("sales.csv", "Expected 2 fields in line 3, saw 3");
        assert_eq!(
            err.to_string(),
            "Failed to parse sales.csv: Expected 2 fields in line 3, saw 3"
        );
        assert_eq!(err.file(), Some("sales.csv"));
    }

    #[test]
    fn test_unknown_file_is_not_file_scoped() {
        let err = SweeperError::UnknownFile(FileId::new(7));
        assert_eq!(err.file(), None);
        assert_eq!(err.to_string(), "No uploaded file with id #7");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.csv",
        ));

        let result: Result<()> = result.context("Failed to read upload");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read upload")
        );
    }
}
