use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `vba2zip` crate.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An I/O error occurred while reading or writing a file.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    /// The source or destination could not be opened or prepared.
    #[error("cannot open '{}': {reason}", .path.display())]
    Construction { path: PathBuf, reason: String },

    /// A Vimball archive violated the framing rules.
    #[error("{reason} in '{}' at line {line}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        reason: &'static str,
    },

    /// No reader accepts the input, or a format identifier is unknown.
    #[error("unsupported format: {what}")]
    UnsupportedFormat { what: String },

    /// Wrong arguments, or the conversion mode could not be resolved.
    #[error("{0}")]
    Argument(String),

    /// A member name that would land outside the destination.
    #[error("refusing unsafe member name '{name}'")]
    UnsafeName { name: String },

    /// An error from the underlying `zip` crate.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ConvertError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io { source, path: path.into() }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, line: usize, reason: &'static str) -> Self {
        ConvertError::Format { path: path.into(), line, reason }
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        ConvertError::UnsupportedFormat { what: what.into() }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
