//! Dataset loading errors.

use thiserror::Error;

/// Failure to fetch or decode a dataset.
///
/// Cloneable because every caller attached to a coalesced load receives
/// the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to load `{path}`: status {status}")]
    Status { path: String, status: u16 },

    #[error("failed to read `{path}`: {message}")]
    Io { path: String, message: String },

    #[error("request for `{path}` failed: {message}")]
    Http { path: String, message: String },

    #[error("invalid JSON in `{path}`: {message}")]
    Parse { path: String, message: String },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            Self::Status { path, .. }
            | Self::Io { path, .. }
            | Self::Http { path, .. }
            | Self::Parse { path, .. } => path,
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::Status {
            path: path.into(),
            status: 404,
        }
    }
}
