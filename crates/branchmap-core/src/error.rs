// crates/branchmap-core/src/error.rs
use thiserror::Error;

/// All errors produced by `branchmap-core`.
///
/// The first three variants form the selector's error taxonomy:
/// - [`SelectorError::DatasetLoad`] is recoverable: the selector shows a
///   retry affordance and stays usable.
/// - [`SelectorError::DataIntegrity`] is a construction-time failure; the
///   configuration bundle is corrupt and no selector is built from it.
/// - [`SelectorError::InvalidSelection`] is absorbed by the selector itself
///   and never reaches the host callbacks.
///
/// The remaining variants are plumbing from the I/O and decoding layers.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Failed to load boundary geometry: {0}")]
    DatasetLoad(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[cfg(feature = "fetch")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl SelectorError {
    /// `true` for failures the selector recovers from with a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SelectorError::DatasetLoad(_) | SelectorError::NotFound(_) | SelectorError::Io(_) => {
                true
            }
            #[cfg(feature = "fetch")]
            SelectorError::Http(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;
