/// Error types shared across the application
///
/// `ImageUnavailable` is the only error an image component ever sees. It is
/// absorbed by the fallback asset and never reaches the embedding layout.
/// `AppError` covers everything around the components: storage, config and
/// start-up.
use thiserror::Error;

/// Why a primary image could not be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnavailableCause {
    /// Network or filesystem failure, including HTTP error statuses
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Bytes arrived but are not a decodable image
    #[error("decode failed: {0}")]
    Decode(String),
    /// Decoded to a zero-sized image
    #[error("image has no pixels")]
    Empty,
}

/// The primary image for a reference could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image {reference} unavailable ({cause})")]
pub struct ImageUnavailable {
    pub reference: String,
    pub cause: UnavailableCause,
}

impl ImageUnavailable {
    pub fn new(reference: impl Into<String>, cause: UnavailableCause) -> Self {
        Self {
            reference: reference.into(),
            cause,
        }
    }
}

/// Errors raised outside the image components
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("invalid exercise name: {0:?}")]
    InvalidName(String),

    #[error("unknown custom exercise: {0}")]
    UnknownExercise(String),
}
