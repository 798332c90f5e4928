#![forbid(unsafe_code)]

use crate::media::MediaId;

pub type Result<T, E = WistiaError> = std::result::Result<T, E>;

/// Every failure the resolution and download pipeline can surface.
#[derive(Debug, thiserror::Error)]
pub enum WistiaError {
    /// No identifier could be extracted at any resolution stage.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request never completed or came back with a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// Embedded payload missing, or one of its decoding stages failed.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no download URL found for {0}")]
    NoDownloadUrl(MediaId),
}

impl WistiaError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network(reason.into())
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }
}
