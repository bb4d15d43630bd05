use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures of a single extraction. None of them is fatal to the process.
///
/// Messages are meant to be shown to the user as-is. The enum is
/// serializable because detailed-fetch failures travel back over the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractError {
    #[error("No post found on the page")]
    NoAnchorFound,

    #[error("Could not determine the author of the post")]
    NoAuthorFound,

    #[error("Could not locate a post id on the page")]
    NoPostId,

    #[error("Page exposes no internal state for post {post_id}")]
    StateHandleMissing { post_id: String },

    #[error("No post data found in page state for {post_id} within {depth} hops")]
    PayloadNotFound { post_id: String, depth: usize },

    #[error("Timed out after {timeout_ms} ms waiting for post data for {post_id}")]
    FetchTimeout { post_id: String, timeout_ms: u64 },

    #[error("Page returned no post data for {post_id}")]
    EmptyResponse { post_id: String },

    #[error("Could not resolve media {media_id} for entity {entity_key}")]
    EntityResolutionMiss { entity_key: String, media_id: String },

    #[error("Page message channel closed")]
    ChannelClosed,

    #[error("Invalid page snapshot: {message}")]
    InvalidSnapshot { message: String },
}

impl ExtractError {
    /// Whether the failure only affects the detailed-fetch path, leaving the
    /// markup skeleton usable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ExtractError::NoAnchorFound
                | ExtractError::NoAuthorFound
                | ExtractError::NoPostId
                | ExtractError::InvalidSnapshot { .. }
        )
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::InvalidSnapshot {
            message: err.to_string(),
        }
    }
}
