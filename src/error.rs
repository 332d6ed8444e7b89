//! Error types for content fetching and page building

use thiserror::Error;

/// Failures raised by a [`ContentSource`](crate::source::ContentSource)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to the content store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store rejected the credentials: {message}")]
    Unauthorized { message: String },

    #[error("content type `{content_type}` is unknown to the content store: {message}")]
    UnknownContentType {
        content_type: String,
        message: String,
    },

    #[error("space or environment not found in the content store: {message}")]
    SpaceNotFound { message: String },

    #[error("content store returned {status} ({id}): {message}")]
    Api {
        status: u16,
        id: String,
        message: String,
    },

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: String },

    #[error("malformed response from the content store: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read local content: {0}")]
    Io(#[from] std::io::Error),

    #[error("content store is not configured: {0}")]
    Config(String),
}

/// Failures raised while turning entries into pages
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no post found for slug `{slug}`")]
    NotFound { slug: String },

    #[error("slug `{slug}` is used by more than one entry ({})", ids.join(", "))]
    DuplicateSlug { slug: String, ids: Vec<String> },

    #[error("entry {entry} has no usable `{field}` field")]
    MissingField { entry: String, field: &'static str },

    #[error("entry {entry} has slug `{slug}` which is not a single path segment")]
    InvalidSlug { entry: String, slug: String },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl BuildError {
    /// True when the requested page does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BuildError::NotFound { .. })
    }
}
