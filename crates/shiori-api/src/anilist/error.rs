use thiserror::Error;

/// Errors from the AniList GraphQL endpoint.
///
/// `Clone` so one failed fetch can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AniListError {
    #[error("API error (status {status}): {message}")]
    Transport { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a GraphQL error list; holds the first message.
    #[error("{0}")]
    Protocol(String),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for AniListError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
