//! The seam between request building and the wire.
//!
//! [`AniListClient`](crate::AniListClient) is the production implementation;
//! tests substitute in-memory fakes.

use std::future::Future;

use shiori_core::config::Credential;

use crate::anilist::{AniListError, QueryDocument, Variables};

/// Executes one GraphQL operation and returns its `data` object.
pub trait GraphQlFetcher: Send + Sync {
    /// POST `{query, variables}` to the endpoint. When `auth` is present it is
    /// sent as a bearer token. No retries.
    fn execute(
        &self,
        document: &QueryDocument,
        variables: Variables,
        auth: Option<&Credential>,
    ) -> impl Future<Output = Result<serde_json::Value, AniListError>> + Send;
}
