use reqwest::Client;
use url::Url;

use shiori_core::config::Credential;

use super::catalog::{QueryDocument, Variables};
use super::error::AniListError;
use super::types::GraphQLEnvelope;
use crate::traits::GraphQlFetcher;

pub const API_URL: &str = "https://graphql.anilist.co";

/// AniList GraphQL API client.
#[derive(Debug, Clone)]
pub struct AniListClient {
    endpoint: Url,
    http: Client,
}

impl AniListClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new(Url::parse(API_URL).expect("built-in API URL is valid"))
    }
}

impl GraphQlFetcher for AniListClient {
    async fn execute(
        &self,
        document: &QueryDocument,
        variables: Variables,
        auth: Option<&Credential>,
    ) -> Result<serde_json::Value, AniListError> {
        let operation = document.operation;
        tracing::debug!(operation, authenticated = auth.is_some(), "AniList GraphQL request");

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": document.text,
                "variables": variables,
            }));
        if let Some(credential) = auth {
            request = request.header("Authorization", format!("Bearer {}", credential.expose()));
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GraphQLEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.first_error().map(str::to_string))
                .unwrap_or(body);
            return Err(AniListError::Transport {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(operation, status = %status, "AniList response received");
        let envelope: GraphQLEnvelope = serde_json::from_str(&body)
            .map_err(|e| AniListError::Shape(format!("invalid response envelope: {e}")))?;

        if let Some(message) = envelope.first_error() {
            return Err(AniListError::Protocol(message.to_string()));
        }

        envelope
            .data
            .ok_or_else(|| AniListError::Shape("response has no `data` object".into()))
    }
}
