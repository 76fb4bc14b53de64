//! Host-facing facade: resolve blocks and links, fetch through the shared
//! cache, and apply list edits.

mod mutation;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use shiori_api::anilist::{catalog, normalize};
use shiori_api::{AniListClient, AniListError, GraphQlFetcher};
use shiori_core::cache::ResponseCache;
use shiori_core::config::Settings;
use shiori_core::error::ConfigError;
use shiori_core::models::{NormalizedPayload, SavedListEntry};
use shiori_core::request::{ListField, QueryRequest};
use shiori_core::resolver::{BlockConfig, ConfigResolver, ConfigSource};

pub use mutation::MutationCoordinator;

/// The response cache shared by fetches and mutation invalidation.
pub type SharedCache = Arc<ResponseCache<AniListError>>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] AniListError),
    #[error("{0}")]
    Auth(String),
}

pub struct Runtime<F = AniListClient> {
    resolver: ConfigResolver,
    fetcher: Arc<F>,
    cache: SharedCache,
    mutations: MutationCoordinator<F>,
}

impl Runtime<AniListClient> {
    /// Build a runtime talking to the endpoint configured in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, RuntimeError> {
        let client = AniListClient::new(settings.endpoint()?);
        Ok(Self::new(settings, client))
    }
}

impl<F: GraphQlFetcher> Runtime<F> {
    pub fn new(settings: &Settings, fetcher: F) -> Self {
        let cache = Arc::new(ResponseCache::new(settings.cache_ttl()));
        Self::with_cache(settings, fetcher, cache)
    }

    /// Build a runtime around a cache owned by the caller.
    pub fn with_cache(settings: &Settings, fetcher: F, cache: SharedCache) -> Self {
        let defaults = settings.resolver_defaults();
        let fetcher = Arc::new(fetcher);
        let mutations = MutationCoordinator::new(
            fetcher.clone(),
            cache.clone(),
            settings.credential(),
            defaults.default_username.clone(),
        );

        Self {
            resolver: ConfigResolver::new(defaults),
            fetcher,
            cache,
            mutations,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn resolve(&self, source: ConfigSource<'_>) -> Result<QueryRequest, RuntimeError> {
        Ok(self.resolver.resolve(source)?)
    }

    pub fn resolve_block(&self, text: &str) -> Result<QueryRequest, RuntimeError> {
        self.resolve(ConfigSource::Block(text))
    }

    pub fn resolve_link(&self, href: &str) -> Result<QueryRequest, RuntimeError> {
        self.resolve(ConfigSource::Link(href))
    }

    /// Resolve a search block against the term the user typed.
    pub fn resolve_search(&self, block: &str, term: &str) -> Result<QueryRequest, RuntimeError> {
        Ok(self
            .resolver
            .resolve_search(&BlockConfig::parse(block), term)?)
    }

    /// Cached fetch: serve a fresh entry, or join/start the single in-flight
    /// fetch for this request and normalize its response.
    pub async fn fetch(
        &self,
        request: &QueryRequest,
    ) -> Result<Arc<NormalizedPayload>, RuntimeError> {
        let key = request.cache_key();
        let kind = request.kind();
        let fetcher = &self.fetcher;

        let payload = self
            .cache
            .get_or_fetch(&key, move || async move {
                let document = catalog::document_for(kind);
                let data = fetcher
                    .execute(document, catalog::variables_for(request), None)
                    .await?;
                normalize::extract(kind, data)
            })
            .await?;
        Ok(payload)
    }

    /// Fetch several requests concurrently, e.g. every inline link of one
    /// document. Results are in input order.
    pub async fn fetch_all(
        &self,
        requests: &[QueryRequest],
    ) -> Vec<Result<Arc<NormalizedPayload>, RuntimeError>> {
        futures::future::join_all(requests.iter().map(|request| self.fetch(request))).await
    }

    /// Change one field of the viewer's list entry for `media_id`.
    pub async fn mutate(
        &self,
        media_id: u64,
        field: ListField,
    ) -> Result<SavedListEntry, RuntimeError> {
        self.mutations.update_field(media_id, field).await
    }
}
