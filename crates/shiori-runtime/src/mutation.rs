use std::sync::Arc;

use shiori_api::anilist::{catalog, normalize};
use shiori_api::GraphQlFetcher;
use shiori_core::config::Credential;
use shiori_core::models::SavedListEntry;
use shiori_core::request::{ListField, MediaListUpdate, QueryRequest};

use crate::{RuntimeError, SharedCache};

const NOT_AUTHENTICATED: &str =
    "Not authenticated. Set `auth.access_token` in the settings file to edit list entries.";

/// Applies list edits and invalidates the cached reads they make stale.
pub struct MutationCoordinator<F> {
    fetcher: Arc<F>,
    cache: SharedCache,
    credential: Option<Credential>,
    default_username: Option<String>,
}

impl<F: GraphQlFetcher> MutationCoordinator<F> {
    pub fn new(
        fetcher: Arc<F>,
        cache: SharedCache,
        credential: Option<Credential>,
        default_username: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            credential,
            default_username,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Save one field of the viewer's entry for `media_id`.
    ///
    /// On success every cached list, single-entry and search read for the
    /// acting user is dropped; stats are left alone. The cache is untouched
    /// when the edit fails.
    pub async fn update_field(
        &self,
        media_id: u64,
        field: ListField,
    ) -> Result<SavedListEntry, RuntimeError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(|| RuntimeError::Auth(NOT_AUTHENTICATED.into()))?;

        let update = MediaListUpdate::new(media_id, field);
        let data = self
            .fetcher
            .execute(
                catalog::document_for(update.kind()),
                catalog::variables_for_update(&update),
                Some(credential),
            )
            .await?;
        let saved = normalize::extract_saved_entry(data)?;

        let acting_user = saved
            .username
            .as_deref()
            .or(self.default_username.as_deref());
        let removed = self
            .cache
            .invalidate(|request| stale_after_edit(request, acting_user));
        tracing::debug!(
            media_id,
            field = field.name(),
            user = acting_user.unwrap_or("<unknown>"),
            removed,
            "List entry saved"
        );

        Ok(saved)
    }
}

/// Whether a cached read may show the list entry the user just edited.
/// Searches carry no username and are always dropped. With no known user,
/// every list and single-entry read is dropped.
fn stale_after_edit(request: &QueryRequest, acting_user: Option<&str>) -> bool {
    match request {
        QueryRequest::List { username, .. } | QueryRequest::Single { username, .. } => {
            acting_user.map_or(true, |user| username.eq_ignore_ascii_case(user))
        }
        QueryRequest::Search { .. } => true,
        QueryRequest::Stats { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{settings, FakeFetcher};
    use crate::Runtime;
    use shiori_api::AniListError;
    use shiori_core::request::{ListStatus, MediaType};

    fn list(username: &str) -> QueryRequest {
        QueryRequest::List {
            username: username.into(),
            media_type: MediaType::Anime,
            status: ListStatus::Current,
        }
    }

    fn single(username: &str) -> QueryRequest {
        QueryRequest::Single {
            username: username.into(),
            media_type: MediaType::Anime,
            media_id: 42,
        }
    }

    fn search() -> QueryRequest {
        QueryRequest::Search {
            media_type: MediaType::Anime,
            term: "frieren".into(),
            page: None,
            per_page: None,
        }
    }

    fn stats(username: &str) -> QueryRequest {
        QueryRequest::Stats {
            username: username.into(),
        }
    }

    async fn warm(runtime: &Runtime<FakeFetcher>, requests: &[QueryRequest]) {
        for request in requests {
            runtime.fetch(request).await.unwrap();
        }
    }

    fn cached(runtime: &Runtime<FakeFetcher>, request: &QueryRequest) -> bool {
        runtime.cache().get(&request.cache_key()).is_some()
    }

    #[tokio::test]
    async fn test_missing_credential_is_auth_error() {
        let mut s = settings();
        s.auth.access_token.clear();
        let runtime = Runtime::new(&s, FakeFetcher::new());

        let err = runtime.mutate(42, ListField::Progress(5)).await.unwrap_err();

        assert!(matches!(err, RuntimeError::Auth(_)));
        assert_eq!(runtime.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_mutation_is_authenticated_and_binds_one_field() {
        let runtime = Runtime::new(&settings(), FakeFetcher::new());

        let saved = runtime.mutate(42, ListField::Progress(5)).await.unwrap();

        assert_eq!(saved.media_id, 42);
        assert_eq!(saved.progress, Some(5));
        let call = runtime.fetcher.last_call().unwrap();
        assert_eq!(call.operation, "SaveMediaListEntry");
        assert!(call.authenticated);
        assert_eq!(call.variables.len(), 2);
        assert_eq!(call.variables["mediaId"], 42);
        assert_eq!(call.variables["progress"], 5);
    }

    #[tokio::test]
    async fn test_edit_invalidates_acting_users_reads() {
        let runtime = Runtime::new(&settings(), FakeFetcher::new());
        let kept = [list("bob"), single("bob"), stats("alice")];
        let dropped = [list("alice"), single("alice"), search()];
        warm(&runtime, &kept).await;
        warm(&runtime, &dropped).await;
        assert_eq!(runtime.fetcher.calls(), 6);

        runtime.mutate(42, ListField::Progress(5)).await.unwrap();

        for request in &dropped {
            assert!(!cached(&runtime, request), "{request:?} should be dropped");
        }
        for request in &kept {
            assert!(cached(&runtime, request), "{request:?} should be kept");
        }

        // 6 reads + 1 mutation, then one refetch for the dropped list.
        runtime.fetch(&list("alice")).await.unwrap();
        assert_eq!(runtime.fetcher.calls(), 8);
    }

    #[tokio::test]
    async fn test_acting_user_falls_back_to_default() {
        let runtime = Runtime::new(&settings(), FakeFetcher::new().with_acting_user(None));
        warm(&runtime, &[list("alice"), list("bob")]).await;

        runtime
            .mutate(42, ListField::Status(ListStatus::Completed))
            .await
            .unwrap();

        assert!(!cached(&runtime, &list("alice")));
        assert!(cached(&runtime, &list("bob")));
    }

    #[tokio::test]
    async fn test_unknown_user_invalidates_every_list() {
        let mut s = settings();
        s.general.default_username.clear();
        let runtime = Runtime::new(&s, FakeFetcher::new().with_acting_user(None));
        warm(&runtime, &[list("alice"), single("bob"), stats("bob")]).await;

        runtime.mutate(42, ListField::Score(8.5)).await.unwrap();

        assert!(!cached(&runtime, &list("alice")));
        assert!(!cached(&runtime, &single("bob")));
        assert!(cached(&runtime, &stats("bob")));
    }

    #[tokio::test]
    async fn test_failed_edit_leaves_cache_alone() {
        let runtime = Runtime::new(&settings(), FakeFetcher::new());
        warm(&runtime, &[list("alice")]).await;

        let coordinator = MutationCoordinator::new(
            Arc::new(FakeFetcher::failing("Invalid token")),
            runtime.cache().clone(),
            Some(Credential::new("bad")),
            Some("alice".into()),
        );
        let err = coordinator
            .update_field(42, ListField::Progress(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::Api(AniListError::Protocol(ref msg)) if msg == "Invalid token"
        ));
        assert!(cached(&runtime, &list("alice")));
    }

    #[test]
    fn test_stale_after_edit_ignores_case() {
        assert!(stale_after_edit(&list("Alice"), Some("alice")));
        assert!(!stale_after_edit(&list("bob"), Some("alice")));
        assert!(!stale_after_edit(&stats("alice"), Some("alice")));
        assert!(stale_after_edit(&search(), Some("alice")));
    }
}
