//! In-memory fetcher for runtime tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use shiori_api::anilist::{QueryDocument, Variables};
use shiori_api::{AniListError, GraphQlFetcher};
use shiori_core::config::{Credential, Settings};

/// One recorded `execute` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub variables: Variables,
    pub authenticated: bool,
}

/// Answers every operation with a canned response and counts calls.
pub struct FakeFetcher {
    calls: AtomicUsize,
    log: Mutex<Vec<RecordedCall>>,
    delay: Duration,
    failure: Option<String>,
    acting_user: Option<String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            failure: None,
            acting_user: Some("alice".into()),
        }
    }

    /// Every call fails with a GraphQL error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Name reported as `user.name` in mutation responses.
    pub fn with_acting_user(mut self, user: Option<&str>) -> Self {
        self.acting_user = user.map(str::to_string);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.log.lock().unwrap().last().cloned()
    }

    fn respond(&self, operation: &str, variables: &Variables) -> Result<Value, AniListError> {
        if let Some(message) = &self.failure {
            return Err(AniListError::Protocol(message.clone()));
        }
        let data = match operation {
            "MediaList" => json!({
                "MediaListCollection": { "lists": [
                    { "entries": [entry(1, 10), entry(2, 20)] }
                ]}
            }),
            "SingleMedia" => json!({ "MediaList": entry(3, variables["mediaId"].as_u64().unwrap_or(0)) }),
            "SearchMedia" => json!({
                "Page": {
                    "pageInfo": { "total": 1, "currentPage": 1, "lastPage": 1, "hasNextPage": false, "perPage": 20 },
                    "media": [media(10)]
                }
            }),
            "UserStats" => json!({
                "User": {
                    "id": 5,
                    "name": variables["username"],
                    "avatar": null,
                    "statistics": {
                        "anime": { "count": 1, "episodesWatched": 12, "minutesWatched": 288, "meanScore": 80.0, "standardDeviation": 0.0 },
                        "manga": { "count": 0, "chaptersRead": 0, "volumesRead": 0, "meanScore": 0.0, "standardDeviation": 0.0 }
                    }
                }
            }),
            "SaveMediaListEntry" => json!({
                "SaveMediaListEntry": {
                    "id": 99,
                    "mediaId": variables["mediaId"],
                    "status": "CURRENT",
                    "score": 0,
                    "progress": variables.get("progress").cloned().unwrap_or(json!(0)),
                    "user": self.acting_user.as_ref().map(|name| json!({ "name": name })),
                }
            }),
            other => return Err(AniListError::Shape(format!("unexpected operation {other}"))),
        };
        Ok(data)
    }
}

impl GraphQlFetcher for FakeFetcher {
    async fn execute(
        &self,
        document: &QueryDocument,
        variables: Variables,
        auth: Option<&Credential>,
    ) -> Result<Value, AniListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(RecordedCall {
            operation: document.operation,
            variables: variables.clone(),
            authenticated: auth.is_some(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.respond(document.operation, &variables)
    }
}

fn media(id: u64) -> Value {
    json!({ "id": id, "title": { "romaji": format!("Title {id}") }, "episodes": 12 })
}

fn entry(id: u64, media_id: u64) -> Value {
    json!({ "id": id, "status": "CURRENT", "score": 0, "progress": 1, "media": media(media_id) })
}

/// Settings with default user `alice`, a token and a five-minute TTL.
pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.general.default_username = "alice".into();
    settings.auth.access_token = "tok-123".into();
    settings.cache.ttl_secs = 300;
    settings
}
