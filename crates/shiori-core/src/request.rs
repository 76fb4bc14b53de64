//! Resolved request values and their cache keys.
//!
//! A [`QueryRequest`] is what a block or link resolves to. Each variant carries
//! only the fields its query needs, so a single-media request without an id or
//! a search without a term cannot be built.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Search page sent when a search request leaves it unset.
pub const DEFAULT_SEARCH_PAGE: u32 = 1;
/// Search page size sent when a search request leaves it unset.
pub const DEFAULT_SEARCH_PER_PAGE: u32 = 20;

/// AniList `MediaType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    #[default]
    Anime,
    Manga,
}

impl MediaType {
    /// Convert to the GraphQL `MediaType` enum value.
    pub fn as_anilist_str(self) -> &'static str {
        match self {
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }

    /// Lowercase path segment used in links and site URLs.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }
}

impl FromStr for MediaType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ANIME" => Ok(Self::Anime),
            "MANGA" => Ok(Self::Manga),
            _ => Err(ConfigError::InvalidValue {
                key: "mediaType",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_anilist_str())
    }
}

/// AniList `MediaListStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    #[default]
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl ListStatus {
    pub const ALL: &[ListStatus] = &[
        Self::Current,
        Self::Planning,
        Self::Completed,
        Self::Dropped,
        Self::Paused,
        Self::Repeating,
    ];

    pub fn as_anilist_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Repeating => "REPEATING",
        }
    }
}

impl FromStr for ListStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_anilist_str() == upper)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "listType",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_anilist_str())
    }
}

/// Discriminant of a request: four read shapes and the one write shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    List,
    Single,
    Search,
    Stats,
    Mutation,
}

/// A fully resolved read request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryRequest {
    List {
        username: String,
        media_type: MediaType,
        status: ListStatus,
    },
    Single {
        username: String,
        media_type: MediaType,
        media_id: u64,
    },
    Search {
        media_type: MediaType,
        term: String,
        page: Option<u32>,
        per_page: Option<u32>,
    },
    Stats {
        username: String,
    },
}

impl QueryRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::List { .. } => RequestKind::List,
            Self::Single { .. } => RequestKind::Single,
            Self::Search { .. } => RequestKind::Search,
            Self::Stats { .. } => RequestKind::Stats,
        }
    }

    /// The user whose data this request reads. Searches are not user-scoped.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::List { username, .. }
            | Self::Single { username, .. }
            | Self::Stats { username } => Some(username),
            Self::Search { .. } => None,
        }
    }

    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Self::List { media_type, .. }
            | Self::Single { media_type, .. }
            | Self::Search { media_type, .. } => Some(*media_type),
            Self::Stats { .. } => None,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self)
    }

    fn canonical_fields(&self) -> BTreeMap<&'static str, Value> {
        let mut fields = BTreeMap::new();
        let kind = match self.kind() {
            RequestKind::List => "list",
            RequestKind::Single => "single",
            RequestKind::Search => "search",
            RequestKind::Stats => "stats",
            RequestKind::Mutation => "mutation",
        };
        fields.insert("kind", Value::from(kind));

        match self {
            Self::List {
                username,
                media_type,
                status,
            } => {
                fields.insert("username", Value::from(username.as_str()));
                fields.insert("mediaType", Value::from(media_type.as_anilist_str()));
                fields.insert("listStatus", Value::from(status.as_anilist_str()));
            }
            Self::Single {
                username,
                media_type,
                media_id,
            } => {
                fields.insert("username", Value::from(username.as_str()));
                fields.insert("mediaType", Value::from(media_type.as_anilist_str()));
                fields.insert("mediaId", Value::from(*media_id));
            }
            Self::Search {
                media_type,
                term,
                page,
                per_page,
            } => {
                fields.insert("mediaType", Value::from(media_type.as_anilist_str()));
                fields.insert("searchTerm", Value::from(term.as_str()));
                fields.insert("page", Value::from(page.unwrap_or(DEFAULT_SEARCH_PAGE)));
                fields.insert(
                    "perPage",
                    Value::from(per_page.unwrap_or(DEFAULT_SEARCH_PER_PAGE)),
                );
            }
            Self::Stats { username } => {
                fields.insert("username", Value::from(username.as_str()));
            }
        }

        fields
    }
}

/// Canonical, order-independent key for a [`QueryRequest`].
///
/// Equality and hashing use only the canonical string; the request is kept so
/// invalidation can match on its fields.
#[derive(Debug, Clone)]
pub struct CacheKey {
    canonical: String,
    request: QueryRequest,
}

impl CacheKey {
    pub fn new(request: &QueryRequest) -> Self {
        // Built in BTreeMap order, so keys are sorted whatever map backs `Value`.
        let object: serde_json::Map<String, Value> = request
            .canonical_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let canonical = Value::Object(object).to_string();
        Self {
            canonical,
            request: request.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// One editable field of a list entry, with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ListField {
    Status(ListStatus),
    Score(f64),
    Progress(u32),
}

impl ListField {
    /// GraphQL variable name for this field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Score(_) => "score",
            Self::Progress(_) => "progress",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Status(status) => Value::from(status.as_anilist_str()),
            Self::Score(score) => Value::from(*score),
            Self::Progress(progress) => Value::from(*progress),
        }
    }
}

/// A single-field edit of the viewer's list entry for one media item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaListUpdate {
    pub media_id: u64,
    pub field: ListField,
}

impl MediaListUpdate {
    pub fn new(media_id: u64, field: ListField) -> Self {
        Self { media_id, field }
    }

    pub fn kind(&self) -> RequestKind {
        RequestKind::Mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice_list() -> QueryRequest {
        QueryRequest::List {
            username: "alice".into(),
            media_type: MediaType::Manga,
            status: ListStatus::Completed,
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("completed".parse::<ListStatus>().unwrap(), ListStatus::Completed);
        assert_eq!(" Repeating ".parse::<ListStatus>().unwrap(), ListStatus::Repeating);
        assert!("watching".parse::<ListStatus>().is_err());
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!("manga".parse::<MediaType>().unwrap(), MediaType::Manga);
        assert_eq!("ANIME".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert!("novel".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_identical_requests_share_key() {
        assert_eq!(alice_list().cache_key(), alice_list().cache_key());
        assert_eq!(alice_list().cache_key().as_str(), alice_list().cache_key().as_str());
    }

    #[test]
    fn test_any_field_change_changes_key() {
        let base = alice_list().cache_key();
        let variants = [
            QueryRequest::List {
                username: "bob".into(),
                media_type: MediaType::Manga,
                status: ListStatus::Completed,
            },
            QueryRequest::List {
                username: "alice".into(),
                media_type: MediaType::Anime,
                status: ListStatus::Completed,
            },
            QueryRequest::List {
                username: "alice".into(),
                media_type: MediaType::Manga,
                status: ListStatus::Current,
            },
            QueryRequest::Stats {
                username: "alice".into(),
            },
        ];
        for variant in variants {
            assert_ne!(base, variant.cache_key(), "{variant:?}");
        }
    }

    #[test]
    fn test_search_pagination_is_part_of_key() {
        let search = |page| QueryRequest::Search {
            media_type: MediaType::Anime,
            term: "frieren".into(),
            page,
            per_page: None,
        };
        assert_ne!(search(Some(1)).cache_key(), search(Some(2)).cache_key());
    }

    #[test]
    fn test_default_paging_shares_key_with_explicit_defaults() {
        let implicit = QueryRequest::Search {
            media_type: MediaType::Anime,
            term: "frieren".into(),
            page: None,
            per_page: None,
        };
        let explicit = QueryRequest::Search {
            media_type: MediaType::Anime,
            term: "frieren".into(),
            page: Some(DEFAULT_SEARCH_PAGE),
            per_page: Some(DEFAULT_SEARCH_PER_PAGE),
        };
        assert_eq!(implicit.cache_key(), explicit.cache_key());
        assert_eq!(
            implicit.cache_key().as_str(),
            r#"{"kind":"search","mediaType":"ANIME","page":1,"perPage":20,"searchTerm":"frieren"}"#
        );
    }

    #[test]
    fn test_canonical_key_is_sorted() {
        let key = QueryRequest::Single {
            username: "bob".into(),
            media_type: MediaType::Anime,
            media_id: 42,
        }
        .cache_key();
        assert_eq!(
            key.as_str(),
            r#"{"kind":"single","mediaId":42,"mediaType":"ANIME","username":"bob"}"#
        );
    }

    #[test]
    fn test_list_field_json() {
        assert_eq!(ListField::Progress(5).to_json(), serde_json::json!(5));
        assert_eq!(
            ListField::Status(ListStatus::Paused).to_json(),
            serde_json::json!("PAUSED")
        );
        assert_eq!(ListField::Score(8.5).name(), "score");
    }
}
