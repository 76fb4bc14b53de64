//! GraphQL documents and their variable bindings.

use serde_json::{Map, Value};

use shiori_core::request::{
    MediaListUpdate, QueryRequest, RequestKind, DEFAULT_SEARCH_PAGE, DEFAULT_SEARCH_PER_PAGE,
};

/// Named GraphQL variables.
pub type Variables = Map<String, Value>;

/// A static GraphQL document with the parameters it declares.
#[derive(Debug, PartialEq, Eq)]
pub struct QueryDocument {
    pub operation: &'static str,
    pub text: &'static str,
    pub parameters: &'static [&'static str],
}

pub static MEDIA_LIST_QUERY: QueryDocument = QueryDocument {
    operation: "MediaList",
    text: r#"
query ($username: String, $status: MediaListStatus, $type: MediaType) {
    MediaListCollection(userName: $username, status: $status, type: $type) {
        lists {
            entries {
                id
                status
                score
                progress
                media {
                    id
                    title { romaji english native }
                    coverImage { large medium }
                    episodes
                    chapters
                    genres
                    format
                    averageScore
                    status
                    startDate { year month day }
                    endDate { year month day }
                }
            }
        }
    }
}
"#,
    parameters: &["username", "status", "type"],
};

pub static SINGLE_MEDIA_QUERY: QueryDocument = QueryDocument {
    operation: "SingleMedia",
    text: r#"
query ($username: String, $mediaId: Int, $type: MediaType) {
    MediaList(userName: $username, mediaId: $mediaId, type: $type) {
        id
        status
        score
        progress
        media {
            id
            title { romaji english native }
            coverImage { large medium }
            episodes
            chapters
            genres
            format
            averageScore
            status
            startDate { year month day }
            endDate { year month day }
        }
    }
}
"#,
    parameters: &["username", "mediaId", "type"],
};

pub static USER_STATS_QUERY: QueryDocument = QueryDocument {
    operation: "UserStats",
    text: r#"
query ($username: String) {
    User(name: $username) {
        id
        name
        avatar { large medium }
        statistics {
            anime {
                count
                episodesWatched
                minutesWatched
                meanScore
                standardDeviation
            }
            manga {
                count
                chaptersRead
                volumesRead
                meanScore
                standardDeviation
            }
        }
    }
}
"#,
    parameters: &["username"],
};

pub static SEARCH_MEDIA_QUERY: QueryDocument = QueryDocument {
    operation: "SearchMedia",
    text: r#"
query ($search: String, $type: MediaType, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo { total currentPage lastPage hasNextPage perPage }
        media(search: $search, type: $type) {
            id
            title { romaji english native }
            coverImage { large medium }
            episodes
            chapters
            genres
            format
            averageScore
            status
            startDate { year month day }
            endDate { year month day }
        }
    }
}
"#,
    parameters: &["search", "type", "page", "perPage"],
};

pub static SAVE_LIST_ENTRY_MUTATION: QueryDocument = QueryDocument {
    operation: "SaveMediaListEntry",
    text: r#"
mutation ($mediaId: Int, $status: MediaListStatus, $score: Float, $progress: Int) {
    SaveMediaListEntry(mediaId: $mediaId, status: $status, score: $score, progress: $progress) {
        id
        mediaId
        status
        score
        progress
        user { name }
    }
}
"#,
    parameters: &["mediaId", "status", "score", "progress"],
};

pub fn document_for(kind: RequestKind) -> &'static QueryDocument {
    match kind {
        RequestKind::List => &MEDIA_LIST_QUERY,
        RequestKind::Single => &SINGLE_MEDIA_QUERY,
        RequestKind::Search => &SEARCH_MEDIA_QUERY,
        RequestKind::Stats => &USER_STATS_QUERY,
        RequestKind::Mutation => &SAVE_LIST_ENTRY_MUTATION,
    }
}

/// Bind a read request to the parameters of its document.
pub fn variables_for(request: &QueryRequest) -> Variables {
    let mut vars = Variables::new();
    match request {
        QueryRequest::List {
            username,
            media_type,
            status,
        } => {
            vars.insert("username".into(), Value::from(username.as_str()));
            vars.insert("status".into(), Value::from(status.as_anilist_str()));
            vars.insert("type".into(), Value::from(media_type.as_anilist_str()));
        }
        QueryRequest::Single {
            username,
            media_type,
            media_id,
        } => {
            vars.insert("username".into(), Value::from(username.as_str()));
            vars.insert("mediaId".into(), Value::from(*media_id));
            vars.insert("type".into(), Value::from(media_type.as_anilist_str()));
        }
        QueryRequest::Search {
            media_type,
            term,
            page,
            per_page,
        } => {
            vars.insert("search".into(), Value::from(term.as_str()));
            vars.insert("type".into(), Value::from(media_type.as_anilist_str()));
            vars.insert("page".into(), Value::from(page.unwrap_or(DEFAULT_SEARCH_PAGE)));
            vars.insert(
                "perPage".into(),
                Value::from(per_page.unwrap_or(DEFAULT_SEARCH_PER_PAGE)),
            );
        }
        QueryRequest::Stats { username } => {
            vars.insert("username".into(), Value::from(username.as_str()));
        }
    }
    vars
}

/// Bind an edit: `mediaId` plus the one changed field. Omitted fields are
/// left unchanged by the service.
pub fn variables_for_update(update: &MediaListUpdate) -> Variables {
    let mut vars = Variables::new();
    vars.insert("mediaId".into(), Value::from(update.media_id));
    vars.insert(update.field.name().into(), update.field.to_json());
    vars
}
