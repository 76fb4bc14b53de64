//! Extracts the renderer-relevant subtree of a response `data` object.
//!
//! Structural nodes (the list collection, the page, the user and its
//! statistics) are required; a missing or null node is a shape error rather
//! than an empty payload.

use serde::de::DeserializeOwned;

use shiori_core::models::{NormalizedPayload, SavedListEntry};
use shiori_core::request::RequestKind;

use super::error::AniListError;
use super::types::{
    MediaListCollectionResponse, MediaListResponse, PageResponse, SaveMediaListEntryResponse,
    UserResponse,
};

pub fn extract(kind: RequestKind, data: serde_json::Value) -> Result<NormalizedPayload, AniListError> {
    match kind {
        RequestKind::List => {
            let resp: MediaListCollectionResponse = decode("media list", data)?;
            let entries = resp
                .media_list_collection
                .lists
                .into_iter()
                .flat_map(|group| group.entries)
                .map(|entry| entry.into_entry())
                .collect();
            Ok(NormalizedPayload::MediaList(entries))
        }
        RequestKind::Single => {
            let resp: MediaListResponse = decode("single media", data)?;
            Ok(NormalizedPayload::Single(resp.media_list.into_entry()))
        }
        RequestKind::Search => {
            let resp: PageResponse = decode("search", data)?;
            Ok(NormalizedPayload::Search(resp.page.into_search_page()))
        }
        RequestKind::Stats => {
            let resp: UserResponse = decode("user stats", data)?;
            Ok(NormalizedPayload::Stats(resp.user.into_stats()))
        }
        RequestKind::Mutation => Err(AniListError::Shape(
            "mutation responses have no read payload".into(),
        )),
    }
}

/// Extract the saved entry from a `SaveMediaListEntry` response.
pub fn extract_saved_entry(data: serde_json::Value) -> Result<SavedListEntry, AniListError> {
    let resp: SaveMediaListEntryResponse = decode("saved list entry", data)?;
    Ok(resp.saved.into_saved())
}

fn decode<T: DeserializeOwned>(what: &str, data: serde_json::Value) -> Result<T, AniListError> {
    serde_json::from_value(data).map_err(|e| AniListError::Shape(format!("{what}: {e}")))
}
