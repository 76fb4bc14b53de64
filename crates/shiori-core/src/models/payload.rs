use serde::{Deserialize, Serialize};

use super::media::{MediaListEntry, MediaRecord};

/// Renderer-facing result of a read request, one variant per query shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NormalizedPayload {
    /// All list groups flattened, in remote order.
    MediaList(Vec<MediaListEntry>),
    Single(MediaListEntry),
    Search(SearchPage),
    Stats(UserStats),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: Option<u32>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub has_next_page: bool,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub media: Vec<MediaRecord>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAvatar {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeStatistics {
    pub count: u32,
    pub episodes_watched: u32,
    pub minutes_watched: u32,
    pub mean_score: f64,
    pub standard_deviation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaStatistics {
    pub count: u32,
    pub chapters_read: u32,
    pub volumes_read: u32,
    pub mean_score: f64,
    pub standard_deviation: f64,
}

/// A user profile with aggregate anime and manga counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub id: u64,
    pub name: String,
    pub avatar: UserAvatar,
    pub anime: AnimeStatistics,
    pub manga: MangaStatistics,
}
