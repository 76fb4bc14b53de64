use serde::Deserialize;

use shiori_core::models::{
    AnimeStatistics, CoverImage, FuzzyDate, MangaStatistics, MediaListEntry, MediaRecord,
    MediaTitle, PageInfo, SavedListEntry, SearchPage, UserAvatar, UserStats,
};
use shiori_core::request::ListStatus;

// ── GraphQL envelope ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLEnvelope {
    pub data: Option<serde_json::Value>,
    pub errors: Option<Vec<GraphQLErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLErrorMessage {
    pub message: String,
}

impl GraphQLEnvelope {
    /// First error message, if the service reported any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_deref()
            .and_then(|errors| errors.first())
            .map(|e| e.message.as_str())
    }
}

// ── Shared media fields ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub cover_image: Option<AniListCoverImage>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub genres: Option<Vec<String>>,
    pub format: Option<String>,
    pub average_score: Option<u32>,
    pub status: Option<String>,
    pub start_date: Option<AniListFuzzyDate>,
    pub end_date: Option<AniListFuzzyDate>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AniListCoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AniListFuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

// ── List queries ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MediaListCollectionResponse {
    #[serde(rename = "MediaListCollection")]
    pub media_list_collection: MediaListCollection,
}

#[derive(Debug, Deserialize)]
pub struct MediaListCollection {
    pub lists: Vec<MediaListGroup>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListGroup {
    pub entries: Vec<AniListListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AniListListEntry {
    pub id: u64,
    pub status: Option<String>,
    pub score: Option<f64>,
    pub progress: Option<u32>,
    pub media: AniListMedia,
}

#[derive(Debug, Deserialize)]
pub struct MediaListResponse {
    #[serde(rename = "MediaList")]
    pub media_list: AniListListEntry,
}

// ── Search ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: AniListPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListPage {
    pub page_info: AniListPageInfo,
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListPageInfo {
    pub total: Option<u32>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub has_next_page: Option<bool>,
    pub per_page: Option<u32>,
}

// ── Stats ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "User")]
    pub user: AniListUser,
}

#[derive(Debug, Deserialize)]
pub struct AniListUser {
    pub id: u64,
    pub name: String,
    pub avatar: Option<AniListAvatar>,
    pub statistics: UserStatisticTypes,
}

#[derive(Debug, Deserialize)]
pub struct AniListAvatar {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserStatisticTypes {
    pub anime: AnimeStatisticsRaw,
    pub manga: MangaStatisticsRaw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeStatisticsRaw {
    pub count: u32,
    pub episodes_watched: u32,
    pub minutes_watched: u32,
    pub mean_score: f64,
    pub standard_deviation: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaStatisticsRaw {
    pub count: u32,
    pub chapters_read: u32,
    pub volumes_read: u32,
    pub mean_score: f64,
    pub standard_deviation: f64,
}

// ── Mutation ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveMediaListEntryResponse {
    #[serde(rename = "SaveMediaListEntry")]
    pub saved: SavedEntryRaw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntryRaw {
    pub id: u64,
    pub media_id: u64,
    pub status: Option<String>,
    pub score: Option<f64>,
    pub progress: Option<u32>,
    pub user: Option<SavedEntryUser>,
}

#[derive(Debug, Deserialize)]
pub struct SavedEntryUser {
    pub name: String,
}

// ── Conversions ──────────────────────────────────────────────────

fn parse_list_status(s: Option<&str>) -> Option<ListStatus> {
    s.and_then(|s| s.parse().ok())
}

impl From<AniListFuzzyDate> for FuzzyDate {
    fn from(d: AniListFuzzyDate) -> Self {
        Self {
            year: d.year,
            month: d.month,
            day: d.day,
        }
    }
}

impl AniListMedia {
    pub fn into_record(self) -> MediaRecord {
        let title = self
            .title
            .map(|t| MediaTitle {
                romaji: t.romaji,
                english: t.english,
                native: t.native,
            })
            .unwrap_or_default();
        let cover_image = self
            .cover_image
            .map(|c| CoverImage {
                large: c.large,
                medium: c.medium,
            })
            .unwrap_or_default();

        MediaRecord {
            id: self.id,
            title,
            cover_image,
            episodes: self.episodes,
            chapters: self.chapters,
            genres: self.genres.unwrap_or_default(),
            format: self.format,
            average_score: self.average_score,
            status: self.status,
            start_date: self.start_date.map(FuzzyDate::from).unwrap_or_default(),
            end_date: self.end_date.map(FuzzyDate::from).unwrap_or_default(),
        }
    }
}

impl AniListListEntry {
    pub fn into_entry(self) -> MediaListEntry {
        MediaListEntry {
            id: self.id,
            status: parse_list_status(self.status.as_deref()),
            score: self.score,
            progress: self.progress,
            media: self.media.into_record(),
        }
    }
}

impl AniListPage {
    pub fn into_search_page(self) -> SearchPage {
        let info = self.page_info;
        SearchPage {
            media: self.media.into_iter().map(AniListMedia::into_record).collect(),
            page_info: PageInfo {
                total: info.total,
                current_page: info.current_page,
                last_page: info.last_page,
                has_next_page: info.has_next_page.unwrap_or(false),
                per_page: info.per_page,
            },
        }
    }
}

impl AniListUser {
    pub fn into_stats(self) -> UserStats {
        let avatar = self
            .avatar
            .map(|a| UserAvatar {
                large: a.large,
                medium: a.medium,
            })
            .unwrap_or_default();
        let anime = self.statistics.anime;
        let manga = self.statistics.manga;

        UserStats {
            id: self.id,
            name: self.name,
            avatar,
            anime: AnimeStatistics {
                count: anime.count,
                episodes_watched: anime.episodes_watched,
                minutes_watched: anime.minutes_watched,
                mean_score: anime.mean_score,
                standard_deviation: anime.standard_deviation,
            },
            manga: MangaStatistics {
                count: manga.count,
                chapters_read: manga.chapters_read,
                volumes_read: manga.volumes_read,
                mean_score: manga.mean_score,
                standard_deviation: manga.standard_deviation,
            },
        }
    }
}

impl SavedEntryRaw {
    pub fn into_saved(self) -> SavedListEntry {
        SavedListEntry {
            id: self.id,
            media_id: self.media_id,
            status: parse_list_status(self.status.as_deref()),
            score: self.score,
            progress: self.progress,
            username: self.user.map(|u| u.name),
        }
    }
}
