mod media;
mod payload;

pub use media::{CoverImage, FuzzyDate, MediaListEntry, MediaRecord, MediaTitle, SavedListEntry};
pub use payload::{
    AnimeStatistics, MangaStatistics, NormalizedPayload, PageInfo, SearchPage, UserAvatar,
    UserStats,
};
