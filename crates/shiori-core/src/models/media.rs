use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::request::{ListStatus, MediaType};

const SITE_URL: &str = "https://anilist.co";

/// A title with its language variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl MediaTitle {
    /// Returns the best available display title, localized first.
    pub fn preferred(&self) -> &str {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

/// A possibly incomplete calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    /// The date with missing month/day filled in as 1, if the year is known.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let year = self.year?;
        NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }
}

/// Immutable description of a title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: u64,
    pub title: MediaTitle,
    pub cover_image: CoverImage,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub genres: Vec<String>,
    pub format: Option<String>,
    pub average_score: Option<u32>,
    pub status: Option<String>,
    pub start_date: FuzzyDate,
    pub end_date: FuzzyDate,
}

impl MediaRecord {
    pub fn site_url(&self, media_type: MediaType) -> String {
        format!("{SITE_URL}/{}/{}", media_type.slug(), self.id)
    }

    /// Episode count, else chapter count; the upper bound for progress.
    pub fn unit_count(&self) -> Option<u32> {
        self.episodes.or(self.chapters)
    }
}

/// A media record plus the list owner's personal tracking fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaListEntry {
    pub id: u64,
    pub status: Option<ListStatus>,
    pub score: Option<f64>,
    pub progress: Option<u32>,
    pub media: MediaRecord,
}

/// The list entry as saved by an edit, with the acting user's name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedListEntry {
    pub id: u64,
    pub media_id: u64,
    pub status: Option<ListStatus>,
    pub score: Option<f64>,
    pub progress: Option<u32>,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_title_order() {
        let mut title = MediaTitle {
            romaji: Some("Sousou no Frieren".into()),
            english: Some("Frieren: Beyond Journey's End".into()),
            native: Some("葬送のフリーレン".into()),
        };
        assert_eq!(title.preferred(), "Frieren: Beyond Journey's End");

        title.english = None;
        assert_eq!(title.preferred(), "Sousou no Frieren");

        title.romaji = None;
        assert_eq!(title.preferred(), "葬送のフリーレン");

        assert_eq!(MediaTitle::default().preferred(), "Unknown");
    }

    #[test]
    fn test_site_url() {
        let media = MediaRecord {
            id: 30013,
            ..Default::default()
        };
        assert_eq!(media.site_url(MediaType::Manga), "https://anilist.co/manga/30013");
        assert_eq!(media.site_url(MediaType::Anime), "https://anilist.co/anime/30013");
    }

    #[test]
    fn test_unit_count_prefers_episodes() {
        let mut media = MediaRecord {
            episodes: Some(28),
            chapters: Some(120),
            ..Default::default()
        };
        assert_eq!(media.unit_count(), Some(28));
        media.episodes = None;
        assert_eq!(media.unit_count(), Some(120));
    }

    #[test]
    fn test_fuzzy_date() {
        let date = FuzzyDate {
            year: Some(2023),
            month: Some(9),
            day: None,
        };
        assert_eq!(date.to_naive_date(), NaiveDate::from_ymd_opt(2023, 9, 1));
        assert!(FuzzyDate::default().is_empty());
        assert_eq!(FuzzyDate::default().to_naive_date(), None);
    }
}
