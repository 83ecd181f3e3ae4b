use chrono::{DateTime, Utc};
use cinescope_trakt::{HistoryEntry, HistoryKind};
use serde::Serialize;

use super::cache::Artwork;

/// A history entry flattened for display, with resolved artwork.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub id: u64,
    pub watched_at: DateTime<Utc>,
    pub kind: HistoryKind,
    /// Movie title, or the show title for episodes.
    pub title: String,
    /// `"S01E02 Title"` for episodes.
    pub episode_label: Option<String>,
    pub year: Option<u16>,
    pub tmdb_id: Option<u64>,
    /// Local page for the title, when a TMDb id is known.
    pub link: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl HistoryItem {
    pub fn from_entry(entry: &HistoryEntry, artwork: Artwork) -> Self {
        let tmdb_id = entry.tmdb_id().or(artwork.tmdb_id);
        let link = tmdb_id.map(|id| match (entry.kind, entry.episode.as_ref()) {
            (HistoryKind::Movie, _) => format!("/movie/{id}"),
            (HistoryKind::Episode, Some(ep)) => format!("/tv/{id}/season/{}", ep.season),
            (HistoryKind::Episode, None) => format!("/tv/{id}"),
        });

        Self {
            id: entry.id,
            watched_at: entry.watched_at,
            kind: entry.kind,
            title: entry
                .title()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("Untitled")
                .to_string(),
            episode_label: entry.episode_label(),
            year: entry.year(),
            tmdb_id,
            link,
            poster_path: artwork.poster_path,
            backdrop_path: artwork.backdrop_path,
        }
    }

    /// Case-insensitive substring match against title and episode label.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .episode_label
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> HistoryEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn episode_links_to_season() {
        let e = entry(json!({
            "id": 9, "watched_at": "2024-01-01T00:00:00Z", "type": "episode",
            "episode": { "season": 2, "number": 3, "title": "Pilot" },
            "show": { "title": " Lost ", "year": 2004, "ids": { "tmdb": 4607 } }
        }));
        let item = HistoryItem::from_entry(&e, Artwork::default());
        assert_eq!(item.title, "Lost");
        assert_eq!(item.link.as_deref(), Some("/tv/4607/season/2"));
        assert_eq!(item.episode_label.as_deref(), Some("S02E03 Pilot"));
        assert!(item.matches("pilot"));
        assert!(item.matches("lost"));
        assert!(!item.matches("found"));
    }

    #[test]
    fn artwork_supplies_missing_id() {
        let e = entry(json!({
            "id": 1, "watched_at": "2024-01-01T00:00:00Z", "type": "movie",
            "movie": { "title": "Heat", "year": 1995 }
        }));
        let item = HistoryItem::from_entry(
            &e,
            Artwork {
                tmdb_id: Some(949),
                poster_path: Some("/heat.jpg".into()),
                backdrop_path: None,
            },
        );
        assert_eq!(item.tmdb_id, Some(949));
        assert_eq!(item.link.as_deref(), Some("/movie/949"));
        assert_eq!(item.poster_path.as_deref(), Some("/heat.jpg"));
    }

    #[test]
    fn untitled_without_title() {
        let e = entry(json!({
            "id": 1, "watched_at": "2024-01-01T00:00:00Z", "type": "movie"
        }));
        let item = HistoryItem::from_entry(&e, Artwork::default());
        assert_eq!(item.title, "Untitled");
        assert_eq!(item.link, None);
    }
}
