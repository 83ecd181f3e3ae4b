use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cross-service identifiers attached to every Trakt object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ids {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<u64>,
    pub tvdb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktMovie {
    pub title: Option<String>,
    pub year: Option<u16>,
    #[serde(default)]
    pub ids: Ids,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktShow {
    pub title: Option<String>,
    pub year: Option<u16>,
    #[serde(default)]
    pub ids: Ids,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktEpisode {
    pub season: u32,
    pub number: u32,
    pub title: Option<String>,
    #[serde(default)]
    pub ids: Ids,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Movie,
    Episode,
}

/// One play from `/users/{id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub watched_at: DateTime<Utc>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub movie: Option<TraktMovie>,
    pub show: Option<TraktShow>,
    pub episode: Option<TraktEpisode>,
}

impl HistoryEntry {
    /// Movie title, or show title for episodes.
    pub fn title(&self) -> Option<&str> {
        match self.kind {
            HistoryKind::Movie => self.movie.as_ref().and_then(|m| m.title.as_deref()),
            HistoryKind::Episode => self.show.as_ref().and_then(|s| s.title.as_deref()),
        }
    }

    /// Release year of the movie, or premiere year of the show.
    pub fn year(&self) -> Option<u16> {
        match self.kind {
            HistoryKind::Movie => self.movie.as_ref().and_then(|m| m.year),
            HistoryKind::Episode => self.show.as_ref().and_then(|s| s.year),
        }
    }

    /// TMDb id of the movie, or of the show for episodes.
    pub fn tmdb_id(&self) -> Option<u64> {
        match self.kind {
            HistoryKind::Movie => self.movie.as_ref().and_then(|m| m.ids.tmdb),
            HistoryKind::Episode => self.show.as_ref().and_then(|s| s.ids.tmdb),
        }
    }

    /// `"S01E02 Title"` for episodes.
    pub fn episode_label(&self) -> Option<String> {
        let ep = self.episode.as_ref()?;
        let code = format!("S{:02}E{:02}", ep.season, ep.number);
        match ep.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => Some(format!("{code} {title}")),
            None => Some(code),
        }
    }
}
