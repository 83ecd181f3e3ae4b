//! In-memory memo of resolved artwork.

use std::future::Future;
use std::sync::Arc;

use cinescope_common::MediaKind;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::OnceCell;

/// What a title is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtworkKey {
    Tmdb { kind: MediaKind, id: u64 },
    /// Used when the history entry carries no TMDb id.
    Title {
        kind: MediaKind,
        title: String,
        year: Option<u16>,
    },
}

impl ArtworkKey {
    pub fn tmdb(kind: MediaKind, id: u64) -> Self {
        ArtworkKey::Tmdb { kind, id }
    }

    /// Title keys are case- and whitespace-insensitive.
    pub fn title(kind: MediaKind, title: &str, year: Option<u16>) -> Self {
        ArtworkKey::Title {
            kind,
            title: title.trim().to_lowercase(),
            year,
        }
    }
}

/// Image paths resolved for one title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub tmdb_id: Option<u64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl Artwork {
    pub fn is_empty(&self) -> bool {
        self.poster_path.is_none() && self.backdrop_path.is_none()
    }
}

/// Artwork memo shared by every enrichment run.
///
/// Each key owns a [`OnceCell`], so concurrent lookups of the same title
/// wait on a single resolution instead of issuing duplicate requests.
/// Empty results are cached too.
#[derive(Default)]
pub struct ArtworkCache {
    entries: DashMap<ArtworkKey, Arc<OnceCell<Artwork>>>,
}

impl ArtworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached artwork for `key`, running `resolve` if this is the
    /// first lookup.
    pub async fn get_or_resolve<F, Fut>(&self, key: ArtworkKey, resolve: F) -> Artwork
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Artwork>,
    {
        // The map guard must not be held across the await below.
        let cell = self.entries.entry(key).or_default().value().clone();
        cell.get_or_init(resolve).await.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
