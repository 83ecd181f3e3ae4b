//! Attaching poster and backdrop paths to history entries.

use std::sync::Arc;

use async_trait::async_trait;
use cinescope_common::MediaKind;
use cinescope_tmdb::{best_backdrop, SearchHit, TmdbClient};
use cinescope_trakt::{HistoryEntry, HistoryKind};
use tracing::{debug, info};

use super::bounded::bounded_map;
use super::cache::{Artwork, ArtworkCache, ArtworkKey};
use super::item::HistoryItem;

/// Where artwork comes from.
///
/// Implementations swallow their own failures and return `None`; enrichment
/// never fails as a whole.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Poster and backdrop from the title's details.
    async fn details_artwork(&self, kind: MediaKind, id: u64) -> Option<Artwork>;

    /// Best-ranked backdrop from the title's image list.
    async fn backdrop_fallback(&self, kind: MediaKind, id: u64) -> Option<String>;

    /// Artwork of the closest search match for a title without a known id.
    async fn search_artwork(&self, kind: MediaKind, title: &str, year: Option<u16>)
        -> Option<Artwork>;
}

#[async_trait]
impl ArtworkSource for TmdbClient {
    async fn details_artwork(&self, kind: MediaKind, id: u64) -> Option<Artwork> {
        match kind {
            MediaKind::Movie => self.movie(id).await.map(|m| Artwork {
                tmdb_id: Some(m.id),
                poster_path: m.poster_path,
                backdrop_path: m.backdrop_path,
            }),
            MediaKind::Tv => self.tv(id).await.map(|s| Artwork {
                tmdb_id: Some(s.id),
                poster_path: s.poster_path,
                backdrop_path: s.backdrop_path,
            }),
        }
    }

    async fn backdrop_fallback(&self, kind: MediaKind, id: u64) -> Option<String> {
        let images = self.images(kind, id).await;
        best_backdrop(&images.backdrops).map(|img| img.file_path.clone())
    }

    async fn search_artwork(
        &self,
        kind: MediaKind,
        title: &str,
        year: Option<u16>,
    ) -> Option<Artwork> {
        let page = self.search(title, 1).await;
        let candidates: Vec<_> = page
            .results
            .into_iter()
            .filter_map(|hit| match (hit, kind) {
                (SearchHit::Movie(m), MediaKind::Movie) | (SearchHit::Tv(m), MediaKind::Tv) => Some(m),
                _ => None,
            })
            .collect();

        let best = candidates
            .iter()
            .find(|m| year.is_some() && m.year() == year)
            .or_else(|| candidates.first())?;

        Some(Artwork {
            tmdb_id: Some(best.id),
            poster_path: best.poster_path.clone(),
            backdrop_path: best.backdrop_path.clone(),
        })
    }
}

/// Enriches history entries with artwork using a bounded number of parallel
/// lookups and a shared [`ArtworkCache`].
pub struct Enricher {
    source: Arc<dyn ArtworkSource>,
    cache: Arc<ArtworkCache>,
    concurrency: usize,
}

impl Enricher {
    pub fn new(source: Arc<dyn ArtworkSource>, cache: Arc<ArtworkCache>, concurrency: usize) -> Self {
        Self {
            source,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn cache(&self) -> &ArtworkCache {
        &self.cache
    }

    /// Resolve artwork for every entry. Output order matches `entries`.
    pub async fn enrich(&self, entries: &[HistoryEntry]) -> Vec<HistoryItem> {
        let artwork = bounded_map(entries, self.concurrency, |entry| self.artwork_for(entry)).await;

        let items: Vec<HistoryItem> = entries
            .iter()
            .zip(artwork)
            .map(|(entry, art)| HistoryItem::from_entry(entry, art))
            .collect();

        info!(
            entries = items.len(),
            with_poster = items.iter().filter(|i| i.poster_path.is_some()).count(),
            cached_titles = self.cache.len(),
            "History enrichment complete"
        );
        items
    }

    async fn artwork_for(&self, entry: &HistoryEntry) -> Artwork {
        // Episodes take the show's artwork.
        let kind = match entry.kind {
            HistoryKind::Movie => MediaKind::Movie,
            HistoryKind::Episode => MediaKind::Tv,
        };

        if let Some(id) = entry.tmdb_id() {
            let source = self.source.as_ref();
            return self
                .cache
                .get_or_resolve(ArtworkKey::tmdb(kind, id), || resolve_by_id(source, kind, id))
                .await;
        }

        let Some(title) = entry.title().map(str::trim).filter(|t| !t.is_empty()) else {
            debug!(entry_id = entry.id, "History entry has neither TMDB id nor title");
            return Artwork::default();
        };
        let year = entry.year();
        let source = self.source.as_ref();
        self.cache
            .get_or_resolve(ArtworkKey::title(kind, title, year), || async move {
                source
                    .search_artwork(kind, title, year)
                    .await
                    .unwrap_or_default()
            })
            .await
    }
}

/// Details first; the image list only when details carried no backdrop.
async fn resolve_by_id(source: &dyn ArtworkSource, kind: MediaKind, id: u64) -> Artwork {
    let mut artwork = source.details_artwork(kind, id).await.unwrap_or_default();
    if artwork.backdrop_path.is_none() {
        artwork.backdrop_path = source.backdrop_fallback(kind, id).await;
    }
    artwork.tmdb_id = Some(id);
    artwork
}
