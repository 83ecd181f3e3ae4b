//! Loading, enriching, and caching a user's watch history.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::FixedOffset;
use cinescope_trakt::{HistoryFilter, TraktClient};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cache::ArtworkCache;
use super::enrich::{ArtworkSource, Enricher};
use super::item::HistoryItem;
use super::view::{apply, utc_offset, HistoryQuery, HistoryView};
use crate::config::Config;

struct Snapshot {
    loaded_at: Instant,
    items: Arc<Vec<HistoryItem>>,
}

/// Serves history views from a snapshot that is refreshed at most once per
/// `history.refresh_secs`.
pub struct HistoryService {
    trakt: Arc<TraktClient>,
    username: Option<String>,
    max_items: usize,
    enricher: Enricher,
    refresh: Duration,
    offset: FixedOffset,
    snapshot: RwLock<Option<Snapshot>>,
    // Serialises reloads so parallel requests don't each walk Trakt.
    load_lock: Mutex<()>,
}

impl HistoryService {
    pub fn new(config: &Config, trakt: Arc<TraktClient>, source: Arc<dyn ArtworkSource>) -> Self {
        let enricher = Enricher::new(
            source,
            Arc::new(ArtworkCache::new()),
            config.history.concurrency,
        );
        Self {
            trakt,
            username: config.trakt.username().map(str::to_string),
            max_items: config.trakt.max_items,
            enricher,
            refresh: Duration::from_secs(config.history.refresh_secs),
            offset: utc_offset(config.history.utc_offset_minutes),
            snapshot: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// True when both a Trakt client id and a username are configured.
    pub fn is_enabled(&self) -> bool {
        self.trakt.is_configured() && self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Distinct titles whose artwork has been resolved so far.
    pub fn cached_titles(&self) -> usize {
        self.enricher.cache().len()
    }

    fn fresh_snapshot(&self) -> Option<Arc<Vec<HistoryItem>>> {
        let guard = self.snapshot.read();
        guard
            .as_ref()
            .filter(|s| s.loaded_at.elapsed() < self.refresh)
            .map(|s| s.items.clone())
    }

    /// Enriched history, newest first. `force` skips the snapshot.
    ///
    /// An empty load never replaces an existing snapshot, so a Trakt outage
    /// keeps serving the last good list. It still counts as a load, so the
    /// next attempt waits out `refresh_secs`.
    pub async fn load(&self, force: bool) -> Arc<Vec<HistoryItem>> {
        let Some(user) = self.username.as_deref().filter(|_| self.trakt.is_configured()) else {
            debug!("Trakt history is not configured");
            return Arc::new(Vec::new());
        };

        if !force {
            if let Some(items) = self.fresh_snapshot() {
                return items;
            }
        }

        let _guard = self.load_lock.lock().await;
        if !force {
            // Another request may have reloaded while we waited.
            if let Some(items) = self.fresh_snapshot() {
                return items;
            }
        }

        let started = Instant::now();
        let entries = self
            .trakt
            .watch_history(user, HistoryFilter::All, self.max_items)
            .await;
        let items = self.enricher.enrich(&entries).await;

        if items.is_empty() {
            // Empty loads restart the refresh window but keep earlier items.
            let mut guard = self.snapshot.write();
            return match guard.as_mut() {
                Some(previous) => {
                    warn!(user, "Trakt returned no history; keeping previous snapshot");
                    previous.loaded_at = Instant::now();
                    previous.items.clone()
                }
                None => {
                    warn!(user, "Trakt returned no history");
                    let empty = Arc::new(Vec::new());
                    *guard = Some(Snapshot {
                        loaded_at: Instant::now(),
                        items: empty.clone(),
                    });
                    empty
                }
            };
        }

        let items = Arc::new(items);
        *self.snapshot.write() = Some(Snapshot {
            loaded_at: Instant::now(),
            items: items.clone(),
        });
        info!(
            user,
            entries = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "History snapshot refreshed"
        );
        items
    }

    /// Load (or reuse) history and apply `query` to it.
    pub async fn view(&self, query: &HistoryQuery, force: bool) -> HistoryView {
        let items = self.load(force).await;
        apply(&items, query, self.offset)
    }
}
