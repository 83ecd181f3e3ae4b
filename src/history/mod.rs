//! Trakt watch history, enriched with TMDb artwork and shaped for display.

mod bounded;
mod cache;
mod enrich;
mod item;
mod service;
mod view;

pub use bounded::bounded_map;
pub use cache::{Artwork, ArtworkCache, ArtworkKey};
pub use enrich::{ArtworkSource, Enricher};
pub use item::HistoryItem;
pub use service::HistoryService;
pub use view::{
    apply, utc_offset, Grouping, HistoryGroup, HistoryQuery, HistoryView, KindFilter, SortKey,
};
