//! Trakt v2 client, limited to reading a user's watch history.

pub mod client;
pub mod models;

pub use client::{HistoryFilter, HistoryPage, TraktClient, TraktConfig};
pub use models::{HistoryEntry, HistoryKind, Ids, TraktEpisode, TraktMovie, TraktShow};
