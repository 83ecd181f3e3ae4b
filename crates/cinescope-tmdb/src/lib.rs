//! TMDb (The Movie Database) v3 API client.
//!
//! [`TmdbClient`] exposes two layers:
//!
//! - [`TmdbClient::fetch`], a typed GET that returns every failure as an
//!   [`Error`](cinescope_common::Error);
//! - guarded wrappers (`movie`, `credits`, `reviews`, ...) that log failures
//!   and hand back a safe default, so page rendering never has to deal with
//!   a missing upstream.
//!
//! [`images`] builds CDN URLs and ranks backdrops.

pub mod client;
pub mod images;
pub mod models;

pub use client::{TimeWindow, TmdbClient, TmdbConfig};
pub use images::{
    backdrop_at, best_backdrop, image_url, rank_backdrops, ImageSize, RankedBackdrop,
};
pub use models::*;
