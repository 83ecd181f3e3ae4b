//! TMDb HTTP client.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 30-second request timeout.
//! - Query-string authentication (`api_key`) and a fixed `language` on every call.

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use cinescope_common::{Error, MediaKind, Result};
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    CombinedCredits, Credits, ImageSet, MediaSummary, MovieDetails, Paged, Person, PersonCredit,
    ReviewPage, SearchPage, Season, TvDetails, Video, VideosResponse, WatchProviders,
    WatchProvidersResponse,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const SERVICE: &str = "tmdb";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for [`TmdbClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// v3 API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// Response language, e.g. `"en-US"`.
    pub language: String,
    /// ISO-3166-1 region used to pick watch providers.
    pub region: String,
    pub base_url: String,
    pub image_base_url: String,
    pub requests_per_second: u32,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: "en-US".to_string(),
            region: "US".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            requests_per_second: 20,
        }
    }
}

/// Trending window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    fn as_path(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDb v3 client.
///
/// Cheap to share behind an `Arc`; the rate limiter is shared by every caller.
///
/// # Examples
///
/// ```no_run
/// use cinescope_tmdb::{TmdbClient, TmdbConfig};
///
/// let client = TmdbClient::new(TmdbConfig {
///     api_key: "your-api-key".into(),
///     ..TmdbConfig::default()
/// })
/// .unwrap();
/// ```
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
    limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build TMDB HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    /// Returns `true` when an API key has been configured.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    /// Typed GET against `path` with rate limiting and 429-retry logic.
    ///
    /// A 404 becomes [`Error::NotFound`], any other non-success status
    /// [`Error::Upstream`], and a body that does not match `T`
    /// [`Error::Decode`].
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        if !self.is_configured() {
            return Err(Error::Config("TMDB api_key is not set".into()));
        }

        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let mut retries = 0u32;
        loop {
            self.limiter.until_ready().await;

            debug!(path, "TMDB request");
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("api_key", self.config.api_key.as_str()),
                    ("language", self.config.language.as_str()),
                ])
                .query(params)
                .send()
                .await
                .map_err(|e| Error::http(SERVICE, e))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                return Err(Error::not_found("tmdb resource", path));
            }

            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(Error::Upstream {
                    service: SERVICE,
                    status: status.as_u16(),
                    message,
                });
            }

            return resp.json::<T>().await.map_err(|e| Error::decode(SERVICE, e));
        }
    }

    /// Run [`fetch`](Self::fetch) and swap any failure for `fallback()`.
    async fn guarded<T, F>(&self, path: &str, params: &[(&str, String)], fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.fetch(path, params).await {
            Ok(value) => value,
            Err(Error::NotFound { .. }) => {
                debug!(path, "TMDB resource not found; using fallback");
                fallback()
            }
            Err(e) => {
                warn!(path, error = %e, "TMDB request failed; using fallback");
                fallback()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub async fn trending(&self, kind: MediaKind, window: TimeWindow) -> Vec<MediaSummary> {
        let path = format!("/trending/{}/{}", kind.as_path(), window.as_path());
        let page: Paged<MediaSummary> = self.guarded(&path, &[], || Paged::empty(1)).await;
        tag_kind(page.results, kind)
    }

    pub async fn popular(&self, kind: MediaKind) -> Vec<MediaSummary> {
        let path = format!("/{}/popular", kind.as_path());
        let page: Paged<MediaSummary> = self.guarded(&path, &[], || Paged::empty(1)).await;
        tag_kind(page.results, kind)
    }

    pub async fn recommendations(&self, kind: MediaKind, id: u64) -> Vec<MediaSummary> {
        let path = format!("/{}/{id}/recommendations", kind.as_path());
        let page: Paged<MediaSummary> = self.guarded(&path, &[], || Paged::empty(1)).await;
        tag_kind(page.results, kind)
    }

    // -----------------------------------------------------------------------
    // Details
    // -----------------------------------------------------------------------

    pub async fn movie(&self, id: u64) -> Option<MovieDetails> {
        self.guarded(&format!("/movie/{id}"), &[], || None).await
    }

    pub async fn tv(&self, id: u64) -> Option<TvDetails> {
        self.guarded(&format!("/tv/{id}"), &[], || None).await
    }

    pub async fn season(&self, tv_id: u64, season_number: u32) -> Option<Season> {
        self.guarded(&format!("/tv/{tv_id}/season/{season_number}"), &[], || None)
            .await
    }

    pub async fn credits(&self, kind: MediaKind, id: u64) -> Credits {
        let path = format!("/{}/{id}/credits", kind.as_path());
        self.guarded(&path, &[], Credits::default).await
    }

    /// One page of user reviews. Page numbers below 1 are treated as 1.
    pub async fn reviews(&self, kind: MediaKind, id: u64, page: u32) -> ReviewPage {
        let page = page.max(1);
        let path = format!("/{}/{id}/reviews", kind.as_path());
        self.guarded(&path, &[("page", page.to_string())], || Paged::empty(page))
            .await
    }

    /// Watch providers for the configured region only.
    pub async fn watch_providers(&self, kind: MediaKind, id: u64) -> Option<WatchProviders> {
        let path = format!("/{}/{id}/watch/providers", kind.as_path());
        let resp: Option<WatchProvidersResponse> = self.guarded(&path, &[], || None).await;
        resp?.results.remove(&self.config.region)
    }

    /// Artwork restricted to English and language-neutral images.
    pub async fn images(&self, kind: MediaKind, id: u64) -> ImageSet {
        let path = format!("/{}/{id}/images", kind.as_path());
        // `language` would otherwise filter out the neutral images.
        let params = [("include_image_language", "en,null".to_string())];
        self.guarded(&path, &params, ImageSet::default).await
    }

    pub async fn videos(&self, kind: MediaKind, id: u64) -> Vec<Video> {
        let path = format!("/{}/{id}/videos", kind.as_path());
        let resp: Option<VideosResponse> = self.guarded(&path, &[], || None).await;
        resp.map(|r| r.results).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // People
    // -----------------------------------------------------------------------

    pub async fn person(&self, id: u64) -> Option<Person> {
        self.guarded(&format!("/person/{id}"), &[], || None).await
    }

    /// Movie and TV credits of a person, most popular first, one entry per title.
    pub async fn person_credits(&self, id: u64) -> Vec<PersonCredit> {
        let path = format!("/person/{id}/combined_credits");
        let resp: Option<CombinedCredits> = self.guarded(&path, &[], || None).await;
        let Some(resp) = resp else {
            return Vec::new();
        };
        known_for(resp.cast.into_iter().chain(resp.crew))
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Multi search across movies, shows, and people. A blank query returns
    /// an empty page without touching the network.
    pub async fn search(&self, query: &str, page: u32) -> SearchPage {
        let page = page.max(1);
        let query = query.trim();
        if query.is_empty() {
            return Paged::empty(page);
        }
        let params = [
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        self.guarded("/search/multi", &params, || Paged::empty(page))
            .await
    }
}

/// Fill in `media_type` for endpoints that only ever return one kind.
fn tag_kind(mut items: Vec<MediaSummary>, kind: MediaKind) -> Vec<MediaSummary> {
    for item in &mut items {
        if item.media_type.is_none() {
            item.media_type = Some(kind.as_path().to_string());
        }
    }
    items
}

/// De-duplicate credits by title and order by popularity.
fn known_for(credits: impl Iterator<Item = PersonCredit>) -> Vec<PersonCredit> {
    let mut seen: HashSet<(MediaKind, u64)> = HashSet::new();
    let mut out: Vec<PersonCredit> = credits
        .filter(|c| c.kind().is_some_and(|kind| seen.insert((kind, c.id))))
        .collect();
    out.sort_by(|a, b| {
        b.popularity
            .unwrap_or(0.0)
            .partial_cmp(&a.popularity.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}
