use std::time::Duration;

use cinescope_common::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::HistoryEntry;

pub const DEFAULT_BASE_URL: &str = "https://api.trakt.tv";
const API_VERSION: &str = "2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SERVICE: &str = "trakt";

/// Connection settings for [`TraktClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraktConfig {
    /// Trakt application client id, sent as `trakt-api-key`.
    pub client_id: String,
    pub base_url: String,
    /// Items requested per history page.
    pub page_limit: u32,
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: 100,
        }
    }
}

/// Which plays to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Movies,
    Episodes,
}

impl HistoryFilter {
    fn path_suffix(self) -> &'static str {
        match self {
            HistoryFilter::All => "",
            HistoryFilter::Movies => "/movies",
            HistoryFilter::Episodes => "/episodes",
        }
    }
}

/// One page of history plus the pagination headers that came with it.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub page: u32,
    pub page_count: u32,
    pub entries: Vec<HistoryEntry>,
}

impl HistoryPage {
    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

pub struct TraktClient {
    http: Client,
    config: TraktConfig,
}

impl TraktClient {
    pub fn new(config: TraktConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build Trakt HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.client_id.trim().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch one page of `user`'s history, newest first.
    pub async fn history_page(
        &self,
        user: &str,
        filter: HistoryFilter,
        page: u32,
    ) -> Result<HistoryPage> {
        if !self.is_configured() {
            return Err(Error::Config("Trakt client_id is not set".into()));
        }
        let user = user.trim();
        if user.is_empty() {
            return Err(Error::Validation("Trakt username is empty".into()));
        }

        let page = page.max(1);
        let path = format!(
            "/users/{}/history{}",
            path_segment(user),
            filter.path_suffix()
        );
        debug!(path = %path, page, "Trakt history request");

        let resp = self
            .http
            .get(self.url(&path))
            .header("trakt-api-key", &self.config.client_id)
            .header("trakt-api-version", API_VERSION)
            .header("Content-Type", "application/json")
            .query(&[("page", page), ("limit", self.config.page_limit.max(1))])
            .send()
            .await
            .map_err(|e| Error::http(SERVICE, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found("trakt user", user));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let headers = resp.headers().clone();
        let entries: Vec<HistoryEntry> = resp.json().await.map_err(|e| Error::decode(SERVICE, e))?;

        Ok(HistoryPage {
            page: header_u32(&headers, "x-pagination-page").unwrap_or(page),
            page_count: header_u32(&headers, "x-pagination-page-count").unwrap_or(page),
            entries,
        })
    }

    /// Walk history pages until they run out or `max_items` have been read.
    ///
    /// A failure on the first page yields an empty list; a failure on a later
    /// page keeps what was already fetched. Failures are logged, never
    /// returned.
    pub async fn watch_history(
        &self,
        user: &str,
        filter: HistoryFilter,
        max_items: usize,
    ) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = Vec::new();
        let mut page = 1u32;

        while entries.len() < max_items {
            match self.history_page(user, filter, page).await {
                Ok(batch) => {
                    let more = batch.has_next() && !batch.entries.is_empty();
                    entries.extend(batch.entries);
                    if !more {
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    warn!(user, page, error = %e, "Trakt history request failed");
                    break;
                }
            }
        }

        entries.truncate(max_items);
        entries
    }
}

/// Percent-encode `s` for use as a single URL path segment.
fn path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
