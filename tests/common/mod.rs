//! Shared test harness for integration tests.
//!
//! [`TestHarness`] starts mock TMDb and Trakt servers, builds a full
//! [`AppContext`] pointed at them, and serves the router on a random port
//! for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use cinescope::config::Config;
use cinescope::server::{create_router, AppContext};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const IMAGE_BASE: &str = "https://img.test/t/p";

pub struct TestHarness {
    pub ctx: AppContext,
    pub tmdb: MockServer,
    pub trakt: MockServer,
    pub addr: SocketAddr,
}

/// Config pointing both API clients at the given mock servers.
pub fn test_config(tmdb: &MockServer, trakt: &MockServer) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".into();
    config.tmdb.api_key = "test-key".into();
    config.tmdb.base_url = tmdb.uri();
    config.tmdb.image_base_url = IMAGE_BASE.into();
    config.tmdb.requests_per_second = 1000;
    config.trakt.client.client_id = "test-client".into();
    config.trakt.client.base_url = trakt.uri();
    config.trakt.username = Some("alice".into());
    config.history.concurrency = 4;
    config
}

impl TestHarness {
    /// Harness with TMDb and Trakt both configured.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Harness whose config is adjusted by `tweak` before the server starts.
    pub async fn start_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let tmdb = MockServer::start().await;
        let trakt = MockServer::start().await;
        let mut config = test_config(&tmdb, &trakt);
        tweak(&mut config);

        let ctx = AppContext::new(config).expect("failed to build context");
        let app = create_router(ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            tmdb,
            trakt,
            addr,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(self.url(path)).await.expect("request failed")
    }

    pub async fn get_html(&self, path: &str) -> (u16, String) {
        let resp = self.get(path).await;
        let status = resp.status().as_u16();
        (status, resp.text().await.expect("body"))
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.get(path).await;
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("json body"))
    }

    /// Answer `GET path` on the TMDb mock with `body`.
    pub async fn tmdb_json(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.tmdb)
            .await;
    }

    /// Number of requests the TMDb mock has received for `route`.
    pub async fn tmdb_hits(&self, route: &str) -> usize {
        self.tmdb
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn movie_details(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "tagline": "Mischief. Mayhem. Soap.",
        "overview": "An insomniac office worker meets a soap maker.",
        "release_date": "1999-10-15",
        "runtime": 139,
        "genres": [{ "id": 18, "name": "Drama" }],
        "vote_average": 8.4,
        "poster_path": "/poster.jpg",
        "backdrop_path": "/details-backdrop.jpg",
        "budget": 63000000
    })
}

pub fn show_details(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "first_air_date": "2008-01-20",
        "last_air_date": "2013-09-29",
        "status": "Ended",
        "episode_run_time": [47],
        "genres": [{ "id": 18, "name": "Drama" }],
        "poster_path": "/show.jpg",
        "backdrop_path": null,
        "created_by": [{ "id": 66633, "name": "Vince Gilligan" }],
        "seasons": [
            { "id": 3572, "season_number": 1, "name": "Season 1", "episode_count": 7 },
            { "id": 3573, "season_number": 2, "name": "Season 2", "episode_count": 13 }
        ]
    })
}

pub fn credits() -> Value {
    json!({
        "cast": [
            { "id": 287, "name": "Brad Pitt", "character": "Tyler Durden", "order": 1 },
            { "id": 819, "name": "Edward Norton", "character": "The Narrator", "order": 0 }
        ],
        "crew": [
            { "id": 7467, "name": "David Fincher", "job": "Director", "department": "Directing" },
            { "id": 7467, "name": "David Fincher", "job": "Director", "department": "Directing" }
        ]
    })
}

pub fn backdrops() -> Value {
    json!({
        "backdrops": [
            { "file_path": "/hd.jpg", "width": 1920, "height": 1080, "iso_639_1": null, "vote_average": 5.5 },
            { "file_path": "/4k.jpg", "width": 3840, "height": 2160, "iso_639_1": null, "vote_average": 5.0 },
            { "file_path": "/fr.jpg", "width": 3840, "height": 2160, "iso_639_1": "fr", "vote_average": 9.0 }
        ]
    })
}

pub fn history_movie(id: u64, watched_at: &str, title: &str, year: u16, tmdb: u64) -> Value {
    json!({
        "id": id,
        "watched_at": watched_at,
        "action": "watch",
        "type": "movie",
        "movie": { "title": title, "year": year, "ids": { "trakt": id, "tmdb": tmdb } }
    })
}

pub fn history_episode(id: u64, watched_at: &str, show: &str, tmdb: u64, season: u32, number: u32) -> Value {
    json!({
        "id": id,
        "watched_at": watched_at,
        "action": "scrobble",
        "type": "episode",
        "episode": { "season": season, "number": number, "title": format!("Episode {number}") },
        "show": { "title": show, "year": 2008, "ids": { "tmdb": tmdb } }
    })
}
