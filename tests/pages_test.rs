//! Integration tests for the HTML pages.

mod common;

use common::{backdrops, credits, movie_details, show_details, TestHarness, IMAGE_BASE};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_shows_trending_carousels() {
    let h = TestHarness::start().await;
    h.tmdb_json(
        "/trending/movie/week",
        json!({ "page": 1, "results": [{ "id": 550, "title": "Fight Club", "release_date": "1999-10-15" }] }),
    )
    .await;
    h.tmdb_json(
        "/trending/tv/week",
        json!({ "page": 1, "results": [{ "id": 1396, "name": "Breaking Bad" }] }),
    )
    .await;

    let (status, html) = h.get_html("/").await;
    assert_eq!(status, 200);
    assert!(html.contains("Trending movies"));
    assert!(html.contains(r#"href="/movie/550""#));
    assert!(html.contains(r#"href="/tv/1396""#));
    assert_eq!(h.tmdb_hits("/movie/popular").await, 0);
}

#[tokio::test]
async fn home_falls_back_to_popular() {
    let h = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.tmdb)
        .await;
    h.tmdb_json(
        "/movie/popular",
        json!({ "page": 1, "results": [{ "id": 603, "title": "The Matrix" }] }),
    )
    .await;

    let (status, html) = h.get_html("/").await;
    assert_eq!(status, 200);
    assert!(html.contains("Popular movies"));
    assert!(html.contains("The Matrix"));
}

#[tokio::test]
async fn home_without_api_key_still_renders() {
    let h = TestHarness::start_with(|c| c.tmdb.api_key.clear()).await;
    let (status, html) = h.get_html("/").await;
    assert_eq!(status, 200);
    assert!(html.contains("Nothing to show right now"));
    assert!(h.tmdb.received_requests().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

async fn mount_movie(h: &TestHarness) {
    h.tmdb_json("/movie/550", movie_details(550, "Fight Club")).await;
    h.tmdb_json("/movie/550/credits", credits()).await;
    h.tmdb_json("/movie/550/images", backdrops()).await;
    h.tmdb_json(
        "/movie/550/videos",
        json!({ "results": [
            { "key": "teaser1", "site": "YouTube", "type": "Teaser", "official": true },
            { "key": "SUXWAEX2jlg", "site": "YouTube", "type": "Trailer", "official": true }
        ] }),
    )
    .await;
    h.tmdb_json(
        "/movie/550/watch/providers",
        json!({ "id": 550, "results": {
            "US": { "link": "https://tmdb.test/watch", "flatrate": [{ "provider_id": 8, "provider_name": "Netflix" }] },
            "GB": { "rent": [{ "provider_id": 2, "provider_name": "Apple TV" }] }
        } }),
    )
    .await;
    h.tmdb_json(
        "/movie/550/recommendations",
        json!({ "page": 1, "results": [{ "id": 807, "title": "Se7en" }] }),
    )
    .await;
}

#[tokio::test]
async fn movie_page_renders_every_section() {
    let h = TestHarness::start().await;
    mount_movie(&h).await;
    Mock::given(method("GET"))
        .and(path("/movie/550/reviews"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1, "total_pages": 2, "total_results": 3,
            "results": [{
                "id": "r1", "author": "critic",
                "author_details": { "rating": 9.0 },
                "content": "Great <b>film</b>", "created_at": "2020-01-02T10:00:00Z"
            }]
        })))
        .mount(&h.tmdb)
        .await;

    let (status, html) = h.get_html("/movie/550").await;
    assert_eq!(status, 200);
    assert!(html.contains("<title>Fight Club · Cinescope</title>"));
    assert!(html.contains("Directed by David Fincher</p>"));
    assert!(html.contains("$63,000,000"));
    assert!(html.contains("2h 19m"));

    // Cast in billing order.
    let norton = html.find("Edward Norton").unwrap();
    let pitt = html.find("Brad Pitt").unwrap();
    assert!(norton < pitt);

    // Best-ranked backdrop, with a toggle to the next one.
    assert!(html.contains(&format!("{IMAGE_BASE}/w1280/4k.jpg")));
    assert!(html.contains(r#"href="/movie/550?backdrop=1""#));
    assert!(html.contains("Backdrop 1 of 2"));

    assert!(html.contains("https://www.youtube.com/watch?v=SUXWAEX2jlg"));
    assert!(html.contains("Netflix"));
    assert!(!html.contains("Apple TV"));
    assert!(html.contains("Great &lt;b&gt;film&lt;/b&gt;"));
    assert!(html.contains(r#"href="/movie/550?reviews=2""#));
    assert!(html.contains(r#"href="/movie/807""#));
}

#[tokio::test]
async fn movie_backdrop_and_review_params() {
    let h = TestHarness::start().await;
    mount_movie(&h).await;
    Mock::given(method("GET"))
        .and(path("/movie/550/reviews"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2, "total_pages": 2, "total_results": 3,
            "results": [{ "id": "r3", "author": "late", "content": "Second page" }]
        })))
        .expect(1)
        .mount(&h.tmdb)
        .await;

    let (status, html) = h.get_html("/movie/550?backdrop=1&reviews=2").await;
    assert_eq!(status, 200);
    assert!(html.contains(&format!("{IMAGE_BASE}/w1280/hd.jpg")));
    // The toggle wraps back to the first backdrop.
    assert!(html.contains(r#"href="/movie/550?backdrop=0""#));
    assert!(html.contains("Second page"));
    // Review paging keeps the chosen backdrop.
    assert!(html.contains(r#"href="/movie/550?backdrop=1&amp;reviews=1""#));
}

#[tokio::test]
async fn backdrop_falls_back_to_details_without_images() {
    let h = TestHarness::start().await;
    h.tmdb_json("/movie/550", movie_details(550, "Fight Club")).await;

    let (status, html) = h.get_html("/movie/550?backdrop=7").await;
    assert_eq!(status, 200);
    assert!(html.contains(&format!("{IMAGE_BASE}/w1280/details-backdrop.jpg")));
    assert!(!html.contains("backdrop-toggle"));
    assert!(html.contains("No reviews yet."));
}

#[tokio::test]
async fn missing_movie_is_404_page() {
    let h = TestHarness::start().await;
    let (status, html) = h.get_html("/movie/999999").await;
    assert_eq!(status, 404);
    assert!(html.contains("We couldn't find that movie."));
}

#[tokio::test]
async fn non_numeric_id_is_404_without_upstream_call() {
    let h = TestHarness::start().await;
    let (status, html) = h.get_html("/movie/fight-club").await;
    assert_eq!(status, 404);
    assert!(html.contains("not a valid movie id"));
    assert!(h.tmdb.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn titles_are_escaped() {
    let h = TestHarness::start().await;
    h.tmdb_json("/movie/1", movie_details(1, "<script>alert(1)</script>")).await;

    let (_, html) = h.get_html("/movie/1").await;
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

// ---------------------------------------------------------------------------
// TV
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tv_page_lists_seasons_and_creators() {
    let h = TestHarness::start().await;
    h.tmdb_json("/tv/1396", show_details(1396, "Breaking Bad")).await;

    let (status, html) = h.get_html("/tv/1396").await;
    assert_eq!(status, 200);
    assert!(html.contains("Breaking Bad"));
    assert!(html.contains("(2008–2013)"));
    assert!(html.contains("Vince Gilligan"));
    assert!(html.contains(r#"href="/tv/1396/season/2""#));
    assert!(html.contains("13 episodes"));
}

#[tokio::test]
async fn season_page_lists_episodes() {
    let h = TestHarness::start().await;
    h.tmdb_json("/tv/1396", show_details(1396, "Breaking Bad")).await;
    h.tmdb_json(
        "/tv/1396/season/1",
        json!({
            "id": 3572, "season_number": 1, "name": "Season 1",
            "episodes": [
                { "id": 62085, "episode_number": 1, "season_number": 1, "name": "Pilot", "runtime": 58, "air_date": "2008-01-20" },
                { "id": 62086, "episode_number": 2, "season_number": 1, "name": "Cat's in the Bag..." }
            ]
        }),
    )
    .await;

    let (status, html) = h.get_html("/tv/1396/season/1").await;
    assert_eq!(status, 200);
    assert!(html.contains(r#"<a href="/tv/1396">Breaking Bad</a>"#));
    assert!(html.contains("S01E01"));
    assert!(html.contains("Pilot"));
    assert!(html.contains("Cat&#39;s in the Bag..."));
    assert!(html.contains("58m"));
}

#[tokio::test]
async fn missing_season_is_404_page() {
    let h = TestHarness::start().await;
    let (status, _) = h.get_html("/tv/1396/season/99").await;
    assert_eq!(status, 404);
}

// ---------------------------------------------------------------------------
// People and search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn person_page_shows_known_for() {
    let h = TestHarness::start().await;
    h.tmdb_json(
        "/person/287",
        json!({ "id": 287, "name": "Brad Pitt", "biography": "Actor.\n\nProducer.", "known_for_department": "Acting" }),
    )
    .await;
    h.tmdb_json(
        "/person/287/combined_credits",
        json!({
            "cast": [
                { "id": 550, "media_type": "movie", "title": "Fight Club", "character": "Tyler Durden", "popularity": 60.0 },
                { "id": 550, "media_type": "movie", "title": "Fight Club", "character": "Tyler", "popularity": 60.0 }
            ],
            "crew": [
                { "id": 1422, "media_type": "movie", "title": "The Departed", "job": "Producer", "popularity": 40.0 }
            ]
        }),
    )
    .await;

    let (status, html) = h.get_html("/person/287").await;
    assert_eq!(status, 200);
    assert!(html.contains("<p>Actor.</p><p>Producer.</p>"));
    assert_eq!(html.matches(r#"href="/movie/550""#).count(), 1);
    assert!(html.contains("Producer</span>"));
}

#[tokio::test]
async fn search_renders_mixed_results() {
    let h = TestHarness::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "pitt & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1, "total_pages": 3, "total_results": 41,
            "results": [
                { "media_type": "person", "id": 287, "name": "Brad Pitt", "known_for_department": "Acting" },
                { "media_type": "movie", "id": 550, "title": "Fight Club" },
                { "media_type": "collection", "id": 9 }
            ]
        })))
        .mount(&h.tmdb)
        .await;

    let (status, html) = h.get_html("/search?q=pitt+%26+co").await;
    assert_eq!(status, 200);
    assert!(html.contains("Results for “pitt &amp; co”"));
    assert!(html.contains(r#"href="/person/287""#));
    assert!(html.contains(r#"href="/movie/550""#));
    assert!(html.contains(r#"href="/search?q=pitt+%26+co&amp;page=2""#));
    assert!(html.contains(r#"value="pitt &amp; co""#));
}

#[tokio::test]
async fn blank_search_makes_no_request() {
    let h = TestHarness::start().await;
    let (status, html) = h.get_html("/search?q=%20%20").await;
    assert_eq!(status, 200);
    assert!(html.contains("Type a title or a name"));
    assert!(h.tmdb.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_route_is_404_page() {
    let h = TestHarness::start().await;
    let (status, html) = h.get_html("/nope").await;
    assert_eq!(status, 404);
    assert!(html.contains("That page does not exist."));
}
