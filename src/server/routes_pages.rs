//! HTML page handlers.
//!
//! Upstream failures never surface here: the TMDb wrappers already fall back
//! to empty values, so a page renders with whatever data is available. Only
//! a missing title (or an id that is not a number) produces a 404 page.

use crate::history::HistoryQuery;
use crate::render::pages::{self, Backdrop, TitleExtras};
use crate::server::AppContext;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use cinescope_common::MediaKind;
use cinescope_tmdb::{backdrop_at, pick_trailer, ImageSet, TimeWindow};
use serde::Deserialize;

pub fn page_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(home))
        .route("/movie/:id", get(movie))
        .route("/tv/:id", get(tv))
        .route("/tv/:id/season/:season", get(season))
        .route("/person/:id", get(person))
        .route("/search", get(search))
        .route("/history", get(history))
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found(message))).into_response()
}

pub async fn fallback() -> Response {
    not_found("That page does not exist.")
}

/// Parse a numeric path or query value; anything else is `None`.
fn parse_num<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

async fn home(State(ctx): State<AppContext>) -> Html<String> {
    let (movies, shows) = tokio::join!(
        ctx.tmdb.trending(MediaKind::Movie, TimeWindow::Week),
        ctx.tmdb.trending(MediaKind::Tv, TimeWindow::Week),
    );

    if movies.is_empty() && shows.is_empty() {
        tracing::debug!("Trending lists empty, falling back to popular");
        let (movies, shows) = tokio::join!(
            ctx.tmdb.popular(MediaKind::Movie),
            ctx.tmdb.popular(MediaKind::Tv),
        );
        return Html(pages::home(&ctx.images, &movies, &shows, false));
    }

    Html(pages::home(&ctx.images, &movies, &shows, true))
}

#[derive(Debug, Default, Deserialize)]
struct TitleParams {
    backdrop: Option<String>,
    reviews: Option<String>,
}

impl TitleParams {
    fn backdrop_index(&self) -> usize {
        self.backdrop.as_deref().and_then(parse_num).unwrap_or(0)
    }

    fn review_page(&self) -> u32 {
        self.reviews
            .as_deref()
            .and_then(parse_num)
            .unwrap_or(1u32)
            .max(1)
    }
}

/// Pick the requested backdrop from the ranked list, wrapping out-of-range
/// indices. Falls back to the details backdrop when TMDb listed no images.
fn choose_backdrop(
    ctx: &AppContext,
    images: &ImageSet,
    index: usize,
    details_backdrop: Option<&str>,
) -> Backdrop {
    match backdrop_at(&images.backdrops, index) {
        Some(picked) => Backdrop {
            url: ctx.images.backdrop(Some(picked.image.file_path.as_str())),
            index: picked.index,
            count: picked.count,
        },
        None => Backdrop {
            url: ctx.images.backdrop(details_backdrop),
            index: 0,
            count: usize::from(details_backdrop.is_some()),
        },
    }
}

/// Credits, reviews, recommendations, providers, images, and videos for a
/// title, fetched in parallel.
async fn title_extras(
    ctx: &AppContext,
    kind: MediaKind,
    id: u64,
    params: &TitleParams,
) -> (TitleExtras, ImageSet) {
    let (credits, reviews, recommendations, providers, images, videos) = tokio::join!(
        ctx.tmdb.credits(kind, id),
        ctx.tmdb.reviews(kind, id, params.review_page()),
        ctx.tmdb.recommendations(kind, id),
        ctx.tmdb.watch_providers(kind, id),
        ctx.tmdb.images(kind, id),
        ctx.tmdb.videos(kind, id),
    );
    let extras = TitleExtras {
        backdrop: Backdrop::default(),
        credits,
        reviews,
        recommendations,
        providers,
        trailer_url: pick_trailer(&videos).and_then(|v| v.url()),
    };
    (extras, images)
}

async fn movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(params): Query<TitleParams>,
) -> Response {
    let Some(id) = parse_num::<u64>(&id) else {
        return not_found("That is not a valid movie id.");
    };

    let (details, (mut extras, images)) = tokio::join!(
        ctx.tmdb.movie(id),
        title_extras(&ctx, MediaKind::Movie, id, &params),
    );
    let Some(details) = details else {
        return not_found("We couldn't find that movie.");
    };

    extras.backdrop = choose_backdrop(
        &ctx,
        &images,
        params.backdrop_index(),
        details.backdrop_path.as_deref(),
    );
    Html(pages::movie(&ctx.images, &details, &extras)).into_response()
}

async fn tv(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(params): Query<TitleParams>,
) -> Response {
    let Some(id) = parse_num::<u64>(&id) else {
        return not_found("That is not a valid show id.");
    };

    let (details, (mut extras, images)) = tokio::join!(
        ctx.tmdb.tv(id),
        title_extras(&ctx, MediaKind::Tv, id, &params),
    );
    let Some(details) = details else {
        return not_found("We couldn't find that show.");
    };

    extras.backdrop = choose_backdrop(
        &ctx,
        &images,
        params.backdrop_index(),
        details.backdrop_path.as_deref(),
    );
    Html(pages::tv(&ctx.images, &details, &extras)).into_response()
}

async fn season(
    State(ctx): State<AppContext>,
    Path((id, number)): Path<(String, String)>,
) -> Response {
    let (Some(id), Some(number)) = (parse_num::<u64>(&id), parse_num::<u32>(&number)) else {
        return not_found("That is not a valid season.");
    };

    let (show, season) = tokio::join!(ctx.tmdb.tv(id), ctx.tmdb.season(id, number));
    let Some(season) = season else {
        return not_found("We couldn't find that season.");
    };
    let show_title = show
        .as_ref()
        .map(|s| s.display_title().to_string())
        .unwrap_or_else(|| "Show".to_string());

    Html(pages::season(&ctx.images, id, &show_title, &season)).into_response()
}

async fn person(State(ctx): State<AppContext>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_num::<u64>(&id) else {
        return not_found("That is not a valid person id.");
    };

    let (person, credits) = tokio::join!(ctx.tmdb.person(id), ctx.tmdb.person_credits(id));
    let Some(person) = person else {
        return not_found("We couldn't find that person.");
    };

    Html(pages::person(&ctx.images, &person, &credits)).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
    page: Option<String>,
}

async fn search(State(ctx): State<AppContext>, Query(params): Query<SearchParams>) -> Html<String> {
    let query = params.q.unwrap_or_default();
    let page = params
        .page
        .as_deref()
        .and_then(parse_num)
        .unwrap_or(1u32)
        .max(1);

    let results = ctx.tmdb.search(&query, page).await;
    Html(pages::search(&ctx.images, &query, &results))
}

/// Query parameters shared by the history page and `/api/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub group: Option<String>,
    pub refresh: Option<String>,
}

impl HistoryParams {
    pub fn query(&self) -> HistoryQuery {
        HistoryQuery::from_params(
            self.q.as_deref(),
            self.kind.as_deref(),
            self.sort.as_deref(),
            self.group.as_deref(),
        )
    }

    pub fn force_refresh(&self) -> bool {
        matches!(
            self.refresh.as_deref().map(str::trim),
            Some("1" | "true" | "yes")
        )
    }
}

async fn history(State(ctx): State<AppContext>, Query(params): Query<HistoryParams>) -> Html<String> {
    if !ctx.history.is_enabled() {
        return Html(pages::history(&ctx.images, None, None));
    }

    let view = ctx
        .history
        .view(&params.query(), params.force_refresh())
        .await;
    Html(pages::history(
        &ctx.images,
        ctx.history.username(),
        Some(&view),
    ))
}
