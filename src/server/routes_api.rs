use crate::history::HistoryView;
use crate::server::routes_pages::HistoryParams;
use crate::server::{AppContext, AppError};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cinescope_common::{Error, MediaKind};
use cinescope_tmdb::{rank_backdrops, ImageSize, ReviewPage};
use serde::{Deserialize, Serialize};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/history", get(get_history))
        .route("/:kind/:id/reviews", get(get_reviews))
        .route("/:kind/:id/backdrops", get(get_backdrops))
}

/// Validate the `:kind/:id` pair shared by the title endpoints.
fn parse_title(kind: &str, id: &str) -> Result<(MediaKind, u64), Error> {
    let kind: MediaKind = kind.parse()?;
    let id = id
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Validation(format!("invalid {kind} id: {id}")))?;
    Ok((kind, id))
}

async fn get_history(
    State(ctx): State<AppContext>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryView>, AppError> {
    if !ctx.history.is_enabled() {
        return Err(Error::Config("Trakt client_id and username are required for history".into()).into());
    }
    let view = ctx
        .history
        .view(&params.query(), params.force_refresh())
        .await;
    Ok(Json(view))
}

#[derive(Deserialize)]
struct ReviewsQuery {
    page: Option<u32>,
}

async fn get_reviews(
    State(ctx): State<AppContext>,
    Path((kind, id)): Path<(String, String)>,
    Query(params): Query<ReviewsQuery>,
) -> Result<Json<ReviewPage>, AppError> {
    let (kind, id) = parse_title(&kind, &id)?;
    let page = params.page.unwrap_or(1).max(1);
    Ok(Json(ctx.tmdb.reviews(kind, id, page).await))
}

#[derive(Debug, Serialize)]
struct BackdropEntry {
    url: Option<String>,
    thumbnail: Option<String>,
    width: u32,
    height: u32,
    language: Option<String>,
    vote_average: f64,
}

#[derive(Debug, Serialize)]
struct BackdropList {
    kind: MediaKind,
    id: u64,
    backdrops: Vec<BackdropEntry>,
}

/// Backdrops in ranked order, best first.
async fn get_backdrops(
    State(ctx): State<AppContext>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<BackdropList>, AppError> {
    let (kind, id) = parse_title(&kind, &id)?;
    let images = ctx.tmdb.images(kind, id).await;

    let backdrops = rank_backdrops(&images.backdrops)
        .into_iter()
        .map(|img| BackdropEntry {
            url: ctx.images.url(ImageSize::Original, Some(img.file_path.as_str())),
            thumbnail: ctx.images.url(ImageSize::STILL, Some(img.file_path.as_str())),
            width: img.width,
            height: img.height,
            language: img.iso_639_1.clone(),
            vote_average: img.vote_average,
        })
        .collect();

    Ok(Json(BackdropList {
        kind,
        id,
        backdrops,
    }))
}
