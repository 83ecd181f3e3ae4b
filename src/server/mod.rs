use crate::config::Config;
use crate::history::HistoryService;
use crate::render::Images;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use cinescope_tmdb::TmdbClient;
use cinescope_trakt::TraktClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod routes_api;
pub mod routes_pages;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tmdb: Arc<TmdbClient>,
    pub history: Arc<HistoryService>,
    /// Image URL builder for the configured CDN
    pub images: Images,
}

impl AppContext {
    /// Build the API clients and history service from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let tmdb = Arc::new(
            TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDb client")?,
        );
        let trakt = Arc::new(
            TraktClient::new(config.trakt.client.clone())
                .context("Failed to create Trakt client")?,
        );
        let history = Arc::new(HistoryService::new(&config, trakt, tmdb.clone()));
        let images = Images::new(config.tmdb.image_base_url.clone());

        Ok(Self {
            config: Arc::new(config),
            tmdb,
            history,
            images,
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    let static_dir = ctx.config.server.static_dir.clone();

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // HTML pages
        .merge(routes_pages::page_routes())
        // JSON API
        .nest("/api", routes_api::api_routes());

    // Serve static assets if the directory exists
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            app = app.nest_service("/static", ServeDir::new(dir));
        }
    }

    app.fallback(routes_pages::fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(config)?;
    if !ctx.tmdb.is_configured() {
        tracing::warn!("TMDb API key is missing; pages will render without data");
    }
    if ctx.history.is_enabled() {
        tracing::info!(
            user = ctx.history.username().unwrap_or_default(),
            "Trakt history enabled"
        );
    }

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
