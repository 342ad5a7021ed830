//! t2k-api library - Top 2000 chart service
//!
//! Serves yearly chart listings, artist and song lookups, admin edits and
//! the year-over-year statistics report.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod source;
pub mod stats;

pub use error::{ApiError, ApiResult};

use source::ChartDataSource;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Chart data behind the statistics report and year range checks
    pub source: Arc<dyn ChartDataSource>,
    /// Shared secret for admin request authentication (`0` disables it)
    pub shared_secret: i64,
}

impl AppState {
    pub fn new(db: SqlitePool, source: Arc<dyn ChartDataSource>, shared_secret: i64) -> Self {
        Self {
            db,
            source,
            shared_secret,
        }
    }
}

/// Build application router
///
/// Admin update routes sit behind the signed-body middleware; everything
/// else is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, put};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/artists/update/:artist_id", put(api::update_artist))
        .route("/song/update/:song_id", put(api::update_song))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/statistieken/:year", get(api::get_statistics))
        .route("/top2000/:year", get(api::get_chart))
        .route("/artists", get(api::get_artists))
        .route("/song/details", get(api::get_song_detail))
        .route("/song/getallsongs", get(api::get_all_songs))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
