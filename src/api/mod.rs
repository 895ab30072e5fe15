pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod stats;
pub mod wagers;

use crate::db::Repository;
use crate::service::WagerService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub service: Arc<WagerService>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, service: Arc<WagerService>) -> Self {
        Self { repo, service }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/wagers",
            get(wagers::list_wagers).post(wagers::create_wager),
        )
        .route("/v1/wagers/:id/win", post(wagers::win_wager))
        .route("/v1/wagers/:id/lose", post(wagers::lose_wager))
        .route("/v1/stats", get(stats::get_stats))
        .route("/v1/leaderboard", get(leaderboard::get_leaderboard))
        .layer(cors)
        .with_state(state)
}
