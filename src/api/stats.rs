use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::db::StatsRow;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub user: String,
    pub score: i64,
    pub win_rate: String,
    pub total: i64,
    pub wins: i64,
    pub losses: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub updated_ms: i64,
}

impl From<StatsRow> for StatsResponse {
    fn from(row: StatsRow) -> Self {
        StatsResponse {
            user: row.user.as_str().to_string(),
            score: row.score,
            win_rate: row.win_rate.to_canonical_string(),
            total: row.total,
            wins: row.wins,
            losses: row.losses,
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            updated_ms: row.updated_ms.as_ms(),
        }
    }
}

/// The caller's summary, materialized at the baseline on first read.
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<StatsResponse>, AppError> {
    let row = state.service.stats_for(&user).await?;
    Ok(Json(row.into()))
}
