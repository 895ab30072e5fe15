use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user: String,
    pub score: i64,
    pub win_rate: String,
    pub wins: i64,
    pub losses: i64,
    pub current_streak: i64,
}

/// All user summaries ranked by score. Ties break by win rate, then by user
/// id, so ranks are deterministic.
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let mut rows = state.repo.list_all_stats().await?;

    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.win_rate.cmp(&a.win_rate))
            .then_with(|| a.user.as_str().cmp(b.user.as_str()))
    });

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| LeaderboardEntry {
            rank: (idx + 1) as i64,
            user: row.user.as_str().to_string(),
            score: row.score,
            win_rate: row.win_rate.to_canonical_string(),
            wins: row.wins,
            losses: row.losses,
            current_streak: row.current_streak,
        })
        .collect();

    Ok(Json(entries))
}
