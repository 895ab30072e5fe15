use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::domain::{time_remaining, Category, Countdown, Decimal, Status, TimeMs, Wager, WagerId};
use crate::error::AppError;
use crate::service::NewWager;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWagerRequest {
    pub title: String,
    pub category: String,
    pub stake: Decimal,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagersQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagersResponse {
    pub wagers: Vec<WagerDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerDto {
    pub id: String,
    pub title: String,
    pub category: String,
    pub stake: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_pct: Option<i32>,
    pub deadline_ms: i64,
    pub created_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_pct: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Countdown>,
}

impl WagerDto {
    fn from_wager(wager: &Wager, now: TimeMs) -> Self {
        WagerDto {
            id: wager.id.to_string(),
            title: wager.title.clone(),
            category: wager.category.to_string(),
            stake: wager.stake.to_canonical_string(),
            status: wager.status.to_string(),
            outcome_pct: wager.outcome_pct,
            deadline_ms: wager.deadline_ms.as_ms(),
            created_ms: wager.created_ms.as_ms(),
            completed_ms: wager.completed_ms.map(|t| t.as_ms()),
            parent_id: wager.parent_id.map(|p| p.to_string()),
            health_pct: wager.current_health(now),
            countdown: (wager.status == Status::Open)
                .then(|| time_remaining(wager.deadline_ms, now)),
        }
    }
}

pub async fn create_wager(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateWagerRequest>,
) -> Result<(StatusCode, Json<WagerDto>), AppError> {
    let category = Category::from_str(&req.category).map_err(|_| {
        AppError::BadRequest("category must be one of: TDAY, TWEEK, TMONTH".to_string())
    })?;

    let wager = state
        .service
        .create(
            &user,
            NewWager {
                title: req.title,
                category,
                stake: req.stake,
                parent_id: req.parent_id.map(WagerId::from),
            },
        )
        .await?;

    let now = TimeMs::now();
    Ok((StatusCode::CREATED, Json(WagerDto::from_wager(&wager, now))))
}

pub async fn list_wagers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<WagersQuery>,
) -> Result<Json<WagersResponse>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Status::from_str(s)
                .map_err(|_| AppError::BadRequest("status must be one of: OPEN, WON, LOST".to_string()))
        })
        .transpose()?;

    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Category::from_str(s).map_err(|_| {
                AppError::BadRequest("category must be one of: TDAY, TWEEK, TMONTH".to_string())
            })
        })
        .transpose()?;

    let wagers = state.repo.list_wagers(&user, status, category).await?;

    let now = TimeMs::now();
    let wagers = wagers
        .iter()
        .map(|w| WagerDto::from_wager(w, now))
        .collect();
    Ok(Json(WagersResponse { wagers }))
}

pub async fn win_wager(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WagerDto>, AppError> {
    let wager = state.service.mark_won(&user, WagerId::from(id)).await?;
    Ok(Json(WagerDto::from_wager(&wager, TimeMs::now())))
}

pub async fn lose_wager(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WagerDto>, AppError> {
    let wager = state.service.mark_lost(&user, WagerId::from(id)).await?;
    Ok(Json(WagerDto::from_wager(&wager, TimeMs::now())))
}
