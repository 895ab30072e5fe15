//! Wager lifecycle operations: create, mark-won, mark-lost, settle-expired.
//!
//! Every operation takes the authenticated caller explicitly, writes through
//! the repository, and then triggers a full score recomputation for the
//! affected user. Storage errors propagate unmodified; there is no retry and
//! the recomputation is not transactional with the triggering write.

use crate::db::{Repository, StatsRow};
use crate::domain::wager::{HEALTH_RESTORE_ON_WIN, LOSS_MARKER_PCT};
use crate::domain::{deadline_for, Category, Decimal, Status, TimeMs, UserId, Wager, WagerId};
use crate::engine::stats::{self, StatsSnapshot};
use crate::service::roll::PayoutRoll;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("an open TDAY wager already exists for today")]
    DuplicateDaily,
    #[error("wager not found")]
    NotFound,
    #[error("stake must be positive")]
    InvalidStake,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Inputs to wager creation.
#[derive(Debug, Clone)]
pub struct NewWager {
    pub title: String,
    pub category: Category,
    pub stake: Decimal,
    pub parent_id: Option<WagerId>,
}

/// Coordinates the repository, the payout roll, and the score aggregator.
pub struct WagerService {
    repo: Arc<Repository>,
    roll: Arc<dyn PayoutRoll>,
    base_score: i64,
    default_payout_pct: i32,
}

impl WagerService {
    pub fn new(
        repo: Arc<Repository>,
        roll: Arc<dyn PayoutRoll>,
        base_score: i64,
        default_payout_pct: i32,
    ) -> Self {
        Self {
            repo,
            roll,
            base_score,
            default_payout_pct,
        }
    }

    /// Create an OPEN wager for the caller, deadline derived from category.
    ///
    /// TDAY wagers are limited to one open per UTC calendar day via a read
    /// pre-check. Two concurrent creations can both pass it; the race is
    /// accepted behavior.
    pub async fn create(&self, user: &UserId, input: NewWager) -> Result<Wager, LifecycleError> {
        if input.title.trim().is_empty() {
            return Err(LifecycleError::EmptyTitle);
        }
        if !input.stake.is_positive() {
            return Err(LifecycleError::InvalidStake);
        }

        let now = TimeMs::now();

        if input.category == Category::Tday {
            let day_start = utc_day_start(now);
            let day_end = TimeMs::new(day_start.as_ms() + MS_PER_DAY);
            let open_today = self
                .repo
                .count_open_in_window(user, Category::Tday, day_start, day_end)
                .await?;
            if open_today > 0 {
                return Err(LifecycleError::DuplicateDaily);
            }
        }

        let wager = Wager {
            id: WagerId::generate(),
            user: user.clone(),
            title: input.title.trim().to_string(),
            category: input.category,
            stake: input.stake,
            status: Status::Open,
            outcome_pct: None,
            deadline_ms: deadline_for(input.category, now),
            created_ms: now,
            completed_ms: None,
            parent_id: input.parent_id,
            health_pct: (input.category == Category::Tmonth).then_some(100),
            last_activity_ms: (input.category == Category::Tmonth).then_some(now),
        };

        self.repo.insert_wager(&wager).await?;
        info!(user = %user, id = %wager.id, category = %wager.category, "Wager created");

        self.recompute_stats(user, now).await?;
        Ok(wager)
    }

    /// Settle a wager as won with a rolled outcome percentage in [10, 40).
    ///
    /// A win on a wager linked to a TMONTH parent restores the parent's
    /// health and stamps its last activity.
    pub async fn mark_won(&self, user: &UserId, id: WagerId) -> Result<Wager, LifecycleError> {
        let now = TimeMs::now();
        let pct = self.roll.roll();

        let affected = self
            .repo
            .settle_wager(id, user, Status::Won, pct, now)
            .await?;
        if affected == 0 {
            return Err(LifecycleError::NotFound);
        }

        let wager = self
            .repo
            .get_wager(id, user)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if let Some(parent_id) = wager.parent_id {
            self.repo
                .restore_health(parent_id, user, HEALTH_RESTORE_ON_WIN, now)
                .await?;
        }

        info!(user = %user, id = %id, outcome_pct = pct, "Wager won");
        self.recompute_stats(user, now).await?;
        Ok(wager)
    }

    /// Settle a wager as lost. The loss marker percentage is recorded but the
    /// payout is always the negated stake.
    pub async fn mark_lost(&self, user: &UserId, id: WagerId) -> Result<Wager, LifecycleError> {
        let now = TimeMs::now();

        let affected = self
            .repo
            .settle_wager(id, user, Status::Lost, LOSS_MARKER_PCT, now)
            .await?;
        if affected == 0 {
            return Err(LifecycleError::NotFound);
        }

        let wager = self
            .repo
            .get_wager(id, user)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        info!(user = %user, id = %id, "Wager lost");
        self.recompute_stats(user, now).await?;
        Ok(wager)
    }

    /// Mark every OPEN wager past its deadline as lost and recompute stats
    /// for each affected user. Returns the number of wagers settled.
    pub async fn settle_expired(&self, now: TimeMs) -> Result<usize, LifecycleError> {
        let expired = self.repo.list_expired_open(now).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut settled = 0usize;
        let mut affected_users: BTreeSet<UserId> = BTreeSet::new();

        for wager in &expired {
            let affected = self
                .repo
                .settle_wager(wager.id, &wager.user, Status::Lost, LOSS_MARKER_PCT, now)
                .await?;
            if affected > 0 {
                settled += 1;
                affected_users.insert(wager.user.clone());
            }
        }

        for user in &affected_users {
            self.recompute_stats(user, now).await?;
        }

        info!(settled, users = affected_users.len(), "Expired wagers settled");
        Ok(settled)
    }

    /// Fetch the caller's summary, materializing a baseline row on first read.
    pub async fn stats_for(&self, user: &UserId) -> Result<StatsRow, LifecycleError> {
        if let Some(row) = self.repo.get_stats(user).await? {
            return Ok(row);
        }

        let now = TimeMs::now();
        let baseline = StatsSnapshot {
            score: self.base_score,
            win_rate: Decimal::zero(),
            total: 0,
            wins: 0,
            losses: 0,
            current_streak: 0,
            longest_streak: 0,
        };
        self.repo.upsert_stats(user, &baseline, now).await?;

        Ok(StatsRow {
            user: user.clone(),
            score: baseline.score,
            win_rate: baseline.win_rate,
            total: 0,
            wins: 0,
            losses: 0,
            current_streak: 0,
            longest_streak: 0,
            updated_ms: now,
        })
    }

    /// Rebuild the user's summary from their full history.
    ///
    /// An empty history writes nothing; the stored longest streak survives as
    /// the high-water mark fed into the recomputation.
    async fn recompute_stats(&self, user: &UserId, now: TimeMs) -> Result<(), LifecycleError> {
        let history = self.repo.list_history(user).await?;
        if history.is_empty() {
            return Ok(());
        }

        let prev_longest = self
            .repo
            .get_stats(user)
            .await?
            .map(|s| s.longest_streak)
            .unwrap_or(0);

        let snapshot = stats::recompute(
            &history,
            self.base_score,
            prev_longest,
            self.default_payout_pct,
        );
        self.repo.upsert_stats(user, &snapshot, now).await?;
        Ok(())
    }
}

/// Start of the UTC calendar day containing `t`.
fn utc_day_start(t: TimeMs) -> TimeMs {
    let dt = DateTime::<Utc>::from_timestamp_millis(t.as_ms()).unwrap_or_default();
    let midnight = dt
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    TimeMs::new(midnight.timestamp_millis())
}
