//! Repository layer for database operations.
//!
//! All access to the wager and user_stats tables goes through `Repository`,
//! which is handed to services explicitly so tests can run against a
//! temporary database. Decimals are stored as canonical TEXT to avoid
//! SQLite's float affinity.

use crate::domain::{Category, Decimal, Status, TimeMs, UserId, Wager, WagerId};
use crate::engine::stats::StatsSnapshot;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// Stored user summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub user: UserId,
    pub score: i64,
    pub win_rate: Decimal,
    pub total: i64,
    pub wins: i64,
    pub losses: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub updated_ms: TimeMs,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Wager operations
    // =========================================================================

    /// Insert a newly created wager.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_wager(&self, wager: &Wager) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO wagers
            (id, user, title, category, stake, status, outcome_pct, deadline_ms,
             created_ms, completed_ms, parent_id, health_pct, last_activity_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(wager.id.to_string())
        .bind(wager.user.as_str())
        .bind(&wager.title)
        .bind(wager.category.as_str())
        .bind(wager.stake.to_canonical_string())
        .bind(wager.status.as_str())
        .bind(wager.outcome_pct)
        .bind(wager.deadline_ms.as_ms())
        .bind(wager.created_ms.as_ms())
        .bind(wager.completed_ms.map(|t| t.as_ms()))
        .bind(wager.parent_id.map(|p| p.to_string()))
        .bind(wager.health_pct)
        .bind(wager.last_activity_ms.map(|t| t.as_ms()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a single wager by id, filtered to the owning user.
    pub async fn get_wager(
        &self,
        id: WagerId,
        user: &UserId,
    ) -> Result<Option<Wager>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM wagers WHERE id = ? AND user = ?")
            .bind(id.to_string())
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| wager_from_row(&r)))
    }

    /// List a user's wagers, newest first, with optional status and category
    /// filters.
    pub async fn list_wagers(
        &self,
        user: &UserId,
        status: Option<Status>,
        category: Option<Category>,
    ) -> Result<Vec<Wager>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM wagers
            WHERE user = ?
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR category = ?)
            ORDER BY created_ms DESC, id DESC
            "#,
        )
        .bind(user.as_str())
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .bind(category.map(|c| c.as_str()))
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(wager_from_row).collect())
    }

    /// Fetch a user's entire wager history, for score aggregation.
    pub async fn list_history(&self, user: &UserId) -> Result<Vec<Wager>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM wagers WHERE user = ? ORDER BY created_ms ASC, id ASC")
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(wager_from_row).collect())
    }

    /// Count a user's OPEN wagers of a category created inside [from_ms, to_ms).
    ///
    /// Backs the one-open-TDAY-per-day pre-check. It is a plain read; two
    /// concurrent creations can both pass it (documented race).
    pub async fn count_open_in_window(
        &self,
        user: &UserId,
        category: Category,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM wagers
            WHERE user = ? AND category = ? AND status = 'OPEN'
              AND created_ms >= ? AND created_ms < ?
            "#,
        )
        .bind(user.as_str())
        .bind(category.as_str())
        .bind(from_ms.as_ms())
        .bind(to_ms.as_ms())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("n"))
    }

    /// Settle a wager with a row filter on id, owner, and OPEN status.
    ///
    /// Returns the number of rows affected: zero means not found, not owned,
    /// or already settled, which the caller cannot tell apart.
    pub async fn settle_wager(
        &self,
        id: WagerId,
        user: &UserId,
        status: Status,
        outcome_pct: i32,
        completed_ms: TimeMs,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE wagers
            SET status = ?, outcome_pct = ?, completed_ms = ?
            WHERE id = ? AND user = ? AND status = 'OPEN'
            "#,
        )
        .bind(status.as_str())
        .bind(outcome_pct)
        .bind(completed_ms.as_ms())
        .bind(id.to_string())
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Restore health on a linked TMONTH wager and stamp its last activity.
    ///
    /// No-op when the target is missing, not owned, or carries no health.
    pub async fn restore_health(
        &self,
        id: WagerId,
        user: &UserId,
        amount: i32,
        now: TimeMs,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE wagers
            SET health_pct = MIN(100, COALESCE(health_pct, 0) + ?),
                last_activity_ms = ?
            WHERE id = ? AND user = ? AND health_pct IS NOT NULL AND status = 'OPEN'
            "#,
        )
        .bind(amount)
        .bind(now.as_ms())
        .bind(id.to_string())
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List every OPEN wager whose deadline has passed, across all users.
    pub async fn list_expired_open(&self, now: TimeMs) -> Result<Vec<Wager>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM wagers
            WHERE status = 'OPEN' AND deadline_ms <= ?
            ORDER BY deadline_ms ASC, id ASC
            "#,
        )
        .bind(now.as_ms())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(wager_from_row).collect())
    }

    // =========================================================================
    // User stats operations
    // =========================================================================

    /// Fetch a user's stored summary, if one exists.
    pub async fn get_stats(&self, user: &UserId) -> Result<Option<StatsRow>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM user_stats WHERE user = ?")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| stats_from_row(&r)))
    }

    /// Overwrite a user's summary in full (upsert keyed by user).
    pub async fn upsert_stats(
        &self,
        user: &UserId,
        stats: &StatsSnapshot,
        updated_ms: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_stats
            (user, score, win_rate, total, wins, losses, current_streak, longest_streak, updated_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user) DO UPDATE SET
                score = excluded.score,
                win_rate = excluded.win_rate,
                total = excluded.total,
                wins = excluded.wins,
                losses = excluded.losses,
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                updated_ms = excluded.updated_ms
            "#,
        )
        .bind(user.as_str())
        .bind(stats.score)
        .bind(stats.win_rate.to_canonical_string())
        .bind(stats.total)
        .bind(stats.wins)
        .bind(stats.losses)
        .bind(stats.current_streak)
        .bind(stats.longest_streak)
        .bind(updated_ms.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch every stored summary. Ranking happens in Rust so win-rate ties
    /// compare as decimals, not TEXT.
    pub async fn list_all_stats(&self) -> Result<Vec<StatsRow>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM user_stats")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(stats_from_row).collect())
    }
}

fn wager_from_row(row: &SqliteRow) -> Wager {
    let id_str: String = row.get("id");
    let stake_str: String = row.get("stake");
    let category_str: String = row.get("category");
    let status_str: String = row.get("status");
    let parent_str: Option<String> = row.get("parent_id");

    let stake = Decimal::from_str(&stake_str).unwrap_or_else(|e| {
        warn!(id = %id_str, stake = %stake_str, error = %e, "Failed to parse stake decimal, using default");
        Decimal::default()
    });

    Wager {
        id: WagerId::parse(&id_str).unwrap_or_else(|_| {
            warn!(id = %id_str, "Malformed wager id in database");
            WagerId(uuid::Uuid::nil())
        }),
        user: UserId::new(row.get("user")),
        title: row.get("title"),
        category: Category::from_str(&category_str).unwrap_or(Category::Tday),
        stake,
        status: Status::from_str(&status_str).unwrap_or(Status::Open),
        outcome_pct: row.get("outcome_pct"),
        deadline_ms: TimeMs::new(row.get("deadline_ms")),
        created_ms: TimeMs::new(row.get("created_ms")),
        completed_ms: row.get::<Option<i64>, _>("completed_ms").map(TimeMs::new),
        parent_id: parent_str.and_then(|p| WagerId::parse(&p).ok()),
        health_pct: row.get("health_pct"),
        last_activity_ms: row
            .get::<Option<i64>, _>("last_activity_ms")
            .map(TimeMs::new),
    }
}

fn stats_from_row(row: &SqliteRow) -> StatsRow {
    let user: String = row.get("user");
    let win_rate_str: String = row.get("win_rate");
    let win_rate = Decimal::from_str(&win_rate_str).unwrap_or_else(|e| {
        warn!(user = %user, win_rate = %win_rate_str, error = %e, "Failed to parse win_rate decimal, using default");
        Decimal::default()
    });

    StatsRow {
        user: UserId::new(user),
        score: row.get("score"),
        win_rate,
        total: row.get("total"),
        wins: row.get("wins"),
        losses: row.get("losses"),
        current_streak: row.get("current_streak"),
        longest_streak: row.get("longest_streak"),
        updated_ms: TimeMs::new(row.get("updated_ms")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn open_wager(user: &str, category: Category, created_ms: i64) -> Wager {
        Wager {
            id: WagerId::generate(),
            user: UserId::new(user.to_string()),
            title: "read forty pages".to_string(),
            category,
            stake: Decimal::from_str("500").unwrap(),
            status: Status::Open,
            outcome_pct: None,
            deadline_ms: TimeMs::new(created_ms + 1000),
            created_ms: TimeMs::new(created_ms),
            completed_ms: None,
            parent_id: None,
            health_pct: (category == Category::Tmonth).then_some(100),
            last_activity_ms: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_wager_roundtrip() {
        let (repo, _temp) = setup_test_db().await;
        let wager = open_wager("u1", Category::Tday, 1000);

        repo.insert_wager(&wager).await.unwrap();
        let fetched = repo.get_wager(wager.id, &wager.user).await.unwrap();
        assert_eq!(fetched, Some(wager));
    }

    #[tokio::test]
    async fn test_get_wager_filters_by_owner() {
        let (repo, _temp) = setup_test_db().await;
        let wager = open_wager("u1", Category::Tday, 1000);
        repo.insert_wager(&wager).await.unwrap();

        let other = UserId::new("u2".to_string());
        assert_eq!(repo.get_wager(wager.id, &other).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_settle_requires_open_status() {
        let (repo, _temp) = setup_test_db().await;
        let wager = open_wager("u1", Category::Tweek, 1000);
        repo.insert_wager(&wager).await.unwrap();

        let first = repo
            .settle_wager(wager.id, &wager.user, Status::Won, 20, TimeMs::new(2000))
            .await
            .unwrap();
        assert_eq!(first, 1);

        // Already settled: the row filter matches nothing.
        let second = repo
            .settle_wager(wager.id, &wager.user, Status::Lost, -100, TimeMs::new(3000))
            .await
            .unwrap();
        assert_eq!(second, 0);

        let fetched = repo.get_wager(wager.id, &wager.user).await.unwrap().unwrap();
        assert_eq!(fetched.status, Status::Won);
        assert_eq!(fetched.outcome_pct, Some(20));
        assert_eq!(fetched.completed_ms, Some(TimeMs::new(2000)));
    }

    #[tokio::test]
    async fn test_settle_zero_rows_for_foreign_owner() {
        let (repo, _temp) = setup_test_db().await;
        let wager = open_wager("u1", Category::Tweek, 1000);
        repo.insert_wager(&wager).await.unwrap();

        let other = UserId::new("u2".to_string());
        let affected = repo
            .settle_wager(wager.id, &other, Status::Won, 20, TimeMs::new(2000))
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_count_open_in_window() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1".to_string());
        repo.insert_wager(&open_wager("u1", Category::Tday, 1000))
            .await
            .unwrap();
        repo.insert_wager(&open_wager("u1", Category::Tday, 90_000_000))
            .await
            .unwrap();

        let n = repo
            .count_open_in_window(&user, Category::Tday, TimeMs::new(0), TimeMs::new(86_400_000))
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn test_list_expired_open_only_returns_overdue() {
        let (repo, _temp) = setup_test_db().await;
        let due = open_wager("u1", Category::Tday, 1000);
        let not_due = open_wager("u2", Category::Tweek, 10_000);
        repo.insert_wager(&due).await.unwrap();
        repo.insert_wager(&not_due).await.unwrap();

        let expired = repo.list_expired_open(TimeMs::new(5000)).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, due.id);
    }

    #[tokio::test]
    async fn test_restore_health_caps_at_hundred() {
        let (repo, _temp) = setup_test_db().await;
        let mut wager = open_wager("u1", Category::Tmonth, 1000);
        wager.health_pct = Some(95);
        repo.insert_wager(&wager).await.unwrap();

        let affected = repo
            .restore_health(wager.id, &wager.user, 15, TimeMs::new(2000))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let fetched = repo.get_wager(wager.id, &wager.user).await.unwrap().unwrap();
        assert_eq!(fetched.health_pct, Some(100));
        assert_eq!(fetched.last_activity_ms, Some(TimeMs::new(2000)));
    }

    #[tokio::test]
    async fn test_upsert_stats_overwrites_in_full() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("u1".to_string());

        let first = StatsSnapshot {
            score: 10_200,
            win_rate: Decimal::from_str("100").unwrap(),
            total: 1,
            wins: 1,
            losses: 0,
            current_streak: 1,
            longest_streak: 1,
        };
        repo.upsert_stats(&user, &first, TimeMs::new(1000))
            .await
            .unwrap();

        let second = StatsSnapshot {
            score: 9_900,
            win_rate: Decimal::from_str("50").unwrap(),
            total: 2,
            wins: 1,
            losses: 1,
            current_streak: 0,
            longest_streak: 1,
        };
        repo.upsert_stats(&user, &second, TimeMs::new(2000))
            .await
            .unwrap();

        let row = repo.get_stats(&user).await.unwrap().unwrap();
        assert_eq!(row.score, 9_900);
        assert_eq!(row.total, 2);
        assert_eq!(row.updated_ms, TimeMs::new(2000));
    }
}
