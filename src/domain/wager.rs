//! The Wager record: a staked commitment with a deadline and a settlement.

use crate::domain::{Decimal, TimeMs, UserId, WagerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome percentage written by mark-lost. A marker only; losses always pay
/// back the negated stake regardless of this value.
pub const LOSS_MARKER_PCT: i32 = -100;

/// Payout percentage applied to a win when no roll was recorded.
pub const DEFAULT_PAYOUT_PCT: i32 = 20;

/// Health points a TMONTH wager loses per full day without activity.
pub const HEALTH_DECAY_PER_DAY: i32 = 5;

/// Health points restored to a linked TMONTH wager when a child wager wins.
pub const HEALTH_RESTORE_ON_WIN: i32 = 15;

const MS_PER_DAY: i64 = 86_400_000;

/// Time-horizon class of a wager. The names read as tickers in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Shortest horizon: resolves within 16 hours.
    Tday,
    /// One-week horizon.
    Tweek,
    /// One-month horizon; carries decaying health.
    Tmonth,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tday => "TDAY",
            Category::Tweek => "TWEEK",
            Category::Tmonth => "TMONTH",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TDAY" => Ok(Category::Tday),
            "TWEEK" => Ok(Category::Tweek),
            "TMONTH" => Ok(Category::Tmonth),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status. Transitions only OPEN -> WON and OPEN -> LOST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Open,
    Won,
    Lost,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Won => "WON",
            Status::Lost => "LOST",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Status::Open)
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Status::Open),
            "WON" => Ok(Status::Won),
            "LOST" => Ok(Status::Lost),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A staked commitment owned by a single user.
///
/// Stake and deadline are immutable after creation; settlement writes status,
/// outcome percentage, and completion time exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: WagerId,
    pub user: UserId,
    pub title: String,
    pub category: Category,
    pub stake: Decimal,
    pub status: Status,
    /// [10, 40) for wins, `LOSS_MARKER_PCT` for losses, None while open.
    pub outcome_pct: Option<i32>,
    pub deadline_ms: TimeMs,
    pub created_ms: TimeMs,
    pub completed_ms: Option<TimeMs>,
    /// Longer-horizon wager whose health a win on this wager restores.
    pub parent_id: Option<WagerId>,
    /// 0-100, TMONTH only. Stored value; decay is applied at read time.
    pub health_pct: Option<i32>,
    pub last_activity_ms: Option<TimeMs>,
}

impl Wager {
    /// Signed payout of a resolved wager (the P&L calculator).
    ///
    /// Pure and idempotent: WON pays stake x (outcome_pct or `default_pct`)/100,
    /// LOST pays the negated stake, OPEN pays zero.
    pub fn payout(&self, default_pct: i32) -> Decimal {
        match self.status {
            Status::Won => {
                let pct = self.outcome_pct.unwrap_or(default_pct);
                self.stake * Decimal::from(pct) / Decimal::hundred()
            }
            Status::Lost => -self.stake,
            Status::Open => Decimal::zero(),
        }
    }

    /// Resolution time used for replay ordering: completion time, falling
    /// back to creation time when settlement never stamped one.
    pub fn resolved_at(&self) -> TimeMs {
        self.completed_ms.unwrap_or(self.created_ms)
    }

    /// Health after decay, as of `now`: 5 points per full day since the last
    /// activity, floored at zero. None for wagers that carry no health.
    pub fn current_health(&self, now: TimeMs) -> Option<i32> {
        let stored = self.health_pct?;
        let since = self.last_activity_ms.unwrap_or(self.created_ms);
        let idle_days = (now.as_ms() - since.as_ms()).max(0) / MS_PER_DAY;
        let decayed = stored as i64 - idle_days * HEALTH_DECAY_PER_DAY as i64;
        Some(decayed.clamp(0, 100) as i32)
    }
}
