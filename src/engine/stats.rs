//! Score aggregation: full-history replay into a user summary.
//!
//! The summary is a derived projection with no authority of its own, so it is
//! always rebuilt from the fixed baseline rather than patched incrementally.
//! That makes the aggregator self-healing: any missed settlement is absorbed
//! by the next replay.

use crate::domain::{Decimal, Status, Wager};

/// Freshly computed user summary, ready to overwrite the stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub score: i64,
    /// Percentage in [0, 100], two decimal places.
    pub win_rate: Decimal,
    pub total: i64,
    pub wins: i64,
    pub losses: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

/// Recompute a user's summary from their entire wager history.
///
/// Resolved wagers are replayed in chronological order of resolution time
/// (completion time, falling back to creation time), ties broken by wager id
/// so the replay is deterministic. Open wagers count toward `total` only.
///
/// `prev_longest` is the stored high-water mark: the longest streak is
/// monotonically non-decreasing, never rebuilt from history, while the
/// current streak is always exact.
pub fn recompute(
    history: &[Wager],
    baseline: i64,
    prev_longest: i64,
    default_payout_pct: i32,
) -> StatsSnapshot {
    let mut resolved: Vec<&Wager> = history.iter().filter(|w| w.status.is_resolved()).collect();
    resolved.sort_by(|a, b| {
        a.resolved_at()
            .cmp(&b.resolved_at())
            .then_with(|| a.id.cmp(&b.id))
    });

    let total = history.len() as i64;
    let wins = resolved.iter().filter(|w| w.status == Status::Won).count() as i64;
    let losses = resolved.len() as i64 - wins;

    let mut score = Decimal::from(baseline);
    for wager in &resolved {
        score = score + wager.payout(default_payout_pct);
    }

    let win_rate = if total > 0 {
        (Decimal::from(wins) / Decimal::from(total) * Decimal::hundred()).round_dp(2)
    } else {
        Decimal::zero()
    };

    let current_streak = resolved
        .iter()
        .rev()
        .take_while(|w| w.status == Status::Won)
        .count() as i64;

    StatsSnapshot {
        score: score.round_to_i64(),
        win_rate,
        total,
        wins,
        losses,
        current_streak,
        longest_streak: prev_longest.max(current_streak),
    }
}
