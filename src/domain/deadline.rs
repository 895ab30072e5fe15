//! Deadline and time-remaining calculators.
//!
//! Both are pure over an explicit `now` so tests never touch the wall clock.

use crate::domain::wager::Category;
use crate::domain::TimeMs;
use serde::Serialize;

const MS_PER_SECOND: i64 = 1000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

/// Hours until a TDAY wager expires.
pub const TDAY_HORIZON_HOURS: i64 = 16;
/// Whole days until a TWEEK wager expires.
pub const TWEEK_HORIZON_DAYS: i64 = 7;
/// Whole days until a TMONTH wager expires.
pub const TMONTH_HORIZON_DAYS: i64 = 30;

/// Expiration timestamp for a wager created at `now`. Infallible.
pub fn deadline_for(category: Category, now: TimeMs) -> TimeMs {
    let span_ms = match category {
        Category::Tday => TDAY_HORIZON_HOURS * MS_PER_HOUR,
        Category::Tweek => TWEEK_HORIZON_DAYS * MS_PER_DAY,
        Category::Tmonth => TMONTH_HORIZON_DAYS * MS_PER_DAY,
    };
    TimeMs::new(now.as_ms() + span_ms)
}

/// Countdown breakdown of the time left until a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_expired: bool,
}

impl Countdown {
    fn expired() -> Self {
        Countdown {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            is_expired: true,
        }
    }
}

/// Decompose the remaining duration with floor division at each unit
/// boundary; partial seconds are discarded. Zeroed and expired once the
/// deadline has passed.
pub fn time_remaining(deadline: TimeMs, now: TimeMs) -> Countdown {
    if deadline <= now {
        return Countdown::expired();
    }

    let mut remaining_s = (deadline.as_ms() - now.as_ms()) / MS_PER_SECOND;
    let days = remaining_s / 86_400;
    remaining_s %= 86_400;
    let hours = remaining_s / 3_600;
    remaining_s %= 3_600;
    let minutes = remaining_s / 60;
    let seconds = remaining_s % 60;

    Countdown {
        days,
        hours,
        minutes,
        seconds,
        is_expired: false,
    }
}
