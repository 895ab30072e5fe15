//! Domain types and pure calculators for the wager ledger.
//!
//! This module provides:
//! - Lossless numeric handling via a Decimal wrapper
//! - Domain primitives: TimeMs, UserId, WagerId
//! - The Wager record with category, status, and P&L calculation
//! - Deadline and countdown calculators, pure over an explicit `now`

pub mod deadline;
pub mod money;
pub mod primitives;
pub mod wager;

pub use deadline::{deadline_for, time_remaining, Countdown};
pub use money::Decimal;
pub use primitives::{TimeMs, UserId, WagerId};
pub use wager::{Category, Status, Wager};
