//! Derived-state engines: score aggregation and deadline sweeping.

pub mod stats;
pub mod sweeper;

pub use stats::{recompute, StatsSnapshot};
pub use sweeper::{ExpirySweeper, SweeperHandle};
