pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;

pub use config::Config;
pub use db::{init_db, Repository, StatsRow};
pub use domain::{Category, Countdown, Decimal, Status, TimeMs, UserId, Wager, WagerId};
pub use error::AppError;
pub use service::{FixedRoll, NewWager, PayoutRoll, ThreadRngRoll, WagerService};
