pub mod lifecycle;
pub mod roll;

pub use lifecycle::{LifecycleError, NewWager, WagerService};
pub use roll::{FixedRoll, PayoutRoll, ThreadRngRoll};
