//! Payout roll: the random outcome percentage assigned on a win.
//!
//! Settlement is deliberately non-deterministic in production (variable
//! payout is part of the game), so the source of randomness sits behind a
//! trait and tests substitute a fixed roll.

use rand::Rng;

/// Inclusive lower bound of a winning roll.
pub const ROLL_MIN_PCT: i32 = 10;
/// Exclusive upper bound of a winning roll.
pub const ROLL_MAX_PCT: i32 = 40;

/// Source of the winning outcome percentage.
pub trait PayoutRoll: Send + Sync {
    /// Produce an outcome percentage in [`ROLL_MIN_PCT`, `ROLL_MAX_PCT`).
    fn roll(&self) -> i32;
}

/// Production roll backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngRoll;

impl PayoutRoll for ThreadRngRoll {
    fn roll(&self) -> i32 {
        rand::thread_rng().gen_range(ROLL_MIN_PCT..ROLL_MAX_PCT)
    }
}

/// Deterministic roll for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRoll(pub i32);

impl PayoutRoll for FixedRoll {
    fn roll(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_rng_roll_stays_in_range() {
        let roll = ThreadRngRoll;
        for _ in 0..200 {
            let pct = roll.roll();
            assert!((ROLL_MIN_PCT..ROLL_MAX_PCT).contains(&pct), "out of range: {}", pct);
        }
    }

    #[test]
    fn fixed_roll_is_deterministic() {
        let roll = FixedRoll(20);
        assert_eq!(roll.roll(), 20);
        assert_eq!(roll.roll(), 20);
    }
}
