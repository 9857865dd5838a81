//! Wall-clock access for the player.
//!
//! The only time-dependent behaviour in the player is the completion notice:
//! it is stamped when a lesson is completed and hidden once its display
//! window has elapsed. Services read "now" through [`Clock`] so tests can pin
//! the moment a notice appears and then step past its expiry.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Real time from the operating system.
    #[default]
    System,
    /// Frozen at a moment; only [`Clock::advance`] moves it.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// The instant `window` from now, e.g. when a notice shown now expires.
    #[must_use]
    pub fn deadline(&self, window: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = self.now();
        (now, now + window)
    }

    /// Whether `deadline` has been reached. A notice stops showing at the
    /// exact expiry instant, not one tick after.
    #[must_use]
    pub fn has_passed(&self, deadline: DateTime<Utc>) -> bool {
        self.now() >= deadline
    }

    /// Step a fixed clock forward, typically past a notice's expiry. The
    /// system clock cannot be moved and ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// 2024-03-01T09:00:00Z, the instant test clocks start at.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_709_283_600;

/// # Panics
///
/// Panics if [`FIXED_TEST_TIMESTAMP`] is out of chrono's range.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// A clock frozen at [`FIXED_TEST_TIMESTAMP`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
