use chrono::{DateTime, Duration, Utc};

/// Injectable time source for quiz sessions.
///
/// `Default` reads the system clock; `Fixed` only moves when advanced, which lets
/// tests step through the feedback delay without waiting.
///
/// `Default` is wall-clock time, not a monotonic source. Deadlines are measured
/// with [`elapsed_between`], so if the system clock steps backwards the feedback
/// delay stalls until time catches up with the armed instant; it never fires
/// early and never goes negative.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a fixed clock forward. No effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Time elapsed from `since` to `now`, never negative.
///
/// A `now` earlier than `since` (wall clock stepped back) counts as no time passed.
#[must_use]
pub fn elapsed_between(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let elapsed = now - since;
    if elapsed < Duration::zero() {
        Duration::zero()
    } else {
        elapsed
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let mut clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
        clock.advance(Duration::milliseconds(1_500));
        assert_eq!(clock.now(), fixed_now() + Duration::milliseconds(1_500));
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let now = fixed_now();
        assert_eq!(
            elapsed_between(now, now - Duration::seconds(3)),
            Duration::zero()
        );
        assert_eq!(
            elapsed_between(now, now + Duration::seconds(3)),
            Duration::seconds(3)
        );
    }
}
