//! Fixed-length countdown shared by the start and capture phases.

use crate::constants::MS_PER_SECOND;

/// Result of polling a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Still running; carries the whole seconds to display (ceiling of remaining)
    Running(u64),
    /// Duration has fully elapsed
    Elapsed,
}

/// A countdown started at a fixed timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    started_at: u64,
    duration_ms: u64,
}

impl Countdown {
    #[must_use]
    pub fn start(now: u64, duration_ms: u64) -> Self {
        Self {
            started_at: now,
            duration_ms,
        }
    }

    /// Milliseconds left, zero once elapsed
    #[must_use]
    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.duration_ms.saturating_sub(now.saturating_sub(self.started_at))
    }

    #[must_use]
    pub fn poll(&self, now: u64) -> CountdownStatus {
        match self.remaining_ms(now) {
            0 => CountdownStatus::Elapsed,
            remaining => CountdownStatus::Running(remaining.div_ceil(MS_PER_SECOND)),
        }
    }

    #[must_use]
    pub fn started_at(&self) -> u64 {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_values() {
        let countdown = Countdown::start(0, 3000);
        assert_eq!(countdown.poll(0), CountdownStatus::Running(3));
        assert_eq!(countdown.poll(999), CountdownStatus::Running(3));
        assert_eq!(countdown.poll(1000), CountdownStatus::Running(2));
        assert_eq!(countdown.poll(1999), CountdownStatus::Running(2));
        assert_eq!(countdown.poll(2000), CountdownStatus::Running(1));
        assert_eq!(countdown.poll(2999), CountdownStatus::Running(1));
        assert_eq!(countdown.poll(3000), CountdownStatus::Elapsed);
        assert_eq!(countdown.poll(10_000), CountdownStatus::Elapsed);
    }

    #[test]
    fn test_offset_start() {
        let countdown = Countdown::start(5000, 3000);
        assert_eq!(countdown.poll(5500), CountdownStatus::Running(3));
        assert_eq!(countdown.remaining_ms(7000), 1000);
        assert_eq!(countdown.poll(8000), CountdownStatus::Elapsed);
    }
}
