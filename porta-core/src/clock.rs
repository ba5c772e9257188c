//! Time sources.

use std::time::{Duration, Instant};

use chrono::Utc;

use crate::identity::Timestamp;

/// Source of wall-clock time for ledger writes.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Process start marker, captured once at boot and carried in app state.
#[derive(Debug, Clone, Copy)]
pub struct ProcessClock {
    started: Instant,
    started_at: Timestamp,
}

impl ProcessClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whole seconds since start.
    pub fn uptime_secs(&self) -> u64 {
        self.uptime().as_secs()
    }
}

impl Default for ProcessClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let at = Utc.timestamp_opt(1_704_067_200, 0).single().unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_process_clock_uptime_starts_near_zero() {
        let clock = ProcessClock::start();
        assert!(clock.uptime_secs() < 5);
        assert!(clock.started_at() <= Utc::now());
    }
}
