//! Clock port - 時刻の抽象化
//!
//! 判定には単調増加する `Instant` を、レコードや batch id には壁時計
//! （`DateTime<Utc>`）を使います。テストでは ManualClock で両方を固定します。

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    /// Monotonic time used for upload decisions.
    fn now(&self) -> Instant;

    /// Wall-clock time used for record timestamps and ids.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Both readings advance together, so `now()` and `utc_now()` stay in step.
#[derive(Debug)]
pub struct ManualClock {
    inner: Mutex<(Instant, DateTime<Utc>)>,
}

impl ManualClock {
    pub fn new(start: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new((start, wall)),
        }
    }

    /// Start at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Instant::now(), Utc::now())
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.0 += by;
        guard.1 += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances_both_readings() {
        let start = Instant::now();
        let wall = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start, wall);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.utc_now(), wall);

        clock.advance(Duration::from_millis(1500));

        assert_eq!(clock.now(), start + Duration::from_millis(1500));
        assert_eq!(clock.utc_now(), wall + chrono::Duration::milliseconds(1500));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
