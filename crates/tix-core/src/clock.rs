//! Wall-clock sources for ticket timestamps.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Supplies the current time to ticket operations.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// System time, strictly increasing at microsecond resolution.
///
/// Two calls never return the same instant, so `createdAt` ordering is total
/// for tickets created by one process.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_us: AtomicI64,
}

impl SystemClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_us: AtomicI64::new(0),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let mut last = self.last_us.load(Ordering::Relaxed);
        loop {
            let next = wall.max(last + 1);
            match self
                .last_us
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return micros_to_datetime(next),
                Err(observed) => last = observed,
            }
        }
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now_us: AtomicI64,
    step_us: i64,
}

impl ManualClock {
    /// Start at `start_us`, advancing `step_us` after every reading.
    #[must_use]
    pub const fn new(start_us: i64, step_us: i64) -> Self {
        Self {
            now_us: AtomicI64::new(start_us),
            step_us,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        micros_to_datetime(self.now_us.fetch_add(self.step_us, Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

fn micros_to_datetime(us: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(us).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
