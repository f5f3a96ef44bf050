//! Clock sources.
use core::sync::atomic::{AtomicI64, Ordering};

use crate::Timestamp;

/// A source of the current time.
pub trait Clock {
    /// Sample the clock.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &T {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// The system wall clock.
///
/// The values it returns are not monotonic. If the system clock is stepped
/// backwards, a later sample can be smaller than an earlier one; no
/// correction is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(chrono_0p4::Utc::now().timestamp_micros())
    }
}

/// A clock that only moves when told to. Useful for making time-dependent
/// code deterministic in tests.
///
/// # Examples
///
/// ```
/// use microstamp::{Clock, ManualClock, Timestamp};
///
/// let clock = ManualClock::new(Timestamp::from_secs(10));
/// clock.advance(Timestamp::from_millis(1_500));
/// assert_eq!(clock.now(), Timestamp::from_micros(11_500_000));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    /// Construct a `ManualClock` that reads `start` until changed.
    pub const fn new(start: Timestamp) -> Self {
        Self {
            micros: AtomicI64::new(start.as_micros()),
        }
    }

    /// Set the current time.
    pub fn set(&self, now: Timestamp) {
        log::trace!("ManualClock::set({now:?})");
        self.micros.store(now.as_micros(), Ordering::Relaxed);
    }

    /// Move the current time by `delta`, which may be negative. Wraps around
    /// on overflow.
    pub fn advance(&self, delta: Timestamp) {
        let old = self.micros.fetch_add(delta.as_micros(), Ordering::Relaxed);
        log::trace!(
            "ManualClock::advance({delta:?}): {:?} → {:?}",
            Timestamp::from_micros(old),
            Timestamp::from_micros(old.wrapping_add(delta.as_micros())),
        );
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Relaxed))
    }
}
