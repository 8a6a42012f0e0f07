//! Clock sources and interval helpers

use core::sync::atomic::{AtomicU64, Ordering};

pub const NSECONDS_IN_SEC: u64 = 1_000_000_000;
pub const USECONDS_IN_SEC: u64 = 1_000_000;
pub const MSECONDS_IN_SEC: u64 = 1_000;

pub const NSECONDS_IN_MSEC: u64 = NSECONDS_IN_SEC / MSECONDS_IN_SEC;

/// Nanosecond delta between two readings; a clock going backwards yields 0.
#[inline]
pub fn diff_nsec(start: u64, end: u64) -> u64 {
    end.saturating_sub(start)
}

#[inline]
pub fn diff_usec(start: u64, end: u64) -> u64 {
    diff_nsec(start, end) / (NSECONDS_IN_SEC / USECONDS_IN_SEC)
}

#[inline]
pub fn diff_msec(start: u64, end: u64) -> f64 {
    diff_nsec(start, end) as f64 / NSECONDS_IN_MSEC as f64
}

#[inline]
pub fn diff_sec(start: u64, end: u64) -> f64 {
    diff_nsec(start, end) as f64 / NSECONDS_IN_SEC as f64
}

/// Monotonic time source in nanoseconds
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// Host monotonic clock, anchored at construction
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Host wall clock (`CLOCK_REALTIME`), nanoseconds since the Unix epoch
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

#[cfg(feature = "std")]
impl Clock for WallClock {
    fn now_ns(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Clock advanced by hand; used by tests and by targets without a timer.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self {
            now: AtomicU64::new(0),
        }
    }

    pub fn set(&self, ns: u64) {
        self.now.store(ns, Ordering::SeqCst);
    }

    pub fn advance(&self, ns: u64) {
        self.now.fetch_add(ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// Start/stop pair for measuring one interval by hand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub start: u64,
    pub stop: u64,
}

impl Profile {
    pub fn start(&mut self, clock: &dyn Clock) {
        self.start = clock.now_ns();
    }

    pub fn stop(&mut self, clock: &dyn Clock) {
        self.stop = clock.now_ns();
    }

    pub fn msec(&self) -> f64 {
        diff_msec(self.start, self.stop)
    }

    pub fn sec(&self) -> f64 {
        diff_sec(self.start, self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_helpers() {
        assert_eq!(diff_nsec(10, 2_500_010), 2_500_000);
        assert_eq!(diff_usec(0, 2_500_000), 2_500);
        assert_eq!(diff_msec(0, 2_500_000), 2.5);
        assert_eq!(diff_sec(0, 1_500_000_000), 1.5);
        // Backwards reading
        assert_eq!(diff_nsec(100, 50), 0);
    }

    #[test]
    fn test_profile_interval() {
        let clock = ManualClock::new();
        let mut p = Profile::default();

        clock.set(1_000_000);
        p.start(&clock);
        clock.advance(3_000_000);
        p.stop(&clock);

        assert_eq!(p.msec(), 3.0);
        assert_eq!(p.sec(), 0.003);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_wall_clock_is_past_epoch() {
        // 2001-09-09, well before any host running this
        assert!(WallClock.now_ns() > 1_000_000_000 * NSECONDS_IN_SEC);
    }
}
