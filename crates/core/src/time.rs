//! Wall-clock abstraction
//!
//! Timestamps are nanoseconds since the Unix epoch, signed to match the wire
//! stat fields. Production code uses [`SystemClock`]; tests pin time with
//! [`FixedClock`].

use std::sync::atomic::{AtomicI64, Ordering};

/// Nanoseconds per second
pub const SEC_TO_NS: i64 = 1_000_000_000;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current time as nanoseconds since the Unix epoch
    fn now_ns(&self) -> i64;
}

/// The real wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> i64 {
        // timestamp_nanos_opt is None only outside ~1677..2262.
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .expect("system clock outside the nanosecond-representable range")
    }
}

/// A clock that returns a settable, fixed instant
pub struct FixedClock {
    ns: AtomicI64,
}

impl FixedClock {
    /// Create a clock pinned at `ns`
    pub fn new(ns: i64) -> Self {
        FixedClock {
            ns: AtomicI64::new(ns),
        }
    }

    /// Move the clock to `ns`
    pub fn set(&self, ns: i64) {
        self.ns.store(ns, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_ns(&self) -> i64 {
        self.ns.load(Ordering::Relaxed)
    }
}
