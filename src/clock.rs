//! Monotonic millisecond clock abstraction.
//!
//! The `Clock` trait is the only source of time the timer consults. It can be
//! implemented for any platform (SysTick counter, RTOS tick, `std::time::Instant`).

/// Millisecond count used for timestamps, offsets and durations.
pub type Millis = u64;

/// Platform-agnostic monotonic clock.
///
/// Readings must be non-decreasing. The epoch is arbitrary (typically boot);
/// the timer only ever works with differences and exact multiples of it.
pub trait Clock {
    /// Current time in milliseconds since an arbitrary, fixed epoch.
    fn now_ms(&self) -> Millis;
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}
