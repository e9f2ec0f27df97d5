//! Configuration traits and implementations for timer defaults.
//!
//! The `TimerConfig` trait selects cadences and wake policy at compile time
//! without runtime overhead.

use crate::clock::Millis;

/// Timer configuration trait defining default cadences and wake policy.
///
/// All values are const (zero runtime cost).
pub trait TimerConfig {
    /// Default short cadence in milliseconds (default: 1000)
    const SHORT_PERIOD: Millis;

    /// Default long cadence in milliseconds (default: 60000)
    const LONG_PERIOD: Millis;

    /// Compare the clock against the next deadline on every tick even while a
    /// hardware wake is armed.
    ///
    /// Without a hardware slot the timer always polls.
    const POLL_WHILE_ARMED: bool;
}

/// Default configuration.
///
/// - SHORT_PERIOD: 1 s
/// - LONG_PERIOD: 60 s
/// - POLL_WHILE_ARMED: true (hardware wake only lowers latency)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl TimerConfig for DefaultConfig {
    const SHORT_PERIOD: Millis = 1_000;
    const LONG_PERIOD: Millis = 60_000;
    const POLL_WHILE_ARMED: bool = true;
}

/// Interrupt-driven configuration.
///
/// Same cadences as [`DefaultConfig`], but while a hardware slot is held the
/// run only advances when the interrupt fires.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InterruptConfig;

impl TimerConfig for InterruptConfig {
    const SHORT_PERIOD: Millis = 1_000;
    const LONG_PERIOD: Millis = 60_000;
    const POLL_WHILE_ARMED: bool = false;
}
