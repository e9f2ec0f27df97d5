//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
pub mod fixtures;

use fixtures::{Hooks, MockClock};
use milestone_timer::{Clock, Millis, Timer, TimerConfig};

// ============================================================================
// Timer Setup Helpers
// ============================================================================

/// Register every hook of `hooks` on `timer`.
pub fn install<'a, K, C>(timer: &mut Timer<'a, K, C>, hooks: &'a mut Hooks<'_>)
where
    K: Clock,
    C: TimerConfig,
{
    timer.set_milestone_callback(Some(&mut *hooks.milestone));
    timer.set_period_callback(Some(&mut *hooks.period));
    timer.set_finished_callback(Some(&mut *hooks.finish));
    timer.set_pause_callback(Some(&mut *hooks.pause));
    timer.set_reset_callback(Some(&mut *hooks.reset));
}

/// Give `timer` a duration and after-start milestones named `at <offset>`.
pub fn plan<K, C>(timer: &mut Timer<'_, K, C>, duration: Millis, offsets: &[Millis])
where
    K: Clock,
    C: TimerConfig,
{
    timer.set_duration(duration).unwrap();
    for &offset in offsets {
        let label = format!("at {}", offset);
        timer.add_milestone_after_start(offset, &label).unwrap();
    }
}

// ============================================================================
// Loop Driving Helpers
// ============================================================================

/// Tick once per millisecond from now until `until` (inclusive).
pub fn tick_until<K, C>(timer: &mut Timer<'_, K, C>, clock: &MockClock, until: Millis)
where
    K: Clock,
    C: TimerConfig,
{
    while clock.now_ms() < until {
        clock.advance(1);
        timer.tick();
    }
}

/// Jump the clock to `at` and tick once.
pub fn tick_at<K, C>(timer: &mut Timer<'_, K, C>, clock: &MockClock, at: Millis)
where
    K: Clock,
    C: TimerConfig,
{
    clock.set(at);
    timer.tick();
}
