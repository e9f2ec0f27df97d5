//! Test fixtures and utilities for milestone-timer testing.
//!
//! Provides:
//! - `MockClock`: Manually advanced implementation of Clock
//! - `AlarmState` / `MockAlarm`: Test implementation of AlarmChannel
//! - `Recorder` / `Hooks`: Callback capture in firing order

#![allow(dead_code)]

use milestone_timer::{AlarmChannel, Cadence, Clock, FireSignals, FireToken, Millis};
use std::cell::{Cell, RefCell};

// ============================================================================
// MockClock - Manually Advanced Time
// ============================================================================

/// Mock monotonic clock.
///
/// Time only moves when the test says so.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<Millis>,
}

impl MockClock {
    /// Create clock reading `now`.
    pub fn at(now: Millis) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Jump to an absolute time. Must not go backwards.
    pub fn set(&self, now: Millis) {
        assert!(now >= self.now.get(), "MockClock must stay monotonic");
        self.now.set(now);
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

// ============================================================================
// MockAlarm - Test AlarmChannel Implementation
// ============================================================================

/// Observable state of one mock hardware channel.
#[derive(Debug, Default)]
pub struct AlarmState {
    /// Currently armed countdown (delay, token)
    armed: Cell<Option<(Millis, FireToken)>>,

    /// Number of `arm()` calls
    arms: Cell<u32>,

    /// Number of `disarm()` calls
    disarms: Cell<u32>,

    /// Make the next `arm()` fail
    fail_next: Cell<bool>,
}

impl AlarmState {
    /// Armed countdown, if any.
    pub fn armed(&self) -> Option<(Millis, FireToken)> {
        self.armed.get()
    }

    /// Armed delay, if any.
    pub fn armed_delay(&self) -> Option<Millis> {
        self.armed.get().map(|(delay, _)| delay)
    }

    /// Number of `arm()` calls so far.
    pub fn arms(&self) -> u32 {
        self.arms.get()
    }

    /// Number of `disarm()` calls so far.
    pub fn disarms(&self) -> u32 {
        self.disarms.get()
    }

    /// Make the next `arm()` return an error.
    pub fn fail_next_arm(&self) {
        self.fail_next.set(true);
    }

    /// Simulate the countdown expiring: run the trampoline for the armed token.
    ///
    /// Returns what the trampoline returned, or false if nothing was armed.
    pub fn expire<const N: usize>(&self, signals: &FireSignals<N>) -> bool {
        match self.armed.take() {
            Some((_, token)) => signals.fire(token),
            None => false,
        }
    }
}

/// Mock hardware channel backed by an `AlarmState` the test keeps.
#[derive(Debug)]
pub struct MockAlarm<'s> {
    state: &'s AlarmState,
}

impl<'s> MockAlarm<'s> {
    pub fn new(state: &'s AlarmState) -> Self {
        Self { state }
    }
}

impl AlarmChannel for MockAlarm<'_> {
    type Error = &'static str;

    fn arm(&mut self, delay_ms: Millis, token: FireToken) -> Result<(), Self::Error> {
        self.state.arms.set(self.state.arms.get() + 1);
        if self.state.fail_next.replace(false) {
            return Err("peripheral busy");
        }
        self.state.armed.set(Some((delay_ms, token)));
        Ok(())
    }

    fn disarm(&mut self) {
        self.state.disarms.set(self.state.disarms.get() + 1);
        self.state.armed.set(None);
    }
}

/// Build `N` mock channels over `states`.
pub fn mock_channels<const N: usize>(states: &[AlarmState; N]) -> [MockAlarm<'_>; N] {
    core::array::from_fn(|i| MockAlarm::new(&states[i]))
}

// ============================================================================
// Recorder - Callback Capture
// ============================================================================

/// One callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Milestone(String, Millis),
    Period(Cadence, Millis),
    Finish(Millis),
    Pause(Millis),
    Reset(Millis),
}

/// Collects callback invocations in order.
#[derive(Debug, Default)]
pub struct Recorder {
    events: RefCell<Vec<Event>>,
}

/// Boxed callbacks writing into a `Recorder`.
pub struct Hooks<'r> {
    pub milestone: Box<dyn FnMut(&str, Millis) + 'r>,
    pub period: Box<dyn FnMut(Cadence, Millis) + 'r>,
    pub finish: Box<dyn FnMut(Millis) + 'r>,
    pub pause: Box<dyn FnMut(Millis) + 'r>,
    pub reset: Box<dyn FnMut(Millis) + 'r>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks that append to this recorder.
    pub fn hooks(&self) -> Hooks<'_> {
        Hooks {
            milestone: Box::new(|label: &str, at: Millis| {
                self.push(Event::Milestone(label.to_string(), at))
            }),
            period: Box::new(|cadence: Cadence, at: Millis| {
                self.push(Event::Period(cadence, at))
            }),
            finish: Box::new(|at: Millis| self.push(Event::Finish(at))),
            pause: Box::new(|at: Millis| self.push(Event::Pause(at))),
            reset: Box::new(|at: Millis| self.push(Event::Reset(at))),
        }
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// All events so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Take all events so far, leaving the recorder empty.
    pub fn drain(&self) -> Vec<Event> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// All events except periods.
    pub fn run_events(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| !matches!(e, Event::Period(..)))
            .cloned()
            .collect()
    }

    /// Period events only.
    pub fn periods(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Period(..)))
            .cloned()
            .collect()
    }
}

/// Shorthand for a milestone event.
pub fn milestone(label: &str, at: Millis) -> Event {
    Event::Milestone(label.to_string(), at)
}
