//! Optional user callback slots.
//!
//! Every slot starts empty and an empty slot is a no-op when the timer
//! notifies it. Registering `None` leaves a previously set callback in place.

use crate::clock::Millis;
use crate::periodic::Cadence;
use core::fmt;

/// Milestone reached: `(label, elapsed_ms)`.
pub type MilestoneCallback<'a> = &'a mut dyn FnMut(&str, Millis);

/// Cadence boundary observed: `(cadence, clock_ms)`.
pub type PeriodCallback<'a> = &'a mut dyn FnMut(Cadence, Millis);

/// Finish, pause or reset notification: `(elapsed_ms)`.
pub type SimpleCallback<'a> = &'a mut dyn FnMut(Millis);

/// The five callback slots of a timer.
#[derive(Default)]
pub struct Callbacks<'a> {
    milestone: Option<MilestoneCallback<'a>>,
    period: Option<PeriodCallback<'a>>,
    finish: Option<SimpleCallback<'a>>,
    pause: Option<SimpleCallback<'a>>,
    reset: Option<SimpleCallback<'a>>,
}

fn replace<T>(slot: &mut Option<T>, cb: Option<T>) {
    if cb.is_some() {
        *slot = cb;
    }
}

impl<'a> Callbacks<'a> {
    /// Create empty slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the milestone callback.
    pub fn set_milestone(&mut self, cb: Option<MilestoneCallback<'a>>) {
        replace(&mut self.milestone, cb);
    }

    /// Set the period callback.
    pub fn set_period(&mut self, cb: Option<PeriodCallback<'a>>) {
        replace(&mut self.period, cb);
    }

    /// Set the finish callback.
    pub fn set_finish(&mut self, cb: Option<SimpleCallback<'a>>) {
        replace(&mut self.finish, cb);
    }

    /// Set the pause callback.
    pub fn set_pause(&mut self, cb: Option<SimpleCallback<'a>>) {
        replace(&mut self.pause, cb);
    }

    /// Set the reset callback.
    pub fn set_reset(&mut self, cb: Option<SimpleCallback<'a>>) {
        replace(&mut self.reset, cb);
    }

    pub(crate) fn milestone(&mut self, label: &str, elapsed: Millis) {
        if let Some(cb) = self.milestone.as_mut() {
            cb(label, elapsed);
        }
    }

    pub(crate) fn period(&mut self, cadence: Cadence, now: Millis) {
        if let Some(cb) = self.period.as_mut() {
            cb(cadence, now);
        }
    }

    pub(crate) fn finish(&mut self, elapsed: Millis) {
        if let Some(cb) = self.finish.as_mut() {
            cb(elapsed);
        }
    }

    pub(crate) fn pause(&mut self, elapsed: Millis) {
        if let Some(cb) = self.pause.as_mut() {
            cb(elapsed);
        }
    }

    pub(crate) fn reset(&mut self, elapsed: Millis) {
        if let Some(cb) = self.reset.as_mut() {
            cb(elapsed);
        }
    }
}

impl fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("milestone", &self.milestone.is_some())
            .field("period", &self.period.is_some())
            .field("finish", &self.finish.is_some())
            .field("pause", &self.pause.is_some())
            .field("reset", &self.reset.is_some())
            .finish()
    }
}
