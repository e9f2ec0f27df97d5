//! Short and long cadence detection.
//!
//! The checker fires a cadence when the observed clock reading is an exact
//! multiple of it. It keeps no accumulator, so a stalled main loop never
//! produces a burst of catch-up fires; boundaries that are not observed
//! exactly are skipped.

use crate::clock::Millis;

/// Which periodic cadence fired.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cadence {
    /// Short cadence (default: every second)
    Short = 1,

    /// Long cadence (default: every minute)
    Long = 2,
}

/// Cadences that fired on one check.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PeriodHits {
    /// Short cadence boundary observed
    pub short: bool,
    /// Long cadence boundary observed
    pub long: bool,
}

impl PeriodHits {
    /// True if any cadence fired.
    pub fn any(&self) -> bool {
        self.short || self.long
    }

    /// Fired cadences, short first.
    pub fn iter(&self) -> impl Iterator<Item = Cadence> {
        [
            self.short.then_some(Cadence::Short),
            self.long.then_some(Cadence::Long),
        ]
        .into_iter()
        .flatten()
    }
}

/// Modulo-based checker for two independent cadences.
///
/// A cadence of 0 is disabled.
#[derive(Debug, Clone)]
pub struct PeriodicChecker {
    short: Millis,
    long: Millis,
    last_check: Millis,
}

impl PeriodicChecker {
    /// Create a checker with the given cadences.
    pub const fn new(short: Millis, long: Millis) -> Self {
        Self {
            short,
            long,
            last_check: 0,
        }
    }

    /// Cadence length in milliseconds.
    pub fn period(&self, cadence: Cadence) -> Millis {
        match cadence {
            Cadence::Short => self.short,
            Cadence::Long => self.long,
        }
    }

    /// Change a cadence length.
    pub fn set_period(&mut self, cadence: Cadence, period: Millis) {
        match cadence {
            Cadence::Short => self.short = period,
            Cadence::Long => self.long = period,
        }
    }

    /// Timestamp of the last accepted check.
    pub fn last_check(&self) -> Millis {
        self.last_check
    }

    /// Check `now` against both cadences.
    ///
    /// Readings that do not move past the previous one fire nothing.
    pub fn check(&mut self, now: Millis) -> PeriodHits {
        if now <= self.last_check {
            return PeriodHits::default();
        }
        self.last_check = now;

        PeriodHits {
            short: on_boundary(now, self.short),
            long: on_boundary(now, self.long),
        }
    }
}

fn on_boundary(now: Millis, period: Millis) -> bool {
    period != 0 && now % period == 0
}
