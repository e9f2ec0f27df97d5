//! Error types for timer operations.
//!
//! The `TimerError` enum covers every condition a caller can observe from the
//! public timer API. None of them are fatal: the timer is always left in a
//! well-defined state.

use crate::clock::Millis;
use crate::timer::TimerState;
use core::fmt;

/// Timer error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Milestones need a duration to resolve against
    DurationNotSet,

    /// Resolved milestone offset would fall outside `[0, duration]`
    OffsetOutOfRange {
        /// Requested offset (after start or before end)
        offset: Millis,
        /// Duration the offset was resolved against
        duration: Millis,
    },

    /// Milestone sequence is at capacity
    SequenceFull,

    /// Milestone label exceeds `MAX_LABEL_LEN`
    LabelTooLong,

    /// Operation not permitted in the current state (state unchanged)
    InvalidTransition {
        /// Rejected operation (e.g. "start")
        operation: &'static str,
        /// State the timer was in
        state: TimerState,
    },
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::DurationNotSet => write!(f, "Duration not set"),
            TimerError::OffsetOutOfRange { offset, duration } => {
                write!(f, "Offset {} ms outside duration {} ms", offset, duration)
            }
            TimerError::SequenceFull => write!(f, "Milestone sequence full"),
            TimerError::LabelTooLong => write!(f, "Milestone label too long"),
            TimerError::InvalidTransition { operation, state } => {
                write!(f, "Cannot {} timer while {}", operation, state)
            }
        }
    }
}
