//! Milestones: labelled points in time inside a timer run.
//!
//! A [`Milestone`] is resolved to an absolute offset from run start when it is
//! built and never changes afterwards. [`MilestoneSequence`] keeps them in
//! firing order and tracks which one is due next.

use crate::clock::Millis;
use crate::error::TimerError;

pub mod sequence;

pub use sequence::MilestoneSequence;

/// Maximum number of milestones a timer holds.
pub const MAX_MILESTONES: usize = 16;

/// Maximum milestone label length in bytes.
pub const MAX_LABEL_LEN: usize = 32;

/// Fixed-capacity milestone label.
pub type Label = heapless::String<MAX_LABEL_LEN>;

/// A labelled offset from run start.
///
/// Invariant: `offset <= duration` of the run it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    offset: Millis,
    label: Label,
}

impl Milestone {
    /// Milestone `offset` ms after the run starts.
    pub fn after_start(offset: Millis, label: &str, duration: Millis) -> Result<Self, TimerError> {
        if offset > duration {
            return Err(TimerError::OffsetOutOfRange { offset, duration });
        }
        Self::resolved(offset, label)
    }

    /// Milestone `before` ms before the run ends (offset `duration - before`).
    pub fn before_end(before: Millis, label: &str, duration: Millis) -> Result<Self, TimerError> {
        let offset = duration
            .checked_sub(before)
            .ok_or(TimerError::OffsetOutOfRange {
                offset: before,
                duration,
            })?;
        Self::resolved(offset, label)
    }

    fn resolved(offset: Millis, label: &str) -> Result<Self, TimerError> {
        let mut text = Label::new();
        text.push_str(label)
            .map_err(|_| TimerError::LabelTooLong)?;
        Ok(Self {
            offset,
            label: text,
        })
    }

    /// Absolute offset from run start.
    pub fn offset(&self) -> Millis {
        self.offset
    }

    /// Milestone label.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}
