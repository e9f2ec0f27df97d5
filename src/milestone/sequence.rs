//! Ordered milestone storage with a firing cursor.

use super::Milestone;
use crate::clock::Millis;
use crate::error::TimerError;

/// Milestones sorted ascending by offset, plus a cursor at the next one due.
///
/// The cursor is either `Some(index)` (next undelivered milestone) or `None`
/// ("at end"). It only moves forward, or back to the start via [`rewind`].
///
/// [`rewind`]: MilestoneSequence::rewind
#[derive(Debug)]
pub struct MilestoneSequence<const N: usize> {
    items: heapless::Vec<Milestone, N>,
    cursor: Option<usize>,
}

impl<const N: usize> MilestoneSequence<N> {
    /// Create an empty sequence with the cursor at end.
    pub const fn new() -> Self {
        Self {
            items: heapless::Vec::new(),
            cursor: None,
        }
    }

    /// Add a milestone `offset` ms after start. Returns the resolved offset.
    pub fn add_after_start(
        &mut self,
        duration: Millis,
        offset: Millis,
        label: &str,
    ) -> Result<Millis, TimerError> {
        self.insert(Milestone::after_start(offset, label, duration)?)
    }

    /// Add a milestone `before` ms before end. Returns the resolved offset.
    pub fn add_before_end(
        &mut self,
        duration: Millis,
        before: Millis,
        label: &str,
    ) -> Result<Millis, TimerError> {
        self.insert(Milestone::before_end(before, label, duration)?)
    }

    /// Insert a resolved milestone, keeping ascending order.
    ///
    /// Equal offsets keep insertion order. If the insertion lands at or before
    /// the cursor, the cursor keeps pointing at the same milestone.
    pub fn insert(&mut self, milestone: Milestone) -> Result<Millis, TimerError> {
        let offset = milestone.offset();
        let pos = self.items.partition_point(|m| m.offset() <= offset);
        self.items
            .insert(pos, milestone)
            .map_err(|_| TimerError::SequenceFull)?;

        if let Some(cursor) = self.cursor
            && pos <= cursor
        {
            self.cursor = Some(cursor + 1);
        }

        Ok(offset)
    }

    /// Remove all milestones.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = None;
    }

    /// Point the cursor at the first milestone (or at end when empty).
    pub fn rewind(&mut self) {
        self.cursor = if self.items.is_empty() { None } else { Some(0) };
    }

    /// Move the cursor past the current milestone.
    pub fn advance(&mut self) {
        self.cursor = match self.cursor {
            Some(i) if i + 1 < self.items.len() => Some(i + 1),
            _ => None,
        };
    }

    /// Put the cursor at end without touching the milestones.
    pub fn finish(&mut self) {
        self.cursor = None;
    }

    /// Next undelivered milestone, `None` when at end.
    pub fn current(&self) -> Option<&Milestone> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    /// True when no milestone remains to be delivered.
    pub fn is_at_end(&self) -> bool {
        self.current().is_none()
    }

    /// Largest offset in the sequence.
    pub fn last_offset(&self) -> Option<Millis> {
        self.items.last().map(Milestone::offset)
    }

    /// Number of milestones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the sequence holds no milestones.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Milestones in firing order.
    pub fn as_slice(&self) -> &[Milestone] {
        &self.items
    }
}

impl<const N: usize> Default for MilestoneSequence<N> {
    fn default() -> Self {
        Self::new()
    }
}
