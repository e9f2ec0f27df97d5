//! Milestone timer state machine.
//!
//! The `Timer` struct ties the milestone sequence, the periodic checker and an
//! optional hardware wake source together. The host drives it by calling
//! [`Timer::tick`] from its main loop; all callbacks run from there.
//!
//! ```text
//!  Invalid --set_duration--> Ready --start--> Running <--pause/resume--> Paused
//!                                               |
//!                                   last wake fired (finish)
//!                                               v
//!                                             Done --start--> Running
//!
//!  reset(false): any --> Ready        reset(true): any --> Running
//! ```

use crate::clock::{Clock, Millis};
use crate::component::Component;
use crate::config::{DefaultConfig, TimerConfig};
use crate::error::TimerError;
use crate::milestone::{MAX_MILESTONES, Milestone, MilestoneSequence};
use crate::periodic::{Cadence, PeriodicChecker};
use crate::pool::{SlotHandle, TimerId, WakeSource};
use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;
use log::{debug, info, warn};

pub mod callbacks;

pub use callbacks::{Callbacks, MilestoneCallback, PeriodCallback, SimpleCallback};

/// Timer lifecycle state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerState {
    /// No duration set yet
    Invalid,

    /// Duration set, not running
    Ready,

    /// Run in progress
    Running,

    /// Run suspended, elapsed time frozen
    Paused,

    /// Last run completed
    Done,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Invalid => "invalid",
            TimerState::Ready => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Milestone timer.
///
/// Generic over:
/// - `'a`: Lifetime of the wake source and callbacks
/// - `K`: Clock implementation
/// - `C`: TimerConfig implementation
///
/// Without a wake source the timer polls the clock on every tick. With one,
/// each transition into `Running` arms a one-shot hardware wake for the next
/// event; the interrupt only flags the fire and the next tick handles it.
pub struct Timer<'a, K, C = DefaultConfig>
where
    K: Clock,
    C: TimerConfig,
{
    /// Pool identity
    id: TimerId,

    /// Time source
    clock: K,

    /// Hardware wake source (None: software polling only)
    wake: Option<&'a dyn WakeSource>,

    /// Slot held while running (None: not armed or degraded)
    slot: Option<SlotHandle>,

    /// Run length in milliseconds
    duration: Millis,

    /// Short/long cadence detection
    periods: PeriodicChecker,

    /// Milestones and firing cursor
    milestones: MilestoneSequence<MAX_MILESTONES>,

    /// Lifecycle state
    state: TimerState,

    /// Elapsed run time frozen at the last pause
    elapsed: Millis,

    /// Clock reading at logical time zero of the current run
    reference: Millis,

    /// Delay until the next event, as last scheduled
    next_wake: Millis,

    /// User callbacks
    callbacks: Callbacks<'a>,

    /// Config type marker (zero-size)
    _config: PhantomData<C>,
}

impl<'a, K, C> fmt::Debug for Timer<'a, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("milestones", &self.milestones.len())
            .field("elapsed", &self.elapsed)
            .field("reference", &self.reference)
            .field("next_wake", &self.next_wake)
            .field("slot", &self.slot)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl<'a, K: Clock> Timer<'a, K> {
    /// Create a timer with the given cadences and the default configuration.
    ///
    /// Starts `Invalid`. Call [`set_duration`](Self::set_duration) before
    /// adding milestones or starting.
    pub fn new(clock: K, short_period: Millis, long_period: Millis) -> Self {
        Self::with_periods(clock, short_period, long_period)
    }
}

impl<'a, K, C> Timer<'a, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    /// Create a timer with explicit cadences.
    pub fn with_periods(clock: K, short_period: Millis, long_period: Millis) -> Self {
        Self {
            id: TimerId::next(),
            clock,
            wake: None,
            slot: None,
            duration: 0,
            periods: PeriodicChecker::new(short_period, long_period),
            milestones: MilestoneSequence::new(),
            state: TimerState::Invalid,
            elapsed: 0,
            reference: 0,
            next_wake: 0,
            callbacks: Callbacks::new(),
            _config: PhantomData,
        }
    }

    /// Create a timer with the cadences from `C`.
    pub fn configured(clock: K) -> Self {
        Self::with_periods(clock, C::SHORT_PERIOD, C::LONG_PERIOD)
    }

    /// Use `wake` for hardware wakes instead of polling only.
    pub fn with_wake_source(mut self, wake: &'a dyn WakeSource) -> Self {
        self.wake = Some(wake);
        self
    }
}

// ============================================================================
// Configuration and accessors
// ============================================================================

impl<'a, K, C> Timer<'a, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    /// Pool identity of this timer.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Run duration in milliseconds.
    pub fn duration(&self) -> Millis {
        self.duration
    }

    /// Set the run duration. Moves `Invalid`/`Done` to `Ready`.
    ///
    /// Rejected while a run is in progress, and when existing milestones would
    /// fall past the new end.
    pub fn set_duration(&mut self, duration: Millis) -> Result<(), TimerError> {
        if matches!(self.state, TimerState::Running | TimerState::Paused) {
            return Err(self.reject("set duration of"));
        }

        if let Some(last) = self.milestones.last_offset()
            && last > duration
        {
            return Err(TimerError::OffsetOutOfRange {
                offset: last,
                duration,
            });
        }

        self.duration = duration;
        self.state = TimerState::Ready;
        Ok(())
    }

    /// Cadence length in milliseconds.
    pub fn period(&self, cadence: Cadence) -> Millis {
        self.periods.period(cadence)
    }

    /// Change a cadence length. Takes effect on the next tick.
    pub fn set_period(&mut self, cadence: Cadence, period: Millis) {
        self.periods.set_period(cadence, period);
    }

    /// Elapsed run time: live while running, frozen while paused, else 0.
    pub fn elapsed(&self) -> Millis {
        match self.state {
            TimerState::Running => self.clock.now_ms().saturating_sub(self.reference),
            TimerState::Paused => self.elapsed,
            _ => 0,
        }
    }

    /// Delay to the next event as computed at the last (re)schedule.
    pub fn next_wake(&self) -> Millis {
        self.next_wake
    }

    /// Hardware slot currently held.
    pub fn slot(&self) -> Option<SlotHandle> {
        self.slot
    }

    /// Milestones in firing order.
    pub fn milestones(&self) -> &MilestoneSequence<MAX_MILESTONES> {
        &self.milestones
    }

    /// Add a milestone `offset` ms after start. Returns the resolved offset.
    pub fn add_milestone_after_start(
        &mut self,
        offset: Millis,
        label: &str,
    ) -> Result<Millis, TimerError> {
        self.require_duration()?;
        let previous = self.target();
        let resolved = self.milestones.add_after_start(self.duration, offset, label)?;
        self.retarget(previous);
        Ok(resolved)
    }

    /// Add a milestone `before` ms before end. Returns the resolved offset.
    pub fn add_milestone_before_end(
        &mut self,
        before: Millis,
        label: &str,
    ) -> Result<Millis, TimerError> {
        self.require_duration()?;
        let previous = self.target();
        let resolved = self.milestones.add_before_end(self.duration, before, label)?;
        self.retarget(previous);
        Ok(resolved)
    }

    /// Remove all milestones. A run in progress then heads straight for the
    /// finish.
    pub fn reset_milestones(&mut self) {
        let previous = self.target();
        self.milestones.reset();
        self.retarget(previous);
    }

    /// Set the milestone callback (`None` keeps the current one).
    pub fn set_milestone_callback(&mut self, cb: Option<MilestoneCallback<'a>>) {
        self.callbacks.set_milestone(cb);
    }

    /// Set the period callback (`None` keeps the current one).
    pub fn set_period_callback(&mut self, cb: Option<PeriodCallback<'a>>) {
        self.callbacks.set_period(cb);
    }

    /// Set the finish callback (`None` keeps the current one).
    pub fn set_finished_callback(&mut self, cb: Option<SimpleCallback<'a>>) {
        self.callbacks.set_finish(cb);
    }

    /// Set the pause callback (`None` keeps the current one).
    pub fn set_pause_callback(&mut self, cb: Option<SimpleCallback<'a>>) {
        self.callbacks.set_pause(cb);
    }

    /// Set the reset callback (`None` keeps the current one).
    pub fn set_reset_callback(&mut self, cb: Option<SimpleCallback<'a>>) {
        self.callbacks.set_reset(cb);
    }

    fn require_duration(&self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Invalid => Err(TimerError::DurationNotSet),
            _ => Ok(()),
        }
    }

    fn reject(&self, operation: &'static str) -> TimerError {
        warn!(
            "Cannot {} timer {} while {}",
            operation, self.id, self.state
        );
        TimerError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

impl<'a, K, C> Timer<'a, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    /// Start a new run from `Ready` or `Done`, or resume from `Paused`.
    pub fn start(&mut self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Paused => self.resume().map(|_| ()),
            TimerState::Ready | TimerState::Done => {
                let now = self.clock.now_ms();
                self.begin_run(now);
                Ok(())
            }
            _ => Err(self.reject("start")),
        }
    }

    /// Suspend the run. Returns the elapsed time.
    ///
    /// The hardware wake is cancelled before this returns.
    pub fn pause(&mut self) -> Result<Millis, TimerError> {
        if self.state != TimerState::Running {
            return Err(self.reject("pause"));
        }

        let now = self.clock.now_ms();
        self.elapsed = now.saturating_sub(self.reference);
        self.release();
        self.state = TimerState::Paused;

        info!(
            "Pausing timer {} at {} with elapsed time = {}",
            self.id, now, self.elapsed
        );
        self.callbacks.pause(self.elapsed);
        Ok(self.elapsed)
    }

    /// Continue a paused run as if no time had passed. Returns the elapsed
    /// time.
    pub fn resume(&mut self) -> Result<Millis, TimerError> {
        if self.state != TimerState::Paused {
            return Err(self.reject("resume"));
        }

        let now = self.clock.now_ms();
        self.reference = now.saturating_sub(self.elapsed);
        self.schedule_next(now);

        info!(
            "Resuming timer {} at {} with next event in {}",
            self.id, now, self.next_wake
        );
        Ok(self.elapsed)
    }

    /// Abandon the current run (if any) and return to `Ready`, or restart
    /// straight away. Returns the elapsed time of the abandoned run.
    ///
    /// The hardware wake is cancelled before this returns.
    pub fn reset(&mut self, start_immediately: bool) -> Millis {
        let now = self.clock.now_ms();
        let elapsed = match self.state {
            TimerState::Running => now.saturating_sub(self.reference),
            TimerState::Paused => self.elapsed,
            _ => 0,
        };

        self.release();
        self.elapsed = 0;
        self.reference = 0;
        self.next_wake = 0;
        self.milestones.finish();
        self.state = TimerState::Ready;

        debug!("Timer {} reset after {} ms", self.id, elapsed);
        self.callbacks.reset(elapsed);

        if start_immediately {
            self.begin_run(now);
        }
        elapsed
    }

    /// Drive the timer. Call once per main-loop iteration.
    ///
    /// Delivers at most one milestone (or the finish) per call, then runs the
    /// periodic check while running.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();

        if self.state == TimerState::Running && self.take_pending(now) {
            self.fire(now);
        }

        if self.state == TimerState::Running {
            let hits = self.periods.check(now);
            for cadence in hits.iter() {
                self.callbacks.period(cadence, now);
            }
        }
    }

    fn begin_run(&mut self, now: Millis) {
        self.milestones.rewind();
        self.elapsed = 0;
        self.reference = now;

        info!(
            "Starting timer {} at {} for {} ms ({} milestones)",
            self.id,
            now,
            self.duration,
            self.milestones.len()
        );
        self.schedule_next(now);
    }

    /// Offset of the next event: the pending milestone, or the end of the run.
    fn target(&self) -> Millis {
        self.milestones
            .current()
            .map_or(self.duration, Milestone::offset)
    }

    fn schedule_next(&mut self, now: Millis) {
        let elapsed = now.saturating_sub(self.reference);
        self.next_wake = self.target().saturating_sub(elapsed);

        if let Some(wake) = self.wake {
            self.slot = wake.attach(self.id, self.next_wake);
            if self.slot.is_none() {
                warn!(
                    "Could not attach timer {} to a hardware timer, polling instead",
                    self.id
                );
            }
        }

        if let Some(ms) = self.milestones.current() {
            debug!(
                "Next milestone of timer {} is '{}' at {}",
                self.id,
                ms.label(),
                ms.offset()
            );
        }
        debug!(
            "Setting timer {} event in {} at {} (elapsed = {})",
            self.id, self.next_wake, now, elapsed
        );

        self.state = TimerState::Running;
    }

    /// Rearm for the new next event if editing the milestones moved it
    /// mid-run.
    fn retarget(&mut self, previous: Millis) {
        if self.state == TimerState::Running && self.target() != previous {
            let now = self.clock.now_ms();
            self.schedule_next(now);
        }
    }

    /// Drain the interrupt flag and, where polling applies, compare the clock
    /// against the next target.
    fn take_pending(&self, now: Millis) -> bool {
        let interrupted = match (self.wake, self.slot) {
            (Some(wake), Some(_)) => wake.take_fire(self.id),
            _ => false,
        };
        let polled = (self.slot.is_none() || C::POLL_WHILE_ARMED)
            && now.saturating_sub(self.reference) >= self.target();

        interrupted || polled
    }

    fn fire(&mut self, now: Millis) {
        let elapsed = now.saturating_sub(self.reference);

        let delivered = match self.milestones.current() {
            Some(ms) => {
                debug!(
                    "Milestone '{}' of timer {} triggered at {}",
                    ms.label(),
                    self.id,
                    elapsed
                );
                self.callbacks.milestone(ms.label(), elapsed);
                true
            }
            None => false,
        };

        if delivered {
            self.milestones.advance();
            self.schedule_next(now);
        } else {
            self.finish(elapsed);
        }
    }

    fn finish(&mut self, elapsed: Millis) {
        self.release();
        self.elapsed = 0;
        self.reference = 0;
        self.next_wake = 0;
        self.milestones.finish();
        self.state = TimerState::Done;

        info!("Timer {} finished after {} ms", self.id, elapsed);
        self.callbacks.finish(elapsed);
    }

    fn release(&mut self) {
        if let Some(wake) = self.wake {
            wake.detach(self.id);
        }
        self.slot = None;
    }
}

impl<K, C> Drop for Timer<'_, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<K, C> Component for Timer<'_, K, C>
where
    K: Clock,
    C: TimerConfig,
{
    type Error = Infallible;

    fn setup(&mut self) -> Result<(), Self::Error> {
        debug!(
            "Timer {} set up (short = {}, long = {})",
            self.id,
            self.periods.period(Cadence::Short),
            self.periods.period(Cadence::Long)
        );
        Ok(())
    }

    fn tick(&mut self) {
        Timer::tick(self);
    }
}
