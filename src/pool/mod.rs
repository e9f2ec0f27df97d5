//! Hardware timer pool.
//!
//! Multiplexes logical timers onto a fixed number of hardware countdown
//! channels. The slot table is only touched from the cooperative loop; the
//! interrupt side is limited to [`FireSignals::fire`].

use crate::clock::Millis;
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use log::{debug, warn};

pub mod signal;

pub use signal::{FireSignals, FireToken, MAX_SLOTS};

use signal::next_generation;

/// One hardware countdown channel.
///
/// Implementations wrap a peripheral timer. When the countdown expires the
/// driver's interrupt handler must call [`FireSignals::fire`] with the token
/// passed to [`arm`](Self::arm), and do nothing else on the timer's behalf.
pub trait AlarmChannel {
    /// Driver-specific error type
    type Error: fmt::Debug;

    /// Arm a one-shot countdown of `delay_ms`, replacing any armed one.
    ///
    /// A delay of 0 means the deadline has already passed: fire as soon as
    /// possible.
    fn arm(&mut self, delay_ms: Millis, token: FireToken) -> Result<(), Self::Error>;

    /// Cancel the countdown. No interrupt may follow for the previous token.
    fn disarm(&mut self);
}

/// Identity of a logical timer inside a pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

impl TimerId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binding between a timer and a pool slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlotHandle {
    index: usize,
    token: FireToken,
}

impl SlotHandle {
    /// Slot index in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Token the slot's countdown was armed with.
    pub fn token(&self) -> FireToken {
        self.token
    }
}

/// Source of hardware wakes for timers.
///
/// Implemented by [`TimerPool`]. All methods are called from the cooperative
/// loop only.
pub trait WakeSource {
    /// Arm a one-shot wake `delay_ms` from now for `owner`.
    ///
    /// Reuses the slot `owner` already holds; otherwise binds a free one.
    /// Returns `None` when no slot is available.
    fn attach(&self, owner: TimerId, delay_ms: Millis) -> Option<SlotHandle>;

    /// Cancel `owner`'s wake and free its slot. False if it held none.
    fn detach(&self, owner: TimerId) -> bool;

    /// Consume a pending fire for `owner`.
    fn take_fire(&self, owner: TimerId) -> bool;
}

struct Slot<A> {
    owner: Option<TimerId>,
    generation: u32,
    channel: A,
}

impl<A> Slot<A> {
    fn token(&self, index: usize) -> FireToken {
        FireToken::new(index, self.generation)
    }
}

/// Fixed-capacity table of hardware channels.
///
/// Generic over:
/// - `'s`: Lifetime of the signal table (typically `'static`)
/// - `A`: AlarmChannel implementation
/// - `N`: Number of slots
pub struct TimerPool<'s, A: AlarmChannel, const N: usize> {
    signals: &'s FireSignals<N>,
    slots: RefCell<[Slot<A>; N]>,
}

impl<'s, A: AlarmChannel, const N: usize> TimerPool<'s, A, N> {
    /// Create a pool over `channels`, signalling through `signals`.
    pub fn new(signals: &'s FireSignals<N>, channels: [A; N]) -> Self {
        const { assert!(N <= MAX_SLOTS, "too many slots for FireToken") };

        for index in 0..N {
            signals.unbind(index);
        }

        Self {
            signals,
            slots: RefCell::new(channels.map(|channel| Slot {
                owner: None,
                generation: 0,
                channel,
            })),
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of unbound slots.
    pub fn free_slots(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.owner.is_none())
            .count()
    }

    /// Slot currently held by `owner`.
    pub fn bound(&self, owner: TimerId) -> Option<SlotHandle> {
        let slots = self.slots.borrow();
        let index = slots.iter().position(|slot| slot.owner == Some(owner))?;
        slots.get(index).map(|slot| SlotHandle {
            index,
            token: slot.token(index),
        })
    }

    /// Signal table shared with the interrupt handlers.
    pub fn signals(&self) -> &'s FireSignals<N> {
        self.signals
    }

    fn arm_slot(
        &self,
        index: usize,
        slot: &mut Slot<A>,
        owner: TimerId,
        delay_ms: Millis,
    ) -> Option<SlotHandle> {
        slot.generation = next_generation(slot.generation);
        slot.owner = Some(owner);

        let token = slot.token(index);
        self.signals.bind(token);

        match slot.channel.arm(delay_ms, token) {
            Ok(()) => {
                debug!("Timer {} armed on slot {} in {} ms", owner, index, delay_ms);
                Some(SlotHandle { index, token })
            }
            Err(e) => {
                warn!("Could not arm slot {} for timer {}: {:?}", index, owner, e);
                self.signals.unbind(index);
                slot.owner = None;
                None
            }
        }
    }
}

impl<A: AlarmChannel, const N: usize> WakeSource for TimerPool<'_, A, N> {
    fn attach(&self, owner: TimerId, delay_ms: Millis) -> Option<SlotHandle> {
        let mut slots = self.slots.borrow_mut();

        if let Some((index, slot)) = slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.owner == Some(owner))
        {
            // Reschedule within a run: same slot, new binding
            slot.channel.disarm();
            return self.arm_slot(index, slot, owner, delay_ms);
        }

        match slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.owner.is_none())
        {
            Some((index, slot)) => self.arm_slot(index, slot, owner, delay_ms),
            None => {
                warn!("Timer pool exhausted ({} slots), timer {} not armed", N, owner);
                None
            }
        }
    }

    fn detach(&self, owner: TimerId) -> bool {
        let mut slots = self.slots.borrow_mut();

        let Some((index, slot)) = slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.owner == Some(owner))
        else {
            return false;
        };

        // Unbind before disarming so an in-flight interrupt finds nothing
        self.signals.unbind(index);
        slot.owner = None;
        slot.channel.disarm();

        debug!("Timer {} detached from slot {}", owner, index);
        true
    }

    fn take_fire(&self, owner: TimerId) -> bool {
        self.bound(owner)
            .is_some_and(|handle| self.signals.take(handle.token))
    }
}

impl<A: AlarmChannel, const N: usize> fmt::Debug for TimerPool<'_, A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug_struct = f.debug_struct("TimerPool");
        debug_struct.field("capacity", &N);

        match self.slots.try_borrow() {
            Ok(slots) => {
                let owners: heapless::Vec<Option<TimerId>, N> =
                    slots.iter().map(|slot| slot.owner).collect();
                debug_struct.field("owners", &owners);
            }
            Err(_) => {
                debug_struct.field("owners", &"<borrowed>");
            }
        }

        debug_struct.finish_non_exhaustive()
    }
}
