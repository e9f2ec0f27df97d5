//! Interrupt-to-loop fire signalling.
//!
//! Each pool slot owns one atomic word holding the token of its current
//! binding plus a "fired" bit. The interrupt trampoline sets the bit only if
//! the word still carries the token the countdown was armed with, in a single
//! atomic read-modify-write. Once the loop unbinds or rebinds a slot, stale
//! interrupts for the old binding can no longer write anything.
//!
//! Requires compare-and-swap atomics on the target.

use core::sync::atomic::{AtomicU32, Ordering};

const INDEX_BITS: u32 = 8;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const GENERATION_MAX: u32 = (1 << (31 - INDEX_BITS)) - 1;
const FIRED: u32 = 1 << 31;
const TOKEN_MASK: u32 = !FIRED;
const UNBOUND: u32 = 0;

/// Maximum number of slots a signal table can address.
pub const MAX_SLOTS: usize = 1 << INDEX_BITS;

/// Opaque identifier the hardware driver hands back to the trampoline.
///
/// Encodes the slot index and the generation of the binding it was armed for.
/// Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FireToken(u32);

impl FireToken {
    pub(crate) fn new(slot: usize, generation: u32) -> Self {
        debug_assert!(slot < MAX_SLOTS);
        debug_assert!(generation != 0 && generation <= GENERATION_MAX);
        Self((generation << INDEX_BITS) | (slot as u32 & INDEX_MASK))
    }

    /// Slot index this token was armed for.
    pub fn slot(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    /// Raw value, for drivers that carry a `u32`/`*mut c_void` context.
    pub fn into_raw(self) -> u32 {
        self.0
    }

    /// Rebuild a token from [`into_raw`](Self::into_raw). Rejects values no
    /// binding could have produced.
    pub fn from_raw(raw: u32) -> Option<Self> {
        (raw & TOKEN_MASK == raw && raw >> INDEX_BITS != 0).then_some(Self(raw))
    }
}

/// Next binding generation, wrapping within the token field and skipping 0.
pub(crate) fn next_generation(generation: u32) -> u32 {
    if generation >= GENERATION_MAX {
        1
    } else {
        generation + 1
    }
}

/// Process-wide fire signal table, one word per hardware slot.
///
/// Meant to live in a `static` so interrupt handlers can reach it:
///
/// ```rust,ignore
/// static SIGNALS: FireSignals<4> = FireSignals::new();
///
/// #[interrupt]
/// fn TIMER0() {
///     SIGNALS.fire(driver::take_token(0));
/// }
/// ```
#[derive(Debug)]
pub struct FireSignals<const N: usize> {
    words: [AtomicU32; N],
}

impl<const N: usize> FireSignals<N> {
    /// Create a table with every slot unbound.
    pub const fn new() -> Self {
        Self {
            words: [const { AtomicU32::new(UNBOUND) }; N],
        }
    }

    /// Interrupt trampoline: mark the binding behind `token` as fired.
    ///
    /// Lock-free and safe to call from interrupt context. Returns false if the
    /// slot has since been unbound or rebound. Repeated fires coalesce.
    pub fn fire(&self, token: FireToken) -> bool {
        let Some(word) = self.words.get(token.slot()) else {
            return false;
        };
        word.fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
            (state & TOKEN_MASK == token.0).then_some(state | FIRED)
        })
        .is_ok()
    }

    /// Trampoline variant taking the raw token value.
    pub fn fire_raw(&self, raw: u32) -> bool {
        FireToken::from_raw(raw).is_some_and(|token| self.fire(token))
    }

    /// True if `token`'s binding has an undrained fire.
    pub fn is_pending(&self, token: FireToken) -> bool {
        self.words
            .get(token.slot())
            .is_some_and(|word| word.load(Ordering::Acquire) == token.0 | FIRED)
    }

    /// Bind a slot to `token`, discarding any previous fire.
    pub(crate) fn bind(&self, token: FireToken) {
        if let Some(word) = self.words.get(token.slot()) {
            word.store(token.0, Ordering::Release);
        }
    }

    /// Unbind a slot. Any later fire for its old token is dropped.
    pub(crate) fn unbind(&self, slot: usize) {
        if let Some(word) = self.words.get(slot) {
            word.store(UNBOUND, Ordering::Release);
        }
    }

    /// Consume a pending fire for `token`.
    pub(crate) fn take(&self, token: FireToken) -> bool {
        self.words.get(token.slot()).is_some_and(|word| {
            word.compare_exchange(token.0 | FIRED, token.0, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        })
    }
}

impl<const N: usize> Default for FireSignals<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_through_raw() {
        let token = FireToken::new(3, 7);
        assert_eq!(token.slot(), 3);
        assert_eq!(FireToken::from_raw(token.into_raw()), Some(token));
    }

    #[test]
    fn test_invalid_raw_tokens_rejected() {
        assert_eq!(FireToken::from_raw(0), None);
        // Generation zero never names a binding
        assert_eq!(FireToken::from_raw(2), None);
        // Fired bit is not part of a token
        assert_eq!(FireToken::from_raw(FIRED | (1 << INDEX_BITS)), None);
    }

    #[test]
    fn test_generation_wraps_past_zero() {
        assert_eq!(next_generation(0), 1);
        assert_eq!(next_generation(1), 2);
        assert_eq!(next_generation(GENERATION_MAX), 1);
    }

    #[test]
    fn test_fire_and_take() {
        let signals = FireSignals::<2>::new();
        let token = FireToken::new(1, 1);

        signals.bind(token);
        assert!(!signals.take(token));

        assert!(signals.fire(token));
        assert!(signals.is_pending(token));
        assert!(signals.take(token));
        assert!(!signals.take(token));
    }

    #[test]
    fn test_fires_coalesce() {
        let signals = FireSignals::<1>::new();
        let token = FireToken::new(0, 4);
        signals.bind(token);

        assert!(signals.fire(token));
        assert!(signals.fire(token));
        assert!(signals.take(token));
        assert!(!signals.take(token));
    }

    #[test]
    fn test_unbound_slot_ignores_fire() {
        let signals = FireSignals::<1>::new();
        let token = FireToken::new(0, 1);

        assert!(!signals.fire(token));

        signals.bind(token);
        signals.unbind(0);
        assert!(!signals.fire(token));
        assert!(!signals.is_pending(token));
    }

    #[test]
    fn test_stale_token_ignored_after_rebind() {
        let signals = FireSignals::<1>::new();
        let old = FireToken::new(0, 1);
        let new = FireToken::new(0, 2);

        signals.bind(old);
        signals.bind(new);

        assert!(!signals.fire(old));
        assert!(!signals.take(new));
        assert!(signals.fire(new));
        assert!(!signals.take(old));
        assert!(signals.take(new));
    }

    #[test]
    fn test_rebind_discards_pending_fire() {
        let signals = FireSignals::<1>::new();
        let first = FireToken::new(0, 1);
        signals.bind(first);
        signals.fire(first);

        let second = FireToken::new(0, 2);
        signals.bind(second);
        assert!(!signals.take(second));
    }

    #[test]
    fn test_out_of_range_slot_ignored() {
        let signals = FireSignals::<1>::new();
        let token = FireToken::new(5, 1);
        assert!(!signals.fire(token));
        assert!(!signals.fire_raw(token.into_raw()));
    }

    #[test]
    fn test_fire_raw() {
        let signals = FireSignals::<1>::new();
        let token = FireToken::new(0, 9);
        signals.bind(token);

        assert!(signals.fire_raw(token.into_raw()));
        assert!(signals.take(token));
        assert!(!signals.fire_raw(0));
    }
}
