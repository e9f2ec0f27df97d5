//! # milestone-timer
//!
//! Interrupt-driven milestone timer for embedded control loops, with zero heap
//! allocation.
//!
//! **Key features:**
//! - **Named milestones** - Offsets after start or before end, delivered in order
//! - **Lifecycle** - Start, pause, resume and reset with continuous elapsed time
//! - **Two cadences** - Short and long periodic callbacks while running
//! - **Hardware wakes** - Fixed pool of countdown channels shared by many timers
//! - **Lock-free handoff** - Interrupts only set an atomic flag; the main loop does the rest
//!
//! A timer works without any hardware at all: every [`Timer::tick`] compares
//! the clock against the next event. Binding it to a [`TimerPool`] adds an
//! interrupt-armed wake for lower latency.
//!
//! ```rust,ignore
//! static SIGNALS: FireSignals<4> = FireSignals::new();
//!
//! let pool = TimerPool::new(&SIGNALS, channels);
//! let mut timer = Timer::new(&clock, 1_000, 60_000).with_wake_source(&pool);
//! timer.set_duration(500)?;
//! timer.add_milestone_after_start(100, "warmup")?;
//! timer.add_milestone_before_end(200, "cooldown")?;
//! timer.set_milestone_callback(Some(&mut on_milestone));
//! timer.start()?;
//!
//! loop {
//!     timer.tick();
//! }
//! ```
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod clock;
pub mod component;
pub mod config;
pub mod error;

pub mod milestone;
pub mod periodic;
pub mod pool;
pub mod timer;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Collaborators
pub use clock::{Clock, Millis};
pub use component::Component;

// Configuration
pub use config::{DefaultConfig, InterruptConfig, TimerConfig};

// Error types
pub use error::TimerError;

// Milestones and cadences
pub use milestone::{Milestone, MilestoneSequence};
pub use periodic::{Cadence, PeriodHits, PeriodicChecker};

// Hardware pool
pub use pool::{AlarmChannel, FireSignals, FireToken, SlotHandle, TimerId, TimerPool, WakeSource};

// Timer
pub use timer::{Timer, TimerState};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
