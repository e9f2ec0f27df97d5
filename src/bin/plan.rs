//! Milestone plan runner.
//!
//! Loads a timer plan from TOML and replays it against a virtual clock,
//! printing every callback as it fires.
//!
//! ```toml
//! duration = 10000
//! short_period = 1000
//! long_period = 5000
//!
//! [[milestone]]
//! label = "warmup done"
//! after_start = 2000
//!
//! [[milestone]]
//! label = "cooldown"
//! before_end = 1500
//!
//! [[pause]]
//! at = 4000
//! length = 3000
//! ```
//!
//! Usage: `milestone-plan <plan.toml>`

use milestone_timer::{Cadence, Clock, DefaultConfig, Millis, Timer, TimerConfig, TimerState};
use serde::Deserialize;
use std::cell::Cell;
use std::env;
use std::fs;
use std::process::ExitCode;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Plan {
    duration: Millis,
    #[serde(default = "default_short")]
    short_period: Millis,
    #[serde(default = "default_long")]
    long_period: Millis,
    #[serde(default, rename = "milestone")]
    milestones: Vec<MilestoneEntry>,
    #[serde(default, rename = "pause")]
    pauses: Vec<PauseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MilestoneEntry {
    label: String,
    after_start: Option<Millis>,
    before_end: Option<Millis>,
}

/// Pause the run at clock time `at` (from start) for `length` ms.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PauseEntry {
    at: Millis,
    length: Millis,
}

fn default_short() -> Millis {
    DefaultConfig::SHORT_PERIOD
}

fn default_long() -> Millis {
    DefaultConfig::LONG_PERIOD
}

#[derive(Debug, Default)]
struct VirtualClock {
    now: Cell<Millis>,
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Pauses in the order the run reaches them.
fn pause_schedule(pauses: &[PauseEntry]) -> Vec<&PauseEntry> {
    let mut schedule: Vec<&PauseEntry> = pauses.iter().collect();
    schedule.sort_by_key(|pause| pause.at);
    schedule
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        let program = args.first().map_or("milestone-plan", String::as_str);
        eprintln!("Usage: {} <plan.toml>", program);
        return ExitCode::FAILURE;
    };

    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
    let plan: Plan = toml::from_str(&source).map_err(|e| format!("Invalid plan: {}", e))?;

    let clock = VirtualClock::default();
    let mut on_milestone = |label: &str, elapsed: Millis| {
        println!("{:>8}  milestone  {:<24} elapsed {}", clock.now_ms(), label, elapsed);
    };
    let mut on_period = |cadence: Cadence, now: Millis| {
        let name = match cadence {
            Cadence::Short => "short",
            Cadence::Long => "long",
        };
        println!("{:>8}  period     {}", now, name);
    };
    let mut on_finish = |elapsed: Millis| {
        println!("{:>8}  finished   elapsed {}", clock.now_ms(), elapsed);
    };
    let mut on_pause = |elapsed: Millis| {
        println!("{:>8}  paused     elapsed {}", clock.now_ms(), elapsed);
    };

    let mut timer = Timer::new(&clock, plan.short_period, plan.long_period);
    timer.set_duration(plan.duration).map_err(|e| e.to_string())?;

    for entry in &plan.milestones {
        let added = match (entry.after_start, entry.before_end) {
            (Some(offset), None) => timer.add_milestone_after_start(offset, &entry.label),
            (None, Some(before)) => timer.add_milestone_before_end(before, &entry.label),
            _ => {
                return Err(format!(
                    "Milestone '{}' needs exactly one of after_start, before_end",
                    entry.label
                ));
            }
        };
        added.map_err(|e| format!("Milestone '{}': {}", entry.label, e))?;
    }

    timer.set_milestone_callback(Some(&mut on_milestone));
    timer.set_period_callback(Some(&mut on_period));
    timer.set_finished_callback(Some(&mut on_finish));
    timer.set_pause_callback(Some(&mut on_pause));

    println!(
        "Plan: {} ms, {} milestones, cadences {}/{} ms",
        plan.duration,
        timer.milestones().len(),
        plan.short_period,
        plan.long_period
    );

    timer.start().map_err(|e| e.to_string())?;

    let mut pauses = pause_schedule(&plan.pauses).into_iter().peekable();
    while timer.state() != TimerState::Done {
        if let Some(pause) = pauses.peek()
            && clock.now_ms() >= pause.at
        {
            let resumed = clock
                .now_ms()
                .checked_add(pause.length)
                .filter(|at| at.checked_add(plan.duration).is_some())
                .ok_or_else(|| format!("Pause at {} ms is too long", pause.at))?;
            timer.pause().map_err(|e| e.to_string())?;
            clock.now.set(resumed);
            timer.resume().map_err(|e| e.to_string())?;
            pauses.next();
        }

        clock.now.set(clock.now_ms() + 1);
        timer.tick();
    }

    Ok(())
}
