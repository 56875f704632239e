//! Pure stopwatch and lap-split logic with no platform dependencies.
//! Testable on host; the terminal front end only feeds it clock readings.

use std::time::Instant;

mod export;
mod format;

pub use export::{laps_to_csv, write_csv, ExportError, CSV_HEADER};
pub use format::format_duration;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Source of monotonic milliseconds. Wall-clock adjustments must not move it.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `Instant`-backed clock measuring from its own construction.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// One recorded split.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LapRecord {
    /// 1-based, assigned at creation.
    pub index: usize,
    /// Time since the previous lap, or since start for the first one.
    pub lap_duration_ms: f64,
    /// Total elapsed time when the lap was taken.
    pub cumulative_ms: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LapClass {
    None,
    Fastest,
    Slowest,
}

pub struct TimerEngine {
    state: TimerState,
    start_moment_ms: Option<f64>,
    accumulated_ms: f64,
    laps: Vec<LapRecord>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            start_moment_ms: None,
            accumulated_ms: 0.0,
            laps: Vec::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Idle with nothing recorded: the state a fresh engine or a reset leaves.
    pub fn is_pristine(&self) -> bool {
        self.state == TimerState::Idle && self.laps.is_empty()
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.state == TimerState::Running {
            return;
        }
        self.start_moment_ms = Some(now_ms);
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.state != TimerState::Running {
            return;
        }
        if let Some(start) = self.start_moment_ms.take() {
            self.accumulated_ms += (now_ms - start).max(0.0);
        }
        self.state = TimerState::Paused;
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self, now_ms: f64) {
        if self.is_running() {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.pause(now_ms);
        self.accumulated_ms = 0.0;
        self.start_moment_ms = None;
        self.laps.clear();
        self.state = TimerState::Idle;
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match (self.state, self.start_moment_ms) {
            (TimerState::Running, Some(start)) => self.accumulated_ms + (now_ms - start).max(0.0),
            _ => self.accumulated_ms,
        }
    }

    /// Records a split at `now_ms`. Nothing is recorded before any time has
    /// accrued.
    pub fn lap(&mut self, now_ms: f64) -> Option<LapRecord> {
        let current = self.elapsed_ms(now_ms);
        if current <= 0.0 {
            return None;
        }
        let previous = self.laps.last().map(|l| l.cumulative_ms).unwrap_or(0.0);
        let record = LapRecord {
            index: self.laps.len() + 1,
            lap_duration_ms: current - previous,
            cumulative_ms: current,
        };
        self.laps.push(record);
        Some(record)
    }

    pub fn clear_laps(&mut self) {
        self.laps.clear();
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Fastest/slowest tags aligned with `laps()`. Fewer than two laps, or all
    /// laps equal, tags nothing.
    pub fn classify_laps(&self) -> Vec<LapClass> {
        classify(&self.laps)
    }
}

pub fn classify(laps: &[LapRecord]) -> Vec<LapClass> {
    let mut classes = vec![LapClass::None; laps.len()];
    if laps.len() < 2 {
        return classes;
    }

    let (min, max) = laps.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| {
        (lo.min(l.lap_duration_ms), hi.max(l.lap_duration_ms))
    });
    if min == max {
        return classes;
    }

    for (class, lap) in classes.iter_mut().zip(laps) {
        if lap.lap_duration_ms == min {
            *class = LapClass::Fastest;
        } else if lap.lap_duration_ms == max {
            *class = LapClass::Slowest;
        }
    }
    classes
}
