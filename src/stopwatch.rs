use timer_core::{LapRecord, TimerEngine, TimerState};

pub struct StopwatchState {
    pub timer: TimerEngine,
    pub lap_scroll_offset: usize,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self {
            timer: TimerEngine::new(),
            lap_scroll_offset: 0,
        }
    }

    pub fn record_lap(&mut self, now_ms: f64) -> Option<LapRecord> {
        let lap = self.timer.lap(now_ms)?;
        // Newest lap is drawn first; jump back to it.
        self.lap_scroll_offset = 0;
        log::debug!("lap {} recorded at {:.0} ms", lap.index, lap.cumulative_ms);
        Some(lap)
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.timer.reset(now_ms);
        self.lap_scroll_offset = 0;
    }

    pub fn clear_laps(&mut self) {
        self.timer.clear_laps();
        self.lap_scroll_offset = 0;
    }

    pub fn scroll_up(&mut self) {
        self.lap_scroll_offset = self.lap_scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.lap_scroll_offset + 1 < self.timer.lap_count() {
            self.lap_scroll_offset += 1;
        }
    }

    /// Label for the start/pause control.
    pub fn toggle_label(&self) -> &'static str {
        match self.timer.state() {
            TimerState::Idle => "Start",
            TimerState::Running => "Pause",
            TimerState::Paused => "Resume",
        }
    }
}
