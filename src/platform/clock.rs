//! Fixed timestep accumulator

use std::time::Instant;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame the accumulator accepts, in seconds
const MAX_FRAME_TIME: f32 = 0.1;

/// Converts wall-clock time into a number of simulation ticks
#[derive(Debug, Default)]
pub struct FixedStep {
    accumulator: f32,
    last: Option<Instant>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks to run for a frame that started at `now`
    pub fn advance_to(&mut self, now: Instant) -> u32 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => SIM_DT,
        };
        self.last = Some(now);
        self.advance(dt)
    }

    /// Ticks to run after `dt` seconds
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_TIME);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Drop accumulated time, e.g. after the window was hidden
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last = None;
    }
}
