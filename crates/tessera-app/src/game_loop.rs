//! Fixed-timestep stepping for the headless walk.
//!
//! Frame times are supplied by the caller, so a run of `n` frames at a given
//! frame time always produces the same sequence of simulation steps.

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame time accepted per call; anything longer is clamped.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator that converts variable frame times into fixed simulation steps.
#[derive(Debug, Default, Clone)]
pub struct FixedTimestep {
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `frame_time` seconds.
    ///
    /// `update_fn(FIXED_DT, total_sim_time)` runs zero or more times. Returns
    /// the number of steps taken this frame.
    pub fn advance(&mut self, frame_time: f64, mut update_fn: impl FnMut(f64, f64)) -> u32 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
            steps += 1;
        }

        self.frame_count += 1;
        steps
    }

    /// Fraction of a step left in the accumulator, in `[0.0, 1.0)`.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Simulated seconds so far.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}
