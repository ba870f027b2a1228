//! Frame clock with delta clamping and fixed-size sub-step planning.
//!
//! Every rendered frame hands the simulation one wall-clock delta. That delta
//! is first clamped to `max_frame_dt` (bounding catch-up after a stall), then
//! split into `substep_dt` slices by [`SubSteps`]. The final slice carries the
//! remainder, so the slices always add up to the clamped delta.

pub const DEFAULT_MAX_FRAME_DT: f32 = 0.1;
pub const DEFAULT_SUBSTEP_DT: f32 = 0.01;

/// Tolerance used when deciding how many whole sub-steps fit in a delta, so
/// that `0.1 / 0.01` does not round up to eleven slices.
const SLICE_EPS: f32 = 1e-4;

/// Iterator over the sub-step durations of a single frame.
#[derive(Debug, Clone)]
pub struct SubSteps {
    step: f32,
    last: f32,
    remaining_full: u32,
    done: bool,
}

impl SubSteps {
    pub fn new(delta: f32, step: f32) -> Self {
        if !(delta > 0.0) || !(step > 0.0) {
            return Self {
                step,
                last: 0.0,
                remaining_full: 0,
                done: true,
            };
        }

        let count = ((delta / step) - SLICE_EPS).ceil().max(1.0) as u32;
        let last = delta - step * (count - 1) as f32;
        Self {
            step,
            last,
            remaining_full: count - 1,
            done: false,
        }
    }

    /// Number of slices left, including the remainder slice.
    pub fn len_remaining(&self) -> u32 {
        if self.done {
            0
        } else {
            self.remaining_full + 1
        }
    }
}

impl Iterator for SubSteps {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.done {
            return None;
        }
        if self.remaining_full > 0 {
            self.remaining_full -= 1;
            return Some(self.step);
        }
        self.done = true;
        Some(self.last)
    }
}

pub struct TimeState {
    pub max_frame_dt: f32,
    pub substep_dt: f32,
    pub total_time: f64,
    pub frame_count: u64,
    pub substep_count: u64,
    pub steps_this_frame: u32,
    pub frame_dt: f32,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_steps(DEFAULT_MAX_FRAME_DT, DEFAULT_SUBSTEP_DT)
    }

    pub fn with_steps(max_frame_dt: f32, substep_dt: f32) -> Self {
        Self {
            max_frame_dt,
            substep_dt,
            total_time: 0.0,
            frame_count: 0,
            substep_count: 0,
            steps_this_frame: 0,
            frame_dt: 0.0,
        }
    }

    /// Accept a raw frame delta and return the clamped delta the simulation
    /// will consume this frame.
    pub fn begin_frame(&mut self, raw_dt: f32) -> f32 {
        let mut dt = if raw_dt.is_finite() { raw_dt.max(0.0) } else { 0.0 };

        // Stall cap
        if dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping simulation delta to {:.1}ms",
                dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            dt = self.max_frame_dt;
        }

        self.frame_dt = dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
        dt
    }

    /// Sub-step plan for the delta accepted by the last `begin_frame`.
    pub fn substeps(&self) -> SubSteps {
        SubSteps::new(self.frame_dt, self.substep_dt)
    }

    pub fn record_step(&mut self, dt: f32) {
        self.total_time += dt as f64;
        self.substep_count += 1;
        self.steps_this_frame += 1;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
