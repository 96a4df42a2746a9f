//! Frame driver
//!
//! Turns measured display-frame time into fixed simulation ticks, so the
//! conveyor moves at the same real-time rate on any refresh rate.

use crate::consts::*;
use crate::sim::{ConveyorState, tick};

/// Fixed-timestep accumulator fed once per display frame
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    accumulator: f32,
    last_time: Option<f64>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp (seconds). The first call only records the
    /// time. Returns the number of ticks run.
    pub fn frame(&mut self, state: &mut ConveyorState, now_secs: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => (now_secs - last) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_secs);
        self.advance(state, dt)
    }

    /// Run simulation ticks for `dt` seconds of elapsed time
    pub fn advance(&mut self, state: &mut ConveyorState, dt: f32) -> u32 {
        // Long stalls (hidden tab, debugger) are dropped, not replayed
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    /// Forget timing history (e.g. after the page becomes visible again)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_first_frame_runs_no_ticks() {
        let mut state = ConveyorState::empty(&Settings::default());
        let mut driver = FrameDriver::new();
        assert_eq!(driver.frame(&mut state, 10.0), 0);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_refresh_rate_does_not_change_sim_rate() {
        let mut at_60 = ConveyorState::empty(&Settings::default());
        let mut at_30 = ConveyorState::empty(&Settings::default());
        let mut d60 = FrameDriver::new();
        let mut d30 = FrameDriver::new();

        for frame in 0..=600 {
            d60.frame(&mut at_60, frame as f64 / 60.0);
        }
        for frame in 0..=300 {
            d30.frame(&mut at_30, frame as f64 / 30.0);
        }
        let diff = at_60.time_ticks.abs_diff(at_30.time_ticks);
        assert!(diff <= 1, "60Hz ran {} ticks, 30Hz ran {}", at_60.time_ticks, at_30.time_ticks);
        assert!((599..=600).contains(&at_60.time_ticks));
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut state = ConveyorState::empty(&Settings::default());
        let mut driver = FrameDriver::new();
        let ticks = driver.advance(&mut state, 5.0);
        // 0.1s of accumulated time at most
        assert!(ticks <= 6);
        assert!(ticks <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_reset_forgets_last_time() {
        let mut state = ConveyorState::empty(&Settings::default());
        let mut driver = FrameDriver::new();
        driver.frame(&mut state, 1.0);
        driver.reset();
        assert_eq!(driver.frame(&mut state, 50.0), 0);
        assert_eq!(driver.alpha(), 0.0);
    }
}
