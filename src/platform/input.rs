//! Device tilt and thrust input
//!
//! Orientation samples arrive in degrees from the host. They are scaled to
//! roughly ±1, offset by a calibration bias, clamped and smoothed once per
//! frame before becoming a `SteeringInput`.

use glam::Vec2;

use crate::sim::physics::SteeringInput;
use crate::sim::state::FlightState;
use crate::{clamp_dt, smooth_toward};

/// Degrees of left/right roll mapped to one unit of lateral input
pub const GAMMA_RANGE_DEG: f32 = 30.0;
/// Degrees of forward/back pitch mapped to one unit of vertical input
pub const BETA_RANGE_DEG: f32 = 45.0;
/// Largest filtered tilt on either axis
pub const MAX_TILT: f32 = 1.2;
/// Smoothing rate (1/s)
pub const TILT_RATE: f32 = 14.0;

/// Filters raw host input into per-tick steering
#[derive(Debug, Clone, Default)]
pub struct InputFilter {
    /// Orientation samples are ignored until enabled
    pub motion_enabled: bool,
    pub thrust_held: bool,
    bias: Vec2,
    raw: Vec2,
    tilt: Vec2,
    has_motion_sample: bool,
}

impl InputFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting orientation samples
    pub fn enable_motion(&mut self) {
        self.motion_enabled = true;
        self.has_motion_sample = false;
        log::info!("Tilt input enabled");
    }

    /// Whether any orientation sample arrived since motion was enabled
    pub fn has_motion_sample(&self) -> bool {
        self.has_motion_sample
    }

    /// Feed one orientation event (gamma = roll, beta = pitch, degrees)
    pub fn orientation(&mut self, gamma_deg: f32, beta_deg: f32) {
        if !self.motion_enabled || !gamma_deg.is_finite() || !beta_deg.is_finite() {
            return;
        }
        self.raw = Vec2::new(gamma_deg / GAMMA_RANGE_DEG, beta_deg / BETA_RANGE_DEG);
        self.has_motion_sample = true;
    }

    /// Treat the current pose as neutral
    pub fn calibrate(&mut self) {
        self.bias = self.raw;
        log::info!("Tilt calibrated at ({:.2}, {:.2})", self.bias.x, self.bias.y);
    }

    /// Ease the filtered tilt toward the latest sample
    pub fn update(&mut self, dt: f32) {
        let dt = clamp_dt(dt);
        let target = (self.raw - self.bias).clamp(Vec2::splat(-MAX_TILT), Vec2::splat(MAX_TILT));
        self.tilt.x = smooth_toward(self.tilt.x, target.x, TILT_RATE, dt);
        self.tilt.y = smooth_toward(self.tilt.y, target.y, TILT_RATE, dt);
    }

    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    pub fn steering(&self) -> SteeringInput {
        SteeringInput::new(self.tilt.x, self.tilt.y, self.thrust_held)
    }

    /// Drop a held thrust button so it cannot launch the next attempt
    pub fn release_thrust(&mut self) {
        self.thrust_held = false;
    }

    /// Follow a flight state change made during a tick
    ///
    /// Deferred resets and level loads land the rocket back in `Ready`;
    /// thrust has to be pressed again after that.
    pub fn follow_state(&mut self, before: FlightState, after: FlightState) {
        if after == FlightState::Ready && before != FlightState::Ready {
            self.release_thrust();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_ignored_until_enabled() {
        let mut f = InputFilter::new();
        f.orientation(30.0, 0.0);
        f.update(0.03);
        assert_eq!(f.tilt(), Vec2::ZERO);
        assert!(!f.has_motion_sample());
    }

    #[test]
    fn test_tilt_converges_and_clamps() {
        let mut f = InputFilter::new();
        f.enable_motion();
        f.orientation(90.0, -22.5);
        for _ in 0..100 {
            f.update(0.03);
        }
        assert!((f.tilt().x - MAX_TILT).abs() < 1e-3);
        assert!((f.tilt().y + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_calibration_recentres() {
        let mut f = InputFilter::new();
        f.enable_motion();
        f.orientation(15.0, 20.0);
        f.calibrate();
        for _ in 0..100 {
            f.update(0.03);
        }
        assert!(f.tilt().length() < 1e-4);

        f.thrust_held = true;
        let s = f.steering();
        assert!(s.thrust_held);
        assert!(s.lateral.abs() < 1e-4);
    }

    #[test]
    fn test_non_finite_sample_dropped() {
        let mut f = InputFilter::new();
        f.enable_motion();
        f.orientation(f32::NAN, 10.0);
        assert!(!f.has_motion_sample());
    }

    #[test]
    fn test_thrust_released_when_returned_to_ready() {
        use crate::sim::state::FlightPhase;

        let mut f = InputFilter::new();
        f.thrust_held = true;
        let flying = FlightState::Flying(FlightPhase::Side);
        f.follow_state(flying, flying);
        assert!(f.thrust_held);
        f.follow_state(FlightState::Ready, FlightState::Ready);
        assert!(f.thrust_held);

        f.follow_state(FlightState::Crashed, FlightState::Ready);
        assert!(!f.thrust_held);

        f.thrust_held = true;
        f.follow_state(FlightState::Landed, FlightState::Ready);
        assert!(!f.steering().thrust_held);
    }
}
