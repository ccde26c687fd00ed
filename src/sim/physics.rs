//! Rocket flight integrator
//!
//! Semi-implicit Euler: every velocity change for the step happens first,
//! then position moves by the new velocity. The order of the stages
//! (gravity, steering blend, centre damping, thrust, clamp, integrate) is
//! part of the flight feel and must not be rearranged.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Rocket;
use crate::consts::MAX_SPEED;
use crate::{clamp_dt, finite_or_zero, lerp};

/// Largest magnitude accepted on either steering axis
pub const MAX_STEER_INPUT: f32 = 1.5;
/// Fraction of the level wind applied as lateral drift acceleration
const WIND_DRIFT: f32 = 0.35;

/// Steering and thrust sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringInput {
    /// Left/right (+x is toward the landing pad)
    pub lateral: f32,
    /// Pitch; positive pulls toward -z
    pub vertical: f32,
    pub thrust_held: bool,
}

impl SteeringInput {
    pub fn new(lateral: f32, vertical: f32, thrust_held: bool) -> Self {
        Self {
            lateral,
            vertical,
            thrust_held,
        }
        .sanitized()
    }

    /// Non-finite axes become zero, everything else is clamped
    pub fn sanitized(self) -> Self {
        Self {
            lateral: finite_or_zero(self.lateral).clamp(-MAX_STEER_INPUT, MAX_STEER_INPUT),
            vertical: finite_or_zero(self.vertical).clamp(-MAX_STEER_INPUT, MAX_STEER_INPUT),
            thrust_held: self.thrust_held,
        }
    }
}

/// Response curve and smoothing for steering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringTuning {
    pub deadzone: f32,
    pub expo: f32,
    pub max_magnitude: f32,
    pub sensitivity: f32,
    /// Target lateral speed per unit of shaped input, times `steer_accel`
    pub lateral_gain: f32,
    /// Target depth speed per unit of shaped input, times `steer_accel`
    pub depth_gain: f32,
    /// Blend rate with no input (1/s)
    pub response_min: f32,
    /// Blend rate at full input (1/s)
    pub response_max: f32,
    /// Damping toward zero when centred (1/s)
    pub center_damping: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            deadzone: 0.06,
            expo: 1.6,
            max_magnitude: MAX_STEER_INPUT,
            sensitivity: 1.0,
            lateral_gain: 0.75,
            depth_gain: 0.45,
            response_min: 3.0,
            response_max: 9.0,
            center_damping: 2.2,
        }
    }
}

impl SteeringTuning {
    /// Deadzone plus exponent response, sign preserved
    pub fn shape_axis(&self, v: f32) -> f32 {
        let mag = finite_or_zero(v).abs().min(self.max_magnitude);
        if mag <= self.deadzone {
            return 0.0;
        }
        let span = self.max_magnitude - self.deadzone;
        if span <= 0.0 {
            return 0.0;
        }
        let n = ((mag - self.deadzone) / span).powf(self.expo);
        (n * self.max_magnitude).copysign(v)
    }
}

/// Per-level physics constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub wind: f32,
    pub max_speed: f32,
    pub steering: SteeringTuning,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            wind: 0.0,
            max_speed: MAX_SPEED,
            steering: SteeringTuning::default(),
        }
    }
}

/// Advance the rocket by `dt` seconds
pub fn integrate(
    rocket: &Rocket,
    input: &SteeringInput,
    params: &PhysicsParams,
    dt: f32,
) -> Rocket {
    let dt = clamp_dt(dt);
    let input = input.sanitized();
    let tuning = &params.steering;
    let mut next = *rocket;
    let mut vel = rocket.vel;

    // Gravity and wind drift
    vel.y -= params.gravity * dt;
    vel.x += params.wind * WIND_DRIFT * dt;

    // Steering targets
    let lat = tuning.shape_axis(input.lateral) * tuning.sensitivity;
    let vert = tuning.shape_axis(input.vertical) * tuning.sensitivity;
    let target_vx = lat * rocket.steer_accel * tuning.lateral_gain;
    let target_vz = -vert * rocket.steer_accel * tuning.depth_gain;

    // Blend harder the further the stick is pushed
    let magnitude = lat.hypot(vert).min(1.0);
    let rate = lerp(tuning.response_min, tuning.response_max, magnitude);
    let blend = 1.0 - (-rate * dt).exp();
    vel.x += (target_vx - vel.x) * blend;
    vel.z += (target_vz - vel.z) * blend;

    // Settle when centred
    let damping = tuning.center_damping * (1.0 - magnitude);
    let decay = (-damping * dt).exp();
    vel.x *= decay;
    vel.z *= decay;

    if input.thrust_held {
        vel.y += rocket.thrust_power * dt;
        next.fuel = (rocket.fuel - rocket.fuel_burn * dt).max(0.0);
    }

    let limit = params.max_speed.abs();
    vel = vel.clamp(Vec3::splat(-limit), Vec3::splat(limit));

    next.vel = vel;
    next.pos = rocket.pos + vel * dt;
    next
}
