//! Rocket Corridor - flight simulation core for a 3D rocket lander
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain field, physics, collisions, flight state)
//! - `platform`: Host-side helpers (tilt input filtering)
//! - `settings`: Player-tunable gameplay settings
//! - `highscores`: Leaderboard payloads and local best scores

pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use highscores::{BestScore, HighScores, ScoreSubmission};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Largest frame step the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Collision radius of the rocket body
    pub const ROCKET_RADIUS: f32 = 0.35;
    /// Default thrust acceleration (units/s²)
    pub const ROCKET_THRUST_POWER: f32 = 18.5;
    /// Default steering acceleration scale
    pub const ROCKET_STEER_ACCEL: f32 = 10.0;
    /// Fuel is effectively unlimited
    pub const ROCKET_FUEL: f32 = 9999.0;
    /// Fuel used per second of thrust (tank never empties by default)
    pub const ROCKET_FUEL_BURN: f32 = 0.0;

    /// Velocity clamp applied to each component every step
    pub const MAX_SPEED: f32 = 25.0;

    /// Landing tolerances
    pub const MAX_LANDING_VSPD: f32 = 6.0;
    pub const MAX_LANDING_HSPD: f32 = 5.5;
    pub const MAX_LANDING_ANGLE_DEG: f32 = 18.0;

    /// Pad box height (pads are boxes centred at `center.y`)
    pub const PAD_HEIGHT: f32 = 1.0;
    /// Height above the pad top where a resting rocket sits
    pub const PAD_REST_OFFSET: f32 = 0.15;
    /// Band above the landing pad top where terrain checks are skipped
    pub const PAD_APPROACH_MARGIN: f32 = 0.7;
    /// Touchdown height above the landing pad top
    pub const PAD_CONTACT_MARGIN: f32 = 0.2;
    /// Horizontal friction applied on the launch pad per tick
    pub const PAD_FRICTION: f32 = 0.9;
    /// Rocket base must stay this far above the ground
    pub const TERRAIN_CLEARANCE: f32 = 0.65;

    /// Lateral input magnitude that launches the rocket from READY
    pub const LAUNCH_STEER_THRESHOLD: f32 = 0.05;
    /// Delay before reset/advance after a crash or landing (seconds)
    pub const OUTCOME_DELAY: f32 = 0.9;
    /// Delay between leaving a landed level and loading the next one
    pub const TRANSITION_DELAY: f32 = 0.35;

    /// Visual tilt limits and smoothing (radians, 1/s)
    pub const MAX_VISUAL_ROLL: f32 = 0.6;
    pub const MAX_VISUAL_PITCH: f32 = 0.25;
    pub const VISUAL_TILT_RATE: f32 = 10.0;
}

/// Cubic Hermite blend `t²(3-2t)` of `x` between two edges.
///
/// Degenerate edges (`edge0 == edge1`) become a hard step at `edge0` instead
/// of dividing by zero.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 || !span.is_finite() {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Bell curve over a segment: zero at both ends, one at the midpoint
#[inline]
pub fn bell(t: f32) -> f32 {
    (smoothstep(0.0, 1.0, t) * std::f32::consts::PI).sin()
}

/// Exponentially approach `target` at `rate` per second
#[inline]
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - (-rate * dt).exp())
}

/// Clamp a host frame delta into the range the integrator accepts
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Replace non-finite values with zero
#[inline]
pub fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_degenerate_span() {
        let v = smoothstep(2.0, 2.0, 2.5);
        assert!(v.is_finite());
        assert_eq!(v, 1.0);
        assert_eq!(smoothstep(2.0, 2.0, 1.0), 0.0);
    }

    #[test]
    fn test_bell_peaks_mid_segment() {
        assert!(bell(0.0).abs() < 1e-6);
        assert!(bell(1.0).abs() < 1e-5);
        assert!((bell(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.1), consts::MAX_FRAME_DT);
        assert_eq!(clamp_dt(-0.01), 0.0);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert_eq!(clamp_dt(0.016), 0.016);
    }
}
