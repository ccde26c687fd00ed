//! Collision and landing judgment
//!
//! Runs once per flying tick after integration. Contact with a pad is either a
//! soft catch (launch pad) or a touchdown handed to the landing judge; anything
//! else solid ends the flight.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{FlightMetrics, Rocket};
use super::world::World;
use crate::consts::*;

/// What the rocket touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionOutcome {
    Safe,
    RoofHit,
    TunnelHit,
    TerrainHit,
    /// Resting on (or caught by) the launch pad
    OnLaunchPad,
    /// Touching down on the landing pad
    OnLandingPad,
}

impl CollisionOutcome {
    /// Crash reason for fatal outcomes
    pub fn crash_reason(self) -> Option<CrashReason> {
        match self {
            CollisionOutcome::RoofHit => Some(CrashReason::RoofHit),
            CollisionOutcome::TunnelHit => Some(CrashReason::TunnelHit),
            CollisionOutcome::TerrainHit => Some(CrashReason::TerrainHit),
            _ => None,
        }
    }

    pub fn is_fatal(self) -> bool {
        self.crash_reason().is_some()
    }
}

/// Why a flight ended badly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrashReason {
    RoofHit,
    TunnelHit,
    TerrainHit,
    /// Vertical speed at touchdown
    TooFastVertical(f32),
    /// Horizontal speed at touchdown
    TooFastHorizontal(f32),
    /// Tilt at touchdown (degrees)
    BadAngle(f32),
}

impl fmt::Display for CrashReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrashReason::RoofHit => write!(f, "ROOF HIT"),
            CrashReason::TunnelHit => write!(f, "TUNNEL HIT"),
            CrashReason::TerrainHit => write!(f, "TERRAIN HIT"),
            CrashReason::TooFastVertical(v) => write!(f, "TOO FAST VSPD {v:.1}"),
            CrashReason::TooFastHorizontal(h) => write!(f, "TOO FAST HSPD {h:.1}"),
            CrashReason::BadAngle(a) => write!(f, "BAD ANGLE {}°", a.round()),
        }
    }
}

/// Test the rocket against the environment, applying soft catches in place
pub fn judge(rocket: &mut Rocket, world: &World, radius: f32) -> CollisionOutcome {
    let ground_y = world.ground_height_at(rocket.pos.x, rocket.pos.z);

    if world.check_roof_collision(rocket.pos) {
        return CollisionOutcome::RoofHit;
    }

    hold_open_side(rocket, world, radius);
    if world.check_tunnel_collision(rocket.pos, radius) {
        return CollisionOutcome::TunnelHit;
    }

    let over_launch = world.is_over_launch_pad(rocket.pos);
    let over_landing = world.is_over_landing_pad(rocket.pos);

    if over_launch {
        let rest_y = world.launch_pad_top_y() + PAD_REST_OFFSET;
        if rocket.pos.y <= rest_y {
            rocket.pos.y = rest_y;
            rocket.vel.y = rocket.vel.y.max(0.0);
            rocket.vel.x *= PAD_FRICTION;
            rocket.vel.z *= PAD_FRICTION;
            return CollisionOutcome::OnLaunchPad;
        }
        return CollisionOutcome::Safe;
    }

    let pad_top = world.landing_pad_top_y();
    if over_landing && rocket.pos.y <= pad_top + PAD_APPROACH_MARGIN {
        if rocket.pos.y <= pad_top + PAD_CONTACT_MARGIN {
            return CollisionOutcome::OnLandingPad;
        }
        return CollisionOutcome::Safe;
    }

    if !over_landing && rocket.pos.y <= ground_y + TERRAIN_CLEARANCE {
        return CollisionOutcome::TerrainHit;
    }

    CollisionOutcome::Safe
}

/// Corridors have no near wall; keep the rocket from leaving through it
fn hold_open_side(rocket: &mut Rocket, world: &World, radius: f32) {
    if let Some(profile) = world.corridor_at(rocket.pos.x) {
        let limit = profile.half_width - radius;
        if rocket.pos.z > limit {
            rocket.pos.z = limit;
            rocket.vel.z = rocket.vel.z.min(0.0);
        }
    }
}

/// Touchdown limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingTolerances {
    pub max_vspd: f32,
    pub max_hspd: f32,
    pub max_angle_deg: f32,
}

impl Default for LandingTolerances {
    fn default() -> Self {
        Self {
            max_vspd: MAX_LANDING_VSPD,
            max_hspd: MAX_LANDING_HSPD,
            max_angle_deg: MAX_LANDING_ANGLE_DEG,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LandingVerdict {
    Landed { bonus: u32 },
    Crash(CrashReason),
}

/// Compare touchdown metrics against the tolerances
///
/// Vertical speed is checked first, then horizontal speed, then tilt; the
/// first failure names the crash. A clean landing earns
/// `max(0, round(100 - (hspd*8 + |vspd|*6 + ang*2)))` on top of the base 100.
pub fn judge_landing(metrics: &FlightMetrics, tol: &LandingTolerances) -> LandingVerdict {
    let FlightMetrics { vspd, hspd, ang } = *metrics;

    if !(vspd.abs() <= tol.max_vspd) {
        return LandingVerdict::Crash(CrashReason::TooFastVertical(vspd));
    }
    if !(hspd <= tol.max_hspd) {
        return LandingVerdict::Crash(CrashReason::TooFastHorizontal(hspd));
    }
    if !(ang <= tol.max_angle_deg) {
        return LandingVerdict::Crash(CrashReason::BadAngle(ang));
    }

    let penalty = hspd * 8.0 + vspd.abs() * 6.0 + ang * 2.0;
    let bonus = (100.0 - penalty).round().max(0.0) as u32;
    LandingVerdict::Landed { bonus }
}
