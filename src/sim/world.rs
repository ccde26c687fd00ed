//! The active level's static environment
//!
//! Wraps whichever terrain field the level uses behind one query surface for
//! collision, camera and HUD code.

use glam::Vec3;

use super::corridor::{CorridorField, CorridorProfile};
use super::level::{Level, LevelTerrain, Pad};
use super::terrain::OpenTerrain;

/// Minimum flight ceiling above the taller pad
const PAD_CLEARANCE: f32 = 6.0;
/// Headroom above the highest terrain along an open route
const ROUTE_PEAK_MARGIN: f32 = 4.0;
/// Headroom above the top of any gate opening
const OPENING_MARGIN: f32 = 1.0;
/// Added on top of everything else
const CEILING_SAFETY_MARGIN: f32 = 1.5;
/// Horizontal distance from the landing pad that counts as the finish on open levels
const OPEN_FINISH_RADIUS: f32 = 12.0;

/// Height field for the active level
#[derive(Debug, Clone)]
pub enum TerrainField {
    Open(OpenTerrain),
    Corridor(CorridorField),
}

/// Static environment built once per level load
#[derive(Debug, Clone)]
pub struct World {
    level: Level,
    field: TerrainField,
    flight_ceiling: f32,
}

impl World {
    pub fn new(level: &Level) -> Self {
        let field = match &level.terrain {
            LevelTerrain::Open(params) => TerrainField::Open(OpenTerrain::generate(
                params,
                &level.launch_pad,
                &level.landing_pad,
            )),
            LevelTerrain::Corridor(params) => TerrainField::Corridor(CorridorField::build(
                params,
                &level.launch_pad,
                &level.landing_pad,
            )),
        };

        let mut world = Self {
            level: level.clone(),
            field,
            flight_ceiling: 0.0,
        };
        world.flight_ceiling = world.compute_flight_ceiling();
        world
    }

    fn compute_flight_ceiling(&self) -> f32 {
        let pads = self.launch_pad_top_y().max(self.landing_pad_top_y()) + PAD_CLEARANCE;
        let route = match &self.field {
            TerrainField::Open(t) => t.route_peak() + ROUTE_PEAK_MARGIN,
            TerrainField::Corridor(c) => c.peak_ceiling(),
        };
        let openings = match &self.field {
            TerrainField::Open(t) => t.opening_tops().fold(f32::MIN, f32::max) + OPENING_MARGIN,
            TerrainField::Corridor(_) => f32::MIN,
        };
        pads.max(route).max(openings) + CEILING_SAFETY_MARGIN
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn field(&self) -> &TerrainField {
        &self.field
    }

    pub fn spawn(&self) -> Vec3 {
        self.level.spawn
    }

    pub fn launch_pad(&self) -> &Pad {
        &self.level.launch_pad
    }

    pub fn landing_pad(&self) -> &Pad {
        &self.level.landing_pad
    }

    /// Ground (or corridor floor) height below `(x, z)`
    pub fn ground_height_at(&self, x: f32, z: f32) -> f32 {
        match &self.field {
            TerrainField::Open(t) => t.height_at(x, z),
            TerrainField::Corridor(c) => c.floor_at(x),
        }
    }

    /// Corridor cross-section at `x` (corridor levels only)
    pub fn corridor_at(&self, x: f32) -> Option<CorridorProfile> {
        match &self.field {
            TerrainField::Corridor(c) => Some(c.sample_at(x)),
            TerrainField::Open(_) => None,
        }
    }

    /// Highest altitude the camera and HUD should plan for
    pub fn flight_ceiling_y(&self) -> f32 {
        self.flight_ceiling
    }

    pub fn is_over_launch_pad(&self, pos: Vec3) -> bool {
        self.level.launch_pad.is_over(pos)
    }

    pub fn is_over_landing_pad(&self, pos: Vec3) -> bool {
        self.level.landing_pad.is_over(pos)
    }

    pub fn launch_pad_top_y(&self) -> f32 {
        self.level.launch_pad.top_y()
    }

    pub fn landing_pad_top_y(&self) -> f32 {
        self.level.landing_pad.top_y()
    }

    pub fn check_roof_collision(&self, pos: Vec3) -> bool {
        self.level.roof.is_some_and(|roof| roof.contains(pos))
    }

    /// Obstacle boxes (open terrain) or ceiling/back wall/rocks (corridor)
    pub fn check_tunnel_collision(&self, pos: Vec3, radius: f32) -> bool {
        match &self.field {
            TerrainField::Open(t) => t.check_tunnel_collision(pos, radius),
            TerrainField::Corridor(c) => c.check_tunnel_collision(pos, radius),
        }
    }

    /// Start of the finish approach on corridor levels
    pub fn finish_start_x(&self) -> Option<f32> {
        match &self.field {
            TerrainField::Corridor(c) => Some(c.finish_start_x()),
            TerrainField::Open(_) => None,
        }
    }

    /// Whether `pos` is on the final approach to the landing pad
    pub fn in_finish_zone(&self, pos: Vec3) -> bool {
        match self.finish_start_x() {
            Some(x0) => pos.x >= x0,
            None => {
                let pad = self.level.landing_pad.center;
                (pos.x - pad.x).hypot(pos.z - pad.z) <= OPEN_FINISH_RADIUS
            }
        }
    }
}
