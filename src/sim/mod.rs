//! Deterministic simulation module
//!
//! All flight logic lives here. This module must be pure and deterministic:
//! - Host frame deltas are clamped before use
//! - Seeded generators only (terrain LCG, per-level PCG)
//! - Terrain is built once per level load and never mutated
//! - No rendering or platform dependencies

pub mod bounds;
pub mod collision;
pub mod corridor;
pub mod level;
pub mod physics;
pub mod rng;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod world;

pub use bounds::{Aabb, Sphere};
pub use collision::{
    CollisionOutcome, CrashReason, LandingTolerances, LandingVerdict, judge, judge_landing,
};
pub use corridor::{CorridorField, CorridorProfile, PROFILE_SAMPLES};
pub use level::{Campaign, Level, LevelError, LevelTerrain, Pad};
pub use physics::{PhysicsParams, SteeringInput, SteeringTuning, integrate};
pub use rng::TerrainLcg;
pub use state::{
    DeferredAction, FlightEvent, FlightMetrics, FlightPhase, FlightState, GameState,
    PendingAction, Rocket,
};
pub use terrain::OpenTerrain;
pub use tick::tick;
pub use world::{TerrainField, World};
