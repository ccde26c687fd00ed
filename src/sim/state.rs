//! Flight state and core simulation types
//!
//! Everything the tick mutates lives here: the rocket, the flight state
//! machine, the single deferred action slot and the outgoing event queue.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{CrashReason, LandingTolerances, LandingVerdict, judge_landing};
use super::level::{Campaign, Level};
use super::physics::{PhysicsParams, SteeringInput};
use super::world::World;
use crate::consts::*;
use crate::highscores::ScoreSubmission;
use crate::settings::Settings;
use crate::smooth_toward;

/// Base award for any clean landing
pub const LANDING_BASE_POINTS: u32 = 100;

/// Where the flight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightState {
    /// Sitting on the launch pad, waiting for input
    Ready,
    Flying(FlightPhase),
    /// Down safely; next level follows shortly
    Landed,
    /// Crashed; level resets shortly
    Crashed,
    /// Between landing and the next level load
    LevelTransition,
}

impl FlightState {
    pub fn is_flying(self) -> bool {
        matches!(self, FlightState::Flying(_))
    }
}

/// Camera/HUD hint only; never changes physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Cruising the route
    Side,
    /// Inside the finish approach
    Finish,
}

/// Touchdown readout
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightMetrics {
    /// Vertical speed (negative is falling)
    pub vspd: f32,
    /// Speed in the x/z plane
    pub hspd: f32,
    /// Largest visual tilt in degrees
    pub ang: f32,
}

/// The player's rocket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub pos: Vec3,
    pub vel: Vec3,
    pub thrust_power: f32,
    pub steer_accel: f32,
    pub fuel: f32,
    /// Fuel used per second of thrust
    pub fuel_burn: f32,
    /// Visual bank (radians), derived from input
    pub roll: f32,
    /// Visual pitch (radians), derived from input
    pub pitch: f32,
}

impl Rocket {
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            thrust_power: ROCKET_THRUST_POWER,
            steer_accel: ROCKET_STEER_ACCEL,
            fuel: ROCKET_FUEL,
            fuel_burn: ROCKET_FUEL_BURN,
            roll: 0.0,
            pitch: 0.0,
        }
    }

    /// Back to the spawn point, at rest, full tank
    pub fn reset(&mut self, spawn: Vec3) {
        *self = Self::at(spawn);
    }

    pub fn metrics(&self) -> FlightMetrics {
        FlightMetrics {
            vspd: self.vel.y,
            hspd: self.vel.x.hypot(self.vel.z),
            ang: self.roll.to_degrees().abs().max(self.pitch.to_degrees().abs()),
        }
    }

    /// Ease the visual tilt toward what the stick is asking for
    pub fn update_visuals(&mut self, input: &SteeringInput, dt: f32) {
        let roll_target =
            (-input.lateral * MAX_VISUAL_ROLL).clamp(-MAX_VISUAL_ROLL, MAX_VISUAL_ROLL);
        let pitch_target =
            (input.vertical * MAX_VISUAL_PITCH).clamp(-MAX_VISUAL_PITCH, MAX_VISUAL_PITCH);
        self.roll = smooth_toward(self.roll, roll_target, VISUAL_TILT_RATE, dt);
        self.pitch = smooth_toward(self.pitch, pitch_target, VISUAL_TILT_RATE, dt);
    }
}

/// Work queued to run after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    ResetLevel,
    NextLevel,
    LoadLevel(usize),
}

/// Single-slot timer: scheduling replaces whatever was pending
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    slot: Option<(DeferredAction, f32)>,
}

impl PendingAction {
    pub fn schedule(&mut self, action: DeferredAction, delay: f32) {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.slot = Some((action, delay));
    }

    pub fn cancel(&mut self) {
        self.slot = None;
    }

    pub fn action(&self) -> Option<DeferredAction> {
        self.slot.map(|(a, _)| a)
    }

    /// Seconds until the pending action fires
    pub fn remaining(&self) -> Option<f32> {
        self.slot.map(|(_, t)| t)
    }

    /// Count down; returns the action once its delay has elapsed
    pub fn advance(&mut self, dt: f32) -> Option<DeferredAction> {
        let (action, remaining) = self.slot?;
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.slot = None;
            Some(action)
        } else {
            self.slot = Some((action, remaining));
            None
        }
    }
}

/// Notifications for the HUD, audio and persistence layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlightEvent {
    LevelLoaded { index: usize, name: String },
    Launched,
    Crashed { reason: CrashReason },
    Landed { points: u32 },
    NewBest { best: u64 },
    CampaignComplete { score: u64 },
}

/// Complete flight session
#[derive(Debug, Clone)]
pub struct GameState {
    campaign: Campaign,
    world: World,
    /// Index of the active level
    pub level_index: usize,
    pub rocket: Rocket,
    pub state: FlightState,
    /// Running total; survives crashes and level changes
    pub score: u64,
    /// Best total seen this session
    pub best: u64,
    pub tolerances: LandingTolerances,
    settings: Settings,
    physics: PhysicsParams,
    pending: PendingAction,
    events: Vec<FlightEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Start a session on the first level
    pub fn new(campaign: Campaign) -> Self {
        Self::with_settings(campaign, Settings::default())
    }

    pub fn with_settings(campaign: Campaign, settings: Settings) -> Self {
        let world = World::new(campaign.level(0));
        let settings = settings.sanitized();
        let mut state = Self {
            physics: physics_for(world.level(), &settings),
            rocket: Rocket::at(world.spawn()),
            campaign,
            world,
            level_index: 0,
            state: FlightState::Ready,
            score: 0,
            best: 0,
            tolerances: LandingTolerances::default(),
            settings,
            pending: PendingAction::default(),
            events: Vec::new(),
            time_ticks: 0,
        };
        state.load_level(0);
        state
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn level(&self) -> &Level {
        self.world.level()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn physics(&self) -> &PhysicsParams {
        &self.physics
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub(crate) fn pending_mut(&mut self) -> &mut PendingAction {
        &mut self.pending
    }

    /// Swap settings; physics picks them up immediately
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.physics = physics_for(self.world.level(), &self.settings);
    }

    pub fn metrics(&self) -> FlightMetrics {
        self.rocket.metrics()
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<FlightEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build and enter a level; out-of-range indices are clamped
    pub fn load_level(&mut self, index: i64) {
        let index = self.campaign.clamp_index(index);
        self.level_index = index;
        self.world = World::new(self.campaign.level(index));
        self.physics = physics_for(self.world.level(), &self.settings);
        self.reset_level();

        let name = self.world.level().name.clone();
        log::info!("Loaded level {} ({name})", index + 1);
        self.events.push(FlightEvent::LevelLoaded { index, name });
    }

    /// Rocket back on the pad, anything pending dropped
    pub fn reset_level(&mut self) {
        self.pending.cancel();
        self.state = FlightState::Ready;
        self.rocket.reset(self.world.spawn());
    }

    /// Advance the campaign, or finish it on the last level
    pub fn next_level(&mut self) {
        let next = self.level_index + 1;
        if next < self.campaign.len() {
            self.state = FlightState::LevelTransition;
            self.pending.schedule(DeferredAction::LoadLevel(next), TRANSITION_DELAY);
        } else {
            log::info!("Campaign complete with {} points", self.score);
            self.events.push(FlightEvent::CampaignComplete { score: self.score });
        }
    }

    /// Run a deferred action
    pub fn apply(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::ResetLevel => self.reset_level(),
            DeferredAction::NextLevel => self.next_level(),
            DeferredAction::LoadLevel(index) => {
                self.load_level(i64::try_from(index).unwrap_or(i64::MAX))
            }
        }
    }

    /// Leave the pad
    pub fn launch(&mut self) {
        if self.state == FlightState::Ready {
            self.state = FlightState::Flying(FlightPhase::Side);
            log::debug!("Launched on level {}", self.level_index + 1);
            self.events.push(FlightEvent::Launched);
        }
    }

    /// End the flight; ignored unless flying
    pub fn crash(&mut self, reason: CrashReason) {
        if !self.state.is_flying() {
            return;
        }
        self.state = FlightState::Crashed;
        self.rocket.vel = Vec3::ZERO;
        self.pending.schedule(DeferredAction::ResetLevel, OUTCOME_DELAY);
        log::info!("Crashed: {reason}");
        self.events.push(FlightEvent::Crashed { reason });
    }

    /// Judge a touchdown on the landing pad
    pub fn try_land(&mut self, metrics: FlightMetrics) {
        if !self.state.is_flying() {
            return;
        }
        match judge_landing(&metrics, &self.tolerances) {
            LandingVerdict::Crash(reason) => self.crash(reason),
            LandingVerdict::Landed { bonus } => {
                let points = LANDING_BASE_POINTS + bonus;
                self.state = FlightState::Landed;
                self.rocket.vel = Vec3::ZERO;
                self.rocket.pos.y = self.world.landing_pad_top_y() + PAD_REST_OFFSET;
                self.score += u64::from(points);
                log::info!("Landed for {points} points (total {})", self.score);
                self.events.push(FlightEvent::Landed { points });
                if self.score > self.best {
                    self.best = self.score;
                    self.events.push(FlightEvent::NewBest { best: self.best });
                }
                self.pending.schedule(DeferredAction::NextLevel, OUTCOME_DELAY);
            }
        }
    }

    /// Entry for the leaderboard, if the name is usable
    pub fn score_submission(&self, name: &str) -> ScoreSubmission {
        ScoreSubmission::new(
            name,
            self.score,
            u32::try_from(self.level_index + 1).unwrap_or(u32::MAX),
        )
    }
}

fn physics_for(level: &Level, settings: &Settings) -> PhysicsParams {
    let mut params = PhysicsParams {
        gravity: level.gravity * settings.gravity_scale,
        wind: level.wind,
        ..PhysicsParams::default()
    };
    params.steering.sensitivity = settings.sensitivity_scale;
    params
}
