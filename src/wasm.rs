//! Browser bindings
//!
//! The host page owns rendering, DOM and networking. It forwards input
//! events here, calls `update` once per animation frame and reads back a
//! JSON snapshot plus any queued flight events.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::highscores::{BestScore, HighScores, NameRateLimiter};
use crate::platform::InputFilter;
use crate::settings::Settings;
use crate::sim::level::Campaign;
use crate::sim::physics::SteeringInput;
use crate::sim::state::{FlightMetrics, FlightState, GameState};
use crate::sim::tick;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Rocket Corridor core loaded");
}

/// Per-frame view for the renderer and HUD
#[derive(Serialize)]
struct Snapshot<'a> {
    state: FlightState,
    level_index: usize,
    level_name: &'a str,
    level_count: usize,
    pos: [f32; 3],
    vel: [f32; 3],
    roll: f32,
    pitch: f32,
    metrics: FlightMetrics,
    score: u64,
    best: u64,
    flight_ceiling: f32,
}

#[wasm_bindgen]
pub struct RocketGame {
    state: GameState,
    input: InputFilter,
    high_scores: HighScores,
    best: BestScore,
    limiter: NameRateLimiter,
}

#[wasm_bindgen]
impl RocketGame {
    /// Start on the built-in campaign with stored settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> RocketGame {
        let high_scores = HighScores::load();
        let mut best = BestScore::load();
        best.record(high_scores.top_score().unwrap_or(0));
        let mut state = GameState::with_settings(Campaign::standard(), Settings::load());
        state.best = best.0;
        RocketGame {
            state,
            input: InputFilter::new(),
            high_scores,
            best,
            limiter: NameRateLimiter::new(),
        }
    }

    /// Replace the campaign with one parsed from JSON
    pub fn load_campaign_json(&mut self, json: &str) -> Result<(), JsError> {
        let campaign = Campaign::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        let best = self.state.best;
        self.state = GameState::with_settings(campaign, *self.state.settings());
        self.state.best = best;
        Ok(())
    }

    /// Advance one frame; keyboard axes add to the filtered tilt
    pub fn update(&mut self, dt: f32, key_lateral: f32, key_vertical: f32) {
        self.input.update(dt);
        let tilt = self.input.steering();
        let input = SteeringInput::new(
            tilt.lateral + key_lateral,
            tilt.vertical + key_vertical,
            tilt.thrust_held,
        );
        let before = self.state.state;
        tick(&mut self.state, &input, dt);
        self.input.follow_state(before, self.state.state);

        if self.best.record(self.state.best) {
            self.best.save();
        }
    }

    pub fn set_thrust(&mut self, held: bool) {
        self.input.thrust_held = held;
    }

    pub fn enable_motion(&mut self) {
        self.input.enable_motion();
    }

    pub fn has_motion_sample(&self) -> bool {
        self.input.has_motion_sample()
    }

    /// deviceorientation gamma/beta in degrees
    pub fn orientation(&mut self, gamma: f32, beta: f32) {
        self.input.orientation(gamma, beta);
    }

    pub fn calibrate(&mut self) {
        self.input.calibrate();
    }

    pub fn reset_level(&mut self) {
        self.input.release_thrust();
        self.state.reset_level();
    }

    pub fn load_level(&mut self, index: i32) {
        self.input.release_thrust();
        self.state.load_level(i64::from(index));
    }

    pub fn ground_height_at(&self, x: f32, z: f32) -> f32 {
        self.state.world().ground_height_at(x, z)
    }

    pub fn flight_ceiling_y(&self) -> f32 {
        self.state.world().flight_ceiling_y()
    }

    /// Level definition for the scene builder
    pub fn level_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.state.level()).map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        let rocket = &self.state.rocket;
        let snapshot = Snapshot {
            state: self.state.state,
            level_index: self.state.level_index,
            level_name: &self.state.level().name,
            level_count: self.state.campaign().len(),
            pos: rocket.pos.to_array(),
            vel: rocket.vel.to_array(),
            roll: rocket.roll,
            pitch: rocket.pitch,
            metrics: self.state.metrics(),
            score: self.state.score,
            best: self.state.best,
            flight_ceiling: self.state.world().flight_ceiling_y(),
        };
        serde_json::to_string(&snapshot).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> Result<String, JsError> {
        let events = self.state.drain_events();
        serde_json::to_string(&events).map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn settings_json(&self) -> Result<String, JsError> {
        self.state.settings().to_json().map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsError> {
        let settings = Settings::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        settings.save();
        self.state.set_settings(settings);
        Ok(())
    }

    /// Validate, rate-limit and record the current score
    ///
    /// Returns the JSON body for the leaderboard POST.
    pub fn submit_score(&mut self, name: &str) -> Result<String, JsError> {
        let submission = self.state.score_submission(name);
        let now_ms = js_sys::Date::now();
        self.limiter
            .admit(&submission, now_ms / 1000.0)
            .map_err(|e| JsError::new(&e.to_string()))?;

        if let Some(rank) = self.high_scores.add(&submission, now_ms) {
            log::info!("New local high score, rank {rank}");
            self.high_scores.save();
        }
        submission.to_json().map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn high_scores_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.high_scores).map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for RocketGame {
    fn default() -> Self {
        Self::new()
    }
}
