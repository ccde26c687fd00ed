//! Player settings
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::finite_or_zero;
use crate::sim::physics::SteeringInput;

pub const MIN_SENSITIVITY: f32 = 0.5;
pub const MAX_SENSITIVITY: f32 = 2.0;
pub const MIN_GRAVITY_SCALE: f32 = 0.5;
pub const MAX_GRAVITY_SCALE: f32 = 1.5;

/// Flight preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier on shaped steering input
    pub sensitivity_scale: f32,
    /// Multiplier on level gravity
    pub gravity_scale: f32,
    /// Flip left/right steering
    pub invert_lateral: bool,
    /// Flip pitch steering
    pub invert_vertical: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity_scale: 1.0,
            gravity_scale: 1.0,
            invert_lateral: false,
            invert_vertical: false,
        }
    }
}

impl Settings {
    /// Clamp scales into range; garbage falls back to the default
    pub fn sanitized(self) -> Self {
        let scale = |v: f32, lo: f32, hi: f32| {
            if v.is_finite() { v.clamp(lo, hi) } else { 1.0 }
        };
        Self {
            sensitivity_scale: scale(self.sensitivity_scale, MIN_SENSITIVITY, MAX_SENSITIVITY),
            gravity_scale: scale(self.gravity_scale, MIN_GRAVITY_SCALE, MAX_GRAVITY_SCALE),
            ..self
        }
    }

    /// Apply axis inversion to raw input
    pub fn apply_to_input(&self, input: SteeringInput) -> SteeringInput {
        let flip = |v: f32, invert: bool| if invert { -v } else { v };
        SteeringInput {
            lateral: flip(finite_or_zero(input.lateral), self.invert_lateral),
            vertical: flip(finite_or_zero(input.vertical), self.invert_vertical),
            thrust_held: input.thrust_held,
        }
        .sanitized()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and sanitize; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "rocket_corridor_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings not persisted on native (key {})", Self::STORAGE_KEY);
    }
}
