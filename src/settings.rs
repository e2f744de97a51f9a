//! Game settings and leaderboard connection config
//!
//! Settings persist in LocalStorage like any other preference. Store
//! credentials do not: they come from the environment at startup (baked in at
//! build time for the browser bundle).

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TOP_N;
use crate::objects::FieldConfig;

/// Default logical app under which scores are stored
pub const DEFAULT_APP_ID: &str = "responsability-game";

pub const ENV_API_KEY: &str = "LEADERBOARD_API_KEY";
pub const ENV_PROJECT_ID: &str = "LEADERBOARD_PROJECT_ID";
pub const ENV_APP_ID: &str = "LEADERBOARD_APP_ID";

/// Remote leaderboard connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub api_key: String,
    pub project_id: String,
    pub app_id: String,
}

impl StoreConfig {
    /// Build from a variable lookup. Needs at least key and project.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(ENV_API_KEY);
        let project_id = non_empty(ENV_PROJECT_ID);
        match (api_key, project_id) {
            (Some(api_key), Some(project_id)) => Some(Self {
                api_key,
                project_id,
                app_id: non_empty(ENV_APP_ID).unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
            }),
            _ => {
                log::warn!(
                    "{} / {} not set, leaderboard stays local",
                    ENV_API_KEY,
                    ENV_PROJECT_ID
                );
                None
            }
        }
    }

    /// Read from the process environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read from values baked in at build time
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| {
            match name {
                ENV_API_KEY => option_env!("LEADERBOARD_API_KEY"),
                ENV_PROJECT_ID => option_env!("LEADERBOARD_PROJECT_ID"),
                ENV_APP_ID => option_env!("LEADERBOARD_APP_ID"),
                _ => None,
            }
            .map(str::to_string)
        })
    }
}

/// Gameplay and presentation preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Number of spawn columns
    pub lanes: u32,

    // === Pacing ===
    /// Global fall speed (px/frame before per-object multipliers)
    pub base_game_speed: f32,
    /// Game speed added per second survived
    pub speed_ramp: f32,
    /// Frames between spawns
    pub spawn_interval: f32,
    /// Probability a spawn is a collectible (0-1)
    pub collectible_chance: f64,
    /// Multiplier applied by a speed-boost pickup
    pub speed_boost: f32,

    // === Run ===
    pub lives: u32,

    // === Leaderboard ===
    pub top_n: usize,
    /// Last name entered, prefilled next time
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 600.0,
            lanes: 4,

            base_game_speed: 3.0,
            speed_ramp: 0.05,
            spawn_interval: 60.0,
            collectible_chance: 0.35,
            speed_boost: 1.25,

            lives: 3,

            top_n: DEFAULT_TOP_N,
            player_name: String::new(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "responsibility_rush_settings";

    /// Playfield parameters for the active-object field
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            width: self.canvas_width,
            height: self.canvas_height,
            lanes: self.lanes.max(1),
            spawn_interval: self.spawn_interval,
            collectible_chance: self.collectible_chance.clamp(0.0, 1.0),
        }
    }

    /// Game speed after `elapsed_secs` of play
    pub fn game_speed_at(&self, elapsed_secs: f32) -> f32 {
        self.base_game_speed + self.speed_ramp * elapsed_secs.max(0.0)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
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
            if let Ok(json) = serde_json::to_string(self) {
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
        // No-op for native
    }
}
