//! Responsibility Rush - dodge the chores, catch the treats
//!
//! Core modules:
//! - `objects`: Falling object model (catalogue, factory, entities, active field)
//! - `render`: Draw surface abstraction and render-kind dispatch
//! - `leaderboard`: Remote top-N leaderboard client
//! - `session`: One run (player, score, lives) over the object field
//! - `settings`: Gameplay settings and store connection config

pub mod leaderboard;
pub mod objects;
pub mod render;
pub mod session;
pub mod settings;

pub use leaderboard::{LeaderboardClient, LeaderboardEntry, PersistenceError};
pub use objects::{Catalogue, Category, EntityFactory, FallingEntity, Field, Hitbox};
pub use session::{Phase, Player, Session};
pub use settings::{Settings, StoreConfig};

/// Game configuration constants
pub mod consts {
    /// Entities spawn this far above the top edge of the viewport
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Entities are culled once this far below the bottom edge
    pub const CULL_MARGIN: f32 = 100.0;

    /// Default fraction of the sprite size used for collision
    pub const DEFAULT_HITBOX_SCALE: f32 = 0.8;
    /// Default sprite size (px) when a definition omits one
    pub const DEFAULT_SIZE: f32 = 50.0;

    /// Sway phase advances this much per unit of fall distance
    pub const SWAY_FREQUENCY: f32 = 0.01;

    /// Readability ring around good/bad objects
    pub const EFFECT_RING_WIDTH: f32 = 2.0;
    pub const BAD_EFFECT_COLOR: &str = "#ff0000";
    pub const GOOD_EFFECT_COLOR: &str = "#00ff00";

    /// Glyph drawn when an image is missing, loading or broken
    pub const FALLBACK_GLYPH: &str = "❓";

    /// Default leaderboard depth
    pub const DEFAULT_TOP_N: usize = 100;
}
