//! Falling object model
//!
//! Definitions are data; the factory turns them into entities; the field
//! owns the live set for one run. Nothing here touches the platform: drawing
//! goes through `render::Surface` and randomness is injected.

pub mod catalogue;
pub mod collision;
pub mod entity;
pub mod factory;
pub mod field;

pub use catalogue::{
    Catalogue, Category, Gameplay, Group, Movement, ObjectDefinition, Physics, Special, Visual,
    VisualKind,
};
pub use collision::Hitbox;
pub use entity::{Body, FallingEntity};
pub use factory::EntityFactory;
pub use field::{Field, FieldConfig, FieldEvent};
