//! A live falling object
//!
//! An entity copies its definition at spawn, so editing the catalogue later
//! never touches objects already on screen. There is a single behavioral
//! state (falling); the owning [`Field`](super::Field) removes the entity
//! when it leaves the screen or hits the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalogue::{Category, Gameplay, Movement, ObjectDefinition, Visual, VisualKind};
use super::collision::Hitbox;
use crate::consts::*;
use crate::render::{ImageLoader, ImageSlot, RenderKind, Surface};

/// Resolved collision footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub width: f32,
    pub height: f32,
    pub hitbox_scale: f32,
}

#[derive(Debug, Clone)]
pub struct FallingEntity {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub visual: Visual,
    pub movement: Movement,
    pub gameplay: Gameplay,
    pub physics: Body,

    /// Spawn column
    pub lane: u32,
    /// Center of the sprite, before sway
    pub pos: Vec2,
    /// Accumulated rotation (radians)
    pub rotation: f32,
    /// Horizontal sway applied when drawing
    pub sway_offset: f32,

    /// Only set for image-backed visuals
    image: Option<ImageSlot>,
}

impl FallingEntity {
    /// Spawn from a definition, above the viewport in lane 0
    pub fn new(definition: &ObjectDefinition) -> Self {
        let body = definition.body_size();
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            category: definition.category,
            visual: definition.visual.clone(),
            movement: definition.movement,
            gameplay: definition.gameplay.clone(),
            physics: Body {
                width: body.x,
                height: body.y,
                hitbox_scale: definition.physics.hitbox_scale,
            },
            lane: 0,
            pos: Vec2::new(0.0, -SPAWN_MARGIN),
            rotation: 0.0,
            sway_offset: 0.0,
            image: None,
        }
    }

    /// Spawn and start loading the sprite image, if the visual has one
    pub fn with_images(definition: &ObjectDefinition, loader: &dyn ImageLoader) -> Self {
        let mut entity = Self::new(definition);
        if entity.visual.kind == VisualKind::Image {
            entity.image = Some(loader.request(&entity.visual.content));
        }
        entity
    }

    /// Copy of the attribute groups with live state reset to spawn defaults.
    /// The image handle is shared; it points at the same asset.
    pub fn fresh_copy(&self) -> Self {
        Self {
            lane: 0,
            pos: Vec2::new(0.0, -SPAWN_MARGIN),
            rotation: 0.0,
            sway_offset: 0.0,
            ..self.clone()
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.category == Category::Obstacle
    }

    pub fn is_collectible(&self) -> bool {
        self.category == Category::Collectible
    }

    /// Center the entity horizontally in a lane
    pub fn set_lane(&mut self, lane: u32, lane_width: f32) {
        self.lane = lane;
        self.pos.x = lane_width * lane as f32 + lane_width / 2.0;
    }

    /// Advance one frame. `delta_time` is in frames (1.0 at the nominal rate).
    pub fn update(&mut self, game_speed: f32, delta_time: f32) {
        self.pos.y += game_speed * self.movement.fall_speed * delta_time;

        if self.movement.rotation != 0.0 {
            self.rotation += self.movement.rotation * delta_time;
        }

        // Driven by y, not time, so sway only depends on how far it has fallen
        if self.movement.sway != 0.0 {
            self.sway_offset = (self.pos.y * SWAY_FREQUENCY).sin() * self.movement.sway;
        }
    }

    /// `update` with a delta of one frame
    pub fn tick(&mut self, game_speed: f32) {
        self.update(game_speed, 1.0);
    }

    /// Past the bottom edge by more than the cull margin
    pub fn is_off_screen(&self, canvas_height: f32) -> bool {
        self.pos.y > canvas_height + CULL_MARGIN
    }

    /// Collision box centered on the (unswayed) position
    pub fn hitbox(&self) -> Hitbox {
        let scale = self.physics.hitbox_scale;
        Hitbox::from_center(
            self.pos,
            Vec2::new(self.physics.width * scale, self.physics.height * scale),
        )
    }

    /// Where the sprite is drawn (position plus sway)
    pub fn draw_position(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.sway_offset, self.pos.y)
    }

    pub fn image(&self) -> Option<&ImageSlot> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, slot: ImageSlot) {
        self.image = Some(slot);
    }

    /// True once the sprite image has finished loading
    pub fn image_loaded(&self) -> bool {
        self.image.as_ref().is_some_and(|slot| slot.is_loaded())
    }

    /// Pick the sprite for this frame. Images that are missing, still
    /// loading or broken draw the fallback glyph.
    pub fn render_kind(&self) -> RenderKind {
        let size = self.visual.size;
        match self.visual.kind {
            VisualKind::Emoji => RenderKind::Glyph {
                text: self.visual.content.clone(),
                size,
            },
            VisualKind::Svg => RenderKind::Placeholder {
                color: self.visual.color.clone(),
                label: self.visual.content.clone(),
                size,
            },
            VisualKind::Image => match &self.image {
                Some(slot) if slot.is_loaded() => RenderKind::Image {
                    path: slot.path().to_string(),
                    size,
                },
                _ => RenderKind::Glyph {
                    text: FALLBACK_GLYPH.to_string(),
                    size,
                },
            },
        }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        let at = self.draw_position();

        surface.save();

        if self.rotation != 0.0 {
            surface.translate(at.x, at.y);
            surface.rotate(self.rotation);
            surface.translate(-at.x, -at.y);
        }

        self.render_kind().draw(surface, at.x, at.y);
        self.draw_effects(surface, at);

        surface.restore();
    }

    /// Thin ring over the sprite: red for bad, green for good
    fn draw_effects(&self, surface: &mut impl Surface, at: Vec2) {
        let color = if self.visual.bad_effect {
            BAD_EFFECT_COLOR
        } else if self.visual.good_effect {
            GOOD_EFFECT_COLOR
        } else {
            return;
        };
        surface.stroke_circle(at.x, at.y, self.visual.size * 0.5, EFFECT_RING_WIDTH, color);
    }
}
