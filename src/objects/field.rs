//! The set of objects currently falling
//!
//! One `step` per animation frame: spawn, advance, resolve player contact,
//! cull. Entities are kept in spawn order so drawing and event order are
//! stable.

use rand::Rng;

use super::catalogue::{Category, Special};
use super::collision::Hitbox;
use super::entity::FallingEntity;
use super::factory::EntityFactory;
use crate::render::Surface;

/// Playfield geometry and spawn pacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Number of spawn columns
    pub lanes: u32,
    /// Frames between spawns
    pub spawn_interval: f32,
    /// Probability a spawn is a collectible (0-1)
    pub collectible_chance: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            lanes: 4,
            spawn_interval: 60.0,
            collectible_chance: 0.35,
        }
    }
}

/// Something the game loop should react to
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    Spawned { id: String, lane: u32 },
    /// An obstacle reached the player
    Hit { id: String, damage: u32 },
    /// A collectible reached the player
    Collected {
        id: String,
        points: u32,
        special: Option<Special>,
    },
    /// Fell past the bottom edge untouched
    Missed { id: String, category: Category },
}

#[derive(Debug, Clone)]
pub struct Field {
    config: FieldConfig,
    entities: Vec<FallingEntity>,
    spawn_timer: f32,
}

impl Field {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn entities(&self) -> &[FallingEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn lane_width(&self) -> f32 {
        self.config.width / self.config.lanes.max(1) as f32
    }

    /// Place an already-built entity in a lane and start it falling
    pub fn insert(&mut self, mut entity: FallingEntity, lane: u32) {
        let lane = lane.min(self.config.lanes.saturating_sub(1));
        entity.set_lane(lane, self.lane_width());
        self.entities.push(entity);
    }

    /// Spawn one random entity in a random lane
    pub fn spawn<R: Rng>(&mut self, factory: &mut EntityFactory<R>) -> Option<FieldEvent> {
        let chance = self.config.collectible_chance.clamp(0.0, 1.0);
        let category = if factory.rng_mut().random_bool(chance) {
            Category::Collectible
        } else {
            Category::Obstacle
        };
        let lane = factory.rng_mut().random_range(0..self.config.lanes.max(1));

        let entity = factory.create(category, None)?;
        let id = entity.id.clone();
        self.insert(entity, lane);
        Some(FieldEvent::Spawned { id, lane })
    }

    /// Advance the field by `delta_time` frames
    pub fn step<R: Rng>(
        &mut self,
        factory: &mut EntityFactory<R>,
        player: &Hitbox,
        game_speed: f32,
        delta_time: f32,
    ) -> Vec<FieldEvent> {
        let mut events = Vec::new();

        self.spawn_timer += delta_time;
        if self.config.spawn_interval > 0.0 && self.spawn_timer >= self.config.spawn_interval {
            self.spawn_timer -= self.config.spawn_interval;
            events.extend(self.spawn(factory));
        }

        for entity in &mut self.entities {
            entity.update(game_speed, delta_time);
        }

        let height = self.config.height;
        self.entities.retain(|entity| {
            if entity.hitbox().overlaps(player) {
                events.push(contact_event(entity));
                return false;
            }
            if entity.is_off_screen(height) {
                events.push(FieldEvent::Missed {
                    id: entity.id.clone(),
                    category: entity.category,
                });
                return false;
            }
            true
        });

        events
    }

    /// Draw survivors in spawn order
    pub fn draw(&self, surface: &mut impl Surface) {
        for entity in &self.entities {
            entity.draw(surface);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.spawn_timer = 0.0;
    }
}

fn contact_event(entity: &FallingEntity) -> FieldEvent {
    match entity.category {
        Category::Obstacle => FieldEvent::Hit {
            id: entity.id.clone(),
            damage: entity.gameplay.damage,
        },
        Category::Collectible => FieldEvent::Collected {
            id: entity.id.clone(),
            points: entity.gameplay.points,
            special: entity.gameplay.special.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Catalogue;
    use crate::render::CommandRecorder;
    use glam::Vec2;

    fn far_player() -> Hitbox {
        Hitbox::new(Vec2::new(-1000.0, -1000.0), Vec2::splat(1.0))
    }

    fn quiet_config() -> FieldConfig {
        FieldConfig {
            spawn_interval: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_centers_in_lane() {
        let factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        let mut field = Field::new(quiet_config());
        field.insert(factory.create_specific(Category::Obstacle, "work").unwrap(), 1);
        assert_eq!(field.entities()[0].pos.x, 150.0);

        // Out-of-range lanes clamp to the last one
        field.insert(factory.create_specific(Category::Obstacle, "work").unwrap(), 99);
        assert_eq!(field.entities()[1].lane, 3);
    }

    #[test]
    fn test_spawns_on_interval() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 11);
        let mut field = Field::new(FieldConfig {
            spawn_interval: 10.0,
            ..Default::default()
        });
        let mut spawned = 0;
        for _ in 0..35 {
            spawned += field
                .step(&mut factory, &far_player(), 0.0, 1.0)
                .iter()
                .filter(|e| matches!(e, FieldEvent::Spawned { .. }))
                .count();
        }
        assert_eq!(spawned, 3);
        assert_eq!(field.len(), 3);
    }

    #[test]
    fn test_obstacle_contact_is_hit() {
        let factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        let mut field = Field::new(quiet_config());
        field.insert(factory.create_specific(Category::Obstacle, "family").unwrap(), 0);
        let player = Hitbox::from_center(Vec2::new(50.0, 0.0), Vec2::splat(40.0));

        let mut factory = factory;
        let events = field.step(&mut factory, &player, 100.0, 1.0);
        assert_eq!(
            events,
            vec![FieldEvent::Hit {
                id: "family".into(),
                damage: 1
            }]
        );
        assert!(field.is_empty());
    }

    #[test]
    fn test_collectible_contact_scores() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        let mut field = Field::new(quiet_config());
        field.insert(factory.create_collectible(Some("coffee")).unwrap(), 2);
        let player = Hitbox::from_center(Vec2::new(250.0, 0.0), Vec2::splat(40.0));

        let events = field.step(&mut factory, &player, 100.0, 1.0);
        assert_eq!(
            events,
            vec![FieldEvent::Collected {
                id: "coffee".into(),
                points: 10,
                special: Some(Special::SpeedBoost)
            }]
        );
    }

    #[test]
    fn test_culls_after_leaving_screen() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        let mut field = Field::new(quiet_config());
        field.insert(factory.create_collectible(Some("pizza")).unwrap(), 0);

        // pizza falls 0.7 * 100 per frame; gone once y > 700
        let mut missed = Vec::new();
        for _ in 0..20 {
            missed.extend(field.step(&mut factory, &far_player(), 100.0, 1.0));
        }
        assert_eq!(
            missed,
            vec![FieldEvent::Missed {
                id: "pizza".into(),
                category: Category::Collectible
            }]
        );
        assert!(field.is_empty());
    }

    #[test]
    fn test_draw_and_clear() {
        let factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        let mut field = Field::new(quiet_config());
        field.insert(factory.create_specific(Category::Obstacle, "work").unwrap(), 0);
        field.insert(factory.create_specific(Category::Collectible, "pizza").unwrap(), 1);

        let mut rec = CommandRecorder::default();
        field.draw(&mut rec);
        assert_eq!(rec.sprite_count(), 2);
        assert!(rec.is_balanced());

        field.clear();
        assert!(field.is_empty());
    }
}
