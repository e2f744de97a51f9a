//! Declarative definitions for everything that falls
//!
//! The catalogue is two ordered groups (obstacles, collectibles) keyed by a
//! stable identifier. Definitions are immutable once spawned from: entities
//! copy what they need at construction.
//!
//! The JSON form mirrors the in-game table:
//! `{ "obstacles": { "work": { "id": "work", "visual": { "type": "image", ... } } } }`

use std::fmt;

use glam::Vec2;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::{DEFAULT_HITBOX_SCALE, DEFAULT_SIZE, FALLBACK_GLYPH};

/// Which group a definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Obstacle,
    Collectible,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Obstacle, Category::Collectible];

    /// Name of the catalogue group holding this category
    pub fn group_name(&self) -> &'static str {
        match self {
            Category::Obstacle => "obstacles",
            Category::Collectible => "collectibles",
        }
    }

    pub fn from_group_name(s: &str) -> Option<Self> {
        match s {
            "obstacles" | "obstacle" => Some(Category::Obstacle),
            "collectibles" | "collectible" => Some(Category::Collectible),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}

/// How the sprite is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    #[default]
    Emoji,
    Image,
    Svg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Visual {
    #[serde(rename = "type")]
    pub kind: VisualKind,
    /// Glyph text, image path or placeholder label depending on `kind`
    pub content: String,
    /// Sprite edge length (px)
    pub size: f32,
    /// Fill color for placeholder sprites
    pub color: String,
    /// Red ring: touching this hurts
    pub bad_effect: bool,
    /// Green ring: touching this scores
    pub good_effect: bool,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            kind: VisualKind::Emoji,
            content: FALLBACK_GLYPH.to_string(),
            size: DEFAULT_SIZE,
            color: "#000000".to_string(),
            bad_effect: false,
            good_effect: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Movement {
    /// Multiplier on the global game speed
    pub fall_speed: f32,
    /// Radians added per tick
    pub rotation: f32,
    /// Horizontal oscillation amplitude (px)
    pub sway: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            fall_speed: 1.0,
            rotation: 0.0,
            sway: 0.0,
        }
    }
}

/// Extra effect granted by a collectible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Special {
    SpeedBoost,
    BonusMultiplier,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gameplay {
    /// Score for catching it
    pub points: u32,
    /// Lives lost when it hits the player
    pub damage: u32,
    pub special: Option<Special>,
}

impl Default for Gameplay {
    fn default() -> Self {
        Self {
            points: 0,
            damage: 1,
            special: None,
        }
    }
}

/// Collision footprint. Width/height fall back to `visual.size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Physics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub hitbox_scale: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            hitbox_scale: DEFAULT_HITBOX_SCALE,
        }
    }
}

/// One catalogue entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub visual: Visual,
    pub movement: Movement,
    pub gameplay: Gameplay,
    pub physics: Physics,
}

impl ObjectDefinition {
    /// Collision footprint before `hitbox_scale` is applied
    pub fn body_size(&self) -> Vec2 {
        Vec2::new(
            self.physics.width.unwrap_or(self.visual.size),
            self.physics.height.unwrap_or(self.visual.size),
        )
    }

    /// Both rings requested; the bad ring wins when drawn
    pub fn effect_conflict(&self) -> bool {
        self.visual.bad_effect && self.visual.good_effect
    }

    /// Replace zero, negative or empty values with the defaults, the same as
    /// an absent field. Returns true if anything changed.
    pub fn apply_fallbacks(&mut self) -> bool {
        let before = self.clone();

        if self.visual.content.is_empty() {
            self.visual.content = FALLBACK_GLYPH.to_string();
        }
        if self.visual.color.is_empty() {
            self.visual.color = Visual::default().color;
        }
        self.visual.size = positive_or(self.visual.size, DEFAULT_SIZE);
        self.movement.fall_speed = positive_or(self.movement.fall_speed, Movement::default().fall_speed);
        if self.gameplay.damage == 0 {
            self.gameplay.damage = Gameplay::default().damage;
        }
        self.physics.hitbox_scale = positive_or(self.physics.hitbox_scale, DEFAULT_HITBOX_SCALE);
        self.physics.width = self.physics.width.filter(|w| *w > 0.0);
        self.physics.height = self.physics.height.filter(|h| *h > 0.0);

        *self != before
    }
}

fn positive_or(value: f32, default: f32) -> f32 {
    if value > 0.0 { value } else { default }
}

/// Ordered key → definition map for one category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    entries: Vec<(String, ObjectDefinition)>,
}

impl Group {
    pub fn get(&self, key: &str) -> Option<&ObjectDefinition> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, definition: ObjectDefinition) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = definition,
            None => self.entries.push((key, definition)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectDefinition)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, definition) in &self.entries {
            map.serialize_entry(key, definition)?;
        }
        map.end()
    }
}

// Hand-rolled so JSON key order survives (serde_json maps are sorted)
impl<'de> Deserialize<'de> for Group {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupVisitor;

        impl<'de> Visitor<'de> for GroupVisitor {
            type Value = Group;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of object definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Group, A::Error> {
                let mut group = Group::default();
                while let Some((key, definition)) =
                    access.next_entry::<String, ObjectDefinition>()?
                {
                    group.insert(key, definition);
                }
                Ok(group)
            }
        }

        deserializer.deserialize_map(GroupVisitor)
    }
}

/// All spawnable definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalogue {
    pub obstacles: Group,
    pub collectibles: Group,
}

impl Catalogue {
    /// Empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalogue from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalogue: Catalogue = serde_json::from_str(json)?;
        for category in Category::ALL {
            let group = catalogue.group_mut(category);
            for (key, definition) in group.entries.iter_mut() {
                // The group decides the category, not the entry
                if definition.category != category {
                    log::warn!(
                        "{}.{} declares type {:?}, treating as {:?}",
                        category,
                        key,
                        definition.category,
                        category
                    );
                    definition.category = category;
                }
                if definition.apply_fallbacks() {
                    log::warn!("{}.{} has empty or non-positive values, using defaults", category, key);
                }
                if definition.effect_conflict() {
                    log::warn!("{}.{} has both bad and good effects", category, key);
                }
            }
        }
        Ok(catalogue)
    }

    pub fn group(&self, category: Category) -> &Group {
        match category {
            Category::Obstacle => &self.obstacles,
            Category::Collectible => &self.collectibles,
        }
    }

    pub fn group_mut(&mut self, category: Category) -> &mut Group {
        match category {
            Category::Obstacle => &mut self.obstacles,
            Category::Collectible => &mut self.collectibles,
        }
    }

    /// Look up a definition; unknown keys are `None`
    pub fn get(&self, category: Category, key: &str) -> Option<&ObjectDefinition> {
        self.group(category).get(key)
    }

    /// Keys of a group in catalogue order
    pub fn keys(&self, category: Category) -> Vec<&str> {
        self.group(category).keys()
    }

    /// Add a definition to the group named by its category
    pub fn insert(&mut self, key: impl Into<String>, mut definition: ObjectDefinition) {
        definition.apply_fallbacks();
        self.group_mut(definition.category).insert(key, definition);
    }

    /// The shipped table
    pub fn builtin() -> Self {
        let mut catalogue = Self::new();

        catalogue.insert("work", image_def(Category::Obstacle, "work", "Lavoro", "/images/work.png", 70.0, (1.0, 0.03, 0.0)));
        catalogue.insert("cleaning", image_def(Category::Obstacle, "cleaning", "Pulizie", "/images/clean.png", 68.0, (0.6, 0.01, 8.0)));
        let mut family = image_def(Category::Obstacle, "family", "Impegni Familiari", "/images/baby.png", 72.0, (0.7, 0.0, 2.0));
        family.physics.hitbox_scale = 0.9;
        catalogue.insert("family", family);

        let mut controller = image_def(Category::Collectible, "game-controller", "Controller", "/images/joystick.png", 65.0, (0.8, 0.04, 6.0));
        controller.gameplay.points = 20;
        catalogue.insert("gameController", controller);

        let mut coffee = image_def(Category::Collectible, "coffee", "Caffè", "/images/coffee.png", 62.0, (1.0, 0.02, 4.0));
        coffee.gameplay.points = 10;
        coffee.gameplay.special = Some(Special::SpeedBoost);
        catalogue.insert("coffee", coffee);

        let mut pizza = image_def(Category::Collectible, "pizza", "Pizza", "/images/pizza.png", 66.0, (0.7, 0.03, 5.0));
        pizza.gameplay.points = 15;
        catalogue.insert("pizza", pizza);

        catalogue
    }
}

/// Image-backed definition; `movement` is (fall_speed, rotation, sway)
fn image_def(
    category: Category,
    id: &str,
    name: &str,
    path: &str,
    size: f32,
    movement: (f32, f32, f32),
) -> ObjectDefinition {
    let (fall_speed, rotation, sway) = movement;
    ObjectDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        visual: Visual {
            kind: VisualKind::Image,
            content: path.to_string(),
            size,
            bad_effect: category == Category::Obstacle,
            good_effect: category == Category::Collectible,
            ..Default::default()
        },
        movement: Movement {
            fall_speed,
            rotation,
            sway,
        },
        gameplay: Gameplay::default(),
        physics: Physics::default(),
    }
}
