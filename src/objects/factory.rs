//! Turns catalogue definitions into live entities

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::catalogue::{Catalogue, Category, ObjectDefinition};
use super::entity::FallingEntity;
use crate::render::ImageLoader;

/// Spawns entities from a catalogue with an injected RNG
pub struct EntityFactory<R: Rng = Pcg32> {
    catalogue: Catalogue,
    rng: R,
    images: Option<Rc<dyn ImageLoader>>,
}

impl EntityFactory<Pcg32> {
    /// Factory with a reproducible PCG stream
    pub fn seeded(catalogue: Catalogue, seed: u64) -> Self {
        Self::new(catalogue, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> EntityFactory<R> {
    pub fn new(catalogue: Catalogue, rng: R) -> Self {
        Self {
            catalogue,
            rng,
            images: None,
        }
    }

    /// Image-backed entities request their sprite from `loader`
    pub fn with_image_loader(mut self, loader: Rc<dyn ImageLoader>) -> Self {
        self.images = Some(loader);
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Obstacle by key, or a uniform random one when `key` is `None`
    pub fn create_obstacle(&mut self, key: Option<&str>) -> Option<FallingEntity> {
        self.create(Category::Obstacle, key)
    }

    /// Collectible by key, or a uniform random one when `key` is `None`
    pub fn create_collectible(&mut self, key: Option<&str>) -> Option<FallingEntity> {
        self.create(Category::Collectible, key)
    }

    /// Spawn from a category. An unknown key falls back to a random pick;
    /// only an empty group yields `None`.
    pub fn create(&mut self, category: Category, key: Option<&str>) -> Option<FallingEntity> {
        if let Some(key) = key {
            if let Some(definition) = self.catalogue.get(category, key) {
                return Some(self.spawn(definition));
            }
            log::warn!("Unknown {} type: {}, picking at random", category, key);
        }

        let len = self.catalogue.group(category).len();
        if len == 0 {
            log::warn!("No {} defined, nothing to spawn", category);
            return None;
        }

        let index = self.rng.random_range(0..len);
        let (_, definition) = self.catalogue.group(category).iter().nth(index)?;
        Some(self.spawn(definition))
    }

    /// Exact lookup, no fallback
    pub fn create_specific(&self, category: Category, key: &str) -> Option<FallingEntity> {
        match self.catalogue.get(category, key) {
            Some(definition) => Some(self.spawn(definition)),
            None => {
                log::warn!("Object not found: {}.{}", category, key);
                None
            }
        }
    }

    /// Keys of a group in catalogue order
    pub fn list_types(&self, category: Category) -> Vec<&str> {
        self.catalogue.keys(category)
    }

    pub fn definition(&self, category: Category, key: &str) -> Option<&ObjectDefinition> {
        self.catalogue.get(category, key)
    }

    fn spawn(&self, definition: &ObjectDefinition) -> FallingEntity {
        match &self.images {
            Some(loader) => FallingEntity::with_images(definition, loader.as_ref()),
            None => FallingEntity::new(definition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ImageSlot, ImageStatus};
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[test]
    fn test_specific_matches_catalogue_id() {
        let factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        for category in Category::ALL {
            for key in factory.list_types(category) {
                let entity = factory.create_specific(category, key).unwrap();
                assert_eq!(entity.id, factory.definition(category, key).unwrap().id);
                assert_eq!(entity.category, category);
            }
        }
    }

    #[test]
    fn test_specific_miss_is_none() {
        let factory = EntityFactory::seeded(Catalogue::builtin(), 1);
        assert!(factory.create_specific(Category::Obstacle, "pizza").is_none());
        assert!(factory.create_specific(Category::Collectible, "").is_none());
    }

    #[test]
    fn test_explicit_key() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 7);
        let e = factory.create_collectible(Some("coffee")).unwrap();
        assert_eq!(e.id, "coffee");
        assert_eq!(e.gameplay.points, 10);
        assert!(e.is_collectible() && !e.is_obstacle());
    }

    #[test]
    fn test_unknown_key_falls_back_to_random() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 7);
        let e = factory.create_obstacle(Some("documents")).unwrap();
        assert!(["work", "cleaning", "family"].contains(&e.id.as_str()));
        assert!(e.is_obstacle());
    }

    #[test]
    fn test_random_pick_covers_group() {
        let mut factory = EntityFactory::seeded(Catalogue::builtin(), 42);
        let seen: HashSet<String> = (0..300)
            .filter_map(|_| factory.create_collectible(None))
            .map(|e| e.id)
            .collect();
        let expected: HashSet<String> = ["game-controller", "coffee", "pizza"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = EntityFactory::seeded(Catalogue::builtin(), 99);
        let mut b = EntityFactory::seeded(Catalogue::builtin(), 99);
        for _ in 0..20 {
            assert_eq!(a.create_obstacle(None).unwrap().id, b.create_obstacle(None).unwrap().id);
        }
    }

    #[test]
    fn test_empty_group_returns_none() {
        let mut factory = EntityFactory::seeded(Catalogue::new(), 3);
        assert!(factory.create_obstacle(None).is_none());
        assert!(factory.create_collectible(Some("pizza")).is_none());
        assert!(factory.list_types(Category::Obstacle).is_empty());
    }

    #[derive(Default)]
    struct CountingLoader {
        requested: RefCell<Vec<String>>,
    }

    impl ImageLoader for CountingLoader {
        fn request(&self, path: &str) -> ImageSlot {
            self.requested.borrow_mut().push(path.to_string());
            ImageSlot::with_status(path, ImageStatus::Loaded)
        }
    }

    #[test]
    fn test_image_loader_used_for_image_visuals() {
        let loader = Rc::new(CountingLoader::default());
        let mut factory =
            EntityFactory::seeded(Catalogue::builtin(), 5).with_image_loader(loader.clone());
        let e = factory.create_obstacle(Some("cleaning")).unwrap();
        assert!(e.image_loaded());
        assert_eq!(*loader.requested.borrow(), vec!["/images/clean.png".to_string()]);
    }
}
