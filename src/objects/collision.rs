//! Axis-aligned collision boxes
//!
//! Everything in the playfield collides as a rectangle. Sprites are usually
//! drawn larger than their hitbox, see `Physics::hitbox_scale`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hitbox {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }

    /// Inclusive point test
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center() {
        let hb = Hitbox::from_center(Vec2::new(50.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(hb.min, Vec2::new(40.0, 45.0));
        assert_eq!(hb.max(), Vec2::new(60.0, 55.0));
        assert_eq!(hb.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_overlap() {
        let a = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Hitbox::new(Vec2::splat(5.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Hitbox::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_separated_vertically() {
        let a = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Hitbox::new(Vec2::new(0.0, 30.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_contains_edges() {
        let a = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(a.contains(Vec2::new(10.0, 10.0)));
        assert!(!a.contains(Vec2::new(10.1, 5.0)));
    }
}
