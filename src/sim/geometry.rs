//! Axis-aligned box geometry shared by the player, rocks and the lidar
//!
//! Boxes are closed: touching edges count as overlap, and a point lying on
//! an edge is inside.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Anything with a world position (box centre)
pub trait Positioned {
    fn position(&self) -> Vec2;
}

/// Anything that takes part in box collision tests
pub trait Collidable: Positioned {
    /// Half of the box width/height
    fn half_extents(&self) -> Vec2;

    fn bounding_box(&self) -> Aabb {
        Aabb::from_center(self.position(), self.half_extents())
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of `center ± half_extents`
    #[inline]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Square box centred on `center` with edge `size`
    #[inline]
    pub fn square(center: Vec2, size: f32) -> Self {
        Self::from_center(center, Vec2::splat(size / 2.0))
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Closed-interval overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when the whole box lies more than `margin` beyond any edge of
    /// the `[0, screen_size]²` field
    pub fn is_beyond_field(&self, screen_size: f32, margin: f32) -> bool {
        self.max.x < -margin
            || self.min.x > screen_size + margin
            || self.max.y < -margin
            || self.min.y > screen_size + margin
    }
}

impl Positioned for Aabb {
    fn position(&self) -> Vec2 {
        self.center()
    }
}

impl Collidable for Aabb {
    fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    fn bounding_box(&self) -> Aabb {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_closed() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let touching = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        let apart = Aabb::new(Vec2::new(10.5, 0.0), Vec2::new(20.0, 10.0));
        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_overlap_needs_both_axes() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let same_column = Aabb::new(Vec2::new(2.0, 20.0), Vec2::new(8.0, 30.0));
        assert!(!a.overlaps(&same_column));
    }

    #[test]
    fn test_contains_point_on_edge() {
        let b = Aabb::square(Vec2::new(50.0, 50.0), 20.0);
        assert!(b.contains_point(Vec2::new(60.0, 50.0)));
        assert!(b.contains_point(Vec2::new(40.0, 40.0)));
        assert!(!b.contains_point(Vec2::new(60.01, 50.0)));
    }

    #[test]
    fn test_zero_size_box() {
        let b = Aabb::square(Vec2::new(5.0, 5.0), 0.0);
        assert!(b.contains_point(Vec2::new(5.0, 5.0)));
        assert!(!b.contains_point(Vec2::new(5.0, 5.1)));
    }

    #[test]
    fn test_beyond_field() {
        let b = Aabb::square(Vec2::new(-70.0, 100.0), 20.0);
        assert!(b.is_beyond_field(512.0, 50.0));
        // max.x == -50 is exactly at the margin, not beyond it
        let b = Aabb::square(Vec2::new(-60.0, 100.0), 20.0);
        assert!(!b.is_beyond_field(512.0, 50.0));
        let b = Aabb::square(Vec2::new(100.0, 600.0), 20.0);
        assert!(b.is_beyond_field(512.0, 50.0));
    }

    #[test]
    fn test_aabb_is_collidable() {
        let b = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0));
        assert_eq!(b.position(), Vec2::new(2.0, 1.0));
        assert_eq!(b.half_extents(), Vec2::new(2.0, 1.0));
        assert_eq!(b.bounding_box(), b);
    }
}
