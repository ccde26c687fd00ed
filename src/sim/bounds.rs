//! Axis-aligned boxes and spheres used for static obstacle collision

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Build from a centre and half extents
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        let half = half.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Strict interior test (touching a face is not inside)
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpgt(self.min).all() && p.cmplt(self.max).all()
    }

    /// Sphere vs box: distance from the centre to the clamped closest point
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        center.distance_squared(closest) < radius * radius
    }
}

/// A spherical obstacle collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let reach = self.radius + radius;
        self.center.distance_squared(center) < reach * reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains() {
        let b = Aabb::from_center(Vec3::new(2.0, 7.0, 0.0), Vec3::new(10.0, 0.5, 9.0));
        assert!(b.contains(Vec3::new(2.0, 7.2, 3.0)));
        assert!(!b.contains(Vec3::new(2.0, 7.6, 3.0)));
        assert!(!b.contains(Vec3::new(12.5, 7.0, 0.0)));
    }

    #[test]
    fn test_aabb_sphere_overlap() {
        let b = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(b.intersects_sphere(Vec3::new(1.2, 0.5, 0.5), 0.35));
        assert!(!b.intersects_sphere(Vec3::new(1.5, 0.5, 0.5), 0.35));
        // Corner approach uses euclidean distance, not per-axis
        assert!(!b.intersects_sphere(Vec3::new(1.3, 1.3, 0.5), 0.35));
    }

    #[test]
    fn test_new_orders_corners() {
        let b = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
    }

    #[test]
    fn test_sphere_overlap() {
        let s = Sphere {
            center: Vec3::new(0.0, 2.0, 0.0),
            radius: 1.0,
        };
        assert!(s.intersects_sphere(Vec3::new(0.0, 3.2, 0.0), 0.35));
        assert!(!s.intersects_sphere(Vec3::new(0.0, 3.5, 0.0), 0.35));
    }
}
