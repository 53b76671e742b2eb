//! Axis-aligned boxes and the static obstacle layout of a world.

use bevy::prelude::Vec3;

/// Axis-aligned bounding box in world units. Touching faces intersect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of a body standing at `position`: square base of `half_width`
    /// around x/z, rising from the ground plane to `height`.
    pub fn footprint(position: Vec3, half_width: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(position.x - half_width, 0.0, position.z - half_width),
            max: Vec3::new(position.x + half_width, height, position.z + half_width),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// True when `body` overlaps any obstacle.
pub fn collides(body: &Aabb, obstacles: &[Aabb]) -> bool {
    obstacles.iter().any(|o| o.intersects(body))
}

/// Supplies the static collision boxes of a world.
pub trait ObstacleSource {
    fn obstacles(&self) -> Vec<Aabb>;
}

/// Procedural neon city: a square grid of buildings around an open plaza.
#[derive(Debug, Clone, PartialEq)]
pub struct NeonCityGrid {
    pub block_size: f32,
    pub spacing: f32,
    /// Grid runs from `-half_extent` to `half_extent` cells on both axes.
    pub half_extent: i32,
    /// Cells with both |x| and |z| below this stay empty.
    pub plaza_radius: i32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for NeonCityGrid {
    fn default() -> Self {
        Self {
            block_size: 10.0,
            spacing: 15.0,
            half_extent: 5,
            plaza_radius: 2,
            min_height: 10.0,
            max_height: 40.0,
        }
    }
}

impl NeonCityGrid {
    /// Stable per-cell height so every client sees the same skyline.
    fn height_at(&self, x: i32, z: i32) -> f32 {
        let h = (x.wrapping_mul(73_856_093) ^ z.wrapping_mul(19_349_663)).unsigned_abs() % 1000;
        self.min_height + (self.max_height - self.min_height) * (h as f32 / 999.0)
    }
}

impl ObstacleSource for NeonCityGrid {
    fn obstacles(&self) -> Vec<Aabb> {
        let half = self.block_size / 2.0;
        let mut out = Vec::new();
        for x in -self.half_extent..=self.half_extent {
            for z in -self.half_extent..=self.half_extent {
                if x.abs() < self.plaza_radius && z.abs() < self.plaza_radius {
                    continue;
                }
                let cx = x as f32 * self.spacing;
                let cz = z as f32 * self.spacing;
                out.push(Aabb::new(
                    Vec3::new(cx - half, 0.0, cz - half),
                    Vec3::new(cx + half, self.height_at(x, z), cz + half),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        let c = Aabb::new(Vec3::new(1.01, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn footprint_sits_on_ground() {
        let fp = Aabb::footprint(Vec3::new(3.0, 7.0, -2.0), 0.5, 2.0);
        assert_eq!(fp.min, Vec3::new(2.5, 0.0, -2.5));
        assert_eq!(fp.max, Vec3::new(3.5, 2.0, -1.5));
    }

    #[test]
    fn neon_city_leaves_plaza_open() {
        let grid = NeonCityGrid::default();
        let obstacles = grid.obstacles();
        assert_eq!(obstacles.len(), 11 * 11 - 9);

        let spawn = Aabb::footprint(Vec3::ZERO, 0.5, 2.0);
        assert!(!collides(&spawn, &obstacles));
    }

    #[test]
    fn neon_city_hunter_spawn_is_in_a_street() {
        let obstacles = NeonCityGrid::default().obstacles();
        let hunter = Aabb::footprint(Vec3::new(37.5, 0.0, 37.5), 0.6, 2.5);
        assert!(!collides(&hunter, &obstacles));
    }

    #[test]
    fn neon_city_is_deterministic() {
        let grid = NeonCityGrid::default();
        assert_eq!(grid.obstacles(), grid.obstacles());
        for o in grid.obstacles() {
            assert!(o.max.y >= 10.0 && o.max.y <= 40.0);
            assert!((o.size().x - 10.0).abs() < 1e-4);
        }
    }
}
