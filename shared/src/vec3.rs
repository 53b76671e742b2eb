/// Wire-level vector types. Positions travel as plain `{x, y, z}` objects,
/// rotations as `{x: pitch, y: yaw}` in radians.
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Euclidean distance between two points
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    length(sub(a, b))
}

/// Look rotation: `x` is pitch, `y` is yaw.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
}

impl Rotation {
    pub const fn new(pitch: f64, yaw: f64) -> Self {
        Self { x: pitch, y: yaw }
    }

    pub fn pitch(&self) -> f64 {
        self.x
    }

    pub fn yaw(&self) -> f64 {
        self.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Integer lattice coordinate of a block cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Lattice cell containing a world-space point.
    pub fn containing(p: Vec3) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn length_of_3_4_0_is_5() {
        assert_close(length(vec3(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = vec3(1.0, 2.0, 3.0);
        let b = vec3(-4.0, 0.5, 9.0);
        assert_close(distance(a, b), distance(b, a));
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!vec3(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Rotation::new(0.0, f64::INFINITY).is_finite());
        assert!(vec3(1.0, 2.0, 3.0).is_finite());
    }

    #[test]
    fn rotation_accessors_map_to_wire_fields() {
        let r = Rotation::new(0.25, 1.2);
        assert_close(r.pitch(), 0.25);
        assert_close(r.yaw(), 1.2);
        assert_close(r.x, 0.25);
        assert_close(r.y, 1.2);
    }

    #[test]
    fn block_pos_containing_floors_negative_coordinates() {
        assert_eq!(BlockPos::containing(vec3(-0.5, 0.0, 2.9)), BlockPos::new(-1, 0, 2));
        assert_eq!(BlockPos::containing(vec3(3.0, 1.99, -3.0)), BlockPos::new(3, 1, -3));
    }
}
