//! Mapping between the 3D world (y up, ground on x/z) and the top-down 2D
//! view (screen y up), plus wire precision conversions.

use std::f32::consts::PI;

use bevy::prelude::{Quat, Vec2, Vec3};
use blockverse_shared::vec3::{BlockPos, Rotation, Vec3 as WireVec3};

use crate::constants::PIXELS_PER_UNIT;

/// View yaw that makes "forward" point up the screen (toward -z).
pub const TOP_DOWN_VIEW_YAW: f32 = PI;

/// World ground position to screen position.
pub fn world_to_screen(p: Vec3) -> Vec2 {
    Vec2::new(p.x * PIXELS_PER_UNIT, -p.z * PIXELS_PER_UNIT)
}

/// Screen position back to the ground plane (y = 0).
pub fn screen_to_world(p: Vec2) -> Vec3 {
    Vec3::new(p.x / PIXELS_PER_UNIT, 0.0, -p.y / PIXELS_PER_UNIT)
}

/// Sprite rotation showing a body that faces `yaw`. Sprites point up at
/// rotation zero.
pub fn yaw_to_screen_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_z(yaw + PI)
}

/// Centre of a lattice cell on screen.
pub fn block_to_screen(pos: BlockPos) -> Vec2 {
    world_to_screen(Vec3::new(pos.x as f32 + 0.5, 0.0, pos.z as f32 + 0.5))
}

pub fn wire_to_world(v: WireVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

pub fn world_to_wire(v: Vec3) -> WireVec3 {
    WireVec3::new(v.x as f64, v.y as f64, v.z as f64)
}

pub fn rotation_to_wire(pitch: f32, yaw: f32) -> Rotation {
    Rotation::new(pitch as f64, yaw as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_world_roundtrip() {
        for (x, z) in [(0.0, 0.0), (37.5, 37.5), (-75.0, 12.0)] {
            let world = Vec3::new(x, 0.0, z);
            let back = screen_to_world(world_to_screen(world));
            assert!((back - world).length() < 1e-5);
        }
    }

    #[test]
    fn negative_z_is_up_the_screen() {
        let s = world_to_screen(Vec3::new(0.0, 0.0, -10.0));
        assert!(s.y > 0.0);
        assert_eq!(s.x, 0.0);
    }

    #[test]
    fn facing_yaw_rotates_sprite_up_vector() {
        // Yaw 0 faces +z, which is down the screen
        let up = yaw_to_screen_rotation(0.0) * Vec3::Y;
        assert!((up - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);

        // Yaw PI/2 faces +x, which is right on screen
        let right = yaw_to_screen_rotation(PI / 2.0) * Vec3::Y;
        assert!((right - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn wire_conversion_keeps_values() {
        let w = WireVec3::new(32.0, 16.0, -4.5);
        assert_eq!(world_to_wire(wire_to_world(w)), w);
    }
}
