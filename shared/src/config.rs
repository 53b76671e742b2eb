use crate::vec3::{Rotation, Vec3};

/// Where every joiner is placed until its first move arrives.
pub const DEFAULT_SPAWN_POSITION: Vec3 = Vec3::new(32.0, 16.0, 32.0);
pub const DEFAULT_SPAWN_ROTATION: Rotation = Rotation::new(0.0, 0.0);

/// Clients send at most this many position updates per second.
pub const MOVE_SEND_RATE_HZ: f64 = 5.0;
/// Position/rotation change below this is not worth sending.
pub const MOVE_SEND_EPSILON: f64 = 0.01;

/// What a world instance is used for. The relay treats every world the same;
/// only clients care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldKind {
    /// Free roaming with block placement.
    Sandbox,
    /// Single-player pursuit rounds against the hunter.
    Chase,
}

impl WorldKind {
    pub fn from_world_id(world_id: &str) -> Self {
        match world_id {
            "neon" | "neon-city" => WorldKind::Chase,
            _ => WorldKind::Sandbox,
        }
    }
}
