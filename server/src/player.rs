use blockverse_shared::config::{DEFAULT_SPAWN_POSITION, DEFAULT_SPAWN_ROTATION};
use blockverse_shared::protocol::{ConnectionId, PlayerMovedMsg, PlayerWire};
use blockverse_shared::vec3::{Rotation, Vec3};

/// Last known state of one connection inside a world room.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub position: Vec3,
    pub rotation: Rotation,
}

impl PlayerState {
    /// A freshly joined player standing at the default spawn.
    pub fn spawn(connection_id: ConnectionId, display_name: String) -> Self {
        Self {
            connection_id,
            display_name,
            position: DEFAULT_SPAWN_POSITION,
            rotation: DEFAULT_SPAWN_ROTATION,
        }
    }

    pub fn to_wire(&self) -> PlayerWire {
        PlayerWire {
            id: self.connection_id,
            display_name: self.display_name.clone(),
            position: self.position,
            rotation: self.rotation,
        }
    }

    pub fn to_moved(&self) -> PlayerMovedMsg {
        PlayerMovedMsg {
            id: self.connection_id,
            position: self.position,
            rotation: self.rotation,
        }
    }
}
