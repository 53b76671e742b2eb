use blockverse_shared::protocol::ConnectionId;

use crate::auth::Identity;

/// One authenticated real-time connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    /// World room this session currently occupies, if any.
    pub current_world: Option<String>,
}

impl Session {
    pub fn new(connection_id: ConnectionId, identity: Identity) -> Self {
        Self {
            connection_id,
            identity,
            current_world: None,
        }
    }

    pub fn is_in_world(&self) -> bool {
        self.current_world.is_some()
    }

    /// Display name for a join request, falling back to the identity's name.
    pub fn display_name_for(&self, requested: &str) -> String {
        let requested = requested.trim();
        if requested.is_empty() {
            self.identity.display_name.clone()
        } else {
            requested.to_string()
        }
    }
}
