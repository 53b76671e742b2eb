//! World room registry: who is connected, which room they are in, and who
//! must hear about each change.
//!
//! Every operation returns the list of deliveries it produces instead of
//! sending anything, so the relay task owns all I/O and the registry stays
//! synchronous and deterministic.

use std::collections::HashMap;

use blockverse_shared::protocol::{
    BlockDestroyedMsg, BlockId, BlockPlacedMsg, ConnectionId, ExistingPlayersMsg, PlayerLeftMsg,
    ServerMsg, WelcomeMsg, PROTOCOL_VERSION,
};
use blockverse_shared::vec3::{BlockPos, Rotation, Vec3};

use crate::auth::Identity;
use crate::player::PlayerState;
use crate::policy::{MovePolicy, PermissiveMovePolicy, PolicyViolation};
use crate::room::WorldRoom;
use crate::session::Session;

/// One message addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub msg: ServerMsg,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelayError {
    #[error("unknown connection {0}")]
    UnknownSession(ConnectionId),
    #[error("connection {0} is not in a world")]
    NotInWorld(ConnectionId),
    #[error("world id must not be empty")]
    EmptyWorldId,
    #[error("move rejected: {0}")]
    PolicyRejected(#[from] PolicyViolation),
}

pub struct RoomRegistry {
    sessions: HashMap<ConnectionId, Session>,
    rooms: HashMap<String, WorldRoom>,
    policy: Box<dyn MovePolicy>,
    next_connection_id: ConnectionId,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(Box::new(PermissiveMovePolicy))
    }
}

impl RoomRegistry {
    pub fn new(policy: Box<dyn MovePolicy>) -> Self {
        Self {
            sessions: HashMap::new(),
            rooms: HashMap::new(),
            policy,
            next_connection_id: 1,
        }
    }

    /// Register a verified connection. Returns its id and the welcome.
    pub fn connect(&mut self, identity: Identity) -> (ConnectionId, Vec<Delivery>) {
        let id = self.next_connection_id;
        self.next_connection_id = self.next_connection_id.wrapping_add(1).max(1);
        self.sessions.insert(id, Session::new(id, identity));

        let welcome = Delivery {
            to: id,
            msg: ServerMsg::Welcome(WelcomeMsg {
                protocol_version: PROTOCOL_VERSION,
                server_version: env!("CARGO_PKG_VERSION").to_string(),
                self_id: id,
            }),
        };
        (id, vec![welcome])
    }

    /// Move a session into `world_id`, leaving its previous room first.
    pub fn join(
        &mut self,
        id: ConnectionId,
        world_id: &str,
        display_name: &str,
    ) -> Result<Vec<Delivery>, RelayError> {
        let world_id = world_id.trim();
        if world_id.is_empty() {
            return Err(RelayError::EmptyWorldId);
        }
        let name = self
            .sessions
            .get(&id)
            .ok_or(RelayError::UnknownSession(id))?
            .display_name_for(display_name);

        let mut deliveries = self.leave_current_room(id);

        let room = self
            .rooms
            .entry(world_id.to_string())
            .or_insert_with(|| WorldRoom::new(world_id.to_string()));
        let player = PlayerState::spawn(id, name);
        let joined = player.to_wire();
        room.insert(player);

        deliveries.push(Delivery {
            to: id,
            msg: ServerMsg::ExistingPlayers(ExistingPlayersMsg {
                players: room.snapshot_except(id),
            }),
        });
        deliveries.extend(fan_out(room, id, ServerMsg::PlayerJoined(joined)));

        if let Some(session) = self.sessions.get_mut(&id) {
            session.current_world = Some(world_id.to_string());
        }
        tracing::info!(
            "Connection {} joined world {} ({} members)",
            id,
            world_id,
            room.len()
        );
        Ok(deliveries)
    }

    /// Overwrite the sender's pose and relay it to the rest of its room.
    pub fn move_player(
        &mut self,
        id: ConnectionId,
        position: Vec3,
        rotation: Rotation,
    ) -> Result<Vec<Delivery>, RelayError> {
        let world_id = self.current_world(id)?;
        let room = self
            .rooms
            .get_mut(&world_id)
            .ok_or(RelayError::NotInWorld(id))?;
        let player = room.get_mut(id).ok_or(RelayError::NotInWorld(id))?;

        self.policy.check_move(player, position, rotation)?;
        player.position = position;
        player.rotation = rotation;
        let moved = player.to_moved();

        Ok(fan_out(room, id, ServerMsg::PlayerMoved(moved)))
    }

    pub fn place_block(
        &mut self,
        id: ConnectionId,
        position: BlockPos,
        block_id: BlockId,
    ) -> Result<Vec<Delivery>, RelayError> {
        let msg = ServerMsg::BlockPlaced(BlockPlacedMsg {
            position,
            block_id,
            actor_id: id,
        });
        self.relay_to_room(id, msg)
    }

    pub fn destroy_block(
        &mut self,
        id: ConnectionId,
        position: BlockPos,
    ) -> Result<Vec<Delivery>, RelayError> {
        let msg = ServerMsg::BlockDestroyed(BlockDestroyedMsg {
            position,
            actor_id: id,
        });
        self.relay_to_room(id, msg)
    }

    /// Leave the current room but stay connected.
    pub fn leave(&mut self, id: ConnectionId) -> Result<Vec<Delivery>, RelayError> {
        self.current_world(id)?;
        Ok(self.leave_current_room(id))
    }

    /// Forget the session entirely, leaving its room if it had one.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<Delivery> {
        let deliveries = self.leave_current_room(id);
        self.sessions.remove(&id);
        deliveries
    }

    pub fn session(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn room(&self, world_id: &str) -> Option<&WorldRoom> {
        self.rooms.get(world_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn current_world(&self, id: ConnectionId) -> Result<String, RelayError> {
        self.sessions
            .get(&id)
            .ok_or(RelayError::UnknownSession(id))?
            .current_world
            .clone()
            .ok_or(RelayError::NotInWorld(id))
    }

    fn relay_to_room(&self, id: ConnectionId, msg: ServerMsg) -> Result<Vec<Delivery>, RelayError> {
        let world_id = self.current_world(id)?;
        let room = self.rooms.get(&world_id).ok_or(RelayError::NotInWorld(id))?;
        Ok(fan_out(room, id, msg))
    }

    /// Remove `id` from whatever room it is in, notify the remaining members
    /// and drop the room if it emptied.
    fn leave_current_room(&mut self, id: ConnectionId) -> Vec<Delivery> {
        let Some(world_id) = self
            .sessions
            .get_mut(&id)
            .and_then(|s| s.current_world.take())
        else {
            return Vec::new();
        };

        let Some(room) = self.rooms.get_mut(&world_id) else {
            return Vec::new();
        };
        if room.remove(id).is_none() {
            return Vec::new();
        }

        let deliveries = fan_out(room, id, ServerMsg::PlayerLeft(PlayerLeftMsg { id }));
        if room.is_empty() {
            self.rooms.remove(&world_id);
            tracing::debug!("World {} is empty, discarded", world_id);
        }
        tracing::info!("Connection {} left world {}", id, world_id);
        deliveries
    }
}

fn fan_out(room: &WorldRoom, except: ConnectionId, msg: ServerMsg) -> Vec<Delivery> {
    room.others(except)
        .map(|to| Delivery {
            to,
            msg: msg.clone(),
        })
        .collect()
}
