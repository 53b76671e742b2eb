use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::vec3::{BlockPos, Rotation, Vec3};

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Per-process connection identifier.
pub type ConnectionId = u32;

/// Block type identifier, opaque to the relay.
pub type BlockId = u16;

// === Server -> Client ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "existing-players")]
    ExistingPlayers(ExistingPlayersMsg),
    #[serde(rename = "player-joined")]
    PlayerJoined(PlayerWire),
    #[serde(rename = "player-moved")]
    PlayerMoved(PlayerMovedMsg),
    #[serde(rename = "block-placed")]
    BlockPlaced(BlockPlacedMsg),
    #[serde(rename = "block-destroyed")]
    BlockDestroyed(BlockDestroyedMsg),
    #[serde(rename = "player-left")]
    PlayerLeft(PlayerLeftMsg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub self_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExistingPlayersMsg {
    pub players: Vec<PlayerWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: ConnectionId,
    pub display_name: String,
    pub position: Vec3,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerMovedMsg {
    pub id: ConnectionId,
    pub position: Vec3,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BlockPlacedMsg {
    pub position: BlockPos,
    pub block_id: BlockId,
    pub actor_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BlockDestroyedMsg {
    pub position: BlockPos,
    pub actor_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerLeftMsg {
    pub id: ConnectionId,
}

// === Client -> Server ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "join-world")]
    JoinWorld(JoinWorldMsg),
    #[serde(rename = "player-move")]
    PlayerMove(PlayerMoveMsg),
    #[serde(rename = "block-placed")]
    BlockPlaced(BlockPlaceMsg),
    #[serde(rename = "block-destroyed")]
    BlockDestroyed(BlockDestroyMsg),
    #[serde(rename = "leave-world")]
    LeaveWorld,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JoinWorldMsg {
    pub world_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMoveMsg {
    pub position: Vec3,
    pub rotation: Rotation,
    /// Informational only; the relay routes by the sender's current room.
    #[serde(default)]
    pub world_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BlockPlaceMsg {
    pub position: BlockPos,
    pub block_id: BlockId,
    #[serde(default)]
    pub world_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BlockDestroyMsg {
    pub position: BlockPos,
    #[serde(default)]
    pub world_id: Option<String>,
}
