use std::collections::BTreeMap;

use blockverse_shared::protocol::{ConnectionId, PlayerWire};

use crate::player::PlayerState;

/// The set of sessions occupying one world instance.
///
/// Keyed by connection id so snapshots come out in a stable order.
#[derive(Debug)]
pub struct WorldRoom {
    world_id: String,
    players: BTreeMap<ConnectionId, PlayerState>,
}

impl WorldRoom {
    pub fn new(world_id: String) -> Self {
        Self {
            world_id,
            players: BTreeMap::new(),
        }
    }

    pub fn world_id(&self) -> &str {
        &self.world_id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.players.contains_key(&id)
    }

    /// Insert a player. Returns false and leaves the room untouched when the
    /// connection is already present.
    pub fn insert(&mut self, player: PlayerState) -> bool {
        if self.players.contains_key(&player.connection_id) {
            return false;
        }
        self.players.insert(player.connection_id, player);
        true
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<PlayerState> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    /// Every member except `id`.
    pub fn others(&self, id: ConnectionId) -> impl Iterator<Item = ConnectionId> + '_ {
        self.players.keys().copied().filter(move |other| *other != id)
    }

    /// Wire snapshot of every member except `id`.
    pub fn snapshot_except(&self, id: ConnectionId) -> Vec<PlayerWire> {
        self.players
            .values()
            .filter(|p| p.connection_id != id)
            .map(PlayerState::to_wire)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(ids: &[ConnectionId]) -> WorldRoom {
        let mut room = WorldRoom::new("neon".to_string());
        for id in ids {
            room.insert(PlayerState::spawn(*id, format!("p{id}")));
        }
        room
    }

    #[test]
    fn duplicate_insert_is_refused() {
        let mut room = room_with(&[1]);
        assert!(!room.insert(PlayerState::spawn(1, "again".to_string())));
        assert_eq!(room.len(), 1);
        assert_eq!(room.get(1).unwrap().display_name, "p1");
    }

    #[test]
    fn others_excludes_self() {
        let room = room_with(&[1, 2, 3]);
        let others: Vec<_> = room.others(2).collect();
        assert_eq!(others, vec![1, 3]);
    }

    #[test]
    fn snapshot_excludes_self_and_is_ordered() {
        let room = room_with(&[3, 1, 2]);
        let ids: Vec<_> = room.snapshot_except(1).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn remove_last_player_empties_room() {
        let mut room = room_with(&[5]);
        assert!(room.remove(5).is_some());
        assert!(room.is_empty());
        assert!(room.remove(5).is_none());
    }
}
