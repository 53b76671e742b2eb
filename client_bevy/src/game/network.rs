use bevy::prelude::*;
use blockverse_shared::protocol::{ClientMsg, JoinWorldMsg, PlayerWire, ServerMsg};
use blockverse_shared::vec3::{Rotation, Vec3 as WireVec3};

use crate::chase::blocks::BlockChange;
use crate::chase::reconciler::Pose;
use crate::chase::throttle::MoveThrottle;
use crate::coord::wire_to_world;
use crate::shared::connection::{ConnectionState, NetEvent, ServerConnection};

use super::avatars::{spawn_avatar_visual, spawn_block_visual, Avatars, Blocks};
use super::core::ClientSettings;
use super::UpdateSet;

pub struct NetworkPlugin;

#[derive(Resource)]
pub(crate) struct NetworkState {
    pub(crate) connection_label: String,
    pub(crate) protocol_mismatch: bool,
    /// A join-world went out on the current socket.
    pub(crate) joined: bool,
    pub(crate) throttle: MoveThrottle,
}

impl Default for NetworkState {
    fn default() -> Self {
        Self {
            connection_label: "connecting".to_string(),
            protocol_mismatch: false,
            joined: false,
            throttle: MoveThrottle::default(),
        }
    }
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, network_event_system.in_set(UpdateSet::Network));
    }
}

pub(crate) fn pose_from_wire(position: WireVec3, rotation: Rotation) -> Pose {
    Pose {
        position: wire_to_world(position),
        pitch: rotation.pitch() as f32,
        yaw: rotation.yaw() as f32,
    }
}

fn network_event_system(
    mut commands: Commands,
    conn: Option<ResMut<ServerConnection>>,
    mut net: ResMut<NetworkState>,
    settings: Res<ClientSettings>,
    mut avatars: ResMut<Avatars>,
    mut blocks: ResMut<Blocks>,
) {
    // Absent while no socket is open, e.g. after a rejected server url.
    let Some(mut conn) = conn else {
        return;
    };
    for evt in conn.poll_events() {
        match evt {
            NetEvent::Connected => {
                info!("WebSocket connected");
                net.connection_label = "connected".to_string();
                conn.state = ConnectionState::Connected;
                net.protocol_mismatch = false;
                conn.protocol_mismatch = false;
            }
            NetEvent::Disconnected => {
                net.connection_label = "disconnected".to_string();
                conn.state = ConnectionState::Disconnected;
                net.joined = false;
                // The room is gone server-side; a fresh join replays it.
                for entity in avatars.0.drain() {
                    commands.entity(entity).despawn();
                }
            }
            NetEvent::ProtocolMismatch { server, client } => {
                warn!("Protocol mismatch: server {} client {}", server, client);
                net.protocol_mismatch = true;
                conn.protocol_mismatch = true;
                net.connection_label = format!("protocol mismatch {server}!={client}");
            }
            NetEvent::Message(msg) => match msg {
                ServerMsg::Welcome(w) => {
                    info!("Welcome: self_id={}, server {}", w.self_id, w.server_version);
                    conn.self_id = w.self_id;
                    conn.server_version = w.server_version;
                    conn.send(ClientMsg::JoinWorld(JoinWorldMsg {
                        world_id: settings.world_id.clone(),
                        display_name: settings.display_name.clone(),
                    }));
                    net.joined = true;
                    net.throttle.reset();
                }
                ServerMsg::ExistingPlayers(existing) => {
                    info!("{} players already in {}", existing.players.len(), settings.world_id);
                    for player in existing.players {
                        add_avatar(&mut commands, &mut avatars, conn.self_id, player);
                    }
                }
                ServerMsg::PlayerJoined(player) => {
                    add_avatar(&mut commands, &mut avatars, conn.self_id, player);
                }
                ServerMsg::PlayerMoved(moved) => {
                    avatars
                        .0
                        .set_target(moved.id, pose_from_wire(moved.position, moved.rotation));
                }
                ServerMsg::PlayerLeft(left) => {
                    if let Some(entity) = avatars.0.leave(left.id) {
                        commands.entity(entity).despawn();
                    }
                }
                ServerMsg::BlockPlaced(placed) => {
                    let change = blocks.0.place_with(placed.position, placed.block_id, || {
                        spawn_block_visual(&mut commands, placed.position)
                    });
                    if let BlockChange::Replaced(old) = change {
                        commands.entity(old).despawn();
                    }
                }
                ServerMsg::BlockDestroyed(destroyed) => {
                    if let BlockChange::Removed(old) = blocks.0.destroy(destroyed.position) {
                        commands.entity(old).despawn();
                    }
                }
            },
        }
    }
}

fn add_avatar(commands: &mut Commands, avatars: &mut Avatars, self_id: u32, player: PlayerWire) {
    if player.id == self_id {
        return;
    }
    let pose = pose_from_wire(player.position, player.rotation);
    let name = player.display_name;
    let added = avatars
        .0
        .join_with(player.id, name.clone(), pose, || spawn_avatar_visual(commands, &name, pose));
    if added {
        info!("Player {} ({}) joined", player.id, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockverse_shared::protocol::{
        BlockDestroyedMsg, BlockPlacedMsg, ExistingPlayersMsg, PlayerLeftMsg, PlayerMovedMsg,
        WelcomeMsg, PROTOCOL_VERSION,
    };
    use blockverse_shared::vec3::BlockPos;
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::game::avatars::{BlockVisual, RemoteAvatarVisual};
    use crate::shared::connection::NetCommand;

    struct Harness {
        app: App,
        events: std::sync::mpsc::Sender<NetEvent>,
        commands: UnboundedReceiver<NetCommand>,
    }

    impl Harness {
        fn new() -> Self {
            let mut app = App::new();
            app.add_plugins(MinimalPlugins);
            app.init_resource::<NetworkState>();
            app.init_resource::<Avatars>();
            app.init_resource::<Blocks>();
            app.insert_resource(ClientSettings::default());

            let (conn, events, commands) = ServerConnection::test_stub();
            app.insert_resource(conn);
            app.add_systems(Update, network_event_system);

            Self {
                app,
                events,
                commands,
            }
        }

        fn deliver(&mut self, msg: ServerMsg) {
            self.events.send(NetEvent::Message(msg)).unwrap();
            self.app.update();
        }

        fn avatar_count(&mut self) -> usize {
            self.app
                .world_mut()
                .query_filtered::<Entity, With<RemoteAvatarVisual>>()
                .iter(self.app.world())
                .count()
        }
    }

    fn wire_player(id: u32, name: &str, x: f64) -> PlayerWire {
        PlayerWire {
            id,
            display_name: name.to_string(),
            position: WireVec3::new(x, 0.0, 0.0),
            rotation: Rotation::default(),
        }
    }

    fn welcome(self_id: u32) -> ServerMsg {
        ServerMsg::Welcome(WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            server_version: "test".to_string(),
            self_id,
        })
    }

    #[test]
    fn welcome_joins_configured_world() {
        let mut h = Harness::new();
        h.deliver(welcome(7));

        match h.commands.try_recv() {
            Ok(NetCommand::Send(ClientMsg::JoinWorld(join))) => assert_eq!(join.world_id, "neon"),
            other => panic!("Expected join-world, got {other:?}"),
        }
        assert!(h.app.world().resource::<NetworkState>().joined);
        assert_eq!(h.app.world().resource::<ServerConnection>().self_id, 7);
    }

    #[test]
    fn relay_events_drive_avatars() {
        let mut h = Harness::new();
        h.deliver(welcome(1));
        h.deliver(ServerMsg::ExistingPlayers(ExistingPlayersMsg {
            players: vec![wire_player(2, "Ada", 0.0), wire_player(3, "Bo", 5.0)],
        }));
        assert_eq!(h.avatar_count(), 2);

        h.deliver(ServerMsg::PlayerMoved(PlayerMovedMsg {
            id: 2,
            position: WireVec3::new(10.0, 0.0, 4.0),
            rotation: Rotation::new(0.0, 1.0),
        }));
        let avatars = h.app.world().resource::<Avatars>();
        let target = avatars.0.get(2).unwrap().target;
        assert_eq!(target.position, Vec3::new(10.0, 0.0, 4.0));
        assert_eq!(target.yaw, 1.0);

        h.deliver(ServerMsg::PlayerLeft(PlayerLeftMsg { id: 3 }));
        assert_eq!(h.avatar_count(), 1);
        assert!(!h.app.world().resource::<Avatars>().0.contains(3));
    }

    #[test]
    fn duplicate_join_and_self_are_skipped() {
        let mut h = Harness::new();
        h.deliver(welcome(1));
        h.deliver(ServerMsg::PlayerJoined(wire_player(2, "Ada", 0.0)));
        h.deliver(ServerMsg::PlayerJoined(wire_player(2, "Ada", 0.0)));
        h.deliver(ServerMsg::PlayerJoined(wire_player(1, "me", 0.0)));
        assert_eq!(h.avatar_count(), 1);
    }

    #[test]
    fn disconnect_drops_every_avatar() {
        let mut h = Harness::new();
        h.deliver(welcome(1));
        h.deliver(ServerMsg::PlayerJoined(wire_player(2, "Ada", 0.0)));
        h.deliver(ServerMsg::PlayerJoined(wire_player(3, "Bo", 0.0)));

        h.events.send(NetEvent::Disconnected).unwrap();
        h.app.update();

        assert_eq!(h.avatar_count(), 0);
        assert!(h.app.world().resource::<Avatars>().0.is_empty());
        let net = h.app.world().resource::<NetworkState>();
        assert!(!net.joined);
        assert_eq!(net.connection_label, "disconnected");
    }

    #[test]
    fn block_events_update_the_map() {
        let mut h = Harness::new();
        let pos = BlockPos::new(2, 0, 3);
        h.deliver(ServerMsg::BlockPlaced(BlockPlacedMsg {
            position: pos,
            block_id: 4,
            actor_id: 9,
        }));
        assert_eq!(h.app.world().resource::<Blocks>().0.get(pos), Some(4));

        h.deliver(ServerMsg::BlockDestroyed(BlockDestroyedMsg {
            position: pos,
            actor_id: 9,
        }));
        assert!(h.app.world().resource::<Blocks>().0.is_empty());
        let remaining = h
            .app
            .world_mut()
            .query_filtered::<Entity, With<BlockVisual>>()
            .iter(h.app.world())
            .count();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn protocol_mismatch_is_reported() {
        let mut h = Harness::new();
        h.events
            .send(NetEvent::ProtocolMismatch {
                server: 9,
                client: PROTOCOL_VERSION,
            })
            .unwrap();
        h.app.update();
        assert!(h.app.world().resource::<NetworkState>().protocol_mismatch);
    }
}
