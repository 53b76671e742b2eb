use std::collections::HashSet;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use blockverse_shared::config::WorldKind;
use blockverse_shared::protocol::ClientMsg;

use crate::constants::{color_from_hex, Colors};
use crate::coord::world_to_screen;
use crate::shared::connection::{connect_url, ServerConnection};

use super::avatars::{Avatars, Blocks};
use super::hunter::ChaseSession;
use super::input::InputState;
use super::network::NetworkState;
use super::player::LocalPlayer;

const DEFAULT_WS_URL: &str = "ws://127.0.0.1:3001/ws";
const DEFAULT_WORLD: &str = "neon";

/// Width of the view in world pixels; the camera scales to keep it visible.
const VIEW_WIDTH: f32 = 600.0;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Lobby,
    InWorld,
}

#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) enum UpdateSet {
    Input,
    Network,
    Simulate,
    Visuals,
}

/// Anything spawned for one world visit. Despawned on leaving.
#[derive(Component)]
pub(crate) struct WorldEntity;

#[derive(Component)]
struct MainCamera;

/// Where to connect and what to join.
#[derive(Resource, Debug, Clone)]
pub struct ClientSettings {
    pub ws_url: String,
    pub token: String,
    pub world_id: String,
    pub display_name: String,
    /// Join the world at startup instead of waiting in the lobby.
    pub auto_join: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            token: String::new(),
            world_id: DEFAULT_WORLD.to_string(),
            display_name: String::new(),
            auto_join: true,
        }
    }
}

impl ClientSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var("BLOCKVERSE_WS_URL") {
            settings.ws_url = url;
        }
        if let Ok(token) = std::env::var("BLOCKVERSE_TOKEN") {
            settings.token = token;
        }
        if let Ok(world) = std::env::var("BLOCKVERSE_WORLD") {
            if !world.trim().is_empty() {
                settings.world_id = world.trim().to_string();
            }
        }
        if let Ok(name) = std::env::var("BLOCKVERSE_NAME") {
            settings.display_name = name;
        }
        settings
    }

    pub fn world_kind(&self) -> WorldKind {
        WorldKind::from_world_id(&self.world_id)
    }
}

pub struct CorePlugin {
    pub settings: ClientSettings,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .init_state::<AppState>()
            .init_resource::<InputState>()
            .init_resource::<NetworkState>()
            .init_resource::<Avatars>()
            .init_resource::<Blocks>()
            .insert_resource(ClearColor(color_from_hex(Colors::NIGHT_BG)))
            .configure_sets(
                Update,
                (
                    UpdateSet::Input,
                    UpdateSet::Network,
                    UpdateSet::Simulate,
                    UpdateSet::Visuals,
                )
                    .chain(),
            )
            .configure_sets(Update, UpdateSet::Input.run_if(in_state(AppState::InWorld)))
            .configure_sets(Update, UpdateSet::Network.run_if(in_state(AppState::InWorld)))
            .configure_sets(Update, UpdateSet::Simulate.run_if(in_state(AppState::InWorld)))
            .configure_sets(Update, UpdateSet::Visuals.run_if(in_state(AppState::InWorld)))
            .add_systems(Startup, (setup_camera, auto_join).chain())
            .add_systems(OnEnter(AppState::InWorld), open_connection)
            .add_systems(
                OnExit(AppState::InWorld),
                (
                    stop_simulation,
                    clear_input,
                    despawn_world_visuals,
                    leave_and_close,
                )
                    .chain(),
            )
            .add_systems(Update, (lobby_transitions, fit_camera_to_window))
            .add_systems(Update, follow_local_player.in_set(UpdateSet::Visuals));
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Msaa::Sample4, MainCamera));
}

fn auto_join(settings: Res<ClientSettings>, mut next: ResMut<NextState<AppState>>) {
    if settings.auto_join {
        next.set(AppState::InWorld);
    }
}

fn open_connection(
    mut commands: Commands,
    settings: Res<ClientSettings>,
    mut net: ResMut<NetworkState>,
    mut next: ResMut<NextState<AppState>>,
) {
    let url = match connect_url(&settings.ws_url, &settings.token) {
        Ok(url) => url,
        Err(e) => {
            error!("Invalid server url {}: {}", settings.ws_url, e);
            next.set(AppState::Lobby);
            return;
        }
    };
    info!("Joining world {} via {}", settings.world_id, settings.ws_url);
    *net = NetworkState::default();
    commands.insert_resource(ServerConnection::new(url));
}

fn lobby_transitions(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<AppState>>,
    mut next: ResMut<NextState<AppState>>,
) {
    match state.get() {
        AppState::Lobby if keys.just_pressed(KeyCode::Enter) => next.set(AppState::InWorld),
        AppState::InWorld if keys.just_pressed(KeyCode::Escape) => next.set(AppState::Lobby),
        _ => {}
    }
}

fn stop_simulation(mut commands: Commands) {
    commands.remove_resource::<ChaseSession>();
    commands.remove_resource::<LocalPlayer>();
}

fn clear_input(mut input: ResMut<InputState>) {
    *input = InputState::default();
}

fn despawn_world_visuals(
    mut commands: Commands,
    mut avatars: ResMut<Avatars>,
    mut blocks: ResMut<Blocks>,
    q_world: Query<Entity, With<WorldEntity>>,
) {
    let released: HashSet<Entity> = avatars
        .0
        .drain()
        .into_iter()
        .chain(blocks.0.drain())
        .collect();
    for entity in &released {
        commands.entity(*entity).despawn();
    }
    for entity in &q_world {
        if !released.contains(&entity) {
            commands.entity(entity).despawn();
        }
    }
}

fn leave_and_close(mut commands: Commands, conn: Option<Res<ServerConnection>>) {
    if let Some(conn) = conn {
        conn.send(ClientMsg::LeaveWorld);
        conn.close();
    }
    commands.remove_resource::<ServerConnection>();
    info!("Left world");
}

fn follow_local_player(
    player: Option<Res<LocalPlayer>>,
    mut q_camera: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(player) = player else {
        return;
    };
    let screen = world_to_screen(player.controller.position());
    for mut transform in &mut q_camera {
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
    }
}

fn fit_camera_to_window(
    q_window: Query<&Window, With<PrimaryWindow>>,
    mut q_projection: Query<&mut Projection, With<MainCamera>>,
) {
    let Ok(window) = q_window.single() else {
        return;
    };

    if window.width() <= 0.0 || window.height() <= 0.0 {
        return;
    }

    let target_scale = (VIEW_WIDTH / window.width()).max(0.0001);
    for mut projection in &mut q_projection {
        if let Projection::Orthographic(ortho) = &mut *projection {
            ortho.scale = target_scale;
        }
    }
}
