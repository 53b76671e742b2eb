use bevy::prelude::*;
use bevy_prototype_lyon::prelude::*;
use blockverse_shared::config::WorldKind;
use blockverse_shared::protocol::{BlockDestroyMsg, BlockId, BlockPlaceMsg, ClientMsg, PlayerMoveMsg};

use crate::chase::blocks::{cell_in_front, BlockChange};
use crate::chase::config::ChaseConfig;
use crate::chase::controller::PlayerController;
use crate::constants::{color_from_hex, Colors, AVATAR_RADIUS, PIXELS_PER_UNIT};
use crate::coord::{rotation_to_wire, world_to_screen, world_to_wire, yaw_to_screen_rotation, TOP_DOWN_VIEW_YAW};
use crate::shared::connection::{ConnectionState, ServerConnection};

use super::avatars::{spawn_block_visual, Blocks};
use super::core::{AppState, ClientSettings, WorldEntity};
use super::input::InputState;
use super::network::NetworkState;
use super::world::Obstacles;
use super::UpdateSet;

const PLAYER_Z: f32 = 6.0;
const BODY_ALPHA: f32 = 0.6;
const SPRINT_BODY_ALPHA: f32 = 0.95;
/// Block type placed with the place key.
const PLACED_BLOCK_ID: BlockId = 1;

pub struct PlayerPlugin {
    pub config: ChaseConfig,
}

#[derive(Resource, Clone)]
pub(crate) struct ChaseTuning(pub(crate) ChaseConfig);

#[derive(Resource)]
pub(crate) struct LocalPlayer {
    pub(crate) controller: PlayerController,
}

#[derive(Component)]
pub(crate) struct LocalPlayerVisual;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(e) => {
                error!("Invalid chase config ({}), using defaults", e);
                ChaseConfig::default()
            }
        };
        app.insert_resource(ChaseTuning(config))
            .add_systems(OnEnter(AppState::InWorld), spawn_local_player)
            .add_systems(
                Update,
                (move_local_player, edit_blocks, send_pose)
                    .chain()
                    .in_set(UpdateSet::Simulate),
            )
            .add_systems(Update, sync_local_player_visual.in_set(UpdateSet::Visuals));
    }
}

fn spawn_local_player(mut commands: Commands, tuning: Res<ChaseTuning>) {
    let spawn = tuning.0.player_spawn;
    commands.insert_resource(LocalPlayer {
        controller: PlayerController::new(&tuning.0, spawn),
    });

    let color = color_from_hex(Colors::LOCAL_PLAYER);
    let radius = AVATAR_RADIUS * PIXELS_PER_UNIT;
    let screen = world_to_screen(spawn);
    commands
        .spawn((
            ShapeBuilder::with(&shapes::Circle {
                radius,
                center: Vec2::ZERO,
            })
            .fill(color.with_alpha(BODY_ALPHA))
            .stroke((color, 2.0))
            .build(),
            Transform::from_xyz(screen.x, screen.y, PLAYER_Z),
            LocalPlayerVisual,
            WorldEntity,
        ))
        .with_children(|parent| {
            // Facing tick
            parent.spawn((
                ShapeBuilder::with(&shapes::Line(Vec2::ZERO, Vec2::new(0.0, radius * 1.6)))
                    .stroke((color, 2.0))
                    .build(),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        });
}

pub(crate) fn move_local_player(
    player: Option<ResMut<LocalPlayer>>,
    input: Res<InputState>,
    obstacles: Res<Obstacles>,
    time: Res<Time>,
) {
    let Some(mut player) = player else {
        return;
    };
    player
        .controller
        .update(time.delta_secs(), input.movement, TOP_DOWN_VIEW_YAW, &obstacles.0);
}

fn edit_blocks(
    mut commands: Commands,
    input: Res<InputState>,
    settings: Res<ClientSettings>,
    player: Option<Res<LocalPlayer>>,
    mut blocks: ResMut<Blocks>,
    conn: Option<Res<ServerConnection>>,
) {
    if settings.world_kind() != WorldKind::Sandbox || !(input.place || input.destroy) {
        return;
    }
    let Some(player) = player else {
        return;
    };
    let position = world_to_wire(player.controller.position());
    let cell = cell_in_front(position, player.controller.heading() as f64);
    let world_id = Some(settings.world_id.clone());

    let msg = if input.place {
        match blocks
            .0
            .place_with(cell, PLACED_BLOCK_ID, || spawn_block_visual(&mut commands, cell))
        {
            BlockChange::Unchanged => None,
            BlockChange::Replaced(old) => {
                commands.entity(old).despawn();
                Some(place_msg(cell, world_id))
            }
            _ => Some(place_msg(cell, world_id)),
        }
    } else {
        match blocks.0.destroy(cell) {
            BlockChange::Removed(old) => {
                commands.entity(old).despawn();
                Some(ClientMsg::BlockDestroyed(BlockDestroyMsg {
                    position: cell,
                    world_id,
                }))
            }
            _ => None,
        }
    };

    if let (Some(msg), Some(conn)) = (msg, conn) {
        conn.send(msg);
    }
}

fn place_msg(cell: blockverse_shared::vec3::BlockPos, world_id: Option<String>) -> ClientMsg {
    ClientMsg::BlockPlaced(BlockPlaceMsg {
        position: cell,
        block_id: PLACED_BLOCK_ID,
        world_id,
    })
}

fn send_pose(
    conn: Option<Res<ServerConnection>>,
    mut net: ResMut<NetworkState>,
    player: Option<Res<LocalPlayer>>,
    settings: Res<ClientSettings>,
    time: Res<Time>,
) {
    let (Some(conn), Some(player)) = (conn, player) else {
        return;
    };
    if conn.state != ConnectionState::Connected || !net.joined {
        return;
    }

    let position = world_to_wire(player.controller.position());
    let rotation = rotation_to_wire(0.0, player.controller.heading());
    if net
        .throttle
        .should_send(time.elapsed_secs_f64(), position, rotation)
    {
        conn.send(ClientMsg::PlayerMove(PlayerMoveMsg {
            position,
            rotation,
            world_id: Some(settings.world_id.clone()),
        }));
    }
}

fn sync_local_player_visual(
    player: Option<Res<LocalPlayer>>,
    mut q_visual: Query<(&mut Transform, &mut Shape), With<LocalPlayerVisual>>,
) {
    let Some(player) = player else {
        return;
    };
    let screen = world_to_screen(player.controller.position());
    let color = if player.controller.is_alive() {
        color_from_hex(Colors::LOCAL_PLAYER)
    } else {
        color_from_hex(Colors::CAUGHT)
    };
    let alpha = body_alpha(&player.controller);
    for (mut transform, mut shape) in &mut q_visual {
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
        transform.rotation = yaw_to_screen_rotation(player.controller.heading());
        if let Some(stroke) = shape.stroke.as_mut() {
            stroke.color = color;
        }
        if let Some(fill) = shape.fill.as_mut() {
            fill.color = color.with_alpha(alpha);
        }
    }
}

/// The body glows brighter while sprinting.
fn body_alpha(controller: &PlayerController) -> f32 {
    if controller.is_sprinting() {
        SPRINT_BODY_ALPHA
    } else {
        BODY_ALPHA
    }
}
