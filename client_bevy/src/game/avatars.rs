use bevy::prelude::*;
use bevy_prototype_lyon::prelude::*;
use blockverse_shared::vec3::BlockPos;

use crate::chase::blocks::BlockMap;
use crate::chase::reconciler::{Pose, RemoteAvatars};
use crate::constants::{color_from_hex, Colors, AVATAR_RADIUS, PIXELS_PER_UNIT};
use crate::coord::{block_to_screen, world_to_screen, yaw_to_screen_rotation};

use super::core::WorldEntity;
use super::UpdateSet;

const AVATAR_Z: f32 = 5.0;
const BLOCK_Z: f32 = 3.0;

pub struct AvatarsPlugin;

/// Remote players, each owning one rendered entity.
#[derive(Resource, Default)]
pub(crate) struct Avatars(pub(crate) RemoteAvatars<Entity>);

/// Blocks placed in a sandbox world.
#[derive(Resource, Default)]
pub(crate) struct Blocks(pub(crate) BlockMap<Entity>);

#[derive(Component)]
pub(crate) struct RemoteAvatarVisual;

#[derive(Component)]
pub(crate) struct BlockVisual;

impl Plugin for AvatarsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, tick_avatars.in_set(UpdateSet::Simulate))
            .add_systems(Update, sync_avatar_transforms.in_set(UpdateSet::Visuals));
    }
}

pub(crate) fn spawn_avatar_visual(commands: &mut Commands, display_name: &str, pose: Pose) -> Entity {
    let screen = world_to_screen(pose.position);
    let color = color_from_hex(Colors::REMOTE_PLAYER);
    let label = if display_name.is_empty() {
        "player".to_string()
    } else {
        display_name.to_string()
    };

    commands
        .spawn((
            ShapeBuilder::with(&shapes::Circle {
                radius: AVATAR_RADIUS * PIXELS_PER_UNIT,
                center: Vec2::ZERO,
            })
            .fill(color.with_alpha(0.5))
            .stroke((color, 1.5))
            .build(),
            Transform::from_xyz(screen.x, screen.y, AVATAR_Z)
                .with_rotation(yaw_to_screen_rotation(pose.yaw)),
            RemoteAvatarVisual,
            WorldEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(label),
                TextFont::from_font_size(10.0),
                TextColor(color),
                Transform::from_xyz(0.0, AVATAR_RADIUS * PIXELS_PER_UNIT + 8.0, 0.1),
            ));
        })
        .id()
}

pub(crate) fn spawn_block_visual(commands: &mut Commands, pos: BlockPos) -> Entity {
    let screen = block_to_screen(pos);
    commands
        .spawn((
            ShapeBuilder::with(&shapes::Rectangle {
                extents: Vec2::splat(PIXELS_PER_UNIT),
                origin: shapes::RectangleOrigin::Center,
                radii: None,
            })
            .fill(color_from_hex(Colors::BLOCK))
            .build(),
            Transform::from_xyz(screen.x, screen.y, BLOCK_Z),
            BlockVisual,
            WorldEntity,
        ))
        .id()
}

fn tick_avatars(mut avatars: ResMut<Avatars>, time: Res<Time>) {
    avatars.0.tick(time.delta_secs());
}

fn sync_avatar_transforms(avatars: Res<Avatars>, mut q_visuals: Query<&mut Transform, With<RemoteAvatarVisual>>) {
    for (_, avatar) in avatars.0.iter() {
        let Ok(mut transform) = q_visuals.get_mut(avatar.handle) else {
            continue;
        };
        let screen = world_to_screen(avatar.current.position);
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
        transform.rotation = yaw_to_screen_rotation(avatar.current.yaw);
    }
}
