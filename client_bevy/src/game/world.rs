use bevy::prelude::*;
use bevy_prototype_lyon::prelude::*;
use blockverse_shared::config::WorldKind;

use crate::chase::geometry::{Aabb, NeonCityGrid, ObstacleSource};
use crate::constants::{color_from_hex, Colors, PIXELS_PER_UNIT};
use crate::coord::world_to_screen;

use super::core::{AppState, ClientSettings, WorldEntity};

const GROUND_Z: f32 = 0.0;
const BUILDING_Z: f32 = 1.0;
/// Street lines run between building rows out to this many world units.
const STREET_EXTENT: f32 = 90.0;

pub struct WorldPlugin;

/// Static collision boxes of the current world, shared by the player and
/// the hunter.
#[derive(Resource, Default, Debug)]
pub(crate) struct Obstacles(pub(crate) Vec<Aabb>);

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Obstacles>()
            .add_systems(OnEnter(AppState::InWorld), build_world)
            .add_systems(OnExit(AppState::InWorld), clear_obstacles);
    }
}

pub(crate) fn obstacles_for(kind: WorldKind) -> Vec<Aabb> {
    match kind {
        WorldKind::Chase => NeonCityGrid::default().obstacles(),
        WorldKind::Sandbox => Vec::new(),
    }
}

fn build_world(mut commands: Commands, settings: Res<ClientSettings>, mut obstacles: ResMut<Obstacles>) {
    obstacles.0 = obstacles_for(settings.world_kind());
    if settings.world_kind() == WorldKind::Chase {
        spawn_streets(&mut commands);
    }
    for aabb in &obstacles.0 {
        spawn_building(&mut commands, aabb);
    }
    info!("World {} built with {} obstacles", settings.world_id, obstacles.0.len());
}

fn spawn_streets(commands: &mut Commands) {
    let grid = NeonCityGrid::default();
    let color = color_from_hex(Colors::STREET_GRID);
    let half = grid.spacing / 2.0;
    for i in -grid.half_extent..=grid.half_extent + 1 {
        let offset = i as f32 * grid.spacing - half;
        for (a, b) in [
            (Vec3::new(offset, 0.0, -STREET_EXTENT), Vec3::new(offset, 0.0, STREET_EXTENT)),
            (Vec3::new(-STREET_EXTENT, 0.0, offset), Vec3::new(STREET_EXTENT, 0.0, offset)),
        ] {
            commands.spawn((
                ShapeBuilder::with(&shapes::Line(world_to_screen(a), world_to_screen(b)))
                    .stroke((color, 1.0))
                    .build(),
                Transform::from_xyz(0.0, 0.0, GROUND_Z),
                WorldEntity,
            ));
        }
    }
}

fn spawn_building(commands: &mut Commands, aabb: &Aabb) {
    let size = aabb.size();
    let center = world_to_screen(aabb.center());
    // Taller buildings glow brighter.
    let glow = (size.y / 40.0).clamp(0.3, 1.0);
    commands.spawn((
        ShapeBuilder::with(&shapes::Rectangle {
            extents: Vec2::new(size.x, size.z) * PIXELS_PER_UNIT,
            origin: shapes::RectangleOrigin::Center,
            radii: None,
        })
        .fill(color_from_hex(Colors::BUILDING))
        .stroke((color_from_hex(Colors::BUILDING_EDGE).with_alpha(glow), 1.5))
        .build(),
        Transform::from_xyz(center.x, center.y, BUILDING_Z),
        WorldEntity,
    ));
}

fn clear_obstacles(mut obstacles: ResMut<Obstacles>) {
    obstacles.0.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_world_has_city_and_sandbox_is_open() {
        assert!(!obstacles_for(WorldKind::Chase).is_empty());
        assert!(obstacles_for(WorldKind::Sandbox).is_empty());
    }
}
