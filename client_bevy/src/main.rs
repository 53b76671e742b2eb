mod chase;
mod constants;
mod coord;
mod game;
mod shared;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};
use bevy_prototype_lyon::prelude::ShapePlugin;

use chase::config::ChaseConfig;
use constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use game::{
    AvatarsPlugin, ClientSettings, CorePlugin, HudPlugin, HunterPlugin, InputPlugin,
    NetworkPlugin, PlayerPlugin, WorldPlugin,
};

fn main() {
    let settings = ClientSettings::from_env();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: format!("Blockverse - {}", settings.world_id),
                resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(ShapePlugin)
        .add_plugins(CorePlugin { settings })
        .add_plugins(WorldPlugin)
        .add_plugins(InputPlugin)
        .add_plugins(NetworkPlugin)
        .add_plugins(AvatarsPlugin)
        .add_plugins(PlayerPlugin {
            config: ChaseConfig::default(),
        })
        .add_plugins(HunterPlugin)
        .add_plugins(HudPlugin)
        .run();
}
