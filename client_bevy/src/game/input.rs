use bevy::prelude::*;

use crate::chase::controller::MoveInput;

use super::UpdateSet;

pub struct InputPlugin;

#[derive(Resource, Default)]
pub(crate) struct InputState {
    pub(crate) movement: MoveInput,
    pub(crate) place: bool,
    pub(crate) destroy: bool,
    pub(crate) restart: bool,
}

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, input_system.in_set(UpdateSet::Input));
    }
}

fn input_system(mut input: ResMut<InputState>, keys: Res<ButtonInput<KeyCode>>) {
    input.movement = MoveInput {
        forward: keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        backward: keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        left: keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
        sprint: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
    };
    input.place = keys.just_pressed(KeyCode::KeyE);
    input.destroy = keys.just_pressed(KeyCode::KeyQ);
    input.restart = keys.just_pressed(KeyCode::KeyR);
}
