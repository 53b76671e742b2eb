use bevy::prelude::*;
use bevy_prototype_lyon::prelude::*;
use blockverse_shared::config::WorldKind;

use crate::chase::hunter::Hunter;
use crate::chase::round::{RoundEvent, RoundState};
use crate::constants::{color_from_hex, Colors, HUNTER_RADIUS, PIXELS_PER_UNIT};
use crate::coord::{world_to_screen, yaw_to_screen_rotation};

use super::core::{AppState, ClientSettings, WorldEntity};
use super::input::InputState;
use super::network::NetworkState;
use super::player::{move_local_player, ChaseTuning, LocalPlayer};
use super::world::Obstacles;
use super::UpdateSet;

const HUNTER_Z: f32 = 7.0;
const TARGET_Z: f32 = 6.5;

pub struct HunterPlugin;

/// Hunter and match state of a chase world.
#[derive(Resource)]
pub(crate) struct ChaseSession {
    pub(crate) hunter: Hunter,
    pub(crate) round: RoundState,
}

#[derive(Component)]
struct HunterVisual;

#[derive(Component)]
struct HunterTargetMarker;

impl Plugin for HunterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InWorld), spawn_chase)
            .add_systems(
                Update,
                update_chase
                    .after(move_local_player)
                    .in_set(UpdateSet::Simulate),
            )
            .add_systems(Update, sync_hunter_visuals.in_set(UpdateSet::Visuals));
    }
}

fn spawn_chase(mut commands: Commands, settings: Res<ClientSettings>, tuning: Res<ChaseTuning>) {
    if settings.world_kind() != WorldKind::Chase {
        return;
    }
    let config = &tuning.0;
    commands.insert_resource(ChaseSession {
        hunter: Hunter::new(config, config.hunter_spawn),
        round: RoundState::new(config),
    });
    info!("Round 1 of {} started", config.max_rounds);

    let screen = world_to_screen(config.hunter_spawn);
    let color = color_from_hex(Colors::HUNTER);
    let radius = HUNTER_RADIUS * PIXELS_PER_UNIT;
    commands
        .spawn((
            ShapeBuilder::with(&shapes::Circle {
                radius,
                center: Vec2::ZERO,
            })
            .fill(color.with_alpha(0.7))
            .stroke((color, 2.0))
            .build(),
            Transform::from_xyz(screen.x, screen.y, HUNTER_Z),
            HunterVisual,
            WorldEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                ShapeBuilder::with(&shapes::Line(Vec2::ZERO, Vec2::new(0.0, radius * 1.8)))
                    .stroke((color, 2.0))
                    .build(),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        });

    commands.spawn((
        ShapeBuilder::with(&shapes::Circle {
            radius: 0.5 * PIXELS_PER_UNIT,
            center: Vec2::ZERO,
        })
        .stroke((color_from_hex(Colors::HUNTER_TARGET), 1.0))
        .build(),
        Transform::from_xyz(screen.x, screen.y, TARGET_Z),
        Visibility::Hidden,
        HunterTargetMarker,
        WorldEntity,
    ));
}

fn update_chase(
    session: Option<ResMut<ChaseSession>>,
    player: Option<ResMut<LocalPlayer>>,
    obstacles: Res<Obstacles>,
    input: Res<InputState>,
    tuning: Res<ChaseTuning>,
    mut net: ResMut<NetworkState>,
    time: Res<Time>,
) {
    let (Some(mut session), Some(mut player)) = (session, player) else {
        return;
    };
    let dt = time.delta_secs();

    // A restart frame does not simulate.
    if input.restart {
        let event = session.round.restart();
        apply_round_events(&mut session, &mut player, &tuning, &mut net, [event]);
        return;
    }

    let mut caught = false;
    if session.round.is_running() {
        let elapsed = session.round.elapsed();
        let controller = &player.controller;
        caught = session.hunter.update(
            dt,
            controller.position(),
            controller.velocity(),
            controller.speed(),
            &obstacles.0,
            elapsed,
        );
        if caught {
            player.controller.mark_caught();
        }
    }
    let events = session.round.tick(dt, caught);
    apply_round_events(&mut session, &mut player, &tuning, &mut net, events);
}

fn apply_round_events(
    session: &mut ChaseSession,
    player: &mut LocalPlayer,
    tuning: &ChaseTuning,
    net: &mut NetworkState,
    events: impl IntoIterator<Item = RoundEvent>,
) {
    for event in events {
        match event {
            RoundEvent::Started { index } => {
                let config = &tuning.0;
                player.controller.reset(config.player_spawn);
                session.hunter.reset(config.hunter_spawn);
                net.throttle.reset();
                info!("Round {} started", index);
            }
            RoundEvent::Ended { index, winner } => {
                let tally = session.round.tally();
                info!(
                    "Round {} won by {:?} ({}-{})",
                    index, winner, tally.player_wins, tally.hunter_wins
                );
            }
            RoundEvent::MatchFinished(outcome) => {
                info!("Match finished: {:?}", outcome);
            }
        }
    }
}

fn sync_hunter_visuals(
    session: Option<Res<ChaseSession>>,
    mut q_hunter: Query<&mut Transform, (With<HunterVisual>, Without<HunterTargetMarker>)>,
    mut q_target: Query<(&mut Transform, &mut Visibility), With<HunterTargetMarker>>,
) {
    let Some(session) = session else {
        return;
    };
    let hunter = &session.hunter;
    let screen = world_to_screen(hunter.position());
    for mut transform in &mut q_hunter {
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
        transform.rotation = yaw_to_screen_rotation(hunter.heading());
    }

    for (mut transform, mut visibility) in &mut q_target {
        match hunter.predicted_target() {
            Some(target) => {
                let screen = world_to_screen(target);
                transform.translation.x = screen.x;
                transform.translation.y = screen.y;
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chase::config::ChaseConfig;
    use crate::chase::controller::PlayerController;
    use crate::chase::round::RoundPhase;

    fn chase_app(config: ChaseConfig, player_at: Vec3) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<InputState>();
        app.init_resource::<NetworkState>();
        app.init_resource::<Obstacles>();
        app.insert_resource(LocalPlayer {
            controller: PlayerController::new(&config, player_at),
        });
        app.insert_resource(ChaseSession {
            hunter: Hunter::new(&config, config.hunter_spawn),
            round: RoundState::new(&config),
        });
        app.insert_resource(ChaseTuning(config));
        app.add_systems(Update, update_chase);
        app
    }

    fn step(app: &mut App) {
        std::thread::sleep(std::time::Duration::from_millis(5));
        app.update();
    }

    #[test]
    fn catch_freezes_player_and_ends_round() {
        let config = ChaseConfig {
            hunter_spawn: Vec3::new(0.5, 0.0, 0.0),
            ..Default::default()
        };
        let mut app = chase_app(config, Vec3::ZERO);
        step(&mut app);
        step(&mut app);

        assert!(!app.world().resource::<LocalPlayer>().controller.is_alive());
        let session = app.world().resource::<ChaseSession>();
        assert_eq!(session.round.tally().hunter_wins, 1);
        assert!(matches!(session.round.phase(), RoundPhase::Ended { .. }));
    }

    #[test]
    fn restart_respawns_both_actors() {
        let config = ChaseConfig {
            hunter_spawn: Vec3::new(0.5, 0.0, 0.0),
            ..Default::default()
        };
        let mut app = chase_app(config.clone(), Vec3::ZERO);
        step(&mut app);
        step(&mut app);
        assert!(!app.world().resource::<LocalPlayer>().controller.is_alive());

        app.world_mut().resource_mut::<InputState>().restart = true;
        step(&mut app);

        let player = &app.world().resource::<LocalPlayer>().controller;
        assert!(player.is_alive());
        assert_eq!(player.position(), config.player_spawn);
        let session = app.world().resource::<ChaseSession>();
        assert_eq!(session.hunter.position(), config.hunter_spawn);
        assert_eq!(session.round.index(), 1);
        assert_eq!(session.round.tally().hunter_wins, 0);
    }
}
