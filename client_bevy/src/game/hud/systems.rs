use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::game::avatars::Avatars;
use crate::game::core::{AppState, ClientSettings};
use crate::game::hunter::ChaseSession;
use crate::game::network::NetworkState;
use crate::shared::connection::ServerConnection;

use super::types::{
    connection_color, hunter_line, round_line, HudConnectionDot, HudConnectionGlow,
    HudHunterText, HudInfoButton, HudInfoPanel, HudInfoPanelText, HudLobbyText, HudPlayersText,
    HudRoundText, HudStatusText, HudUiState,
};

type ButtonInteractionQuery<'w, 's> =
    Query<'w, 's, &'static Interaction, (Changed<Interaction>, With<Button>, With<HudInfoButton>)>;

type ConnectionColorsSet<'w, 's> = ParamSet<
    'w,
    's,
    (
        Query<'w, 's, &'static mut BackgroundColor, With<HudConnectionGlow>>,
        Query<'w, 's, &'static mut BackgroundColor, With<HudConnectionDot>>,
    ),
>;

type RoundTextQuery<'w, 's> = Query<
    'w,
    's,
    (&'static mut Text, &'static mut Visibility),
    (With<HudRoundText>, Without<HudHunterText>),
>;
type HunterTextQuery<'w, 's> = Query<
    'w,
    's,
    (&'static mut Text, &'static mut Visibility),
    (With<HudHunterText>, Without<HudRoundText>),
>;

#[derive(SystemParam)]
pub(super) struct ConnectionUiQueries<'w, 's> {
    colors: ConnectionColorsSet<'w, 's>,
    status: Query<'w, 's, &'static mut Text, With<HudStatusText>>,
}

#[derive(SystemParam)]
pub(super) struct RoundUiQueries<'w, 's> {
    round: RoundTextQuery<'w, 's>,
    hunter: HunterTextQuery<'w, 's>,
}

pub(super) fn handle_button_interactions(
    buttons: ButtonInteractionQuery,
    mut hud_ui: ResMut<HudUiState>,
) {
    for interaction in &buttons {
        if *interaction == Interaction::Pressed {
            hud_ui.info_visible = !hud_ui.info_visible;
        }
    }
}

pub(super) fn update_connection_ui(
    conn: Option<Res<ServerConnection>>,
    net: Res<NetworkState>,
    mut queries: ConnectionUiQueries,
) {
    let state = conn.as_ref().map(|c| c.state);
    let color = connection_color(state, net.protocol_mismatch);
    for mut glow in &mut queries.colors.p0() {
        glow.0 = color.with_alpha(0.45);
    }
    for mut dot in &mut queries.colors.p1() {
        dot.0 = color.with_alpha(1.0);
    }
    if let Ok(mut text) = queries.status.single_mut() {
        text.0 = if conn.is_some() {
            net.connection_label.clone()
        } else {
            "offline".to_string()
        };
    }
}

pub(super) fn update_players_ui(
    settings: Res<ClientSettings>,
    avatars: Res<Avatars>,
    conn: Option<Res<ServerConnection>>,
    mut q_players: Query<&mut Text, With<HudPlayersText>>,
) {
    let Ok(mut text) = q_players.single_mut() else {
        return;
    };
    text.0 = match conn {
        // Count includes the local player.
        Some(_) => format!("{}  {} online", settings.world_id, avatars.0.len() + 1),
        None => String::new(),
    };
}

pub(super) fn update_round_ui(
    session: Option<Res<ChaseSession>>,
    hud_ui: Res<HudUiState>,
    mut queries: RoundUiQueries,
) {
    let Ok((mut round_text, mut round_visibility)) = queries.round.single_mut() else {
        return;
    };
    let Some(session) = session else {
        *round_visibility = Visibility::Hidden;
        if let Ok((_, mut hunter_visibility)) = queries.hunter.single_mut() {
            *hunter_visibility = Visibility::Hidden;
        }
        return;
    };

    round_text.0 = round_line(&session.round);
    *round_visibility = Visibility::Visible;

    if let Ok((mut hunter_text, mut hunter_visibility)) = queries.hunter.single_mut() {
        if hud_ui.info_visible {
            hunter_text.0 = hunter_line(&session.hunter.debug_info());
            *hunter_visibility = Visibility::Visible;
        } else {
            *hunter_visibility = Visibility::Hidden;
        }
    }
}

pub(super) fn update_lobby_ui(
    state: Res<State<AppState>>,
    mut q_lobby: Query<&mut Visibility, With<HudLobbyText>>,
) {
    if let Ok(mut visibility) = q_lobby.single_mut() {
        *visibility = match state.get() {
            AppState::Lobby => Visibility::Visible,
            AppState::InWorld => Visibility::Hidden,
        };
    }
}

pub(super) fn update_info_panel_ui(
    hud_ui: Res<HudUiState>,
    conn: Option<Res<ServerConnection>>,
    mut q_panel: Query<&mut Visibility, With<HudInfoPanel>>,
    mut q_text: Query<&mut Text, With<HudInfoPanelText>>,
) {
    if let Ok(mut visibility) = q_panel.single_mut() {
        *visibility = if hud_ui.info_visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
    if !hud_ui.info_visible {
        return;
    }

    let server = match conn.as_ref() {
        Some(c) if !c.server_version.is_empty() => format!("v{} (id {})", c.server_version, c.self_id),
        _ => "-".to_string(),
    };
    if let Ok(mut text) = q_text.single_mut() {
        text.0 = format!(
            "Client: v{}\nServer: {}\nWASD move, Shift sprint\nE/Q place/destroy, Esc leave",
            env!("CARGO_PKG_VERSION"),
            server
        );
    }
}
