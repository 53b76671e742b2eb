use bevy::prelude::*;

use crate::constants::color_from_hex;

use super::types::{
    panel_bg, panel_border, HudConnectionDot, HudConnectionGlow, HudHunterText, HudInfoButton,
    HudInfoPanel, HudInfoPanelText, HudLobbyText, HudPlayersText, HudRoundText, HudStatusText,
    BUTTON_BOTTOM, BUTTON_SIZE, HUNTER_TOP, INFO_BUTTON_LEFT, PANEL_BOTTOM, PANEL_LEFT,
    PANEL_WIDTH, PLAYERS_TOP, ROUND_TOP, STATUS_CONNECTING, STATUS_TOP, UI_ACCENT, UI_DIM,
};

pub(super) fn spawn_hud(mut commands: Commands) {
    let small = TextFont::from_font_size(10.0);
    let medium = TextFont::from_font_size(14.0);

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            top: Val::Px(STATUS_TOP),
            width: Val::Px(16.0),
            height: Val::Px(16.0),
            ..default()
        },
        BackgroundColor(color_from_hex(STATUS_CONNECTING).with_alpha(0.45)),
        BorderRadius::MAX,
        HudConnectionGlow,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(23.0),
            top: Val::Px(STATUS_TOP + 3.0),
            width: Val::Px(10.0),
            height: Val::Px(10.0),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
        BackgroundColor(color_from_hex(STATUS_CONNECTING).with_alpha(1.0)),
        BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.6)),
        BorderRadius::MAX,
        HudConnectionDot,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(42.0),
            top: Val::Px(STATUS_TOP + 1.0),
            ..default()
        },
        Text::new(""),
        small.clone(),
        TextColor(color_from_hex(UI_DIM)),
        HudStatusText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            top: Val::Px(PLAYERS_TOP),
            ..default()
        },
        Text::new(""),
        small.clone(),
        TextColor(color_from_hex(UI_DIM)),
        HudPlayersText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            top: Val::Px(ROUND_TOP),
            ..default()
        },
        Text::new(""),
        medium.clone(),
        TextColor(color_from_hex(UI_ACCENT)),
        Visibility::Hidden,
        HudRoundText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            top: Val::Px(HUNTER_TOP),
            ..default()
        },
        Text::new(""),
        small.clone(),
        TextColor(color_from_hex(UI_DIM)),
        Visibility::Hidden,
        HudHunterText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(35.0),
            top: Val::Percent(45.0),
            ..default()
        },
        Text::new("Press Enter to join"),
        medium.clone(),
        TextColor(color_from_hex(UI_ACCENT)),
        Visibility::Hidden,
        HudLobbyText,
    ));

    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(INFO_BUTTON_LEFT),
                bottom: Val::Px(BUTTON_BOTTOM),
                width: Val::Px(BUTTON_SIZE),
                height: Val::Px(BUTTON_SIZE),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(panel_bg(0.6)),
            BorderColor::all(panel_border(0.4)),
            BorderRadius::MAX,
            HudInfoButton,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("i"),
                TextFont::from_font_size(16.0),
                TextColor(panel_border(0.7)),
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(PANEL_LEFT),
                bottom: Val::Px(PANEL_BOTTOM),
                width: Val::Px(PANEL_WIDTH),
                padding: UiRect::all(Val::Px(8.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(panel_bg(0.85)),
            BorderColor::all(panel_border(0.4)),
            BorderRadius::all(Val::Px(6.0)),
            Visibility::Hidden,
            HudInfoPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                small,
                TextColor(color_from_hex(UI_DIM)),
                HudInfoPanelText,
            ));
        });
}
