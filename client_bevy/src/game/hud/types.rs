use bevy::prelude::*;

use crate::chase::hunter::{HunterDebug, PursuitMode, StepOutcome};
use crate::chase::round::{MatchOutcome, RoundPhase, RoundState, RoundWinner};
use crate::constants::color_from_hex;
use crate::shared::connection::ConnectionState;

pub(super) const STATUS_TOP: f32 = 30.0;
pub(super) const PLAYERS_TOP: f32 = 10.0;
pub(super) const ROUND_TOP: f32 = 30.0;
pub(super) const HUNTER_TOP: f32 = 52.0;

pub(super) const INFO_BUTTON_LEFT: f32 = 12.0;
pub(super) const BUTTON_BOTTOM: f32 = 12.0;
pub(super) const BUTTON_SIZE: f32 = 28.0;

pub(super) const PANEL_LEFT: f32 = 12.0;
pub(super) const PANEL_BOTTOM: f32 = 48.0;
pub(super) const PANEL_WIDTH: f32 = 190.0;

pub(super) const STATUS_CONNECTED: u32 = 0x44ff44;
pub(super) const STATUS_CONNECTING: u32 = 0xffaa00;
pub(super) const STATUS_DISCONNECTED: u32 = 0xff4444;
pub(super) const UI_DIM: u32 = 0x888888;
pub(super) const UI_ACCENT: u32 = 0x00ffff;

#[derive(Resource, Default)]
pub(crate) struct HudUiState {
    pub(crate) info_visible: bool,
}

#[derive(Component)]
pub(super) struct HudConnectionGlow;

#[derive(Component)]
pub(super) struct HudConnectionDot;

#[derive(Component)]
pub(super) struct HudStatusText;

#[derive(Component)]
pub(super) struct HudPlayersText;

#[derive(Component)]
pub(super) struct HudRoundText;

#[derive(Component)]
pub(super) struct HudHunterText;

#[derive(Component)]
pub(super) struct HudLobbyText;

#[derive(Component)]
pub(super) struct HudInfoButton;

#[derive(Component)]
pub(super) struct HudInfoPanel;

#[derive(Component)]
pub(super) struct HudInfoPanelText;

pub(super) fn connection_color(state: Option<ConnectionState>, protocol_mismatch: bool) -> Color {
    if protocol_mismatch {
        return color_from_hex(STATUS_DISCONNECTED);
    }

    match state {
        Some(ConnectionState::Connected) => color_from_hex(STATUS_CONNECTED),
        Some(ConnectionState::Connecting) => color_from_hex(STATUS_CONNECTING),
        Some(ConnectionState::Disconnected) | None => color_from_hex(STATUS_DISCONNECTED),
    }
}

pub(super) fn panel_bg(alpha: f32) -> Color {
    Color::srgba(5.0 / 255.0, 5.0 / 255.0, 16.0 / 255.0, alpha)
}

pub(super) fn panel_border(alpha: f32) -> Color {
    Color::srgba(0.0, 1.0, 1.0, alpha)
}

/// `m:ss`, rounding up so the clock shows 0:00 only at expiry.
pub(super) fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).ceil() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

pub(super) fn round_line(round: &RoundState) -> String {
    let tally = round.tally();
    let score = format!("you {} - {} hunter", tally.player_wins, tally.hunter_wins);
    match round.phase() {
        RoundPhase::InProgress => format!(
            "Round {}/{}  {}  {}",
            round.index(),
            round.max_rounds(),
            format_clock(round.remaining()),
            score
        ),
        RoundPhase::Ended { winner, .. } => {
            let who = match winner {
                RoundWinner::Player => "You escaped",
                RoundWinner::Hunter => "Caught",
            };
            format!("{who}!  {score}")
        }
        RoundPhase::Finished(outcome) => {
            let result = match outcome {
                MatchOutcome::PlayerWins => "You win the match",
                MatchOutcome::HunterWins => "The hunter wins the match",
                MatchOutcome::Draw => "Match drawn",
            };
            format!("{result}  {score}  (R to restart)")
        }
    }
}

pub(super) fn hunter_line(debug: &HunterDebug) -> String {
    let mode = match debug.mode {
        PursuitMode::Patrol => "patrol",
        PursuitMode::Chase => "chase",
        PursuitMode::Intercept => "intercept",
    };
    let step = match debug.step {
        StepOutcome::Idle => "idle".to_string(),
        StepOutcome::Direct => "direct".to_string(),
        StepOutcome::Deflected(angle) => format!("deflect {:+.0}", angle.to_degrees()),
        StepOutcome::Retreated => "retreat".to_string(),
        StepOutcome::Stalled => "stalled".to_string(),
    };
    format!(
        "hunter {mode}  v {:.1}  lead {:.2}s  closing {:.1}  aggr {:.2}  {step}",
        debug.speed, debug.lead_time, debug.closing_rate, debug.aggressiveness
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chase::config::ChaseConfig;

    #[test]
    fn clock_rounds_up() {
        assert_eq!(format_clock(180.0), "3:00");
        assert_eq!(format_clock(59.2), "1:00");
        assert_eq!(format_clock(9.0), "0:09");
        assert_eq!(format_clock(-1.0), "0:00");
    }

    #[test]
    fn round_line_shows_progress_and_result() {
        let mut round = RoundState::new(&ChaseConfig::default());
        assert!(round_line(&round).starts_with("Round 1/3  3:00"));

        round.tick(0.1, true);
        assert!(round_line(&round).starts_with("Caught!"));
    }

    #[test]
    fn hunter_line_names_mode_and_step() {
        let debug = HunterDebug {
            mode: PursuitMode::Intercept,
            speed: 9.0,
            lead_time: 1.25,
            closing_rate: 3.0,
            aggressiveness: 1.5,
            step: StepOutcome::Deflected(-std::f32::consts::FRAC_PI_3),
        };
        assert_eq!(
            hunter_line(&debug),
            "hunter intercept  v 9.0  lead 1.25s  closing 3.0  aggr 1.50  deflect -60"
        );
    }

    #[test]
    fn mismatch_overrides_connected_color() {
        assert_eq!(
            connection_color(Some(ConnectionState::Connected), true),
            color_from_hex(STATUS_DISCONNECTED)
        );
        assert_eq!(connection_color(None, false), color_from_hex(STATUS_DISCONNECTED));
    }
}
