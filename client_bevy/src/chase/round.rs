use super::config::ChaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundWinner {
    Player,
    Hunter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    PlayerWins,
    HunterWins,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundPhase {
    InProgress,
    /// Waiting out the delay before the next round.
    Ended { winner: RoundWinner, waited: f32 },
    Finished(MatchOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub player_wins: u32,
    pub hunter_wins: u32,
}

impl Tally {
    fn outcome(&self) -> MatchOutcome {
        use std::cmp::Ordering;
        match self.player_wins.cmp(&self.hunter_wins) {
            Ordering::Greater => MatchOutcome::PlayerWins,
            Ordering::Less => MatchOutcome::HunterWins,
            Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

/// Transitions the caller must react to, e.g. by respawning actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    Started { index: u32 },
    Ended { index: u32, winner: RoundWinner },
    MatchFinished(MatchOutcome),
}

/// Timed rounds of player-versus-hunter, best of `max_rounds`.
#[derive(Debug, Clone)]
pub struct RoundState {
    index: u32,
    max_rounds: u32,
    duration: f32,
    delay: f32,
    remaining: f32,
    phase: RoundPhase,
    tally: Tally,
}

impl RoundState {
    /// A match whose first round is already running.
    pub fn new(config: &ChaseConfig) -> Self {
        Self {
            index: 1,
            max_rounds: config.max_rounds,
            duration: config.round_duration,
            delay: config.round_delay,
            remaining: config.round_duration,
            phase: RoundPhase::InProgress,
            tally: Tally::default(),
        }
    }

    /// Advance by `dt`. `caught` is this frame's hunter result and wins over
    /// the clock running out in the same tick.
    pub fn tick(&mut self, dt: f32, caught: bool) -> Vec<RoundEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();

        match self.phase {
            RoundPhase::InProgress => {
                self.remaining = (self.remaining - dt).max(0.0);
                let winner = if caught {
                    Some(RoundWinner::Hunter)
                } else if self.remaining <= 0.0 {
                    Some(RoundWinner::Player)
                } else {
                    None
                };
                if let Some(winner) = winner {
                    self.end_round(winner, &mut events);
                }
            }
            RoundPhase::Ended { winner, waited } => {
                let waited = waited + dt;
                if waited >= self.delay {
                    self.index += 1;
                    self.start_round();
                    events.push(RoundEvent::Started { index: self.index });
                } else {
                    self.phase = RoundPhase::Ended { winner, waited };
                }
            }
            RoundPhase::Finished(_) => {}
        }

        events
    }

    fn end_round(&mut self, winner: RoundWinner, events: &mut Vec<RoundEvent>) {
        match winner {
            RoundWinner::Player => self.tally.player_wins += 1,
            RoundWinner::Hunter => self.tally.hunter_wins += 1,
        }
        events.push(RoundEvent::Ended {
            index: self.index,
            winner,
        });

        if self.index >= self.max_rounds {
            let outcome = self.tally.outcome();
            self.phase = RoundPhase::Finished(outcome);
            events.push(RoundEvent::MatchFinished(outcome));
        } else {
            self.phase = RoundPhase::Ended { winner, waited: 0.0 };
        }
    }

    fn start_round(&mut self) {
        self.remaining = self.duration;
        self.phase = RoundPhase::InProgress;
    }

    /// Throw away the current match and begin round one.
    pub fn restart(&mut self) -> RoundEvent {
        self.index = 1;
        self.tally = Tally::default();
        self.start_round();
        RoundEvent::Started { index: 1 }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Seconds since the current round started.
    pub fn elapsed(&self) -> f32 {
        self.duration - self.remaining
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_rounds() -> RoundState {
        RoundState::new(&ChaseConfig {
            round_duration: 10.0,
            round_delay: 3.0,
            max_rounds: 3,
            ..Default::default()
        })
    }

    /// Run until the current round ends with `winner`.
    fn finish_round(round: &mut RoundState, winner: RoundWinner) -> Vec<RoundEvent> {
        match winner {
            RoundWinner::Hunter => round.tick(0.1, true),
            RoundWinner::Player => round.tick(10.0, false),
        }
    }

    fn wait_out_delay(round: &mut RoundState) -> Vec<RoundEvent> {
        round.tick(3.0, false)
    }

    #[test]
    fn clock_counts_down_and_floors_at_zero() {
        let mut round = short_rounds();
        round.tick(4.0, false);
        assert_eq!(round.remaining(), 6.0);
        assert_eq!(round.elapsed(), 4.0);

        let events = round.tick(100.0, false);
        assert_eq!(round.remaining(), 0.0);
        assert_eq!(
            events,
            vec![RoundEvent::Ended {
                index: 1,
                winner: RoundWinner::Player
            }]
        );
    }

    #[test]
    fn catch_beats_expiry_in_same_tick() {
        let mut round = short_rounds();
        let events = round.tick(10.0, true);
        assert_eq!(
            events,
            vec![RoundEvent::Ended {
                index: 1,
                winner: RoundWinner::Hunter
            }]
        );
        assert_eq!(round.tally().hunter_wins, 1);
        assert_eq!(round.tally().player_wins, 0);
    }

    #[test]
    fn next_round_starts_after_delay() {
        let mut round = short_rounds();
        finish_round(&mut round, RoundWinner::Hunter);
        assert!(round.tick(2.0, false).is_empty());
        assert!(!round.is_running());

        let events = round.tick(1.0, false);
        assert_eq!(events, vec![RoundEvent::Started { index: 2 }]);
        assert!(round.is_running());
        assert_eq!(round.remaining(), 10.0);
    }

    #[test]
    fn catches_during_delay_are_ignored() {
        let mut round = short_rounds();
        finish_round(&mut round, RoundWinner::Player);
        assert!(round.tick(0.5, true).is_empty());
        assert_eq!(round.tally().hunter_wins, 0);
    }

    #[test]
    fn higher_tally_wins_the_match() {
        let mut round = short_rounds();
        finish_round(&mut round, RoundWinner::Hunter);
        wait_out_delay(&mut round);
        finish_round(&mut round, RoundWinner::Player);
        wait_out_delay(&mut round);
        let events = finish_round(&mut round, RoundWinner::Hunter);

        assert_eq!(
            events,
            vec![
                RoundEvent::Ended {
                    index: 3,
                    winner: RoundWinner::Hunter
                },
                RoundEvent::MatchFinished(MatchOutcome::HunterWins),
            ]
        );
        assert_eq!(round.phase(), RoundPhase::Finished(MatchOutcome::HunterWins));
        // Finished is terminal until restart
        assert!(round.tick(60.0, true).is_empty());
    }

    #[test]
    fn equal_tally_is_a_draw() {
        let mut round = RoundState::new(&ChaseConfig {
            round_duration: 10.0,
            max_rounds: 2,
            ..Default::default()
        });
        finish_round(&mut round, RoundWinner::Player);
        wait_out_delay(&mut round);
        let events = finish_round(&mut round, RoundWinner::Hunter);
        assert_eq!(events.last(), Some(&RoundEvent::MatchFinished(MatchOutcome::Draw)));
    }

    #[test]
    fn restart_clears_tally() {
        let mut round = short_rounds();
        finish_round(&mut round, RoundWinner::Hunter);
        assert_eq!(round.restart(), RoundEvent::Started { index: 1 });
        assert_eq!(round.tally(), Tally::default());
        assert!(round.is_running());
        assert_eq!(round.index(), 1);
    }
}
