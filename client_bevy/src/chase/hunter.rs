//! Pursuit AI for the chase world.
//!
//! The hunter leads its target: it aims at where the player will be after
//! the time it needs to close the gap, and ramps its aggressiveness with
//! elapsed round time so a round cannot stall forever.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

use bevy::prelude::{Quat, Vec3};

use super::config::ChaseConfig;
use super::geometry::{collides, Aabb};

/// Minimum player speed treated as moving.
const MOVING_SPEED: f32 = 0.1;
/// Cap on speed boost while the player is opening distance, as a multiple
/// of max speed.
const ESCAPE_SPEED_CAP: f32 = 1.5;
const ESCAPE_BOOST: f32 = 1.8;
/// Headings tried in order when the direct step is blocked.
const DEFLECTIONS: [f32; 5] = [FRAC_PI_3, -FRAC_PI_3, FRAC_PI_2, -FRAC_PI_2, PI];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitMode {
    Patrol,
    Chase,
    Intercept,
}

/// How the last step resolved against obstacles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Idle,
    Direct,
    Deflected(f32),
    Retreated,
    /// Every option collided; position held for this frame.
    Stalled,
}

/// Snapshot for the HUD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HunterDebug {
    pub mode: PursuitMode,
    pub speed: f32,
    pub lead_time: f32,
    pub closing_rate: f32,
    pub aggressiveness: f32,
    pub step: StepOutcome,
}

#[derive(Debug, Clone)]
pub struct Hunter {
    position: Vec3,
    velocity: Vec3,
    heading: f32,
    current_speed: f32,
    mode: PursuitMode,
    aggressiveness: f32,
    target: Option<Vec3>,
    predicted: Option<Vec3>,
    lead_time: f32,
    closing_rate: f32,
    last_step: StepOutcome,

    config: ChaseConfig,
}

impl Hunter {
    pub fn new(config: &ChaseConfig, spawn: Vec3) -> Self {
        let mut hunter = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            heading: 0.0,
            current_speed: config.hunter_base_speed,
            mode: PursuitMode::Patrol,
            aggressiveness: 1.0,
            target: None,
            predicted: None,
            lead_time: 0.0,
            closing_rate: 0.0,
            last_step: StepOutcome::Idle,
            config: config.clone(),
        };
        hunter.reset(spawn);
        hunter
    }

    /// Advance one frame. Returns true when the player is within catch range
    /// after the step.
    pub fn update(
        &mut self,
        dt: f32,
        player_position: Vec3,
        player_velocity: Vec3,
        player_speed: f32,
        obstacles: &[Aabb],
        elapsed_round_time: f32,
    ) -> bool {
        let cfg = &self.config;

        let elapsed = elapsed_round_time.clamp(0.0, cfg.round_duration);
        let ramp = 1.0 + (elapsed / cfg.round_duration) * 2.0;
        self.aggressiveness = self.aggressiveness.max(ramp);

        let to_player = player_position - self.position;
        let distance = to_player.length();
        let to_player_dir = to_player.normalize_or_zero();
        self.closing_rate = -(player_velocity - self.velocity).dot(to_player_dir);

        self.mode = self.next_mode(distance);

        if self.mode == PursuitMode::Patrol {
            self.plan_patrol();
        } else {
            self.plan_pursuit(player_position, player_velocity, player_speed, to_player_dir, distance);
        }

        self.step(dt, obstacles);

        self.position.distance(player_position) <= self.config.catch_range
    }

    fn next_mode(&self, distance: f32) -> PursuitMode {
        let cfg = &self.config;
        if distance > cfg.detection_range {
            return PursuitMode::Patrol;
        }
        let intercept_exit = cfg.intercept_range + cfg.intercept_hysteresis;
        let stays_intercept = self.mode == PursuitMode::Intercept
            && cfg.intercept_hysteresis > 0.0
            && distance <= intercept_exit;
        if distance < cfg.intercept_range || stays_intercept {
            PursuitMode::Intercept
        } else {
            PursuitMode::Chase
        }
    }

    /// Head for the last known target, then fall back to the world centre.
    fn plan_patrol(&mut self) {
        if let Some(target) = self.target {
            if self.position.distance(target) < self.config.patrol_reach {
                self.target = None;
            }
        }
        if self.target.is_none() {
            self.target = Some(Vec3::ZERO);
        }
        self.predicted = None;
        self.current_speed = self.config.hunter_base_speed;
    }

    fn plan_pursuit(
        &mut self,
        player_position: Vec3,
        player_velocity: Vec3,
        player_speed: f32,
        to_player_dir: Vec3,
        distance: f32,
    ) {
        let cfg = &self.config;

        if player_speed > MOVING_SPEED {
            let mut speed = cfg.hunter_base_speed * self.aggressiveness;
            if distance < cfg.boost_range {
                speed = cfg.hunter_max_speed.min(speed * cfg.boost_factor);
            }

            let cos_angle = to_player_dir.dot(player_velocity.normalize_or_zero());
            let closing_speed = speed - player_speed * cos_angle;

            if closing_speed > 0.0 {
                self.lead_time = (distance / closing_speed).min(cfg.max_lead_time);
                let predicted = player_position + player_velocity * self.lead_time;
                self.predicted = Some(predicted);
                self.target = Some(predicted);
                self.current_speed = speed;
            } else {
                // Player outruns the intercept; go straight at them flat out
                self.lead_time = 0.0;
                self.predicted = None;
                self.target = Some(player_position);
                self.current_speed = cfg.hunter_max_speed * self.aggressiveness;
            }
        } else {
            self.lead_time = 0.0;
            self.predicted = Some(player_position);
            self.target = Some(player_position);
            self.current_speed = cfg.hunter_max_speed * self.aggressiveness;
        }

        if self.closing_rate < 0.0 {
            self.current_speed = (cfg.hunter_max_speed * ESCAPE_SPEED_CAP)
                .min(self.current_speed * ESCAPE_BOOST);
        }
    }

    fn step(&mut self, dt: f32, obstacles: &[Aabb]) {
        let Some(target) = self.target else {
            self.velocity = Vec3::ZERO;
            self.last_step = StepOutcome::Idle;
            return;
        };

        let mut direction = target - self.position;
        direction.y = 0.0;
        let direction = direction.normalize_or_zero();
        self.velocity = direction * self.current_speed;

        if direction == Vec3::ZERO || dt <= 0.0 {
            self.last_step = StepOutcome::Idle;
            return;
        }

        let step = self.current_speed * dt;
        self.heading = direction.x.atan2(direction.z);

        if self.try_move(self.position + direction * step, obstacles) {
            self.last_step = StepOutcome::Direct;
            return;
        }

        for angle in DEFLECTIONS {
            let deflected = Quat::from_rotation_y(angle) * direction;
            if self.try_move(self.position + deflected * step, obstacles) {
                self.last_step = StepOutcome::Deflected(angle);
                return;
            }
        }

        if self.try_move(self.position - direction * step * 0.5, obstacles) {
            self.last_step = StepOutcome::Retreated;
        } else {
            self.last_step = StepOutcome::Stalled;
        }
    }

    fn try_move(&mut self, candidate: Vec3, obstacles: &[Aabb]) -> bool {
        let body = Aabb::footprint(
            candidate,
            self.config.hunter_half_width,
            self.config.hunter_height,
        );
        if collides(&body, obstacles) {
            return false;
        }
        self.position = Vec3::new(candidate.x, 0.0, candidate.z);
        true
    }

    pub fn reset(&mut self, spawn: Vec3) {
        self.position = Vec3::new(spawn.x, 0.0, spawn.z);
        self.velocity = Vec3::ZERO;
        self.heading = 0.0;
        self.current_speed = self.config.hunter_base_speed;
        self.mode = PursuitMode::Patrol;
        self.aggressiveness = 1.0;
        self.target = None;
        self.predicted = None;
        self.lead_time = 0.0;
        self.closing_rate = 0.0;
        self.last_step = StepOutcome::Idle;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn mode(&self) -> PursuitMode {
        self.mode
    }

    pub fn aggressiveness(&self) -> f32 {
        self.aggressiveness
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn predicted_target(&self) -> Option<Vec3> {
        self.predicted
    }

    pub fn debug_info(&self) -> HunterDebug {
        HunterDebug {
            mode: self.mode,
            speed: self.current_speed,
            lead_time: self.lead_time,
            closing_rate: self.closing_rate,
            aggressiveness: self.aggressiveness,
            step: self.last_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn hunter_at(pos: Vec3) -> Hunter {
        Hunter::new(&ChaseConfig::default(), pos)
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn aggressiveness_ramps_from_one_to_three() {
        let mut h = hunter_at(Vec3::ZERO);
        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.aggressiveness(), 1.0);

        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 90.0);
        assert!((h.aggressiveness() - 2.0).abs() < 1e-5);

        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 180.0);
        assert!((h.aggressiveness() - 3.0).abs() < 1e-5);

        // Clamped past the end of the round
        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 900.0);
        assert!((h.aggressiveness() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn aggressiveness_never_decreases_within_a_round() {
        let mut h = hunter_at(Vec3::ZERO);
        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 120.0);
        let high = h.aggressiveness();
        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 10.0);
        assert_eq!(h.aggressiveness(), high);

        h.reset(Vec3::ZERO);
        assert_eq!(h.aggressiveness(), 1.0);
    }

    #[test]
    fn stationary_player_is_targeted_exactly() {
        let mut h = hunter_at(Vec3::ZERO);
        let player = Vec3::new(40.0, 0.0, 10.0);
        h.update(DT, player, Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.predicted_target(), Some(player));
        assert_eq!(h.current_speed(), 15.0);
    }

    #[test]
    fn moving_player_is_led() {
        let mut h = hunter_at(Vec3::ZERO);
        let player = Vec3::new(50.0, 0.0, 0.0);
        let velocity = Vec3::new(0.0, 0.0, 5.0);
        h.update(DT, player, velocity, 5.0, &[], 0.0);

        // Perpendicular motion: closing speed is the full hunter speed
        let lead = (50.0f32 / 6.0).min(3.0);
        assert!((h.debug_info().lead_time - lead).abs() < 1e-5);
        assert_close(h.predicted_target().unwrap(), player + velocity * lead);
        assert_eq!(h.mode(), PursuitMode::Chase);
    }

    #[test]
    fn lead_time_is_short_when_close() {
        let mut h = hunter_at(Vec3::ZERO);
        let player = Vec3::new(10.0, 0.0, 0.0);
        h.update(DT, player, Vec3::new(0.0, 0.0, 5.0), 5.0, &[], 0.0);
        // Boosted to 9 inside 30 units
        assert!((h.debug_info().lead_time - 10.0 / 9.0).abs() < 1e-4);
    }

    #[test]
    fn outrunning_player_is_chased_directly_at_max_speed() {
        let mut h = hunter_at(Vec3::ZERO);
        let player = Vec3::new(50.0, 0.0, 0.0);
        h.update(DT, player, Vec3::new(100.0, 0.0, 0.0), 100.0, &[], 0.0);
        assert_eq!(h.predicted_target(), None);
        // max * aggr, then the escape boost capped at 1.5 * max
        assert!((h.current_speed() - 22.5).abs() < 1e-4);
    }

    #[test]
    fn far_player_means_patrol_toward_centre() {
        let mut h = hunter_at(Vec3::new(10.0, 0.0, 0.0));
        h.update(1.0, Vec3::new(200.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Patrol);
        assert_eq!(h.current_speed(), 6.0);
        assert_close(h.position(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn patrol_visits_last_known_target_first() {
        let mut h = hunter_at(Vec3::ZERO);
        // Spot a stationary player, then lose them
        h.update(DT, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        h.update(1.0, Vec3::new(500.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Patrol);
        // Still heading out along +x, not back to the centre
        assert!(h.position().x > 1.0);
    }

    #[test]
    fn intercept_mode_has_hysteresis() {
        let mut h = hunter_at(Vec3::ZERO);
        h.update(0.0, Vec3::new(19.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Intercept);
        h.update(0.0, Vec3::new(22.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Intercept);
        h.update(0.0, Vec3::new(25.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Chase);
        h.update(0.0, Vec3::new(22.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Chase);
    }

    #[test]
    fn zero_hysteresis_uses_bare_thresholds() {
        let config = ChaseConfig {
            intercept_hysteresis: 0.0,
            ..Default::default()
        };
        let mut h = Hunter::new(&config, Vec3::ZERO);
        h.update(0.0, Vec3::new(19.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Intercept);
        h.update(0.0, Vec3::new(20.5, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0);
        assert_eq!(h.mode(), PursuitMode::Chase);
    }

    #[test]
    fn catch_is_reported_within_range() {
        let mut h = hunter_at(Vec3::ZERO);
        assert!(h.update(DT, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0));

        let mut far = hunter_at(Vec3::ZERO);
        assert!(!far.update(DT, Vec3::new(30.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0));
    }

    #[test]
    fn catch_counts_the_distance_after_the_step() {
        // 1.6 apart before the step; a 1.5 unit step closes to 0.1
        let mut h = hunter_at(Vec3::ZERO);
        assert!(h.update(0.1, Vec3::new(1.6, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0));
        assert_close(h.position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn overshooting_step_is_not_a_catch() {
        // In range before the step, 14 units past the player after it
        let mut h = hunter_at(Vec3::ZERO);
        assert!(!h.update(1.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 0.0, &[], 0.0));
        assert_close(h.position(), Vec3::new(15.0, 0.0, 0.0));
    }

    #[test]
    fn identical_inputs_give_identical_runs() {
        let obstacles = crate::chase::geometry::ObstacleSource::obstacles(
            &crate::chase::geometry::NeonCityGrid::default(),
        );
        let config = ChaseConfig::default();
        let mut a = Hunter::new(&config, config.hunter_spawn);
        let mut b = Hunter::new(&config, config.hunter_spawn);
        let mut player = Vec3::ZERO;
        let velocity = Vec3::new(5.0, 0.0, 0.0);
        for i in 0..600 {
            player += velocity * DT;
            let t = i as f32 * DT;
            let caught_a = a.update(DT, player, velocity, 5.0, &obstacles, t);
            let caught_b = b.update(DT, player, velocity, 5.0, &obstacles, t);
            assert_eq!(caught_a, caught_b);
            assert_eq!(a.position(), b.position());
        }
    }

    #[test]
    fn blocked_step_deflects() {
        let wall = Aabb::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 5.0, 3.0));
        let mut h = hunter_at(Vec3::ZERO);
        h.update(0.1, Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO, 0.0, &[wall], 0.0);
        assert_eq!(h.debug_info().step, StepOutcome::Deflected(FRAC_PI_2));
        assert_close(h.position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn boxed_in_hunter_retreats_at_half_speed() {
        let obstacles = [
            Aabb::new(Vec3::new(-5.0, 0.0, 0.7), Vec3::new(5.0, 5.0, 5.0)),
            Aabb::new(Vec3::new(0.65, 0.0, -0.5), Vec3::new(5.0, 5.0, 0.5)),
            Aabb::new(Vec3::new(-5.0, 0.0, -0.5), Vec3::new(-0.65, 5.0, 0.5)),
            Aabb::new(Vec3::new(-5.0, 0.0, -3.0), Vec3::new(5.0, 5.0, -1.4)),
        ];
        let mut h = hunter_at(Vec3::ZERO);
        h.update(0.1, Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO, 0.0, &obstacles, 0.0);
        assert_eq!(h.debug_info().step, StepOutcome::Retreated);
        assert_close(h.position(), Vec3::new(0.0, 0.0, -0.75));
    }

    #[test]
    fn fully_enclosed_hunter_holds_position() {
        let cage = Aabb::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 5.0, 5.0));
        let mut h = hunter_at(Vec3::ZERO);
        h.update(0.1, Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO, 0.0, &[cage], 0.0);
        assert_eq!(h.debug_info().step, StepOutcome::Stalled);
        assert_eq!(h.position(), Vec3::ZERO);
    }
}
