use bevy::prelude::Vec3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChaseConfigError {
    #[error("{0} must be finite and > 0")]
    NonPositive(&'static str),
    #[error("sprint_speed must not be below walk_speed")]
    SprintSlowerThanWalk,
    #[error("intercept_range must be below detection_range")]
    InterceptBeyondDetection,
    #[error("intercept_hysteresis must be finite and >= 0")]
    NegativeHysteresis,
    #[error("max_rounds must be at least 1")]
    NoRounds,
}

/// Tuning for the neon city chase.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaseConfig {
    // Local player
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub player_half_width: f32,
    pub player_height: f32,

    // Hunter
    pub hunter_base_speed: f32,
    pub hunter_max_speed: f32,
    pub detection_range: f32,
    pub intercept_range: f32,
    /// Extra distance beyond `intercept_range` before intercept is dropped.
    pub intercept_hysteresis: f32,
    pub boost_range: f32,
    pub boost_factor: f32,
    pub catch_range: f32,
    pub max_lead_time: f32,
    pub patrol_reach: f32,
    pub hunter_half_width: f32,
    pub hunter_height: f32,

    // Rounds
    pub round_duration: f32,
    pub max_rounds: u32,
    pub round_delay: f32,
    pub player_spawn: Vec3,
    pub hunter_spawn: Vec3,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            sprint_speed: 10.0,
            player_half_width: 0.5,
            player_height: 2.0,

            hunter_base_speed: 6.0,
            hunter_max_speed: 15.0,
            detection_range: 100.0,
            intercept_range: 20.0,
            intercept_hysteresis: 4.0,
            boost_range: 30.0,
            boost_factor: 1.5,
            catch_range: 1.5,
            max_lead_time: 3.0,
            patrol_reach: 2.0,
            hunter_half_width: 0.6,
            hunter_height: 2.5,

            round_duration: 180.0,
            max_rounds: 3,
            round_delay: 3.0,
            player_spawn: Vec3::ZERO,
            hunter_spawn: Vec3::new(37.5, 0.0, 37.5),
        }
    }
}

impl ChaseConfig {
    pub fn validate(&self) -> Result<(), ChaseConfigError> {
        let positive = [
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("player_half_width", self.player_half_width),
            ("player_height", self.player_height),
            ("hunter_base_speed", self.hunter_base_speed),
            ("hunter_max_speed", self.hunter_max_speed),
            ("detection_range", self.detection_range),
            ("intercept_range", self.intercept_range),
            ("catch_range", self.catch_range),
            ("max_lead_time", self.max_lead_time),
            ("hunter_half_width", self.hunter_half_width),
            ("hunter_height", self.hunter_height),
            ("round_duration", self.round_duration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChaseConfigError::NonPositive(name));
            }
        }
        if self.sprint_speed < self.walk_speed {
            return Err(ChaseConfigError::SprintSlowerThanWalk);
        }
        if self.intercept_range >= self.detection_range {
            return Err(ChaseConfigError::InterceptBeyondDetection);
        }
        if !self.intercept_hysteresis.is_finite() || self.intercept_hysteresis < 0.0 {
            return Err(ChaseConfigError::NegativeHysteresis);
        }
        if self.max_rounds == 0 {
            return Err(ChaseConfigError::NoRounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ChaseConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_round_duration_rejected() {
        let config = ChaseConfig {
            round_duration: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ChaseConfigError::NonPositive("round_duration"))
        );
    }

    #[test]
    fn intercept_must_sit_inside_detection() {
        let config = ChaseConfig {
            intercept_range: 150.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ChaseConfigError::InterceptBeyondDetection)
        );
    }
}
