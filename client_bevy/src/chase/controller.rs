use bevy::prelude::Vec3;

use super::config::ChaseConfig;
use super::geometry::{collides, Aabb};

/// Movement keys held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl MoveInput {
    pub fn any_direction(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Horizontal forward vector for a yaw. Yaw 0 faces +z.
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Right-hand vector for a yaw (forward × up).
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.cos(), 0.0, yaw.sin())
}

/// Kinematic controller for the local player on the ground plane.
#[derive(Debug, Clone)]
pub struct PlayerController {
    position: Vec3,
    velocity: Vec3,
    /// Direction the body faces, updated only on accepted moves.
    heading: f32,
    current_speed: f32,
    distance_traveled: f32,
    alive: bool,

    walk_speed: f32,
    sprint_speed: f32,
    half_width: f32,
    height: f32,
}

impl PlayerController {
    pub fn new(config: &ChaseConfig, spawn: Vec3) -> Self {
        Self {
            position: Vec3::new(spawn.x, 0.0, spawn.z),
            velocity: Vec3::ZERO,
            heading: 0.0,
            current_speed: config.walk_speed,
            distance_traveled: 0.0,
            alive: true,
            walk_speed: config.walk_speed,
            sprint_speed: config.sprint_speed,
            half_width: config.player_half_width,
            height: config.player_height,
        }
    }

    /// Advance one frame. `view_yaw` orients the movement keys.
    pub fn update(&mut self, dt: f32, input: MoveInput, view_yaw: f32, obstacles: &[Aabb]) {
        if !self.alive {
            self.velocity = Vec3::ZERO;
            return;
        }

        let mut direction = Vec3::ZERO;
        let forward = forward_from_yaw(view_yaw);
        let right = right_from_yaw(view_yaw);
        if input.forward {
            direction += forward;
        }
        if input.backward {
            direction -= forward;
        }
        if input.left {
            direction -= right;
        }
        if input.right {
            direction += right;
        }
        let direction = direction.normalize_or_zero();

        self.current_speed = if input.sprint {
            self.sprint_speed
        } else {
            self.walk_speed
        };
        self.velocity = direction * self.current_speed;

        if dt <= 0.0 || direction == Vec3::ZERO {
            return;
        }

        let candidate = self.position + self.velocity * dt;
        let body = Aabb::footprint(candidate, self.half_width, self.height);
        if collides(&body, obstacles) {
            return;
        }

        self.distance_traveled += candidate.distance(self.position);
        self.position = Vec3::new(candidate.x, 0.0, candidate.z);
        self.heading = direction.x.atan2(direction.z);
    }

    /// Freeze for the rest of the round.
    pub fn mark_caught(&mut self) {
        self.alive = false;
        self.velocity = Vec3::ZERO;
    }

    pub fn reset(&mut self, spawn: Vec3) {
        self.position = Vec3::new(spawn.x, 0.0, spawn.z);
        self.velocity = Vec3::ZERO;
        self.heading = 0.0;
        self.current_speed = self.walk_speed;
        self.distance_traveled = 0.0;
        self.alive = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Commanded velocity this frame, zero once caught.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Magnitude of the commanded velocity.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_sprinting(&self) -> bool {
        self.current_speed > self.walk_speed && self.velocity != Vec3::ZERO
    }
}
