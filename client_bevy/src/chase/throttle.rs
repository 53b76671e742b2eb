use blockverse_shared::config::{MOVE_SEND_EPSILON, MOVE_SEND_RATE_HZ};
use blockverse_shared::vec3::{Rotation, Vec3};

/// Rate-limits outgoing pose updates and suppresses ones that did not change.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    min_interval: f64,
    epsilon: f64,
    last_sent_at: Option<f64>,
    last_pose: Option<(Vec3, Rotation)>,
}

impl Default for MoveThrottle {
    fn default() -> Self {
        Self::new(MOVE_SEND_RATE_HZ, MOVE_SEND_EPSILON)
    }
}

impl MoveThrottle {
    pub fn new(rate_hz: f64, epsilon: f64) -> Self {
        Self {
            min_interval: 1.0 / rate_hz,
            epsilon,
            last_sent_at: None,
            last_pose: None,
        }
    }

    /// True when a pose should go out at time `now` (seconds). Records it as
    /// sent when it returns true.
    pub fn should_send(&mut self, now: f64, position: Vec3, rotation: Rotation) -> bool {
        if let Some(at) = self.last_sent_at {
            if now - at < self.min_interval {
                return false;
            }
        }
        if let Some((last_pos, last_rot)) = self.last_pose {
            if !self.changed(last_pos, last_rot, position, rotation) {
                return false;
            }
        }
        self.last_sent_at = Some(now);
        self.last_pose = Some((position, rotation));
        true
    }

    /// Forget history so the next pose goes out immediately, e.g. after a
    /// re-join.
    pub fn reset(&mut self) {
        self.last_sent_at = None;
        self.last_pose = None;
    }

    fn changed(&self, a: Vec3, ar: Rotation, b: Vec3, br: Rotation) -> bool {
        let eps = self.epsilon;
        (a.x - b.x).abs() > eps
            || (a.y - b.y).abs() > eps
            || (a.z - b.z).abs() > eps
            || (ar.x - br.x).abs() > eps
            || (ar.y - br.y).abs() > eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn first_pose_goes_out() {
        let mut t = MoveThrottle::default();
        assert!(t.should_send(0.0, at(0.0), Rotation::default()));
    }

    #[test]
    fn at_most_five_per_second() {
        let mut t = MoveThrottle::default();
        let mut sent = 0;
        // 60 fps for one second, moving every frame
        for frame in 0..60 {
            let now = frame as f64 / 60.0;
            if t.should_send(now, at(frame as f64), Rotation::default()) {
                sent += 1;
            }
        }
        assert!(sent <= 5, "sent {sent}");
        assert!(sent >= 4);
    }

    #[test]
    fn unchanged_pose_is_suppressed() {
        let mut t = MoveThrottle::default();
        assert!(t.should_send(0.0, at(1.0), Rotation::default()));
        assert!(!t.should_send(1.0, at(1.005), Rotation::default()));
        assert!(t.should_send(2.0, at(1.02), Rotation::default()));
    }

    #[test]
    fn rotation_change_counts() {
        let mut t = MoveThrottle::default();
        t.should_send(0.0, at(0.0), Rotation::new(0.0, 0.0));
        assert!(t.should_send(1.0, at(0.0), Rotation::new(0.0, 0.5)));
    }

    #[test]
    fn reset_allows_immediate_resend() {
        let mut t = MoveThrottle::default();
        t.should_send(0.0, at(0.0), Rotation::default());
        t.reset();
        assert!(t.should_send(0.01, at(0.0), Rotation::default()));
    }
}
