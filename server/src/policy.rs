//! Pluggable validation of client-submitted moves.
//!
//! The relay trusts clients by default. Stricter policies slot in here
//! without touching fan-out.

use blockverse_shared::vec3::{distance, Rotation, Vec3};

use crate::player::PlayerState;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("NaN or Infinity in move")]
    NonFinite,
    #[error("step of {step:.2} exceeds limit {limit:.2}")]
    StepTooLarge { step: f64, limit: f64 },
}

pub trait MovePolicy: Send + Sync {
    fn check_move(
        &self,
        current: &PlayerState,
        position: Vec3,
        rotation: Rotation,
    ) -> Result<(), PolicyViolation>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveMovePolicy;

impl MovePolicy for PermissiveMovePolicy {
    fn check_move(&self, _: &PlayerState, _: Vec3, _: Rotation) -> Result<(), PolicyViolation> {
        Ok(())
    }
}

/// Rejects non-finite values and single updates that move further than
/// `max_step` from the last accepted position.
#[derive(Debug, Clone, Copy)]
pub struct MaxStepPolicy {
    pub max_step: f64,
}

impl MovePolicy for MaxStepPolicy {
    fn check_move(
        &self,
        current: &PlayerState,
        position: Vec3,
        rotation: Rotation,
    ) -> Result<(), PolicyViolation> {
        if !position.is_finite() || !rotation.is_finite() {
            return Err(PolicyViolation::NonFinite);
        }
        let step = distance(current.position, position);
        if step > self.max_step {
            return Err(PolicyViolation::StepTooLarge {
                step,
                limit: self.max_step,
            });
        }
        Ok(())
    }
}
