//! Remote avatar bookkeeping: relay updates set targets, each frame eases
//! the rendered pose toward them.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use bevy::log::warn;
use bevy::prelude::Vec3;
use blockverse_shared::protocol::ConnectionId;

/// Fraction of the remaining gap left after one second of smoothing.
pub const DEFAULT_DECAY: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug)]
pub struct RemoteAvatar<H> {
    pub display_name: String,
    pub handle: H,
    pub current: Pose,
    pub target: Pose,
}

/// Remote avatars keyed by connection id. `H` is whatever the renderer
/// needs to release on removal.
#[derive(Debug)]
pub struct RemoteAvatars<H> {
    avatars: HashMap<ConnectionId, RemoteAvatar<H>>,
    decay: f32,
}

impl<H> Default for RemoteAvatars<H> {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY)
    }
}

impl<H> RemoteAvatars<H> {
    pub fn new(decay: f32) -> Self {
        Self {
            avatars: HashMap::new(),
            decay: decay.clamp(0.0, 1.0),
        }
    }

    /// Add an avatar, creating its handle only if `id` is new. Returns false
    /// for a duplicate join.
    pub fn join_with(
        &mut self,
        id: ConnectionId,
        display_name: String,
        pose: Pose,
        spawn: impl FnOnce() -> H,
    ) -> bool {
        if self.avatars.contains_key(&id) {
            return false;
        }
        self.avatars.insert(
            id,
            RemoteAvatar {
                display_name,
                handle: spawn(),
                current: pose,
                target: pose,
            },
        );
        true
    }

    /// Last update wins. Unknown ids are dropped.
    pub fn set_target(&mut self, id: ConnectionId, pose: Pose) -> bool {
        match self.avatars.get_mut(&id) {
            Some(avatar) => {
                avatar.target = pose;
                true
            }
            None => {
                warn!("Move for unknown avatar {}", id);
                false
            }
        }
    }

    /// Remove an avatar and hand back its handle for release.
    pub fn leave(&mut self, id: ConnectionId) -> Option<H> {
        self.avatars.remove(&id).map(|a| a.handle)
    }

    /// Remove everything, handing back every handle.
    pub fn drain(&mut self) -> Vec<H> {
        self.avatars.drain().map(|(_, a)| a.handle).collect()
    }

    /// Ease every avatar toward its target.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let alpha = 1.0 - self.decay.powf(dt);
        for avatar in self.avatars.values_mut() {
            let (cur, target) = (&mut avatar.current, avatar.target);
            cur.position = cur.position.lerp(target.position, alpha);
            cur.yaw = lerp_angle(cur.yaw, target.yaw, alpha);
            cur.pitch = lerp_angle(cur.pitch, target.pitch, alpha);
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&RemoteAvatar<H>> {
        self.avatars.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.avatars.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &RemoteAvatar<H>)> {
        self.avatars.iter().map(|(id, a)| (*id, a))
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}

/// Wrap an angle into [-PI, PI).
pub fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Interpolate along the shorter arc.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    wrap_angle(from + wrap_angle(to - from) * t)
}
