pub mod enemy;
pub mod health;
pub mod player;

use bevy::prelude::*;

/// Position in the host world. The host physics owns the real transform and
/// mirrors it here; the server-side steering writes it back.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct WorldPosition(pub Vec3);

/// Heading around +Y in radians, 0 looking down +Z. Mirrored to the host so
/// models turn toward whatever they chase.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct Facing {
    pub yaw: f32,
}

impl Facing {
    /// Heading from `from` to `to` on the ground plane. None when the two
    /// overlap horizontally.
    pub fn toward(from: Vec3, to: Vec3) -> Option<Self> {
        let dx = to.x - from.x;
        let dz = to.z - from.z;
        if dx * dx + dz * dz <= f32::EPSILON {
            return None;
        }
        Some(Self { yaw: dx.atan2(dz) })
    }
}

/// Where an enemy was spawned, used to normalize hit distances for feedback.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrigin(pub Vec3);
