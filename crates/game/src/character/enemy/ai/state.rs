//! Per-enemy targeting and movement state machine.
//!
//! ```text
//! Idle ──(target found)──> Tracking <──(path done)── Pathfinding
//!                              └──(far and due)──────────^
//! any ──(killed)──> Dead
//! ```
//!
//! Targets are held by `PlayerId` and re-validated against the connected
//! players every tick, never by a strong reference.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::character::{enemy::EnemyConfig, Facing};
use crate::character::player::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect, Serialize, Deserialize, Default)]
pub enum MonsterState {
    #[default]
    Idle,
    Tracking,
    Pathfinding,
    Dead,
}

/// A player the enemy could chase this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    pub id: PlayerId,
    pub position: Vec3,
    pub downed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveIntent {
    Hold,
    /// Move straight toward `toward` this tick.
    Steer { toward: Vec3, speed: f32 },
    /// Ask the host for a path to `goal`.
    Pathfind { goal: Vec3 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathfindOutcome {
    Completed,
    Aborted,
    Skipped,
}

#[derive(Component, Reflect, Clone, Debug, Default, PartialEq)]
#[reflect(Component)]
pub struct EnemyBrain {
    pub state: MonsterState,
    pub target: Option<PlayerId>,
    pub retarget_accumulator_ms: u64,
    pub pathfind_accumulator_ms: u64,
    pub is_pathfinding: bool,
}

fn nearest(position: Vec3, candidates: &[TargetCandidate]) -> Option<&TargetCandidate> {
    candidates
        .iter()
        .filter(|c| !c.downed)
        .min_by(|a, b| {
            position
                .distance_squared(a.position)
                .total_cmp(&position.distance_squared(b.position))
        })
}

impl EnemyBrain {
    pub fn tick(
        &mut self,
        dt_ms: u64,
        position: Vec3,
        speed: f32,
        candidates: &[TargetCandidate],
        config: &EnemyConfig,
    ) -> MoveIntent {
        if self.state == MonsterState::Dead {
            return MoveIntent::Hold;
        }

        self.retarget_accumulator_ms += dt_ms;
        self.pathfind_accumulator_ms += dt_ms;

        let current = self
            .target
            .and_then(|id| candidates.iter().find(|c| c.id == id && !c.downed));
        let target = if current.is_none() || self.retarget_accumulator_ms >= config.retarget_interval_ms
        {
            self.retarget_accumulator_ms = 0;
            nearest(position, candidates)
        } else {
            current
        };

        let Some(target) = target.copied() else {
            self.target = None;
            self.state = MonsterState::Idle;
            return MoveIntent::Hold;
        };
        self.target = Some(target.id);

        if self.is_pathfinding {
            self.state = MonsterState::Pathfinding;
            return MoveIntent::Hold;
        }

        let distance = position.distance(target.position);
        if distance <= config.near_distance
            || self.pathfind_accumulator_ms < config.pathfind_interval_ms
        {
            self.state = MonsterState::Tracking;
            return MoveIntent::Steer {
                toward: target.position,
                speed,
            };
        }

        self.pathfind_accumulator_ms = 0;
        self.is_pathfinding = true;
        self.state = MonsterState::Pathfinding;
        MoveIntent::Pathfind {
            goal: target.position,
        }
    }

    /// Every outcome frees the brain to steer again on the next tick.
    pub fn on_pathfind_finished(&mut self, outcome: PathfindOutcome) {
        self.is_pathfinding = false;
        if self.state == MonsterState::Pathfinding {
            self.state = MonsterState::Tracking;
        }
        trace!("brain{{pathfind_finished outcome={:?}}}", outcome);
    }

    pub fn kill(&mut self) {
        self.state = MonsterState::Dead;
        self.target = None;
        self.is_pathfinding = false;
    }
}

/// One tick of direct steering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteerStep {
    pub position: Vec3,
    /// None when already standing on the target.
    pub facing: Option<Facing>,
}

/// Horizontal step toward `toward`, never overshooting it, turning to face
/// the target.
pub fn steer_step(position: Vec3, toward: Vec3, speed: f32, dt_secs: f32) -> SteerStep {
    let facing = Facing::toward(position, toward);
    let mut delta = toward - position;
    delta.y = 0.0;
    let distance = delta.length();
    let step = speed * dt_secs;
    let position = if distance <= step || distance <= f32::EPSILON {
        Vec3::new(toward.x, position.y, toward.z)
    } else {
        position + delta / distance * step
    };
    SteerStep { position, facing }
}
