pub mod ai;
pub mod combat;
pub mod create;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{character::Facing, waves::config::EnemyStats};

pub use combat::{DamageInput, DamageOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum EnemyKind {
    Zombie,
    Boss,
}

impl EnemyKind {
    pub fn model(self) -> &'static str {
        match self {
            EnemyKind::Zombie => "models/zombie.glb",
            EnemyKind::Boss => "models/zombie-brute.glb",
        }
    }

    pub fn net_kind(self) -> &'static str {
        match self {
            EnemyKind::Zombie => "zombie",
            EnemyKind::Boss => "boss",
        }
    }
}

#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[require(Facing)]
pub struct Enemy {
    pub kind: EnemyKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub headshot_multiplier: f32,
    /// Height band of the head above the entity origin.
    pub head_min_height: f32,
    pub head_max_height: f32,
    /// Horizontal distance from the entity axis still counted as the head.
    pub head_radius: f32,
    pub damage_flash_ms: u64,

    pub retarget_interval_ms: u64,
    pub pathfind_interval_ms: u64,
    /// Below this distance to the target, steer straight at it.
    pub near_distance: f32,
    pub max_jump: f32,
    pub max_fall: f32,
    /// Negative values make the host prefer jumping.
    pub vertical_penalty: f32,

    pub attack_range: f32,
    pub attack_cooldown_ms: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            headshot_multiplier: 2.5,
            head_min_height: 1.4,
            head_max_height: 2.0,
            head_radius: 0.45,
            damage_flash_ms: 125,

            retarget_interval_ms: 5_000,
            pathfind_interval_ms: 3_000,
            near_distance: 8.0,
            max_jump: 3.0,
            max_fall: 6.0,
            vertical_penalty: -1.0,

            attack_range: 1.5,
            attack_cooldown_ms: 1_000,
        }
    }
}

/// Live combat stats of a spawned enemy, fixed at spawn time from the wave.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct EnemyInstance {
    /// Not clamped at zero; death is the crossing of zero.
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    /// Money split between attackers in proportion to damage dealt.
    pub reward: f32,
    pub headshot_multiplier: f32,
    pub dead: bool,
    pub last_attack_ms: Option<u64>,
}

impl EnemyInstance {
    pub fn new(stats: EnemyStats, config: &EnemyConfig) -> Self {
        Self {
            health: stats.health,
            max_health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            reward: stats.reward,
            headshot_multiplier: config.headshot_multiplier,
            dead: false,
            last_attack_ms: None,
        }
    }

    /// Health for display, never below zero.
    pub fn display_health(&self) -> f32 {
        self.health.max(0.0)
    }
}
