pub mod create;
pub mod revive;
pub mod systems;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use create::{spawn_player, PlayerJoined, PlayerLeft};
pub use revive::{ReviveError, ReviveRequest};

/// Stable identifier of a connected player session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// False between the game-over despawn and the next respawn.
    pub spawned: bool,
}

/// A player went down or got back up.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDownedChanged {
    pub player: PlayerId,
    pub downed: bool,
}

impl PlayerDownedChanged {
    pub fn new(player: PlayerId, downed: bool) -> Self {
        Self { player, downed }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    pub starting_money: f32,
    /// Quiet period after the last damage before regeneration kicks in.
    pub regen_delay_ms: u64,
    pub regen_per_second: f32,
    pub revive_health_fraction: f32,
    pub revive_range: f32,
    /// Kills closer together than this keep the kill streak going.
    pub kill_streak_window_ms: u64,
    pub spawn_position: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            starting_money: 0.0,
            regen_delay_ms: 5_000,
            regen_per_second: 8.0,
            revive_health_fraction: 0.5,
            revive_range: 3.0,
            kill_streak_window_ms: 4_000,
            spawn_position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Combat bookkeeping owned by a player's session entity.
#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerCombatState {
    pub health: f32,
    pub max_health: f32,
    pub money: f32,
    pub score: u64,
    pub kills: u32,
    pub headshots: u32,
    pub revives: u32,
    pub downs: u32,
    pub downed: bool,
    pub combo_level: u32,
    pub combo_kill_count: u32,
    pub last_kill_ms: Option<u64>,
    pub last_damage_ms: Option<u64>,
}

impl PlayerCombatState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            money: config.starting_money,
            score: 0,
            kills: 0,
            headshots: 0,
            revives: 0,
            downs: 0,
            downed: false,
            combo_level: 0,
            combo_kill_count: 0,
            last_kill_ms: None,
            last_damage_ms: None,
        }
    }

    /// Applies incoming damage. Returns true when this hit put the player down.
    pub fn take_damage(&mut self, amount: f32, now_ms: u64) -> bool {
        if self.downed || amount <= 0.0 {
            return false;
        }

        self.health = (self.health - amount).max(0.0);
        self.last_damage_ms = Some(now_ms);

        if self.health <= 0.0 {
            self.downed = true;
            self.downs += 1;
            self.combo_level = 0;
            self.combo_kill_count = 0;
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: f32) {
        if self.downed {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Passive regeneration once the player has not been hit for a while.
    pub fn regenerate(&mut self, dt_ms: f32, now_ms: u64, config: &PlayerConfig) {
        if self.downed || self.health >= self.max_health {
            return;
        }
        let quiet = self
            .last_damage_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= config.regen_delay_ms);
        if quiet {
            self.heal(config.regen_per_second * dt_ms / 1000.0);
        }
    }

    pub fn add_money(&mut self, amount: f32) {
        self.money += amount.max(0.0);
    }

    /// Deducts `cost` if affordable.
    pub fn spend(&mut self, cost: f32) -> bool {
        if self.money + f32::EPSILON < cost {
            return false;
        }
        self.money = (self.money - cost).max(0.0);
        true
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += u64::from(points);
    }

    /// Counts a kill and extends or restarts the kill streak. Returns the
    /// streak length after this kill.
    pub fn register_kill(&mut self, headshot: bool, now_ms: u64, window_ms: u64) -> u32 {
        self.kills += 1;
        if headshot {
            self.headshots += 1;
        }

        let in_streak = self
            .last_kill_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= window_ms);
        self.combo_kill_count = if in_streak { self.combo_kill_count + 1 } else { 1 };
        self.last_kill_ms = Some(now_ms);
        self.combo_kill_count
    }

    /// Back to a fresh session: used by the game-over respawn.
    pub fn reset_for_respawn(&mut self, config: &PlayerConfig) {
        *self = Self::new(config);
    }
}
