//! Hit scoring and per-player combo tracking.
//!
//! `calculate_score` updates the hitting player's combo first, then prices
//! the hit with the updated combo:
//!
//! ```text
//! score = round(base * (1 + distance + speed + headshot) * combo_multiplier)
//! ```

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::character::player::PlayerId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub points_per_damage: f32,
    pub kill_bonus: f32,
    pub distance_bonus_per_unit: f32,
    pub max_distance_bonus: f32,
    pub speed_bonus_per_unit: f32,
    pub max_speed_bonus: f32,
    pub headshot_multiplier: f32,
    pub combo_timeout_ms: u64,
    /// Window for rapid consecutive hits. Tracked for stats only.
    pub multi_hit_timeout_ms: u64,
    pub combo_step: f32,
    pub max_combo_multiplier: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            points_per_damage: 1.0,
            kill_bonus: 50.0,
            distance_bonus_per_unit: 0.02,
            max_distance_bonus: 0.5,
            speed_bonus_per_unit: 0.05,
            max_speed_bonus: 0.5,
            headshot_multiplier: 1.5,
            combo_timeout_ms: 2_000,
            multi_hit_timeout_ms: 500,
            combo_step: 0.1,
            max_combo_multiplier: 2.0,
        }
    }
}

/// One successful raycast hit, produced by the combat layer and consumed by
/// scoring in the same tick.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct HitEvent {
    pub player: PlayerId,
    /// Damage after multipliers.
    pub damage: f32,
    pub distance: f32,
    pub target_speed: f32,
    pub headshot: bool,
    pub kill: bool,
    pub hit_position: Vec3,
    /// Where the target spawned, for distance-relative presentation.
    pub spawn_origin: Option<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComboRecord {
    pub combo: u32,
    pub last_hit_ms: Option<u64>,
    pub multi_hit_count: u32,
    pub last_multi_hit_ms: Option<u64>,
    pub total_damage: f32,
    pub highest_combo: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub score: u32,
    pub combo: u32,
    pub multiplier: f32,
    pub multi_hit: u32,
}

pub fn combo_multiplier(combo: u32, step: f32, cap: f32) -> f32 {
    let extra = combo.saturating_sub(1) as f32;
    (1.0 + extra * step).min(cap)
}

fn within(last: Option<u64>, now_ms: u64, window_ms: u64) -> bool {
    last.is_some_and(|last| now_ms.saturating_sub(last) <= window_ms)
}

#[derive(Resource, Debug, Default)]
pub struct ScoreManager {
    config: ScoreConfig,
    records: HashMap<PlayerId, ComboRecord>,
}

impl ScoreManager {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn record(&self, player: PlayerId) -> Option<&ComboRecord> {
        self.records.get(&player)
    }

    pub fn tracked_players(&self) -> usize {
        self.records.len()
    }

    pub fn calculate_score(&mut self, hit: &HitEvent, now_ms: u64) -> ScoreResult {
        let config = &self.config;
        let record = self.records.entry(hit.player).or_default();

        record.combo = if within(record.last_hit_ms, now_ms, config.combo_timeout_ms) {
            record.combo + 1
        } else {
            1
        };
        record.last_hit_ms = Some(now_ms);

        record.multi_hit_count =
            if within(record.last_multi_hit_ms, now_ms, config.multi_hit_timeout_ms) {
                record.multi_hit_count + 1
            } else {
                1
            };
        record.last_multi_hit_ms = Some(now_ms);

        record.total_damage += hit.damage;
        record.highest_combo = record.highest_combo.max(record.combo);

        let base = hit.damage * config.points_per_damage
            + if hit.kill { config.kill_bonus } else { 0.0 };
        let distance_bonus = (hit.distance * config.distance_bonus_per_unit).min(config.max_distance_bonus);
        let speed_bonus = (hit.target_speed * config.speed_bonus_per_unit).min(config.max_speed_bonus);
        let headshot_bonus = if hit.headshot {
            config.headshot_multiplier - 1.0
        } else {
            0.0
        };
        let multiplier =
            combo_multiplier(record.combo, config.combo_step, config.max_combo_multiplier);

        let score = (base * (1.0 + distance_bonus + speed_bonus + headshot_bonus) * multiplier)
            .round()
            .max(0.0) as u32;

        ScoreResult {
            score,
            combo: record.combo,
            multiplier,
            multi_hit: record.multi_hit_count,
        }
    }

    /// Called once a kill has been shown to the player. The next hit starts a
    /// fresh combo.
    pub fn reset_combo(&mut self, player: PlayerId) {
        if let Some(record) = self.records.get_mut(&player) {
            record.combo = 0;
            record.last_hit_ms = None;
        }
    }

    /// Drops a departed player's record.
    pub fn forget(&mut self, player: PlayerId) {
        self.records.remove(&player);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
