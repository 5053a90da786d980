//! Wave pacing and enemy stat scaling.
//!
//! Stats grow multiplicatively from wave to wave. The per-wave growth factor
//! depends on which `ScalingRegime` the wave falls in, so early waves ramp
//! gently and late waves ramp hard. Player count on top of a baseline adds
//! linear multipliers on health, reward and spawn rate.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Growth factors applied for every wave up to and including `until_wave`.
/// The last regime is open ended (`until_wave: None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRegime {
    pub until_wave: Option<u32>,
    pub health_growth: f32,
    pub reward_growth: f32,
    /// Per-wave multiplier on the spawn interval, below 1.0.
    pub interval_decay: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub reward: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub every_waves: u32,
    pub base_health: f32,
    pub health_growth: f32,
    pub base_damage: f32,
    pub damage_growth: f32,
    pub base_reward: f32,
    pub reward_growth: f32,
    pub speed: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            every_waves: 5,
            base_health: 300.0,
            health_growth: 1.6,
            base_damage: 25.0,
            damage_growth: 1.3,
            base_reward: 250.0,
            reward_growth: 1.5,
            speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub countdown_secs: u32,
    pub wave_interval_ms: u64,
    /// Extra delay injected once into the spawn loop when a wave starts.
    pub wave_delay_ms: u64,
    pub slowest_spawn_interval_ms: u64,
    pub fastest_spawn_interval_ms: u64,

    pub base_health: f32,
    pub base_damage: f32,
    /// Linear damage increase per wave after the first.
    pub damage_per_wave: f32,
    pub base_speed: f32,
    pub speed_per_wave: f32,
    pub max_speed: f32,
    pub base_reward: f32,

    pub regimes: Vec<ScalingRegime>,

    /// Player count the base numbers are tuned for.
    pub baseline_players: u32,
    pub health_per_extra_player: f32,
    pub reward_per_extra_player: f32,
    pub spawn_rate_per_extra_player: f32,

    pub boss: BossConfig,

    pub end_game_debounce_ms: u64,
    pub game_over_settle_ms: u64,
    /// Area unlocked when a game starts.
    pub starting_area: String,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 45,
            wave_interval_ms: 30_000,
            wave_delay_ms: 10_000,
            slowest_spawn_interval_ms: 4_000,
            fastest_spawn_interval_ms: 750,

            base_health: 7.0,
            base_damage: 10.0,
            damage_per_wave: 0.04,
            base_speed: 2.0,
            speed_per_wave: 0.25,
            max_speed: 6.0,
            base_reward: 20.0,

            regimes: vec![
                ScalingRegime {
                    until_wave: Some(4),
                    health_growth: 1.12,
                    reward_growth: 1.05,
                    interval_decay: 0.88,
                },
                ScalingRegime {
                    until_wave: Some(15),
                    health_growth: 1.18,
                    reward_growth: 1.08,
                    interval_decay: 0.93,
                },
                ScalingRegime {
                    until_wave: None,
                    health_growth: 1.25,
                    reward_growth: 1.10,
                    interval_decay: 0.97,
                },
            ],

            baseline_players: 1,
            health_per_extra_player: 0.35,
            reward_per_extra_player: 0.2,
            spawn_rate_per_extra_player: 0.25,

            boss: BossConfig::default(),

            end_game_debounce_ms: 1_000,
            game_over_settle_ms: 5_000,
            starting_area: "start".into(),
        }
    }
}

impl WaveConfig {
    /// Product of `factor(regime)` over waves `2..=wave`.
    fn growth_product(&self, wave: u32, factor: impl Fn(&ScalingRegime) -> f32) -> f32 {
        let mut product = 1.0;
        let mut first = 2;
        for regime in &self.regimes {
            if first > wave {
                break;
            }
            let last = regime.until_wave.map_or(wave, |until| until.min(wave));
            if last >= first {
                product *= factor(regime).powi((last - first + 1) as i32);
                first = last + 1;
            }
        }
        product
    }

    pub fn extra_players(&self, players: u32) -> f32 {
        players.saturating_sub(self.baseline_players) as f32
    }

    pub fn enemy_stats(&self, wave: u32, players: u32) -> EnemyStats {
        let wave = wave.max(1);
        let extra = self.extra_players(players);
        let waves_past_first = (wave - 1) as f32;

        EnemyStats {
            health: self.base_health
                * self.growth_product(wave, |r| r.health_growth)
                * (1.0 + extra * self.health_per_extra_player),
            damage: self.base_damage * (1.0 + waves_past_first * self.damage_per_wave),
            speed: (self.base_speed + waves_past_first * self.speed_per_wave).min(self.max_speed),
            reward: self.base_reward
                * self.growth_product(wave, |r| r.reward_growth)
                * (1.0 + extra * self.reward_per_extra_player),
        }
    }

    pub fn spawn_interval_ms(&self, wave: u32, players: u32) -> u64 {
        let decay = self.growth_product(wave.max(1), |r| r.interval_decay);
        let rate = 1.0 + self.extra_players(players) * self.spawn_rate_per_extra_player;
        let scaled = (self.slowest_spawn_interval_ms as f32 * decay / rate).round() as u64;
        scaled.max(self.fastest_spawn_interval_ms)
    }

    /// Delay until the next spawn, including any delay carried over from a
    /// wave start.
    pub fn next_spawn_delay_ms(&self, wave: u32, players: u32, carried_delay_ms: u64) -> u64 {
        self.spawn_interval_ms(wave, players) + carried_delay_ms
    }

    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.boss.every_waves > 0 && wave > 0 && wave % self.boss.every_waves == 0
    }

    pub fn boss_stats(&self, wave: u32) -> EnemyStats {
        let boss = &self.boss;
        let count = (wave / boss.every_waves.max(1)).max(1);
        let exponent = (count - 1) as i32;
        EnemyStats {
            health: boss.base_health * boss.health_growth.powi(exponent),
            damage: boss.base_damage * boss.damage_growth.powi(exponent),
            speed: boss.speed,
            reward: boss.base_reward * boss.reward_growth.powi(exponent),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(reason)) };

        if self.fastest_spawn_interval_ms > self.slowest_spawn_interval_ms {
            return invalid(format!(
                "fastest spawn interval {}ms is slower than the slowest {}ms",
                self.fastest_spawn_interval_ms, self.slowest_spawn_interval_ms
            ));
        }
        if self.regimes.is_empty() {
            return invalid("at least one scaling regime is required".into());
        }

        let mut previous = 0;
        for (index, regime) in self.regimes.iter().enumerate() {
            let is_last = index + 1 == self.regimes.len();
            match regime.until_wave {
                Some(until) if until <= previous => {
                    return invalid(format!(
                        "regime {index} ends at wave {until}, not after wave {previous}"
                    ));
                }
                Some(until) if is_last => {
                    return invalid(format!("last regime must be open ended, not stop at {until}"));
                }
                Some(until) => previous = until,
                None if !is_last => {
                    return invalid(format!("regime {index} is open ended but is not the last"));
                }
                None => {}
            }
            if !(regime.interval_decay > 0.0 && regime.interval_decay <= 1.0) {
                return invalid(format!(
                    "regime {index} interval decay {} must be in (0, 1]",
                    regime.interval_decay
                ));
            }
            if regime.health_growth <= 0.0 || regime.reward_growth <= 0.0 {
                return invalid(format!("regime {index} growth factors must be positive"));
            }
        }

        if self.boss.every_waves == 0 {
            return invalid("boss.every_waves must be at least 1".into());
        }
        Ok(())
    }
}
