//! Every gameplay tunable in one place.
//!
//! Defaults are the shipped balance. A RON file can override any subset:
//!
//! ```ron
//! (
//!     waves: (countdown_secs: 20, wave_interval_ms: 45000),
//!     score: (combo_timeout_ms: 2500),
//! )
//! ```

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    audio::AudioPoolConfig,
    character::{enemy::EnemyConfig, player::PlayerConfig},
    effects::ParticlePoolConfig,
    feedback::FeedbackConfig,
    score::ScoreConfig,
    shop::ShopCatalogue,
    waves::config::WaveConfig,
    weapons::GunConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTunables {
    pub waves: WaveConfig,
    pub enemy: EnemyConfig,
    pub score: ScoreConfig,
    pub feedback: FeedbackConfig,
    pub audio: AudioPoolConfig,
    pub particles: ParticlePoolConfig,
    pub player: PlayerConfig,
    pub starting_gun: GunConfig,
    pub shop: ShopCatalogue,
}

impl Default for GameTunables {
    fn default() -> Self {
        Self {
            waves: WaveConfig::default(),
            enemy: EnemyConfig::default(),
            score: ScoreConfig::default(),
            feedback: FeedbackConfig::default(),
            audio: AudioPoolConfig::default(),
            particles: ParticlePoolConfig::default(),
            player: PlayerConfig::default(),
            starting_gun: GunConfig::pistol(),
            shop: ShopCatalogue::default(),
        }
    }
}

impl GameTunables {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let tunables: Self = ron::from_str(source)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tunables = Self::from_ron_str(&source)?;
        info!("config{{loaded path={}}}", path.display());
        Ok(tunables)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.waves.validate()?;

        if self.score.max_combo_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "max combo multiplier {} is below 1.0",
                self.score.max_combo_multiplier
            )));
        }
        if self.feedback.color_tiers.is_empty() {
            return Err(ConfigError::Invalid("feedback needs at least one color tier".into()));
        }
        if self
            .feedback
            .color_tiers
            .windows(2)
            .any(|pair| pair[0].threshold >= pair[1].threshold)
        {
            return Err(ConfigError::Invalid(
                "feedback color tiers must have increasing thresholds".into(),
            ));
        }
        if self.audio.max_concurrent == 0 {
            return Err(ConfigError::Invalid("audio.max_concurrent must be positive".into()));
        }
        if self.particles.max_active == 0 || self.particles.max_pool < self.particles.initial_pool
        {
            return Err(ConfigError::Invalid(
                "particles need a positive max_active and max_pool >= initial_pool".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.player.revive_health_fraction) {
            return Err(ConfigError::Invalid(
                "player.revive_health_fraction must be within 0..=1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameTunables::default().validate().is_ok());
    }

    #[test]
    fn partial_ron_overrides_keep_other_defaults() {
        let tunables = GameTunables::from_ron_str(
            "(waves: (countdown_secs: 20), score: (combo_timeout_ms: 2500))",
        )
        .unwrap();
        assert_eq!(tunables.waves.countdown_secs, 20);
        assert_eq!(tunables.waves.wave_interval_ms, 30_000);
        assert_eq!(tunables.score.combo_timeout_ms, 2_500);
        assert_eq!(tunables.starting_gun.id, "pistol");
    }

    #[test]
    fn parse_and_validation_errors_are_reported() {
        assert!(matches!(
            GameTunables::from_ron_str("(waves: (countdown_secs: \"soon\"))"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameTunables::from_ron_str(
                "(waves: (fastest_spawn_interval_ms: 9000, slowest_spawn_interval_ms: 1000))"
            ),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn shipped_sample_parses() {
        let tunables =
            GameTunables::from_ron_str(include_str!("../../../assets/tunables.ron")).unwrap();
        assert_eq!(tunables.waves.countdown_secs, 15);
        assert_eq!(tunables.player.starting_money, 250.0);
        assert_eq!(tunables.shop.barriers.len(), 2);
        assert_eq!(tunables.shop.wall_weapons[0].gun.id, "shotgun");
        assert_eq!(tunables.enemy, EnemyConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            GameTunables::load("/definitely/not/here.ron"),
            Err(ConfigError::Io { .. })
        ));
    }
}
