//! Wave director: countdown, timed spawning, escalating waves, bosses and
//! the game-over cycle.
//!
//! # Flow
//!
//! ```text
//! Countdown ──> Active (wave 1, 2, ...) ──> GameOver ──(settle)──> Countdown
//! ```
//!
//! Spawning runs on its own timer whose interval shrinks as waves advance;
//! a new wave only raises the stats of what spawns next and briefly delays
//! the next spawn. Scaling is configured through `WaveConfig`.

pub mod config;
pub mod director;
pub mod state;
pub mod systems;

use bevy::prelude::*;

use crate::system_set::GameSystemSet;

pub use config::{BossConfig, EnemyStats, ScalingRegime, WaveConfig};
pub use director::{Arena, DirectorAction, PlayerSnapshot, SpawnPoint, WaveDirector};
pub use state::{DirectorPhase, WaveState};
pub use systems::{EndGameRequest, LoadArena, UnloadArena};

/// Installs the director resource and its systems. Expects `GameTunables`
/// and `SessionRng` to be present.
pub struct WaveDirectorPlugin {
    pub config: WaveConfig,
}

impl Plugin for WaveDirectorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(WaveDirector::new(self.config.clone()));
        app.register_type::<DirectorPhase>();

        app.add_message::<LoadArena>()
            .add_message::<UnloadArena>()
            .add_message::<EndGameRequest>();

        app.add_systems(
            Update,
            (
                systems::arena_lifecycle_system,
                systems::watch_downed_system,
                systems::director_system,
            )
                .chain()
                .in_set(GameSystemSet::Director),
        );
    }
}
