use std::time::Duration;

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use utils::{
    frame::{increase_tick_system, TickCount},
    net_id::{NetId, NetIdFactory},
};

use crate::{
    audio::{audio_pool_system, AudioPool, PlaySound, SoundStarted},
    character::{
        enemy::ai::{
            systems::{
                enemy_attack_system, enemy_brain_system, pathfind_finished_system,
                PathfindFinished, PathfindRequest,
            },
            EnemyBrain,
        },
        health::{apply_hit_reports_system, damage_flash_system, EnemyKilled, HitReport},
        player::{
            create::{player_join_system, player_leave_system},
            systems::{announce_downed_system, player_regen_system, revive_system},
            Player, PlayerDownedChanged, PlayerJoined, PlayerLeft, ReviveRequest,
        },
        Facing, WorldPosition,
    },
    config::GameTunables,
    effects::{death_effects_system, DeathEffects, ParticleSpawned},
    feedback::systems::score_hits_system,
    score::{HitEvent, ScoreManager},
    shop::{purchase_system, PurchaseRequest},
    system_set::GameSystemSet,
    ui::{
        scoreboard::push_scoreboard_system,
        status::{push_ammo_system, push_status_system},
        ChatLine, ScoreboardTimer, UiPush,
    },
    waves::WaveDirectorPlugin,
    weapons::systems::{
        gun_fire_system, gun_reload_system, RaycastRequest, ReloadInput, TriggerInput,
    },
};

/// Identity of this server build, logged at startup and handed to clients
/// so they can tell which balance they are playing against.
#[derive(Debug, Clone, Resource)]
pub struct GameInfo {
    pub version: String,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Game time in milliseconds, accumulated from `Time` deltas. All
/// timestamps stored on players, guns and combos use this clock.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GameClock {
    elapsed: Duration,
}

impl GameClock {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }
}

pub fn advance_clock_system(time: Res<Time>, mut clock: ResMut<GameClock>) {
    clock.advance(time.delta());
}

/// The single random stream of a game world.
#[derive(Resource, Debug)]
pub struct SessionRng(pub StdRng);

impl SessionRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// Core plugin for the horde server.
// Wires every gameplay resource, message and system; the host adds its own
// transport, physics and pathfinding on top.
pub struct HordeGamePlugin {
    pub tunables: GameTunables,
    pub seed: u64,
}

impl Default for HordeGamePlugin {
    fn default() -> Self {
        Self {
            tunables: GameTunables::default(),
            seed: 0,
        }
    }
}

impl Plugin for HordeGamePlugin {
    fn build(&self, app: &mut App) {
        let tunables = self.tunables.clone();

        app.add_plugins(WaveDirectorPlugin {
            config: tunables.waves.clone(),
        });

        app.init_resource::<GameInfo>()
            .init_resource::<GameClock>()
            .init_resource::<TickCount>()
            .init_resource::<NetIdFactory>()
            .init_resource::<ScoreboardTimer>()
            .insert_resource(SessionRng::seeded(self.seed))
            .insert_resource(ScoreManager::new(tunables.score.clone()))
            .insert_resource(AudioPool::new(tunables.audio.clone()))
            .insert_resource(DeathEffects::new(tunables.particles.clone()))
            .insert_resource(tunables);

        app.register_type::<Player>()
            .register_type::<WorldPosition>()
            .register_type::<Facing>()
            .register_type::<NetId>()
            .register_type::<EnemyBrain>();

        app.add_message::<PlayerJoined>()
            .add_message::<PlayerLeft>()
            .add_message::<PlayerDownedChanged>()
            .add_message::<ReviveRequest>()
            .add_message::<PurchaseRequest>()
            .add_message::<TriggerInput>()
            .add_message::<ReloadInput>()
            .add_message::<RaycastRequest>()
            .add_message::<HitReport>()
            .add_message::<HitEvent>()
            .add_message::<EnemyKilled>()
            .add_message::<PathfindRequest>()
            .add_message::<PathfindFinished>()
            .add_message::<PlaySound>()
            .add_message::<SoundStarted>()
            .add_message::<ParticleSpawned>()
            .add_message::<UiPush>()
            .add_message::<ChatLine>();

        app.configure_sets(
            Update,
            (
                GameSystemSet::Clock,
                GameSystemSet::Lobby,
                GameSystemSet::Input,
                GameSystemSet::Combat,
                GameSystemSet::Director,
                GameSystemSet::EnemyAi,
                GameSystemSet::Presentation,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (increase_tick_system, advance_clock_system).in_set(GameSystemSet::Clock),
        );
        app.add_systems(
            Update,
            (player_join_system, player_leave_system)
                .chain()
                .in_set(GameSystemSet::Lobby),
        );
        app.add_systems(
            Update,
            (
                gun_reload_system,
                gun_fire_system,
                revive_system,
                purchase_system,
            )
                .chain()
                .in_set(GameSystemSet::Input),
        );
        app.add_systems(
            Update,
            (
                apply_hit_reports_system,
                enemy_attack_system,
                player_regen_system,
                damage_flash_system,
            )
                .chain()
                .in_set(GameSystemSet::Combat),
        );
        app.add_systems(
            Update,
            (pathfind_finished_system, enemy_brain_system)
                .chain()
                .in_set(GameSystemSet::EnemyAi),
        );
        app.add_systems(
            Update,
            (
                score_hits_system,
                announce_downed_system,
                death_effects_system,
                audio_pool_system,
                push_status_system,
                push_ammo_system,
                push_scoreboard_system,
            )
                .chain()
                .in_set(GameSystemSet::Presentation),
        );

        let info = app.world().resource::<GameInfo>();
        info!("core{{plugin version={} seed={}}}", info.version, self.seed);
    }
}
