//! Authoritative game state machine.
//!
//! ```text
//! Countdown ──(reaches 0)──> Active ──(everyone down)──> GameOver
//!     ^                                                      │
//!     └───────────────────(settle delay)─────────────────────┘
//! ```
//!
//! The director owns no entities. Each `advance` call moves its timers
//! forward and returns the `DirectorAction`s the ECS side has to carry out,
//! in the order the timers fired.

use std::time::Duration;

use bevy::prelude::*;
use rand::{seq::SliceRandom, Rng};

use crate::character::enemy::EnemyKind;
use crate::character::player::PlayerId;
use crate::schedule::{Scheduler, TimerId};
use crate::ui::{ChatColor, UiMessage};

use super::config::{EnemyStats, WaveConfig};
use super::state::{DirectorPhase, WaveState};

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub area_id: String,
}

/// The loaded world the director spawns into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arena {
    pub spawn_points: Vec<SpawnPoint>,
    pub player_spawn: Vec3,
}

/// What the director needs to know about a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub downed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectorTimer {
    CountdownTick,
    Spawn,
    Wave,
    EndGameCheck,
    Respawn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectorAction {
    Announce { text: String, color: ChatColor },
    PushAll(UiMessage),
    PushScoreboard { wave: u32 },
    SpawnEnemy {
        kind: EnemyKind,
        stats: EnemyStats,
        position: Vec3,
    },
    KillAllEnemies,
    DespawnPlayers,
    RespawnPlayers { position: Vec3 },
}

#[derive(Resource, Debug)]
pub struct WaveDirector {
    config: WaveConfig,
    state: WaveState,
    phase: DirectorPhase,
    arena: Option<Arena>,
    countdown_remaining: u32,

    timers: Scheduler<DirectorTimer>,
    countdown_timer: Option<TimerId>,
    spawn_timer: Option<TimerId>,
    wave_timer: Option<TimerId>,
    end_check_timer: Option<TimerId>,
    respawn_timer: Option<TimerId>,
    /// Players were despawned by a game over whose respawn never fired.
    respawn_owed: bool,

    actions: Vec<DirectorAction>,
}

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

impl WaveDirector {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            state: WaveState::new(&config.starting_area),
            countdown_remaining: config.countdown_secs,
            config,
            phase: DirectorPhase::Countdown,
            arena: None,
            timers: Scheduler::new(),
            countdown_timer: None,
            spawn_timer: None,
            wave_timer: None,
            end_check_timer: None,
            respawn_timer: None,
            respawn_owed: false,
            actions: Vec::new(),
        }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn state(&self) -> &WaveState {
        &self.state
    }

    pub fn phase(&self) -> DirectorPhase {
        self.phase
    }

    pub fn arena(&self) -> Option<&Arena> {
        self.arena.as_ref()
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn end_check_pending(&self) -> bool {
        self.end_check_timer.is_some()
    }

    /// Installs the world and starts a fresh countdown. Players still waiting
    /// on a game-over respawn are brought back into the new world; the
    /// action is returned by the next `advance`.
    pub fn load_arena(&mut self, arena: Arena) {
        info!(
            "director{{load_arena spawn_points={}}}",
            arena.spawn_points.len()
        );
        let respawn = self.respawn_owed || self.phase == DirectorPhase::GameOver;
        self.cancel_all_timers();
        if respawn {
            self.respawn_owed = false;
            self.actions.push(DirectorAction::RespawnPlayers {
                position: arena.player_spawn,
            });
        }
        self.arena = Some(arena);
        self.state.reset(&self.config.starting_area);
        self.enter_countdown();
    }

    pub fn unload_arena(&mut self) {
        info!("director{{unload_arena}}");
        if self.phase == DirectorPhase::GameOver {
            self.respawn_owed = true;
        }
        self.cancel_all_timers();
        self.arena = None;
        self.state.reset(&self.config.starting_area);
        self.phase = DirectorPhase::Countdown;
        self.countdown_remaining = self.config.countdown_secs;
    }

    /// Area unlocks come from purchases. Returns false if already unlocked.
    pub fn unlock_area(&mut self, area_id: &str) -> bool {
        self.state.unlock_area(area_id)
    }

    /// A player went down or came back. Schedules one end-game check unless
    /// one is already pending. Returns whether a check was scheduled.
    pub fn notify_downed_changed(&mut self) -> bool {
        if self.phase != DirectorPhase::Active || self.end_check_timer.is_some() {
            return false;
        }
        let delay = Duration::from_millis(self.config.end_game_debounce_ms);
        self.timers
            .rearm(&mut self.end_check_timer, delay, DirectorTimer::EndGameCheck);
        true
    }

    /// Runs every timer that came due during `dt`, in firing order.
    pub fn advance(
        &mut self,
        dt: Duration,
        players: &[PlayerSnapshot],
        rng: &mut impl Rng,
    ) -> Vec<DirectorAction> {
        self.timers.advance(dt);
        while let Some((id, timer)) = self.timers.pop_due() {
            self.release_slot(id, timer);
            match timer {
                DirectorTimer::CountdownTick => self.on_countdown_tick(players, rng),
                DirectorTimer::Spawn => self.on_spawn(players, rng),
                DirectorTimer::Wave => self.on_wave(rng),
                DirectorTimer::EndGameCheck => self.on_end_game_check(players),
                DirectorTimer::Respawn => self.on_respawn(),
            }
        }
        std::mem::take(&mut self.actions)
    }

    /// Ends the running game. A no-op outside the active phase.
    pub fn end_game(&mut self) -> Vec<DirectorAction> {
        self.end_game_inner();
        std::mem::take(&mut self.actions)
    }

    fn release_slot(&mut self, id: TimerId, timer: DirectorTimer) {
        let slot = match timer {
            DirectorTimer::CountdownTick => &mut self.countdown_timer,
            DirectorTimer::Spawn => &mut self.spawn_timer,
            DirectorTimer::Wave => &mut self.wave_timer,
            DirectorTimer::EndGameCheck => &mut self.end_check_timer,
            DirectorTimer::Respawn => &mut self.respawn_timer,
        };
        if *slot == Some(id) {
            *slot = None;
        }
    }

    fn cancel_all_timers(&mut self) {
        self.timers.clear();
        self.countdown_timer = None;
        self.spawn_timer = None;
        self.wave_timer = None;
        self.end_check_timer = None;
        self.respawn_timer = None;
    }

    fn announce(&mut self, text: impl Into<String>, color: ChatColor) {
        self.actions.push(DirectorAction::Announce {
            text: text.into(),
            color,
        });
    }

    fn enter_countdown(&mut self) {
        self.phase = DirectorPhase::Countdown;
        self.countdown_remaining = self.config.countdown_secs;
        self.timers
            .rearm(&mut self.countdown_timer, COUNTDOWN_TICK, DirectorTimer::CountdownTick);
    }

    fn on_countdown_tick(&mut self, players: &[PlayerSnapshot], rng: &mut impl Rng) {
        if self.arena.is_none() || self.phase != DirectorPhase::Countdown {
            return;
        }

        if players.is_empty() {
            // Paused until someone connects.
            self.timers
                .rearm(&mut self.countdown_timer, COUNTDOWN_TICK, DirectorTimer::CountdownTick);
            return;
        }

        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        let seconds = self.countdown_remaining;
        self.actions.push(DirectorAction::PushAll(UiMessage::Countdown { seconds }));

        if seconds == 0 {
            self.start_game(players.len() as u32, rng);
            return;
        }

        if seconds % 10 == 0 || seconds <= 5 {
            let unit = if seconds == 1 { "second" } else { "seconds" };
            self.announce(format!("Game starts in {seconds} {unit}"), ChatColor::Announcement);
        }
        self.timers
            .rearm(&mut self.countdown_timer, COUNTDOWN_TICK, DirectorTimer::CountdownTick);
    }

    fn start_game(&mut self, players: u32, rng: &mut impl Rng) {
        info!("director{{start_game players={}}}", players);
        self.phase = DirectorPhase::Active;
        self.state.is_started = true;
        self.state.wave_number = 0;
        self.timers.cancel_slot(&mut self.countdown_timer);

        self.announce("The horde is coming. Survive!", ChatColor::Warning);
        self.actions.push(DirectorAction::PushAll(UiMessage::GameStart));

        self.on_wave(rng);
        // The first wave starts spawning right away.
        self.state.wave_delay_ms = 0;
        self.timers
            .rearm(&mut self.spawn_timer, Duration::ZERO, DirectorTimer::Spawn);
    }

    fn on_wave(&mut self, rng: &mut impl Rng) {
        if self.arena.is_none() || self.phase != DirectorPhase::Active {
            return;
        }

        self.state.wave_number += 1;
        self.state.wave_delay_ms = self.config.wave_delay_ms;
        let wave = self.state.wave_number;
        let boss = self.config.is_boss_wave(wave);
        info!("director{{wave n={} boss={}}}", wave, boss);

        self.announce(format!("Wave {wave} has begun"), ChatColor::Announcement);
        self.actions.push(DirectorAction::PushAll(UiMessage::Wave { wave }));

        if boss {
            match self.pick_spawn_point(rng) {
                Some(SpawnPoint { position, .. }) => {
                    self.announce("A boss has appeared!", ChatColor::Error);
                    self.actions.push(DirectorAction::SpawnEnemy {
                        kind: EnemyKind::Boss,
                        stats: self.config.boss_stats(wave),
                        position,
                    });
                }
                None => warn!("director{{wave n={} boss skipped no_spawn_point}}", wave),
            }
        }

        let interval = Duration::from_millis(self.config.wave_interval_ms);
        self.timers
            .rearm(&mut self.wave_timer, interval, DirectorTimer::Wave);
    }

    fn on_spawn(&mut self, players: &[PlayerSnapshot], rng: &mut impl Rng) {
        if self.arena.is_none() || self.phase != DirectorPhase::Active {
            return;
        }

        let wave = self.state.wave_number;
        let player_count = players.len() as u32;

        match self.pick_spawn_point(rng) {
            Some(point) => {
                let stats = self.config.enemy_stats(wave, player_count);
                debug!(
                    "director{{spawn wave={} area={} health={:.1}}}",
                    wave, point.area_id, stats.health
                );
                self.actions.push(DirectorAction::SpawnEnemy {
                    kind: EnemyKind::Zombie,
                    stats,
                    position: point.position,
                });
            }
            None => warn!("director{{spawn wave={} no_unlocked_spawn_point}}", wave),
        }

        let carried = self.state.take_wave_delay();
        let delay = self.config.next_spawn_delay_ms(wave, player_count, carried);
        self.timers.rearm(
            &mut self.spawn_timer,
            Duration::from_millis(delay),
            DirectorTimer::Spawn,
        );
    }

    /// Uniform pick among the spawn points of unlocked areas.
    fn pick_spawn_point(&self, rng: &mut impl Rng) -> Option<SpawnPoint> {
        let arena = self.arena.as_ref()?;
        let candidates: Vec<&SpawnPoint> = arena
            .spawn_points
            .iter()
            .filter(|point| self.state.is_unlocked(&point.area_id))
            .collect();
        candidates.choose(rng).map(|point| (*point).clone())
    }

    fn on_end_game_check(&mut self, players: &[PlayerSnapshot]) {
        if self.arena.is_none() || self.phase != DirectorPhase::Active {
            return;
        }
        let everyone_down = players.iter().all(|player| player.downed);
        debug!(
            "director{{end_check players={} everyone_down={}}}",
            players.len(),
            everyone_down
        );
        if everyone_down {
            self.end_game_inner();
        }
    }

    fn end_game_inner(&mut self) {
        if self.phase != DirectorPhase::Active {
            return;
        }

        let wave = self.state.wave_number;
        info!("director{{end_game wave={}}}", wave);
        self.cancel_all_timers();

        self.announce(
            format!("Game over! The horde overran you on wave {wave}"),
            ChatColor::Error,
        );
        self.actions.push(DirectorAction::PushAll(UiMessage::GameOver { wave }));
        self.actions.push(DirectorAction::PushScoreboard { wave });
        self.actions.push(DirectorAction::KillAllEnemies);
        self.actions.push(DirectorAction::DespawnPlayers);

        self.state.reset(&self.config.starting_area);
        self.phase = DirectorPhase::GameOver;
        let settle = Duration::from_millis(self.config.game_over_settle_ms);
        self.timers
            .rearm(&mut self.respawn_timer, settle, DirectorTimer::Respawn);
    }

    fn on_respawn(&mut self) {
        let Some(arena) = self.arena.as_ref() else {
            return;
        };
        if self.phase != DirectorPhase::GameOver {
            return;
        }
        self.actions.push(DirectorAction::RespawnPlayers {
            position: arena.player_spawn,
        });
        self.enter_countdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waves::config::BossConfig;
    use rand::{rngs::StdRng, SeedableRng};

    fn arena() -> Arena {
        Arena {
            spawn_points: vec![
                SpawnPoint {
                    position: Vec3::new(10.0, 0.0, 0.0),
                    area_id: "start".into(),
                },
                SpawnPoint {
                    position: Vec3::new(-10.0, 0.0, 0.0),
                    area_id: "start".into(),
                },
                SpawnPoint {
                    position: Vec3::new(0.0, 0.0, 50.0),
                    area_id: "cellar".into(),
                },
            ],
            player_spawn: Vec3::Y,
        }
    }

    fn config() -> WaveConfig {
        WaveConfig {
            countdown_secs: 3,
            ..default()
        }
    }

    fn player(id: u64, downed: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId(id),
            downed,
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn spawns(actions: &[DirectorAction]) -> Vec<(EnemyKind, Vec3)> {
        actions
            .iter()
            .filter_map(|a| match a {
                DirectorAction::SpawnEnemy { kind, position, .. } => Some((*kind, *position)),
                _ => None,
            })
            .collect()
    }

    fn started_director(rng: &mut StdRng) -> WaveDirector {
        let mut director = WaveDirector::new(config());
        director.load_arena(arena());
        director.advance(secs(3), &[player(1, false)], rng);
        assert_eq!(director.phase(), DirectorPhase::Active);
        director
    }

    #[test]
    fn countdown_pauses_without_players() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut director = WaveDirector::new(config());
        director.load_arena(arena());

        let actions = director.advance(secs(10), &[], &mut rng);
        assert!(actions.is_empty());
        assert_eq!(director.countdown_remaining(), 3);
        assert_eq!(director.phase(), DirectorPhase::Countdown);

        director.advance(secs(1), &[player(1, false)], &mut rng);
        assert_eq!(director.countdown_remaining(), 2);
    }

    #[test]
    fn countdown_reaching_zero_starts_wave_one_and_spawns() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut director = WaveDirector::new(config());
        director.load_arena(arena());

        let actions = director.advance(secs(3), &[player(1, false)], &mut rng);
        let countdowns: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                DirectorAction::PushAll(UiMessage::Countdown { seconds }) => Some(*seconds),
                _ => None,
            })
            .collect();
        assert_eq!(countdowns, vec![2, 1, 0]);
        assert!(actions.contains(&DirectorAction::PushAll(UiMessage::GameStart)));
        assert!(actions.contains(&DirectorAction::PushAll(UiMessage::Wave { wave: 1 })));

        assert_eq!(director.state().wave_number, 1);
        assert!(director.state().is_started);
        // Only the unlocked area is used.
        let spawned = spawns(&actions);
        assert_eq!(spawned.len(), 1);
        assert_ne!(spawned[0].1.z, 50.0);
    }

    #[test]
    fn spawn_loop_reschedules_with_scaled_interval() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut director = started_director(&mut rng);
        let interval = director.config().spawn_interval_ms(1, 1);

        let just_before = Duration::from_millis(interval - 1);
        assert!(spawns(&director.advance(just_before, &[player(1, false)], &mut rng)).is_empty());
        let actions = director.advance(Duration::from_millis(1), &[player(1, false)], &mut rng);
        assert_eq!(spawns(&actions).len(), 1);
    }

    #[test]
    fn new_wave_delays_the_next_spawn_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = WaveConfig {
            countdown_secs: 1,
            wave_interval_ms: 5_000,
            wave_delay_ms: 10_000,
            slowest_spawn_interval_ms: 4_000,
            fastest_spawn_interval_ms: 4_000,
            boss: BossConfig {
                every_waves: 100,
                ..default()
            },
            ..default()
        };
        let mut director = WaveDirector::new(config);
        director.load_arena(arena());
        let players = [player(1, false)];

        // t=1s start: spawn at 1s, next at 5s.
        let actions = director.advance(secs(1), &players, &mut rng);
        assert_eq!(spawns(&actions).len(), 1);

        // t=5s spawn carries nothing, t=6s wave 2 sets the delay, so the spawn
        // fired at t=9s schedules the next one at t=23s.
        let actions = director.advance(secs(5), &players, &mut rng);
        assert_eq!(spawns(&actions).len(), 1);
        assert_eq!(director.state().wave_number, 2);
        assert_eq!(director.state().wave_delay_ms, 10_000);

        let actions = director.advance(secs(4), &players, &mut rng);
        assert_eq!(spawns(&actions).len(), 1);
        assert_eq!(director.state().wave_delay_ms, 0);

        let actions = director.advance(secs(10), &players, &mut rng);
        assert!(spawns(&actions).is_empty());
        let actions = director.advance(secs(4), &players, &mut rng);
        assert_eq!(spawns(&actions).len(), 1);
    }

    #[test]
    fn every_fifth_wave_spawns_one_boss() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut director = started_director(&mut rng);
        let interval = Duration::from_millis(director.config().wave_interval_ms);

        let mut bosses = Vec::new();
        for _ in 0..9 {
            let actions = director.advance(interval, &[player(1, false)], &mut rng);
            bosses.extend(
                spawns(&actions)
                    .into_iter()
                    .filter(|(kind, _)| *kind == EnemyKind::Boss),
            );
        }
        assert_eq!(director.state().wave_number, 10);
        assert_eq!(bosses.len(), 2);
    }

    #[test]
    fn end_check_is_debounced_to_one_pending() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut director = started_director(&mut rng);
        let downed = [player(1, true)];

        assert!(director.notify_downed_changed());
        assert!(!director.notify_downed_changed());
        assert!(!director.notify_downed_changed());

        let actions = director.advance(secs(1), &downed, &mut rng);
        let game_overs = actions
            .iter()
            .filter(|a| matches!(a, DirectorAction::PushAll(UiMessage::GameOver { .. })))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(director.phase(), DirectorPhase::GameOver);
        assert!(!director.notify_downed_changed());
    }

    #[test]
    fn end_check_does_nothing_while_someone_stands() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut director = started_director(&mut rng);

        director.notify_downed_changed();
        director.advance(secs(1), &[player(1, true), player(2, false)], &mut rng);
        assert_eq!(director.phase(), DirectorPhase::Active);
        assert!(!director.end_check_pending());
        assert!(director.notify_downed_changed());
    }

    #[test]
    fn game_over_resets_and_respawns_into_a_new_countdown() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut director = started_director(&mut rng);
        director.unlock_area("cellar");

        let actions = director.end_game();
        assert_eq!(
            actions[1..],
            [
                DirectorAction::PushAll(UiMessage::GameOver { wave: 1 }),
                DirectorAction::PushScoreboard { wave: 1 },
                DirectorAction::KillAllEnemies,
                DirectorAction::DespawnPlayers,
            ]
        );
        assert_eq!(director.state(), &WaveState::new("start"));

        // Stale spawn and wave loops were cancelled with the game.
        let settle = Duration::from_millis(director.config().game_over_settle_ms);
        let actions = director.advance(settle, &[player(1, false)], &mut rng);
        assert!(spawns(&actions).is_empty());
        assert_eq!(
            actions,
            vec![DirectorAction::RespawnPlayers { position: Vec3::Y }]
        );
        assert_eq!(director.phase(), DirectorPhase::Countdown);
        assert_eq!(director.countdown_remaining(), 3);

        // Ending again outside a game is ignored.
        assert!(director.end_game().is_empty());
    }

    #[test]
    fn bosses_spawn_at_random_unlocked_points() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = WaveConfig {
            countdown_secs: 1,
            boss: BossConfig {
                every_waves: 1,
                ..default()
            },
            ..default()
        };
        let mut director = WaveDirector::new(config);
        director.load_arena(arena());
        let players = [player(1, false)];
        let interval = Duration::from_millis(director.config().wave_interval_ms);

        let mut bosses = spawns(&director.advance(secs(1), &players, &mut rng));
        for _ in 0..20 {
            bosses.extend(spawns(&director.advance(interval, &players, &mut rng)));
        }
        let positions: Vec<Vec3> = bosses
            .into_iter()
            .filter(|(kind, _)| *kind == EnemyKind::Boss)
            .map(|(_, position)| position)
            .collect();

        assert_eq!(positions.len(), 21);
        assert!(positions.iter().all(|p| p.z != 50.0));
        assert!(positions.iter().any(|p| p.x > 0.0));
        assert!(positions.iter().any(|p| p.x < 0.0));
    }

    #[test]
    fn reloading_the_arena_during_game_over_still_respawns() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut director = started_director(&mut rng);
        let players = [player(1, false)];

        director.end_game();
        director.unload_arena();
        director.load_arena(arena());

        let actions = director.advance(Duration::ZERO, &players, &mut rng);
        assert_eq!(
            actions,
            vec![DirectorAction::RespawnPlayers { position: Vec3::Y }]
        );
        assert_eq!(director.phase(), DirectorPhase::Countdown);

        let settle = Duration::from_millis(director.config().game_over_settle_ms);
        let actions = director.advance(settle, &players, &mut rng);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, DirectorAction::RespawnPlayers { .. })));
    }

    #[test]
    fn loading_a_new_arena_mid_game_over_respawns_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut director = started_director(&mut rng);

        director.end_game();
        director.load_arena(arena());
        let actions = director.advance(Duration::ZERO, &[player(1, false)], &mut rng);
        let respawns = actions
            .iter()
            .filter(|a| matches!(a, DirectorAction::RespawnPlayers { .. }))
            .count();
        assert_eq!(respawns, 1);
        assert!(director.arena().is_some());
    }

    #[test]
    fn nothing_fires_without_an_arena() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut director = started_director(&mut rng);
        director.unload_arena();

        let actions = director.advance(secs(120), &[player(1, false)], &mut rng);
        assert!(actions.is_empty());
        assert_eq!(director.state().wave_number, 0);
    }
}
