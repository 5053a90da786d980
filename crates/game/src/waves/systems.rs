//! ECS side of the wave director: feeds it the clock and the player list,
//! then carries out the actions it returns.

use bevy::{ecs::system::SystemParam, prelude::*};
use utils::net_id::NetIdFactory;

use crate::{
    audio::AudioPool,
    character::{
        enemy::{ai::EnemyBrain, create::spawn_enemy, Enemy, EnemyInstance},
        health::EnemyKilled,
        player::{Player, PlayerCombatState, PlayerDownedChanged},
        WorldPosition,
    },
    config::GameTunables,
    core::SessionRng,
    score::ScoreManager,
    ui::{scoreboard::build_scoreboard, ChatLine, UiMessage, UiPush},
    weapons::Gun,
};

use super::director::{Arena, DirectorAction, PlayerSnapshot, WaveDirector};

/// The host finished loading a world.
#[derive(Message, Debug, Clone)]
pub struct LoadArena(pub Arena);

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct UnloadArena;

/// Forces the running game to end, e.g. from an admin command.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct EndGameRequest;

#[derive(SystemParam)]
pub struct DirectorOutputs<'w> {
    pub chat: MessageWriter<'w, ChatLine>,
    pub ui: MessageWriter<'w, UiPush>,
    pub killed: MessageWriter<'w, EnemyKilled>,
}

pub fn arena_lifecycle_system(
    mut commands: Commands,
    mut director: ResMut<WaveDirector>,
    mut loads: MessageReader<LoadArena>,
    mut unloads: MessageReader<UnloadArena>,
    enemies: Query<Entity, With<Enemy>>,
) {
    if unloads.read().count() > 0 {
        director.unload_arena();
        for entity in enemies.iter() {
            commands.entity(entity).try_despawn();
        }
    }
    // Only the latest world matters when several loads land in one tick.
    if let Some(LoadArena(arena)) = loads.read().last() {
        director.load_arena(arena.clone());
    }
}

pub fn director_system(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<GameTunables>,
    mut director: ResMut<WaveDirector>,
    mut rng: ResMut<SessionRng>,
    mut id_factory: ResMut<NetIdFactory>,
    mut scores: ResMut<ScoreManager>,
    mut audio: ResMut<AudioPool>,
    mut end_requests: MessageReader<EndGameRequest>,
    mut players: Query<
        (&mut Player, &mut PlayerCombatState, &mut Gun, &mut WorldPosition),
        Without<Enemy>,
    >,
    mut enemies: Query<
        (Entity, &Enemy, &mut EnemyInstance, &mut EnemyBrain, &WorldPosition),
        Without<Player>,
    >,
    mut out: DirectorOutputs,
) {
    let snapshots: Vec<PlayerSnapshot> = players
        .iter()
        .map(|(player, state, ..)| PlayerSnapshot {
            id: player.id,
            downed: state.downed,
        })
        .collect();

    let mut actions = director.advance(time.delta(), &snapshots, &mut rng.0);
    if end_requests.read().count() > 0 {
        actions.extend(director.end_game());
    }

    // Enemies spawned earlier in this batch are not visible to the query yet.
    let mut spawned_now = Vec::new();
    for action in actions {
        match action {
            DirectorAction::Announce { text, color } => {
                out.chat.write(ChatLine::broadcast(text, color));
            }
            DirectorAction::PushAll(payload) => {
                for snapshot in &snapshots {
                    out.ui.write(UiPush::new(snapshot.id, payload.clone()));
                }
            }
            DirectorAction::PushScoreboard { wave } => {
                let rows = build_scoreboard(
                    players.iter().map(|(player, state, ..)| (player, state)),
                );
                for snapshot in &snapshots {
                    out.ui.write(UiPush::new(
                        snapshot.id,
                        UiMessage::Scoreboard {
                            players: rows.clone(),
                            wave,
                        },
                    ));
                }
            }
            DirectorAction::SpawnEnemy {
                kind,
                stats,
                position,
            } => {
                spawned_now.push(spawn_enemy(
                    &mut commands,
                    &mut id_factory,
                    kind,
                    stats,
                    position,
                    &tunables.enemy,
                ));
            }
            DirectorAction::KillAllEnemies => {
                let mut count = 0;
                for (entity, marker, mut instance, mut brain, position) in enemies.iter_mut() {
                    if instance.kill() {
                        brain.kill();
                        out.killed.write(EnemyKilled {
                            entity,
                            kind: marker.kind,
                            position: position.0,
                            killer: None,
                            headshot: false,
                        });
                    }
                    commands.entity(entity).try_despawn();
                    count += 1;
                }
                for entity in spawned_now.drain(..) {
                    commands.entity(entity).try_despawn();
                }
                info!("director{{kill_all count={}}}", count);
            }
            DirectorAction::DespawnPlayers => {
                for (mut player, ..) in players.iter_mut() {
                    player.spawned = false;
                }
                scores.clear();
                audio.reset();
            }
            DirectorAction::RespawnPlayers { position } => {
                for (mut player, mut state, mut gun, mut world_position) in players.iter_mut() {
                    state.reset_for_respawn(&tunables.player);
                    *gun = Gun::new(tunables.starting_gun.clone());
                    world_position.0 = position;
                    player.spawned = true;
                }
            }
        }
    }
}

pub fn watch_downed_system(
    mut director: ResMut<WaveDirector>,
    mut changes: MessageReader<PlayerDownedChanged>,
) {
    if changes.read().count() > 0 && director.notify_downed_changed() {
        debug!("director{{end_check scheduled}}");
    }
}
