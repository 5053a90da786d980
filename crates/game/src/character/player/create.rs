use bevy::prelude::*;
use utils::net_id::NetIdFactory;

use crate::{
    character::WorldPosition,
    config::GameTunables,
    score::ScoreManager,
    ui::{ChatColor, ChatLine},
    waves::{DirectorPhase, WaveDirector},
    weapons::{Gun, GunConfig},
};

use super::{Player, PlayerCombatState, PlayerConfig, PlayerId};

/// A client connected and picked a name.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PlayerJoined {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLeft {
    pub id: PlayerId,
}

pub fn spawn_player(
    commands: &mut Commands,
    id_factory: &mut NetIdFactory,
    id: PlayerId,
    name: String,
    position: Vec3,
    spawned: bool,
    config: &PlayerConfig,
    gun: GunConfig,
) -> Entity {
    let net_id = id_factory.next("player");
    info!("player{{spawn id={} name={} net_id={}}}", id, name, net_id);

    commands
        .spawn((
            Name::new(name.clone()),
            net_id,
            Player { id, name, spawned },
            PlayerCombatState::new(config),
            WorldPosition(position),
            Gun::new(gun),
        ))
        .id()
}

pub fn player_join_system(
    mut commands: Commands,
    tunables: Res<GameTunables>,
    director: Res<WaveDirector>,
    mut id_factory: ResMut<NetIdFactory>,
    mut joins: MessageReader<PlayerJoined>,
    existing: Query<&Player>,
    mut chat: MessageWriter<ChatLine>,
) {
    for join in joins.read() {
        if existing.iter().any(|player| player.id == join.id) {
            warn!("player{{join duplicate id={}}}", join.id);
            continue;
        }

        let position = director
            .arena()
            .map_or(tunables.player.spawn_position, |arena| arena.player_spawn);
        // Players joining during the game-over settle wait for the respawn.
        let spawned = director.phase() != DirectorPhase::GameOver;

        spawn_player(
            &mut commands,
            &mut id_factory,
            join.id,
            join.name.clone(),
            position,
            spawned,
            &tunables.player,
            tunables.starting_gun.clone(),
        );
        chat.write(ChatLine::broadcast(
            format!("{} joined the game", join.name),
            ChatColor::Info,
        ));
    }
}

pub fn player_leave_system(
    mut commands: Commands,
    mut director: ResMut<WaveDirector>,
    mut scores: ResMut<ScoreManager>,
    mut leaves: MessageReader<PlayerLeft>,
    players: Query<(Entity, &Player)>,
    mut chat: MessageWriter<ChatLine>,
) {
    for leave in leaves.read() {
        let Some((entity, player)) = players.iter().find(|(_, p)| p.id == leave.id) else {
            continue;
        };
        info!("player{{leave id={}}}", player.id);
        commands.entity(entity).try_despawn();
        scores.forget(player.id);
        chat.write(ChatLine::broadcast(
            format!("{} left the game", player.name),
            ChatColor::Info,
        ));
        // The ones left behind might all be down.
        director.notify_downed_changed();
    }
}
