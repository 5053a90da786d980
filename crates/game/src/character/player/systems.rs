use bevy::prelude::*;

use crate::{
    character::WorldPosition,
    config::GameTunables,
    core::GameClock,
    ui::{ChatColor, ChatLine},
};

use super::{
    revive::{revive, ReviveError, ReviveRequest},
    Player, PlayerCombatState, PlayerDownedChanged,
};

pub fn player_regen_system(
    time: Res<Time>,
    clock: Res<GameClock>,
    tunables: Res<GameTunables>,
    mut players: Query<&mut PlayerCombatState>,
) {
    let dt_ms = time.delta_secs() * 1000.0;
    let now_ms = clock.now_ms();

    for mut state in players.iter_mut() {
        // Read first so full-health players are not flagged as changed.
        if state.downed || state.health >= state.max_health {
            continue;
        }
        state.regenerate(dt_ms, now_ms, &tunables.player);
    }
}

pub fn revive_system(
    tunables: Res<GameTunables>,
    mut requests: MessageReader<ReviveRequest>,
    mut players: Query<(Entity, &Player, &mut PlayerCombatState, &WorldPosition)>,
    mut chat: MessageWriter<ChatLine>,
    mut downed: MessageWriter<PlayerDownedChanged>,
) {
    for request in requests.read() {
        if request.reviver == request.target {
            chat.write(ChatLine::error(request.reviver, &ReviveError::SamePlayer));
            continue;
        }

        let find = |id| {
            players
                .iter()
                .find(|(_, player, _, _)| player.id == id && player.spawned)
                .map(|(entity, ..)| entity)
        };
        let (Some(reviver), Some(target)) = (find(request.reviver), find(request.target)) else {
            continue;
        };

        let Ok(
            [(_, reviver_player, mut reviver_state, reviver_position), (_, target_player, mut target_state, target_position)],
        ) = players.get_many_mut([reviver, target])
        else {
            continue;
        };

        match revive(
            &mut reviver_state,
            reviver_position.0,
            &mut target_state,
            target_position.0,
            &tunables.player,
        ) {
            Ok(()) => {
                info!(
                    "player{{revive reviver={} target={}}}",
                    reviver_player.id, target_player.id
                );
                chat.write(ChatLine::broadcast(
                    format!("{} revived {}", reviver_player.name, target_player.name),
                    ChatColor::Success,
                ));
                downed.write(PlayerDownedChanged::new(target_player.id, false));
            }
            Err(error) => {
                chat.write(ChatLine::error(reviver_player.id, &error));
            }
        }
    }
}

pub fn announce_downed_system(
    mut changes: MessageReader<PlayerDownedChanged>,
    players: Query<&Player>,
    mut chat: MessageWriter<ChatLine>,
) {
    for change in changes.read() {
        if !change.downed {
            continue;
        }
        let Some(player) = players.iter().find(|p| p.id == change.player) else {
            continue;
        };
        chat.write(ChatLine::broadcast(
            format!("{} is down! Get over there and revive them", player.name),
            ChatColor::Warning,
        ));
    }
}
