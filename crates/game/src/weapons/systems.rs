use bevy::prelude::*;

use crate::{
    audio::{PlaySound, SoundRequest},
    character::player::{Player, PlayerCombatState, PlayerId},
    core::{GameClock, SessionRng},
};

use super::{FireBlocked, Gun, TriggerState};

/// Trigger input for one player this tick, from the host input layer.
#[derive(Message, Debug, Clone)]
pub struct TriggerInput {
    pub player: PlayerId,
    pub trigger: TriggerState,
    pub origin: Vec3,
    pub forward: Vec3,
}

#[derive(Message, Debug, Clone)]
pub struct ReloadInput {
    pub player: PlayerId,
}

/// Ray the host must cast. The host answers with a `HitReport` when the ray
/// hits an enemy.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct RaycastRequest {
    pub shooter: PlayerId,
    pub origin: Vec3,
    pub direction: Vec3,
    pub range: f32,
    pub damage: f32,
}

pub fn gun_fire_system(
    clock: Res<GameClock>,
    mut rng: ResMut<SessionRng>,
    mut triggers: MessageReader<TriggerInput>,
    mut players: Query<(&Player, &PlayerCombatState, &mut Gun)>,
    mut raycasts: MessageWriter<RaycastRequest>,
    mut sounds: MessageWriter<PlaySound>,
) {
    let now_ms = clock.now_ms();

    for input in triggers.read() {
        let Some((player, state, mut gun)) = players
            .iter_mut()
            .find(|(player, _, _)| player.id == input.player)
        else {
            continue;
        };
        if !player.spawned || state.downed {
            continue;
        }

        match gun.try_fire(now_ms, input.trigger, input.forward, &mut rng.0) {
            Ok(directions) => {
                for direction in directions {
                    raycasts.write(RaycastRequest {
                        shooter: player.id,
                        origin: input.origin,
                        direction,
                        range: gun.config.range,
                        damage: gun.config.damage,
                    });
                }
                sounds.write(PlaySound(
                    SoundRequest::new(format!("audio/sfx/{}-shoot.mp3", gun.config.id))
                        .at(input.origin),
                ));
            }
            Err(FireBlocked::EmptyMagazine) => {
                sounds.write(PlaySound(SoundRequest::new("audio/sfx/empty-gun.mp3").at(input.origin)));
            }
            Err(reason) => {
                trace!("gun{{player={} blocked={:?}}}", player.id, reason);
            }
        }
    }
}

pub fn gun_reload_system(
    clock: Res<GameClock>,
    mut reloads: MessageReader<ReloadInput>,
    mut players: Query<(&Player, &mut Gun)>,
) {
    let now_ms = clock.now_ms();

    for input in reloads.read() {
        if let Some((player, mut gun)) = players.iter_mut().find(|(p, _)| p.id == input.player) {
            if gun.start_reload(now_ms) {
                debug!("gun{{player={} reload gun={}}}", player.id, gun.config.id);
            }
        }
    }

    for (_, mut gun) in players.iter_mut() {
        // Only touch the component when a reload actually lands so change
        // detection drives the ammo push.
        if gun.reload_done_ms.is_some_and(|done| now_ms >= done) {
            gun.update(now_ms);
        }
    }
}
