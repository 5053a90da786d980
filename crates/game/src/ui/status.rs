//! Per-player HUD pushes: health, money, downed flag and ammo.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::{
    character::player::{Player, PlayerCombatState, PlayerId, PlayerLeft},
    weapons::Gun,
};

use super::{UiMessage, UiPush};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HudSnapshot {
    health: f32,
    max_health: f32,
    money: f32,
    downed: bool,
}

impl HudSnapshot {
    fn of(state: &PlayerCombatState) -> Self {
        Self {
            health: state.health.round(),
            max_health: state.max_health,
            money: state.money.floor(),
            downed: state.downed,
        }
    }
}

/// Only the fields that actually moved since the last push are sent.
pub fn hud_updates(previous: Option<HudSnapshot>, state: &PlayerCombatState) -> Vec<UiMessage> {
    let next = HudSnapshot::of(state);
    let mut out = Vec::new();
    if previous.is_none_or(|p| p.health != next.health || p.max_health != next.max_health) {
        out.push(UiMessage::Health {
            health: next.health,
            max_health: next.max_health,
        });
    }
    if previous.is_none_or(|p| p.money != next.money) {
        out.push(UiMessage::Money { money: next.money });
    }
    if previous.is_some_and(|p| p.downed != next.downed) {
        out.push(UiMessage::Downed {
            downed: next.downed,
        });
    }
    out
}

/// A freshly spawned player always gets a full push, even when an earlier
/// session under the same id left a snapshot behind.
pub fn push_status_system(
    mut sent: Local<HashMap<PlayerId, HudSnapshot>>,
    mut leaves: MessageReader<PlayerLeft>,
    players: Query<(&Player, Ref<PlayerCombatState>), Changed<PlayerCombatState>>,
    mut ui: MessageWriter<UiPush>,
) {
    for leave in leaves.read() {
        sent.remove(&leave.id);
    }

    for (player, state) in players.iter() {
        let previous = if state.is_added() {
            None
        } else {
            sent.get(&player.id).copied()
        };
        let updates = hud_updates(previous, &state);
        if updates.is_empty() {
            continue;
        }
        sent.insert(player.id, HudSnapshot::of(&state));
        ui.write_batch(updates.into_iter().map(|payload| UiPush::new(player.id, payload)));
    }
}

pub fn push_ammo_system(players: Query<(&Player, &Gun), Changed<Gun>>, mut ui: MessageWriter<UiPush>) {
    for (player, gun) in players.iter() {
        ui.write(UiPush::new(
            player.id,
            UiMessage::Ammo {
                gun: gun.config.name.clone(),
                ammo: gun.magazine,
                reserve: gun.reserve,
                reloading: gun.is_reloading(),
            },
        ));
    }
}
