use bevy::prelude::*;
use serde::Serialize;

use crate::character::player::{Player, PlayerCombatState};
use crate::waves::WaveDirector;

use super::{UiMessage, UiPush};

const SCOREBOARD_INTERVAL_SECS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreboardEntry {
    pub name: String,
    pub kills: u32,
    pub headshots: u32,
    pub money: f32,
    pub score: u64,
    pub revives: u32,
    pub downs: u32,
}

impl ScoreboardEntry {
    pub fn from_player(player: &Player, state: &PlayerCombatState) -> Self {
        Self {
            name: player.name.clone(),
            kills: state.kills,
            headshots: state.headshots,
            money: state.money.floor(),
            score: state.score,
            revives: state.revives,
            downs: state.downs,
        }
    }
}

/// Rows sorted by score, best first; ties keep name order so the board
/// does not flicker between pushes.
pub fn build_scoreboard<'a>(
    players: impl IntoIterator<Item = (&'a Player, &'a PlayerCombatState)>,
) -> Vec<ScoreboardEntry> {
    let mut rows: Vec<_> = players
        .into_iter()
        .map(|(player, state)| ScoreboardEntry::from_player(player, state))
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[derive(Resource)]
pub struct ScoreboardTimer(pub Timer);

impl Default for ScoreboardTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(SCOREBOARD_INTERVAL_SECS, TimerMode::Repeating))
    }
}

pub fn push_scoreboard_system(
    time: Res<Time>,
    mut timer: ResMut<ScoreboardTimer>,
    director: Res<WaveDirector>,
    players: Query<(&Player, &PlayerCombatState)>,
    mut ui: MessageWriter<UiPush>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    let rows = build_scoreboard(players.iter());
    let wave = director.state().wave_number;
    for (player, _) in players.iter() {
        ui.write(UiPush::new(
            player.id,
            UiMessage::Scoreboard {
                players: rows.clone(),
                wave,
            },
        ));
    }
}
