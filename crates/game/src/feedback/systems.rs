use bevy::prelude::*;

use crate::{
    character::player::{Player, PlayerCombatState},
    config::GameTunables,
    core::GameClock,
    score::{HitEvent, ScoreManager},
    ui::{DamageNumberPayload, UiMessage, UiPush},
};

use super::damage_number::{banner_on_reach, combo_level, damage_number_style};

/// Turns each hit into score, a floating damage number and, on kills, the
/// kill streak pushes. A kill also ends the shooter's hit combo.
pub fn score_hits_system(
    clock: Res<GameClock>,
    tunables: Res<GameTunables>,
    mut scores: ResMut<ScoreManager>,
    mut hits: MessageReader<HitEvent>,
    mut players: Query<(&Player, &mut PlayerCombatState)>,
    mut ui: MessageWriter<UiPush>,
) {
    let now_ms = clock.now_ms();

    for hit in hits.read() {
        let Some((player, mut state)) = players
            .iter_mut()
            .find(|(player, _)| player.id == hit.player)
        else {
            continue;
        };

        let result = scores.calculate_score(hit, now_ms);
        state.add_score(result.score);
        trace!(
            "score{{player={} points={} combo={} multi_hit={}}}",
            player.id,
            result.score,
            result.combo,
            result.multi_hit
        );

        let style = damage_number_style(
            hit.damage,
            hit.headshot,
            hit.hit_position,
            hit.spawn_origin,
            &tunables.feedback,
        );
        ui.write(UiPush::new(
            player.id,
            UiMessage::DamageNumber(DamageNumberPayload {
                damage: hit.damage,
                score: result.score,
                combo: result.combo,
                headshot: hit.headshot,
                kill: hit.kill,
                position: hit.hit_position.to_array(),
                duration_ms: style.duration_ms,
                scale: style.scale,
                rise_height: style.rise_height,
                color: style.color,
                glow: style.glow,
                intensity: style.intensity,
            }),
        ));

        if !hit.kill {
            continue;
        }

        scores.reset_combo(player.id);
        let streak = state.register_kill(
            hit.headshot,
            now_ms,
            tunables.player.kill_streak_window_ms,
        );
        state.combo_level = combo_level(streak);
        ui.write(UiPush::new(
            player.id,
            UiMessage::Combo {
                level: state.combo_level,
                kills: streak,
            },
        ));
        if let Some(label) = banner_on_reach(streak) {
            debug!("score{{banner player={} label={}}}", player.id, label);
            ui.write(UiPush::new(
                player.id,
                UiMessage::ComboBanner {
                    label: label.to_string(),
                    combo: streak,
                },
            ));
        }
    }
}
