use bevy::prelude::*;

use crate::{
    character::{
        enemy::{ai::EnemyBrain, DamageInput, Enemy, EnemyInstance, EnemyKind},
        player::{Player, PlayerCombatState, PlayerId},
        SpawnOrigin, WorldPosition,
    },
    config::GameTunables,
    score::HitEvent,
};

/// A ray that hit an enemy, as resolved by the host.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct HitReport {
    pub shooter: PlayerId,
    pub target: Entity,
    pub damage: f32,
    pub hit_point: Option<Vec3>,
    pub distance: f32,
    /// Set when the host already knows which collider was hit.
    pub headshot: Option<bool>,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct EnemyKilled {
    pub entity: Entity,
    pub kind: EnemyKind,
    pub position: Vec3,
    /// `None` for forced kills at game over.
    pub killer: Option<PlayerId>,
    pub headshot: bool,
}

/// Short-lived hit indicator on an enemy.
#[derive(Component, Debug, Clone)]
pub struct DamageFlash(pub Timer);

impl DamageFlash {
    pub fn new(duration_ms: u64) -> Self {
        Self(Timer::from_seconds(duration_ms as f32 / 1000.0, TimerMode::Once))
    }
}

pub fn apply_hit_reports_system(
    mut commands: Commands,
    tunables: Res<GameTunables>,
    mut reports: MessageReader<HitReport>,
    mut enemies: Query<(
        &Enemy,
        &mut EnemyInstance,
        &mut EnemyBrain,
        &WorldPosition,
        Option<&SpawnOrigin>,
    )>,
    mut players: Query<(&Player, &mut PlayerCombatState)>,
    mut hits: MessageWriter<HitEvent>,
    mut killed: MessageWriter<EnemyKilled>,
) {
    for report in reports.read() {
        // The enemy may have died or despawned since the ray was cast.
        let Ok((marker, mut enemy, mut brain, position, origin)) = enemies.get_mut(report.target) else {
            continue;
        };

        let input = DamageInput {
            amount: report.damage,
            attacker: Some(report.shooter),
            headshot: report.headshot,
            hit_point: report.hit_point,
        };
        let Some(outcome) = enemy.take_damage(&input, position.0, &tunables.enemy) else {
            continue;
        };

        if let Some((_, mut shooter)) = players
            .iter_mut()
            .find(|(player, _)| player.id == report.shooter)
        {
            shooter.add_money(outcome.reward);
        }

        hits.write(HitEvent {
            player: report.shooter,
            damage: outcome.applied,
            distance: report.distance,
            target_speed: enemy.speed,
            headshot: outcome.headshot,
            kill: outcome.killed,
            hit_position: report.hit_point.unwrap_or(position.0),
            spawn_origin: origin.map(|o| o.0),
        });

        if outcome.killed {
            debug!(
                "enemy{{killed entity={} by={} headshot={}}}",
                report.target, report.shooter, outcome.headshot
            );
            brain.kill();
            killed.write(EnemyKilled {
                entity: report.target,
                kind: marker.kind,
                position: position.0,
                killer: Some(report.shooter),
                headshot: outcome.headshot,
            });
            commands.entity(report.target).try_despawn();
        } else {
            commands
                .entity(report.target)
                .try_insert(DamageFlash::new(tunables.enemy.damage_flash_ms));
        }
    }
}

pub fn damage_flash_system(
    time: Res<Time>,
    mut commands: Commands,
    mut flashes: Query<(Entity, &mut DamageFlash)>,
) {
    for (entity, mut flash) in flashes.iter_mut() {
        if flash.0.tick(time.delta()).just_finished() {
            commands.entity(entity).try_remove::<DamageFlash>();
        }
    }
}
