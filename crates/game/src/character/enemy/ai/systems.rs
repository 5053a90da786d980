use bevy::prelude::*;

use crate::{
    audio::{PlaySound, SoundRequest},
    character::{
        enemy::EnemyInstance,
        player::{Player, PlayerCombatState, PlayerDownedChanged},
        Facing, WorldPosition,
    },
    config::GameTunables,
    core::GameClock,
};

use super::state::{steer_step, EnemyBrain, MoveIntent, PathfindOutcome, TargetCandidate};

/// Path search the host must run for an enemy.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct PathfindRequest {
    pub enemy: Entity,
    pub from: Vec3,
    pub goal: Vec3,
    pub max_jump: f32,
    pub max_fall: f32,
    pub vertical_penalty: f32,
}

/// Host answer to a `PathfindRequest`.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct PathfindFinished {
    pub enemy: Entity,
    pub outcome: PathfindOutcome,
    /// Where the enemy ended up, when the host moved it.
    pub position: Option<Vec3>,
}

pub fn enemy_brain_system(
    time: Res<Time>,
    tunables: Res<GameTunables>,
    mut enemies: Query<
        (
            Entity,
            &EnemyInstance,
            &mut EnemyBrain,
            &mut WorldPosition,
            &mut Facing,
        ),
        Without<Player>,
    >,
    players: Query<(&Player, &PlayerCombatState, &WorldPosition)>,
    mut pathfinds: MessageWriter<PathfindRequest>,
) {
    let config = &tunables.enemy;
    let dt = time.delta();
    let dt_ms = dt.as_millis() as u64;

    let candidates: Vec<TargetCandidate> = players
        .iter()
        .filter(|(player, _, _)| player.spawned)
        .map(|(player, state, position)| TargetCandidate {
            id: player.id,
            position: position.0,
            downed: state.downed,
        })
        .collect();

    for (entity, enemy, mut brain, mut position, mut facing) in enemies.iter_mut() {
        if enemy.dead {
            continue;
        }
        match brain.tick(dt_ms, position.0, enemy.speed, &candidates, config) {
            MoveIntent::Hold => {}
            MoveIntent::Steer { toward, speed } => {
                let step = steer_step(position.0, toward, speed, dt.as_secs_f32());
                position.0 = step.position;
                if let Some(turned) = step.facing {
                    *facing = turned;
                }
            }
            MoveIntent::Pathfind { goal } => {
                trace!("enemy{{pathfind entity={} goal={}}}", entity, goal);
                pathfinds.write(PathfindRequest {
                    enemy: entity,
                    from: position.0,
                    goal,
                    max_jump: config.max_jump,
                    max_fall: config.max_fall,
                    vertical_penalty: config.vertical_penalty,
                });
            }
        }
    }
}

pub fn pathfind_finished_system(
    mut finished: MessageReader<PathfindFinished>,
    mut brains: Query<(&mut EnemyBrain, &mut WorldPosition, &mut Facing), Without<Player>>,
) {
    for message in finished.read() {
        let Ok((mut brain, mut position, mut facing)) = brains.get_mut(message.enemy) else {
            continue;
        };
        brain.on_pathfind_finished(message.outcome);
        if let Some(end) = message.position {
            if let Some(turned) = Facing::toward(position.0, end) {
                *facing = turned;
            }
            position.0 = end;
        }
    }
}

pub fn enemy_attack_system(
    clock: Res<GameClock>,
    tunables: Res<GameTunables>,
    mut enemies: Query<(&mut EnemyInstance, &EnemyBrain, &WorldPosition), Without<Player>>,
    mut players: Query<(&Player, &mut PlayerCombatState, &WorldPosition)>,
    mut downed: MessageWriter<PlayerDownedChanged>,
    mut sounds: MessageWriter<PlaySound>,
) {
    let now_ms = clock.now_ms();

    for (mut enemy, brain, position) in enemies.iter_mut() {
        let Some(target) = brain.target else {
            continue;
        };
        let Some((player, mut state, player_position)) = players
            .iter_mut()
            .find(|(player, _, _)| player.id == target && player.spawned)
        else {
            continue;
        };
        if state.downed {
            continue;
        }

        let distance = position.0.distance(player_position.0);
        let Some(damage) = enemy.try_attack(now_ms, distance, &tunables.enemy) else {
            continue;
        };

        sounds.write(PlaySound(
            SoundRequest::new("audio/sfx/zombie-attack.mp3").at(position.0),
        ));
        if state.take_damage(damage, now_ms) {
            info!("player{{downed id={} by_melee damage={:.1}}}", player.id, damage);
            downed.write(PlayerDownedChanged::new(player.id, true));
        }
    }
}
