use bevy::prelude::*;
use utils::net_id::NetIdFactory;

use crate::{
    character::{SpawnOrigin, WorldPosition},
    waves::config::EnemyStats,
};

use super::{ai::EnemyBrain, Enemy, EnemyConfig, EnemyInstance, EnemyKind};

pub fn spawn_enemy(
    commands: &mut Commands,
    id_factory: &mut NetIdFactory,
    kind: EnemyKind,
    stats: EnemyStats,
    position: Vec3,
    config: &EnemyConfig,
) -> Entity {
    let net_id = id_factory.next(kind.net_kind());
    debug!(
        "enemy{{spawn id={} model={} health={:.1} reward={:.1}}}",
        net_id,
        kind.model(),
        stats.health,
        stats.reward
    );

    commands
        .spawn((
            Name::new(format!("{}", net_id)),
            net_id,
            Enemy { kind },
            EnemyInstance::new(stats, config),
            EnemyBrain::default(),
            WorldPosition(position),
            SpawnOrigin(position),
        ))
        .id()
}
