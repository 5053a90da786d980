use bevy::prelude::*;
use thiserror::Error;

use super::{PlayerCombatState, PlayerConfig, PlayerId};

#[derive(Debug, Error, PartialEq)]
pub enum ReviveError {
    #[error("you cannot revive yourself")]
    SamePlayer,
    #[error("that player is not down")]
    NotDowned,
    #[error("you are down and cannot revive anyone")]
    ReviverDowned,
    #[error("too far away to revive ({distance:.1}m, need {range:.1}m)")]
    OutOfRange { distance: f32, range: f32 },
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviveRequest {
    pub reviver: PlayerId,
    pub target: PlayerId,
}

/// Brings a downed teammate back with a fraction of their max health and
/// credits the reviver.
pub fn revive(
    reviver: &mut PlayerCombatState,
    reviver_position: Vec3,
    target: &mut PlayerCombatState,
    target_position: Vec3,
    config: &PlayerConfig,
) -> Result<(), ReviveError> {
    if reviver.downed {
        return Err(ReviveError::ReviverDowned);
    }
    if !target.downed {
        return Err(ReviveError::NotDowned);
    }

    let distance = reviver_position.distance(target_position);
    if distance > config.revive_range {
        return Err(ReviveError::OutOfRange {
            distance,
            range: config.revive_range,
        });
    }

    target.downed = false;
    target.health = (target.max_health * config.revive_health_fraction).max(1.0);
    reviver.revives += 1;
    Ok(())
}
