use bevy::prelude::SystemSet;

/// Order of the game's `Update` systems within one tick.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum GameSystemSet {
    Clock,
    Lobby,
    Input,
    Combat,
    Director,
    EnemyAi,
    Presentation,
}
