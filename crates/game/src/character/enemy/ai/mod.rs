pub mod state;
pub mod systems;

pub use state::{EnemyBrain, MonsterState, MoveIntent, PathfindOutcome, TargetCandidate};
pub use systems::{PathfindFinished, PathfindRequest};
