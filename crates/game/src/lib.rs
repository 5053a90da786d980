pub mod args;
pub mod audio;
pub mod character;
pub mod config;
pub mod core;
pub mod effects;
pub mod feedback;
pub mod schedule;
pub mod score;
pub mod shop;
pub mod system_set;
pub mod ui;
pub mod waves;
pub mod weapons;

pub use crate::config::{ConfigError, GameTunables};
pub use crate::core::{GameClock, HordeGamePlugin, SessionRng};
