//! Wave progression state.
//!
//! Created once per game session, reset on game over, and only mutated by the
//! director's timers (and area unlocks coming from the shop).

use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Current phase of the director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Reflect)]
pub enum DirectorPhase {
    /// Waiting for players; the countdown only runs while someone is connected.
    #[default]
    Countdown,
    /// Spawn loop, wave loop and end-game watchdog are live.
    Active,
    /// Between the end of a game and the respawn of every player.
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    pub wave_number: u32,
    pub is_started: bool,
    /// One-shot delay added to the next spawn, set when a wave starts.
    pub wave_delay_ms: u64,
    pub unlocked_area_ids: BTreeSet<String>,
}

impl WaveState {
    pub fn new(starting_area: &str) -> Self {
        Self {
            wave_number: 0,
            is_started: false,
            wave_delay_ms: 0,
            unlocked_area_ids: BTreeSet::from([starting_area.to_string()]),
        }
    }

    pub fn reset(&mut self, starting_area: &str) {
        *self = Self::new(starting_area);
    }

    /// Consumes the carried wave delay.
    pub fn take_wave_delay(&mut self) -> u64 {
        std::mem::take(&mut self.wave_delay_ms)
    }

    /// Returns false if the area was already unlocked.
    pub fn unlock_area(&mut self, area_id: &str) -> bool {
        self.unlocked_area_ids.insert(area_id.to_string())
    }

    pub fn is_unlocked(&self, area_id: &str) -> bool {
        self.unlocked_area_ids.contains(area_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_delay_is_consumed_once() {
        let mut state = WaveState::new("start");
        state.wave_delay_ms = 10_000;
        assert_eq!(state.take_wave_delay(), 10_000);
        assert_eq!(state.take_wave_delay(), 0);
    }

    #[test]
    fn reset_keeps_only_the_starting_area() {
        let mut state = WaveState::new("start");
        assert!(state.unlock_area("courtyard"));
        assert!(!state.unlock_area("courtyard"));
        state.wave_number = 12;
        state.is_started = true;

        state.reset("start");
        assert_eq!(state, WaveState::new("start"));
        assert!(state.is_unlocked("start"));
        assert!(!state.is_unlocked("courtyard"));
    }
}
