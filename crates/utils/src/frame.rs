use bevy::prelude::*;

/// Number of simulation ticks since the server booted.
#[derive(Resource, Default, Reflect, Hash, Clone, Copy, Debug)]
#[reflect(Hash)]
pub struct TickCount {
    pub tick: u64,
}

impl std::fmt::Display for TickCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.tick)
    }
}

pub fn increase_tick_system(mut tick_count: ResMut<TickCount>) {
    tick_count.tick += 1;
}
