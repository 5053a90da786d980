//! Gore particles spawned when enemies die.
//!
//! Particles live in a pre-allocated slab and are recycled instead of being
//! created per death. The slab grows in batches when the free list runs low,
//! up to a hard ceiling. Each live particle is released by a timer after its
//! lifetime; a periodic sweep also reclaims anything whose lifetime ran out
//! but whose release never fired.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    audio::{PlaySound, SoundRequest},
    character::{enemy::EnemyKind, health::EnemyKilled},
    core::SessionRng,
    schedule::Scheduler,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlePoolConfig {
    pub initial_pool: usize,
    /// Replenish when fewer free particles than this remain.
    pub low_water_mark: usize,
    pub replenish_batch: usize,
    pub max_pool: usize,
    pub max_active: usize,
    pub burst_size: usize,
    pub lifetime_ms: u64,
    pub sweep_interval_ms: u64,
}

impl Default for ParticlePoolConfig {
    fn default() -> Self {
        Self {
            initial_pool: 64,
            low_water_mark: 8,
            replenish_batch: 16,
            max_pool: 256,
            max_active: 96,
            burst_size: 12,
            lifetime_ms: 1_200,
            sweep_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Particle {
    generation: u32,
    position: Vec3,
    velocity: Vec3,
    expires_at: Option<Duration>,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct ParticleSpawned {
    pub position: Vec3,
    pub velocity: Vec3,
    pub lifetime_ms: u64,
}

#[derive(Resource, Debug)]
pub struct DeathEffects {
    config: ParticlePoolConfig,
    slab: Vec<Particle>,
    free: Vec<usize>,
    active: usize,
    releases: Scheduler<(usize, u32)>,
    since_sweep: Duration,
    spawned: Vec<ParticleSpawned>,
    dropped: u64,
}

impl DeathEffects {
    pub fn new(config: ParticlePoolConfig) -> Self {
        let mut effects = Self {
            slab: Vec::with_capacity(config.initial_pool),
            free: Vec::with_capacity(config.initial_pool),
            config,
            active: 0,
            releases: Scheduler::new(),
            since_sweep: Duration::ZERO,
            spawned: Vec::new(),
            dropped: 0,
        };
        effects.allocate(effects.config.initial_pool);
        effects
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn free(&self) -> usize {
        self.free.len()
    }

    pub fn allocated(&self) -> usize {
        self.slab.len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn allocate(&mut self, count: usize) -> usize {
        let count = count.min(self.config.max_pool.saturating_sub(self.slab.len()));
        for _ in 0..count {
            self.free.push(self.slab.len());
            self.slab.push(Particle::default());
        }
        if count > 0 {
            debug!(
                "particles{{allocate count={} total={}}}",
                count,
                self.slab.len()
            );
        }
        count
    }

    fn acquire(&mut self) -> Option<usize> {
        if self.free.len() < self.config.low_water_mark {
            self.allocate(self.config.replenish_batch);
        }
        self.free.pop()
    }

    /// Spawns a burst of particles at `position`. Priority bursts ignore the
    /// active cap but still need free particles. Returns how many spawned.
    pub fn spawn_burst(&mut self, position: Vec3, priority: bool, rng: &mut impl Rng) -> usize {
        let wanted = self.config.burst_size;
        let allowed = if priority {
            wanted
        } else {
            wanted.min(self.config.max_active.saturating_sub(self.active))
        };

        let lifetime = Duration::from_millis(self.config.lifetime_ms);
        let now = self.releases.now();
        let mut count = 0;
        for _ in 0..allowed {
            let Some(index) = self.acquire() else {
                break;
            };
            let velocity = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(1.0..4.0),
                rng.gen_range(-2.0..2.0),
            );

            let particle = &mut self.slab[index];
            particle.generation = particle.generation.wrapping_add(1);
            particle.position = position;
            particle.velocity = velocity;
            particle.expires_at = Some(now + lifetime);
            let generation = particle.generation;

            self.active += 1;
            self.releases.schedule(lifetime, (index, generation));
            self.spawned.push(ParticleSpawned {
                position,
                velocity,
                lifetime_ms: self.config.lifetime_ms,
            });
            count += 1;
        }

        let missed = (wanted - count) as u64;
        if missed > 0 {
            self.dropped += missed;
            debug!(
                "particles{{drop count={} active={} free={}}}",
                missed,
                self.active,
                self.free.len()
            );
        }
        count
    }

    fn release(&mut self, index: usize, generation: Option<u32>) -> bool {
        let Some(particle) = self.slab.get_mut(index) else {
            return false;
        };
        if particle.expires_at.is_none() || generation.is_some_and(|g| g != particle.generation) {
            return false;
        }
        particle.expires_at = None;
        self.active = self.active.saturating_sub(1);
        self.free.push(index);
        true
    }

    pub fn advance(&mut self, dt: Duration) {
        self.releases.advance(dt);
        while let Some((_, (index, generation))) = self.releases.pop_due() {
            self.release(index, Some(generation));
        }

        self.since_sweep += dt;
        if self.since_sweep >= Duration::from_millis(self.config.sweep_interval_ms) {
            self.since_sweep = Duration::ZERO;
            self.sweep();
        }
    }

    /// Reclaims expired particles regardless of pending releases.
    pub fn sweep(&mut self) -> usize {
        let now = self.releases.now();
        let expired: Vec<usize> = self
            .slab
            .iter()
            .enumerate()
            .filter(|(_, p)| p.expires_at.is_some_and(|at| at <= now))
            .map(|(index, _)| index)
            .collect();
        let reclaimed = expired
            .into_iter()
            .filter(|&index| self.release(index, None))
            .count();
        if reclaimed > 0 {
            warn!("particles{{sweep reclaimed={}}}", reclaimed);
        }
        reclaimed
    }

    pub fn take_spawned(&mut self) -> Vec<ParticleSpawned> {
        std::mem::take(&mut self.spawned)
    }
}

pub fn death_effects_system(
    time: Res<Time>,
    mut effects: ResMut<DeathEffects>,
    mut rng: ResMut<SessionRng>,
    mut killed: MessageReader<EnemyKilled>,
    mut sounds: MessageWriter<PlaySound>,
    mut spawned: MessageWriter<ParticleSpawned>,
) {
    for kill in killed.read() {
        let boss = kill.kind == EnemyKind::Boss;
        effects.spawn_burst(kill.position, boss, &mut rng.0);

        let mut sound = SoundRequest::new("audio/sfx/zombie-death.mp3").at(kill.position);
        if boss {
            sound = sound.priority();
        }
        sounds.write(PlaySound(sound));
    }

    effects.advance(time.delta());
    spawned.write_batch(effects.take_spawned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn config() -> ParticlePoolConfig {
        ParticlePoolConfig {
            initial_pool: 10,
            low_water_mark: 4,
            replenish_batch: 5,
            max_pool: 20,
            max_active: 12,
            burst_size: 5,
            lifetime_ms: 1_000,
            sweep_interval_ms: 250,
        }
    }

    #[test]
    fn active_count_respects_the_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut effects = DeathEffects::new(config());
        assert_eq!(effects.spawn_burst(Vec3::ZERO, false, &mut rng), 5);
        assert_eq!(effects.spawn_burst(Vec3::ZERO, false, &mut rng), 5);
        assert_eq!(effects.spawn_burst(Vec3::ZERO, false, &mut rng), 2);
        assert_eq!(effects.active(), 12);
        assert_eq!(effects.dropped(), 3);
        assert_eq!(effects.take_spawned().len(), 12);
    }

    #[test]
    fn pool_replenishes_below_low_water_up_to_the_ceiling() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut effects = DeathEffects::new(config());
        assert_eq!(effects.allocated(), 10);

        effects.spawn_burst(Vec3::ZERO, false, &mut rng);
        effects.spawn_burst(Vec3::ZERO, false, &mut rng);
        assert!(effects.allocated() > 10);

        for _ in 0..10 {
            effects.spawn_burst(Vec3::ZERO, true, &mut rng);
        }
        assert_eq!(effects.allocated(), 20);
        assert_eq!(effects.active(), 20);
    }

    #[test]
    fn particles_return_after_their_lifetime() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut effects = DeathEffects::new(config());
        effects.spawn_burst(Vec3::ZERO, false, &mut rng);

        effects.advance(Duration::from_millis(999));
        assert_eq!(effects.active(), 5);
        effects.advance(Duration::from_millis(1));
        assert_eq!(effects.active(), 0);
        assert_eq!(effects.free(), effects.allocated());
    }

    #[test]
    fn sweep_reclaims_particles_whose_release_was_lost() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut effects = DeathEffects::new(config());
        effects.spawn_burst(Vec3::ZERO, false, &mut rng);
        effects.releases.clear();

        effects.advance(Duration::from_millis(1_000));
        assert_eq!(effects.active(), 0);
    }

    #[test]
    fn stale_release_does_not_free_a_recycled_particle() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut effects = DeathEffects::new(config());
        effects.spawn_burst(Vec3::ZERO, false, &mut rng);

        // Force-reclaim early, then reuse the same slots.
        for index in 0..effects.slab.len() {
            effects.release(index, None);
        }
        effects.advance(Duration::from_millis(500));
        effects.spawn_burst(Vec3::ZERO, false, &mut rng);
        assert_eq!(effects.active(), 5);

        // The first burst's releases fire at 1000ms and must not touch the
        // second burst, which lives until 1500ms.
        effects.advance(Duration::from_millis(500));
        assert_eq!(effects.active(), 5);
        effects.advance(Duration::from_millis(500));
        assert_eq!(effects.active(), 0);
    }
}
