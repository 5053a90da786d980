//! Hitscan guns.
//!
//! Every gun is one `GunConfig`; what differs between a pistol, a rifle and a
//! shotgun is data plus a `FireMode` tag. Whether the trigger state allows a
//! shot and which rays a shot produces are pure functions of that tag.

pub mod systems;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireMode {
    /// One shot per trigger press.
    SemiAuto,
    /// Keeps firing while the trigger is held.
    FullAuto,
    /// One press fires `pellets` rays inside a cone.
    Spread { pellets: u32, spread_degrees: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GunConfig {
    pub id: String,
    pub name: String,
    /// Damage of a single ray.
    pub damage: f32,
    /// Minimum time between two shots.
    pub fire_interval_ms: u64,
    pub magazine_size: u32,
    pub reserve_ammo: u32,
    pub reload_ms: u64,
    pub range: f32,
    pub fire_mode: FireMode,
}

impl GunConfig {
    pub fn pistol() -> Self {
        Self {
            id: "pistol".into(),
            name: "Pistol".into(),
            damage: 3.0,
            fire_interval_ms: 150,
            magazine_size: 10,
            reserve_ammo: 80,
            reload_ms: 1_200,
            range: 60.0,
            fire_mode: FireMode::SemiAuto,
        }
    }

    pub fn shotgun() -> Self {
        Self {
            id: "shotgun".into(),
            name: "Shotgun".into(),
            damage: 2.5,
            fire_interval_ms: 700,
            magazine_size: 6,
            reserve_ammo: 36,
            reload_ms: 2_000,
            range: 20.0,
            fire_mode: FireMode::Spread {
                pellets: 8,
                spread_degrees: 12.0,
            },
        }
    }

    pub fn rifle() -> Self {
        Self {
            id: "ar15".into(),
            name: "AR-15".into(),
            damage: 2.5,
            fire_interval_ms: 100,
            magazine_size: 30,
            reserve_ammo: 210,
            reload_ms: 1_800,
            range: 80.0,
            fire_mode: FireMode::FullAuto,
        }
    }
}

/// Trigger state for one tick, as reported by the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerState {
    /// The trigger went down this tick.
    pub pressed: bool,
    /// The trigger is down (including the tick it was pressed).
    pub held: bool,
}

/// Holding the trigger only keeps firing in full-auto; the other modes need a
/// fresh press for every shot.
pub fn trigger_allows_fire(mode: FireMode, trigger: TriggerState) -> bool {
    match mode {
        FireMode::FullAuto => trigger.held || trigger.pressed,
        FireMode::SemiAuto | FireMode::Spread { .. } => trigger.pressed,
    }
}

/// Ray directions produced by one shot. Spread pellets are jittered inside a
/// cone of `spread_degrees` half-angle around `forward`.
pub fn spread_directions(mode: FireMode, forward: Vec3, rng: &mut impl Rng) -> Vec<Vec3> {
    let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    match mode {
        FireMode::SemiAuto | FireMode::FullAuto => vec![forward],
        FireMode::Spread {
            pellets,
            spread_degrees,
        } => {
            let max_angle = spread_degrees.to_radians();
            let (right, up) = forward.any_orthonormal_pair();
            (0..pellets.max(1))
                .map(|_| {
                    let angle = rng.gen::<f32>() * max_angle;
                    let around = rng.gen::<f32>() * std::f32::consts::TAU;
                    let offset = (right * around.cos() + up * around.sin()) * angle.sin();
                    (forward * angle.cos() + offset).normalize()
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireBlocked {
    Reloading,
    Cooldown,
    EmptyMagazine,
    TriggerNotReady,
}

/// A player's equipped gun and its ammo bookkeeping.
#[derive(Component, Debug, Clone)]
pub struct Gun {
    pub config: GunConfig,
    pub magazine: u32,
    pub reserve: u32,
    pub last_shot_ms: Option<u64>,
    pub reload_done_ms: Option<u64>,
}

impl Gun {
    pub fn new(config: GunConfig) -> Self {
        Self {
            magazine: config.magazine_size,
            reserve: config.reserve_ammo,
            config,
            last_shot_ms: None,
            reload_done_ms: None,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_done_ms.is_some()
    }

    /// Spends one round and returns the ray directions of the shot.
    pub fn try_fire(
        &mut self,
        now_ms: u64,
        trigger: TriggerState,
        forward: Vec3,
        rng: &mut impl Rng,
    ) -> Result<Vec<Vec3>, FireBlocked> {
        if !trigger_allows_fire(self.config.fire_mode, trigger) {
            return Err(FireBlocked::TriggerNotReady);
        }
        if self.is_reloading() {
            return Err(FireBlocked::Reloading);
        }
        if self
            .last_shot_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.config.fire_interval_ms)
        {
            return Err(FireBlocked::Cooldown);
        }
        if self.magazine == 0 {
            self.start_reload(now_ms);
            return Err(FireBlocked::EmptyMagazine);
        }

        self.magazine -= 1;
        self.last_shot_ms = Some(now_ms);
        Ok(spread_directions(self.config.fire_mode, forward, rng))
    }

    /// Starts a reload if it would do anything. Returns whether one started.
    pub fn start_reload(&mut self, now_ms: u64) -> bool {
        if self.is_reloading() || self.reserve == 0 || self.magazine >= self.config.magazine_size {
            return false;
        }
        self.reload_done_ms = Some(now_ms + self.config.reload_ms);
        true
    }

    /// Completes a pending reload once its delay has elapsed.
    pub fn update(&mut self, now_ms: u64) -> bool {
        match self.reload_done_ms {
            Some(done) if now_ms >= done => {
                let wanted = self.config.magazine_size - self.magazine;
                let loaded = wanted.min(self.reserve);
                self.magazine += loaded;
                self.reserve -= loaded;
                self.reload_done_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const PRESS: TriggerState = TriggerState {
        pressed: true,
        held: true,
    };
    const HOLD: TriggerState = TriggerState {
        pressed: false,
        held: true,
    };

    #[test]
    fn auto_fire_is_suppressed_outside_full_auto() {
        assert!(trigger_allows_fire(FireMode::FullAuto, HOLD));
        assert!(!trigger_allows_fire(FireMode::SemiAuto, HOLD));
        assert!(trigger_allows_fire(FireMode::SemiAuto, PRESS));
        assert!(!trigger_allows_fire(GunConfig::shotgun().fire_mode, HOLD));
    }

    #[test]
    fn spread_stays_inside_the_cone() {
        let mut rng = StdRng::seed_from_u64(7);
        let mode = GunConfig::shotgun().fire_mode;
        let rays = spread_directions(mode, Vec3::Z, &mut rng);
        assert_eq!(rays.len(), 8);

        let max_angle = 12f32.to_radians() + 1e-4;
        for ray in rays {
            assert!((ray.length() - 1.0).abs() < 1e-4);
            assert!(ray.angle_between(Vec3::Z) <= max_angle);
        }

        let single = spread_directions(FireMode::SemiAuto, Vec3::new(0.0, 0.0, 5.0), &mut rng);
        assert_eq!(single, vec![Vec3::Z]);
    }

    #[test]
    fn fire_interval_and_magazine_are_enforced() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut gun = Gun::new(GunConfig::rifle());

        assert!(gun.try_fire(0, PRESS, Vec3::Z, &mut rng).is_ok());
        assert_eq!(
            gun.try_fire(50, HOLD, Vec3::Z, &mut rng),
            Err(FireBlocked::Cooldown)
        );
        assert!(gun.try_fire(100, HOLD, Vec3::Z, &mut rng).is_ok());
        assert_eq!(gun.magazine, 28);

        gun.magazine = 0;
        assert_eq!(
            gun.try_fire(1_000, HOLD, Vec3::Z, &mut rng),
            Err(FireBlocked::EmptyMagazine)
        );
        assert!(gun.is_reloading());
        assert_eq!(
            gun.try_fire(1_500, HOLD, Vec3::Z, &mut rng),
            Err(FireBlocked::Reloading)
        );
    }

    #[test]
    fn reload_moves_rounds_from_reserve_after_delay() {
        let mut gun = Gun::new(GunConfig::pistol());
        gun.magazine = 4;
        gun.reserve = 3;

        assert!(gun.start_reload(0));
        assert!(!gun.start_reload(10));
        assert!(!gun.update(1_000));
        assert!(gun.update(1_200));
        assert_eq!((gun.magazine, gun.reserve), (7, 0));
        assert!(!gun.start_reload(2_000));
    }
}
