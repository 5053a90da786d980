//! Damage taken and dealt by enemies.

use bevy::prelude::*;

use crate::character::player::PlayerId;

use super::{EnemyConfig, EnemyInstance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInput {
    pub amount: f32,
    pub attacker: Option<PlayerId>,
    /// Explicit headshot flag from the host. When absent, the hit point decides.
    pub headshot: Option<bool>,
    pub hit_point: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Damage after the headshot multiplier.
    pub applied: f32,
    pub headshot: bool,
    /// Money owed to the attacker, zero when there is none.
    pub reward: f32,
    pub killed: bool,
}

/// True when `hit_point` lies in the head band above `position` and close to
/// the entity's vertical axis.
pub fn is_headshot(hit_point: Vec3, position: Vec3, config: &EnemyConfig) -> bool {
    let offset = hit_point - position;
    let horizontal = Vec2::new(offset.x, offset.z).length();
    (config.head_min_height..=config.head_max_height).contains(&offset.y)
        && horizontal <= config.head_radius
}

/// Share of the reward pool earned by `damage`. Headshots pay double.
pub fn reward_for(damage: f32, max_health: f32, reward_pool: f32, headshot: bool) -> f32 {
    if max_health <= 0.0 {
        return 0.0;
    }
    let factor = if headshot { 2.0 } else { 1.0 };
    damage / max_health * reward_pool * factor
}

impl EnemyInstance {
    /// Applies a hit. Returns `None` once the enemy is already dead, so a
    /// second lethal hit can neither despawn nor reward twice.
    pub fn take_damage(
        &mut self,
        input: &DamageInput,
        position: Vec3,
        config: &EnemyConfig,
    ) -> Option<DamageOutcome> {
        if self.dead {
            return None;
        }

        let headshot = input
            .headshot
            .or_else(|| input.hit_point.map(|point| is_headshot(point, position, config)))
            .unwrap_or(false);

        let applied = if headshot {
            input.amount * self.headshot_multiplier
        } else {
            input.amount
        };
        self.health -= applied;

        let reward = match input.attacker {
            Some(_) => reward_for(input.amount, self.max_health, self.reward, headshot),
            None => 0.0,
        };

        let killed = self.health <= 0.0;
        if killed {
            self.dead = true;
        }

        Some(DamageOutcome {
            applied,
            headshot,
            reward,
            killed,
        })
    }

    /// Marks the enemy dead without a killer. Returns false if it already was.
    pub fn kill(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        true
    }

    /// Melee swing at a target `distance` away. Returns the damage dealt.
    pub fn try_attack(&mut self, now_ms: u64, distance: f32, config: &EnemyConfig) -> Option<f32> {
        if self.dead || distance > config.attack_range {
            return None;
        }
        if self
            .last_attack_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < config.attack_cooldown_ms)
        {
            return None;
        }
        self.last_attack_ms = Some(now_ms);
        Some(self.damage)
    }
}
