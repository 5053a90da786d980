//! Animation parameters of floating damage numbers and combo banners.

use bevy::prelude::*;

use super::{color::interpolate, FeedbackConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct DamageNumberStyle {
    pub duration_ms: u32,
    pub scale: f32,
    pub rise_height: f32,
    pub color: String,
    pub glow: f32,
    pub intensity: f32,
}

/// Bigger hits linger longer (with diminishing returns) and render larger.
/// A known spawn origin lets long-range hits read a little bigger.
pub fn damage_number_style(
    damage: f32,
    headshot: bool,
    hit_position: Vec3,
    spawn_origin: Option<Vec3>,
    config: &FeedbackConfig,
) -> DamageNumberStyle {
    let damage = damage.max(0.0);

    let duration = (config.base_duration_ms + config.duration_per_sqrt_damage * damage.sqrt())
        .min(config.max_duration_ms);

    let distance_boost = spawn_origin.map_or(1.0, |origin| {
        let normalized = (hit_position.distance(origin) / config.distance_normalization).min(1.0);
        1.0 + normalized * config.max_distance_boost
    });
    let headshot_boost = if headshot {
        config.headshot_scale_boost
    } else {
        1.0
    };
    let scale = ((config.base_scale + damage * config.scale_per_damage)
        * headshot_boost
        * distance_boost)
        .min(config.max_scale);

    let sample = interpolate(&config.color_tiers, damage);

    DamageNumberStyle {
        duration_ms: duration.round() as u32,
        scale,
        rise_height: config.base_rise_height * (1.0 + (scale - 1.0) * 0.5),
        color: sample.hex(),
        glow: sample.glow,
        intensity: sample.intensity,
    }
}

pub const COMBO_BANNERS: &[(u32, &str)] = &[
    (2, "COMBO!"),
    (5, "KILLING SPREE!"),
    (10, "RAMPAGE!"),
    (15, "DOMINATING!"),
    (20, "GODLIKE!"),
    (30, "UNSTOPPABLE!"),
];

/// Label of the highest tier reached by `kills`.
pub fn combo_banner(kills: u32) -> Option<&'static str> {
    COMBO_BANNERS
        .iter()
        .rev()
        .find(|(threshold, _)| kills >= *threshold)
        .map(|(_, label)| *label)
}

/// Number of tiers reached.
pub fn combo_level(kills: u32) -> u32 {
    COMBO_BANNERS
        .iter()
        .filter(|(threshold, _)| kills >= *threshold)
        .count() as u32
}

/// Banner to show when a streak reaches exactly a tier threshold.
pub fn banner_on_reach(kills: u32) -> Option<&'static str> {
    COMBO_BANNERS
        .iter()
        .find(|(threshold, _)| kills == *threshold)
        .map(|(_, label)| *label)
}
