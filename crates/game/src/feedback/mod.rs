//! Presentation parameters derived from hits: damage numbers, colors and
//! combo banners. Everything except the systems is pure.

pub mod color;
pub mod damage_number;
pub mod systems;

use serde::{Deserialize, Serialize};

use color::{default_color_tiers, ColorTier};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub base_duration_ms: f32,
    pub duration_per_sqrt_damage: f32,
    pub max_duration_ms: f32,
    pub base_scale: f32,
    pub scale_per_damage: f32,
    pub headshot_scale_boost: f32,
    pub max_scale: f32,
    pub base_rise_height: f32,
    /// Spawn-to-hit distance at which the distance boost is maxed out.
    pub distance_normalization: f32,
    pub max_distance_boost: f32,
    pub color_tiers: Vec<ColorTier>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            base_duration_ms: 800.0,
            duration_per_sqrt_damage: 60.0,
            max_duration_ms: 1_800.0,
            base_scale: 1.0,
            scale_per_damage: 0.01,
            headshot_scale_boost: 1.3,
            max_scale: 2.5,
            base_rise_height: 1.2,
            distance_normalization: 30.0,
            max_distance_boost: 0.25,
            color_tiers: default_color_tiers(),
        }
    }
}
