use serde::{Deserialize, Serialize};

/// One stop of the damage color ramp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorTier {
    pub threshold: f32,
    pub color: [u8; 3],
    pub glow: f32,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSample {
    pub color: [u8; 3],
    pub glow: f32,
    pub intensity: f32,
}

impl ColorSample {
    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

impl From<&ColorTier> for ColorSample {
    fn from(tier: &ColorTier) -> Self {
        Self {
            color: tier.color,
            glow: tier.glow,
            intensity: tier.intensity,
        }
    }
}

pub fn default_color_tiers() -> Vec<ColorTier> {
    vec![
        ColorTier {
            threshold: 0.0,
            color: [255, 255, 255],
            glow: 0.0,
            intensity: 1.0,
        },
        ColorTier {
            threshold: 25.0,
            color: [255, 235, 59],
            glow: 0.2,
            intensity: 1.1,
        },
        ColorTier {
            threshold: 50.0,
            color: [255, 152, 0],
            glow: 0.4,
            intensity: 1.25,
        },
        ColorTier {
            threshold: 100.0,
            color: [244, 67, 54],
            glow: 0.7,
            intensity: 1.5,
        },
        ColorTier {
            threshold: 200.0,
            color: [156, 39, 176],
            glow: 1.0,
            intensity: 1.8,
        },
    ]
}

/// Accelerates out of the lower stop and decelerates into the upper one.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Samples the ramp at `value`. Tiers must be sorted by threshold; values
/// outside the ramp take the nearest end.
pub fn interpolate(tiers: &[ColorTier], value: f32) -> ColorSample {
    let (Some(first), Some(last)) = (tiers.first(), tiers.last()) else {
        return ColorSample {
            color: [255, 255, 255],
            glow: 0.0,
            intensity: 1.0,
        };
    };
    if value <= first.threshold {
        return first.into();
    }
    if value >= last.threshold {
        return last.into();
    }

    let Some(pair) = tiers
        .windows(2)
        .find(|pair| value >= pair[0].threshold && value < pair[1].threshold)
    else {
        return last.into();
    };
    let (low, high) = (&pair[0], &pair[1]);
    let t = smoothstep((value - low.threshold) / (high.threshold - low.threshold));

    let mut color = [0u8; 3];
    for (channel, (a, b)) in color.iter_mut().zip(low.color.iter().zip(high.color.iter())) {
        *channel = lerp(f32::from(*a), f32::from(*b), t).round() as u8;
    }
    ColorSample {
        color,
        glow: lerp(low.glow, high.glow, t),
        intensity: lerp(low.intensity, high.intensity, t),
    }
}
