use bevy::prelude::*;
use serde::Serialize;

use crate::character::player::PlayerId;

use super::scoreboard::ScoreboardEntry;

/// JSON payloads pushed to a single client. Serialized with an internal
/// `type` tag and camelCase fields, e.g. `{"type":"health","health":80,"maxHealth":100}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiMessage {
    Health {
        health: f32,
        max_health: f32,
    },
    Money {
        money: f32,
    },
    Ammo {
        gun: String,
        ammo: u32,
        reserve: u32,
        reloading: bool,
    },
    Countdown {
        seconds: u32,
    },
    GameStart,
    Wave {
        wave: u32,
    },
    GameOver {
        wave: u32,
    },
    Downed {
        downed: bool,
    },
    Scoreboard {
        players: Vec<ScoreboardEntry>,
        wave: u32,
    },
    Combo {
        level: u32,
        kills: u32,
    },
    ComboBanner {
        label: String,
        combo: u32,
    },
    DamageNumber(DamageNumberPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageNumberPayload {
    pub damage: f32,
    pub score: u32,
    pub combo: u32,
    pub headshot: bool,
    pub kill: bool,
    pub position: [f32; 3],
    pub duration_ms: u32,
    pub scale: f32,
    pub rise_height: f32,
    pub color: String,
    pub glow: f32,
    pub intensity: f32,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct UiPush {
    pub player: PlayerId,
    pub payload: UiMessage,
}

impl UiPush {
    pub fn new(player: PlayerId, payload: UiMessage) -> Self {
        Self { player, payload }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(message: &UiMessage) -> serde_json::Value {
        serde_json::to_value(message).unwrap()
    }

    #[test]
    fn health_payload_shape() {
        let payload = UiMessage::Health {
            health: 80.0,
            max_health: 100.0,
        };
        assert_eq!(
            value(&payload),
            json!({"type": "health", "health": 80.0, "maxHealth": 100.0})
        );
    }

    #[test]
    fn wave_and_combo_payload_shapes() {
        assert_eq!(value(&UiMessage::Wave { wave: 3 }), json!({"type": "wave", "wave": 3}));
        assert_eq!(
            value(&UiMessage::Combo { level: 2, kills: 5 }),
            json!({"type": "combo", "level": 2, "kills": 5})
        );
        assert_eq!(value(&UiMessage::GameStart), json!({"type": "gameStart"}));
    }

    #[test]
    fn scoreboard_payload_shape() {
        let payload = UiMessage::Scoreboard {
            players: vec![ScoreboardEntry {
                name: "ana".into(),
                kills: 4,
                headshots: 1,
                money: 120.0,
                score: 900,
                revives: 0,
                downs: 1,
            }],
            wave: 6,
        };
        assert_eq!(
            value(&payload),
            json!({
                "type": "scoreboard",
                "players": [{
                    "name": "ana", "kills": 4, "headshots": 1, "money": 120.0,
                    "score": 900, "revives": 0, "downs": 1
                }],
                "wave": 6
            })
        );
    }

    #[test]
    fn damage_number_is_flattened_under_its_tag() {
        let payload = UiMessage::DamageNumber(DamageNumberPayload {
            damage: 25.0,
            score: 40,
            combo: 2,
            headshot: true,
            kill: false,
            position: [1.0, 2.0, 3.0],
            duration_ms: 900,
            scale: 1.5,
            rise_height: 1.7,
            color: "#FFD700".into(),
            glow: 0.4,
            intensity: 1.2,
        });
        let json = value(&payload);
        assert_eq!(json["type"], "damageNumber");
        assert_eq!(json["durationMs"], 900);
        assert_eq!(json["riseHeight"], 1.7f32 as f64);
    }
}
