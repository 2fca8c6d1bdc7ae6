use serde::Serialize;

use crate::classes::ClassConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerClass {
    Shotgun,
    Sniper,
    Rifle,
    Pyro,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Shotgun,
        PlayerClass::Sniper,
        PlayerClass::Rifle,
        PlayerClass::Pyro,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "shotgun" => Some(Self::Shotgun),
            "sniper" => Some(Self::Sniper),
            "rifle" => Some(Self::Rifle),
            "pyro" => Some(Self::Pyro),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shotgun => "shotgun",
            Self::Sniper => "sniper",
            Self::Rifle => "rifle",
            Self::Pyro => "pyro",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpType {
    Health,
    Speed,
    Ammo,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 3] = [PowerUpType::Health, PowerUpType::Speed, PowerUpType::Ammo];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub color: String,
    pub class: PlayerClass,
    pub health: i32,
    #[serde(rename = "maxHealth")]
    pub max_health: i32,
    pub ammo: u32,
    pub reserve: u32,
    #[serde(rename = "isReloading")]
    pub is_reloading: bool,
    pub speed: f32,
    pub score: i32,
    pub kills: u32,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    #[serde(rename = "botName", skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BulletView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "velocityX")]
    pub velocity_x: f32,
    #[serde(rename = "velocityY")]
    pub velocity_y: f32,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub color: String,
    pub damage: i32,
    pub class: PlayerClass,
}

#[derive(Clone, Debug, Serialize)]
pub struct PowerUpView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: PowerUpType,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    PlayerJoined {
        player: PlayerView,
    },
    PlayerLeft {
        id: String,
    },
    BulletFired {
        bullet: BulletView,
    },
    BulletHit {
        id: String,
        #[serde(rename = "targetId")]
        target_id: String,
    },
    PowerUpSpawned {
        #[serde(rename = "powerUp")]
        power_up: PowerUpView,
    },
    PowerUpCollected {
        id: String,
        #[serde(rename = "playerId")]
        player_id: String,
    },
    PlayerKilled {
        #[serde(rename = "killerId")]
        killer_id: String,
        #[serde(rename = "victimId")]
        victim_id: String,
    },
    YouDied {
        #[serde(rename = "killerId")]
        killer_id: String,
        #[serde(rename = "killerClass")]
        killer_class: PlayerClass,
    },
}

/// Who an outbound event is addressed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(String),
    Only(String),
}

#[derive(Clone, Debug)]
pub struct OutboundEvent {
    pub audience: Audience,
    pub event: ServerEvent,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldUpdate {
    pub tick: u64,
    pub players: Vec<PlayerView>,
    pub bullets: Vec<BulletView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JoinSnapshot {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub players: Vec<PlayerView>,
    pub bullets: Vec<BulletView>,
    #[serde(rename = "powerUps")]
    pub power_ups: Vec<PowerUpView>,
    pub walls: Vec<Wall>,
    #[serde(rename = "mapWidth")]
    pub map_width: f32,
    #[serde(rename = "mapHeight")]
    pub map_height: f32,
    pub classes: Vec<ClassConfig>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Correction {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub ammo: u32,
    pub reserve: u32,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreEntry {
    pub id: String,
    pub name: String,
    pub class: PlayerClass,
    pub score: i32,
    pub kills: u32,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_parse_round_trips_names() {
        for class in PlayerClass::ALL {
            assert_eq!(PlayerClass::parse(class.as_str()), Some(class));
        }
        assert_eq!(PlayerClass::parse("bazooka"), None);
        assert_eq!(PlayerClass::parse("Rifle"), None);
    }

    #[test]
    fn events_serialize_with_camel_case_tags() {
        let event = ServerEvent::PlayerKilled {
            killer_id: "player_1".to_string(),
            victim_id: "bot_2".to_string(),
        };
        let value = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(
            value,
            json!({ "type": "playerKilled", "killerId": "player_1", "victimId": "bot_2" })
        );

        let died = ServerEvent::YouDied {
            killer_id: "bot_2".to_string(),
            killer_class: PlayerClass::Sniper,
        };
        let value = serde_json::to_value(&died).expect("event serializes");
        assert_eq!(value["type"], "youDied");
        assert_eq!(value["killerClass"], "sniper");
    }
}
