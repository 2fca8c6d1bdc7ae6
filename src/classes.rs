//! Per-archetype weapon and movement tuning.

use serde::Serialize;

use crate::constants::{FLAME_RANGE, PLAYER_BASE_SPEED};
use crate::types::PlayerClass;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageModel {
    Fixed {
        damage: i32,
    },
    /// Damage grows linearly with travel distance up to `range`.
    Falloff {
        #[serde(rename = "baseDamage")]
        base_damage: i32,
        #[serde(rename = "maxDamage")]
        max_damage: i32,
        range: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassConfig {
    pub class: PlayerClass,
    #[serde(rename = "bulletSpeed")]
    pub bullet_speed: f32,
    #[serde(rename = "bulletCount")]
    pub bullet_count: u32,
    pub spread: f32,
    #[serde(rename = "fireRate")]
    pub fire_rate_ms: u64,
    pub damage: DamageModel,
    #[serde(rename = "maxAmmo")]
    pub max_ammo: u32,
    #[serde(rename = "maxReserve")]
    pub max_reserve: u32,
    #[serde(rename = "reloadTime")]
    pub reload_time_ms: u64,
    #[serde(rename = "speedMultiplier")]
    pub speed_multiplier: f32,
    /// Flame projectiles burn out after `FLAME_RANGE` of travel.
    pub flame: bool,
}

const SHOTGUN: ClassConfig = ClassConfig {
    class: PlayerClass::Shotgun,
    bullet_speed: 10.0,
    bullet_count: 3,
    spread: 0.3,
    fire_rate_ms: 600,
    damage: DamageModel::Fixed { damage: 20 },
    max_ammo: 8,
    max_reserve: 32,
    reload_time_ms: 1_500,
    speed_multiplier: 1.0,
    flame: false,
};

const SNIPER: ClassConfig = ClassConfig {
    class: PlayerClass::Sniper,
    bullet_speed: 20.0,
    bullet_count: 1,
    spread: 0.0,
    fire_rate_ms: 800,
    damage: DamageModel::Falloff {
        base_damage: 30,
        max_damage: 80,
        range: 900.0,
    },
    max_ammo: 5,
    max_reserve: 20,
    reload_time_ms: 2_000,
    speed_multiplier: 0.9,
    flame: false,
};

const RIFLE: ClassConfig = ClassConfig {
    class: PlayerClass::Rifle,
    bullet_speed: 12.0,
    bullet_count: 1,
    spread: 0.05,
    fire_rate_ms: 100,
    damage: DamageModel::Fixed { damage: 15 },
    max_ammo: 40,
    max_reserve: 120,
    reload_time_ms: 1_800,
    speed_multiplier: 1.0,
    flame: false,
};

const PYRO: ClassConfig = ClassConfig {
    class: PlayerClass::Pyro,
    bullet_speed: 8.0,
    bullet_count: 1,
    spread: 0.35,
    fire_rate_ms: 60,
    damage: DamageModel::Fixed { damage: 4 },
    max_ammo: 100,
    max_reserve: 200,
    reload_time_ms: 2_500,
    speed_multiplier: 1.1,
    flame: true,
};

pub fn class_config(class: PlayerClass) -> &'static ClassConfig {
    match class {
        PlayerClass::Shotgun => &SHOTGUN,
        PlayerClass::Sniper => &SNIPER,
        PlayerClass::Rifle => &RIFLE,
        PlayerClass::Pyro => &PYRO,
    }
}

pub fn catalog() -> Vec<ClassConfig> {
    PlayerClass::ALL
        .iter()
        .map(|class| *class_config(*class))
        .collect()
}

impl ClassConfig {
    pub fn base_speed(&self) -> f32 {
        PLAYER_BASE_SPEED * self.speed_multiplier
    }

    /// Damage a projectile of this class deals after travelling `distance`.
    pub fn damage_at(&self, distance: f32) -> i32 {
        match self.damage {
            DamageModel::Fixed { damage } => damage,
            DamageModel::Falloff {
                base_damage,
                max_damage,
                range,
            } => falloff_damage(base_damage, max_damage, range, distance),
        }
    }

    /// Damage stamped on a freshly fired projectile.
    pub fn muzzle_damage(&self) -> i32 {
        self.damage_at(0.0)
    }

    pub fn max_range(&self) -> Option<f32> {
        self.flame.then_some(FLAME_RANGE)
    }
}

pub fn falloff_damage(base_damage: i32, max_damage: i32, range: f32, distance: f32) -> i32 {
    let ratio = if range > 0.0 {
        (distance / range).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let damage = base_damage as f32 + (max_damage - base_damage) as f32 * ratio;
    damage.round() as i32
}
