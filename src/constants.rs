pub const TICK_MS: u64 = 16;
pub const CORRECTION_TICK_MS: u64 = 100;

pub const MAP_WIDTH: f32 = 2400.0;
pub const MAP_HEIGHT: f32 = 1800.0;
pub const BORDER_THICKNESS: f32 = 20.0;

pub const PLAYER_SIZE: f32 = 30.0;
pub const PLAYER_BASE_SPEED: f32 = 3.0;
pub const MAX_HEALTH: i32 = 100;
pub const HIT_RADIUS_SQ: f32 = (PLAYER_SIZE / 2.0) * (PLAYER_SIZE / 2.0);

pub const BULLET_SIZE: f32 = 10.0;
pub const FLAME_RANGE: f32 = 220.0;

pub const KILL_SCORE: i32 = 100;

pub const SPAWN_ATTEMPTS: usize = 100;
pub const SPAWN_MARGIN: f32 = 50.0;

/// Client position reports may move at most this many frames' worth of
/// travel from the authoritative position in one message.
pub const POSITION_SLACK_FRAMES: f32 = 3.0;

pub const POWER_UP_INTERVAL_MS: u64 = 10_000;
pub const INITIAL_POWER_UPS: usize = 3;
pub const MAX_POWER_UPS: usize = 12;
pub const PICKUP_RADIUS_SQ: f32 = 40.0 * 40.0;
pub const HEALTH_PACK_AMOUNT: i32 = 30;
pub const SPEED_BOOST_FACTOR: f32 = 1.5;
pub const SPEED_BOOST_DURATION_MS: u64 = 5_000;
pub const AMMO_PACK_AMOUNT: u32 = 20;

pub const DEFAULT_BOT_COUNT: usize = 4;
pub const MAX_BOT_COUNT: usize = 32;
pub const BOT_RESPAWN_DELAY_MS: u64 = 3_000;
pub const BOT_RETARGET_CHANCE: f32 = 0.02;
pub const BOT_ENGAGE_RANGE: f32 = 500.0;
pub const BOT_AIM_JITTER: f32 = 0.08;
pub const BOT_ARRIVE_DISTANCE: f32 = 20.0;

pub const PLAYER_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#E74C3C", "#3498DB",
];

pub const BOT_NAMES: [&str; 8] = [
    "Viper", "Ghost", "Havoc", "Rook", "Nova", "Blaze", "Talon", "Echo",
];

/// Motion is specified per reference frame; a tick of `dt_ms` advances
/// `dt_ms / TICK_MS` frames.
pub fn frame_scale(dt_ms: u64) -> f32 {
    dt_ms as f32 / TICK_MS as f32
}
