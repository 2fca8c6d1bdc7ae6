use serde::Serialize;
use tracing::debug;

use crate::classes::{catalog, class_config};
use crate::collision::resolve_movement;
use crate::constants::{
    frame_scale, INITIAL_POWER_UPS, MAX_HEALTH, PLAYER_SIZE, POSITION_SLACK_FRAMES,
    POWER_UP_INTERVAL_MS,
};
use crate::error::{CommandError, CommandResult};
use crate::rng::Rng;
use crate::server_utils::entity_order_key;
use crate::types::{
    Audience, BulletView, Correction, JoinSnapshot, OutboundEvent, PlayerClass, PlayerView,
    PowerUpView, ScoreEntry, ServerEvent, WorldUpdate,
};
use crate::world::StaticWorld;

mod bot_system;
mod combat;
mod power_up_system;
mod spawn_system;
mod store;
pub mod timers;
mod utils;

pub use self::combat::spread_angles;

use self::store::{BotBrain, EntityStore, PlayerInternal};
use self::timers::{TimerKind, TimerQueue};
use self::utils::{random_color, wall_clock_ms};

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub bot_target: usize,
    pub world: StaticWorld,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            bot_target: crate::constants::DEFAULT_BOT_COUNT,
            world: StaticWorld::default(),
        }
    }
}

/// Running totals for the whole match.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MatchStats {
    #[serde(rename = "shotsFired")]
    pub shots_fired: u64,
    #[serde(rename = "bulletsHit")]
    pub bullets_hit: u64,
    pub kills: u64,
    #[serde(rename = "powerUpsCollected")]
    pub power_ups_collected: u64,
    #[serde(rename = "botsSpawned")]
    pub bots_spawned: u64,
}

/// The simulation context: owns every entity and all deferred effects.
/// Callers serialise access to it; nothing in here is shared.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub world: StaticWorld,

    rng: Rng,
    store: EntityStore,
    timers: TimerQueue,
    events: Vec<OutboundEvent>,
    stats: MatchStats,
    bot_target: usize,
    seed: u32,

    elapsed_ms: u64,
    tick_counter: u64,
    spawn_cursor: usize,
    next_power_up_at: u64,
    next_id_counter: u64,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions, seed: u32) -> Self {
        let mut engine = Self {
            world: options.world,
            rng: Rng::new(seed),
            store: EntityStore::default(),
            timers: TimerQueue::default(),
            events: Vec::new(),
            stats: MatchStats::default(),
            bot_target: options.bot_target,
            seed,
            elapsed_ms: 0,
            tick_counter: 0,
            spawn_cursor: 0,
            next_power_up_at: POWER_UP_INTERVAL_MS,
            next_id_counter: 1,
        };
        for _ in 0..INITIAL_POWER_UPS {
            engine.spawn_power_up();
        }
        for _ in 0..engine.bot_target {
            engine.spawn_bot();
        }
        engine
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Simulation clock in milliseconds since the engine started.
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn step(&mut self, dt_ms: u64) {
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;
        let frame = frame_scale(dt_ms);

        self.run_due_timers(now_ms);
        self.update_bots(frame, now_ms);
        self.advance_bullets(frame);
        self.resolve_power_up_pickups();
        self.update_power_up_spawner(now_ms);
    }

    fn run_due_timers(&mut self, now_ms: u64) {
        for key in self.timers.pop_due(now_ms) {
            match key.kind {
                TimerKind::ReloadComplete => self.complete_reload(&key.entity_id),
                TimerKind::SpeedBoostExpired => self.expire_speed_boost(&key.entity_id),
                TimerKind::BotRespawn => {
                    if self.store.bot_count() < self.bot_target {
                        self.spawn_bot();
                    }
                }
            }
        }
    }

    /// Adds a human-controlled player and announces it to everyone else.
    pub fn join(&mut self, name: &str, class: PlayerClass) -> String {
        let id = self.make_id("player");
        let player = self.create_player(&id, name, class, None);
        self.emit(
            Audience::AllExcept(id.clone()),
            ServerEvent::PlayerJoined {
                player: player.view.clone(),
            },
        );
        self.store.insert_player(player);
        id
    }

    pub(crate) fn create_player(
        &mut self,
        id: &str,
        name: &str,
        class: PlayerClass,
        bot: Option<BotBrain>,
    ) -> PlayerInternal {
        let config = class_config(class);
        let spawn = self.next_spawn_position();
        let color = random_color(&mut self.rng);
        let is_bot = bot.is_some();
        PlayerInternal {
            view: PlayerView {
                id: id.to_string(),
                name: name.to_string(),
                x: spawn.x,
                y: spawn.y,
                angle: 0.0,
                color,
                class,
                health: MAX_HEALTH,
                max_health: MAX_HEALTH,
                ammo: config.max_ammo,
                reserve: config.max_reserve,
                is_reloading: false,
                speed: config.base_speed(),
                score: 0,
                kills: 0,
                is_bot,
                bot_name: is_bot.then(|| name.to_string()),
            },
            last_shot_at: None,
            bot,
        }
    }

    /// Removes a player on disconnect. Returns false if it was already gone.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        if self.take_player(player_id).is_none() {
            return false;
        }
        self.emit(
            Audience::All,
            ServerEvent::PlayerLeft {
                id: player_id.to_string(),
            },
        );
        true
    }

    /// Drops the entity and any deferred effects aimed at it.
    fn take_player(&mut self, player_id: &str) -> Option<PlayerInternal> {
        self.timers.cancel_entity(player_id);
        self.store.remove_player(player_id)
    }

    /// Applies a client-reported position as a movement intent: the step is
    /// capped by the player's speed and resolved against the walls.
    pub fn update_position(
        &mut self,
        player_id: &str,
        x: f32,
        y: f32,
        angle: Option<f32>,
    ) -> CommandResult<()> {
        let player = self
            .store
            .players
            .get_mut(player_id)
            .ok_or_else(|| CommandError::PlayerNotFound(player_id.to_string()))?;

        let mut dx = x - player.view.x;
        let mut dy = y - player.view.y;
        let max_step = player.view.speed * POSITION_SLACK_FRAMES;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > max_step && dist > 0.0 {
            debug!(player_id, dist, max_step, "position report exceeds speed; capping");
            dx = dx / dist * max_step;
            dy = dy / dist * max_step;
        }

        let outcome = resolve_movement(
            player.view.x,
            player.view.y,
            dx,
            dy,
            PLAYER_SIZE,
            &self.world.walls,
        );
        let (cx, cy) = self.world.clamp_to_arena(outcome.x, outcome.y);
        player.view.x = cx;
        player.view.y = cy;
        if let Some(angle) = angle.filter(|angle| angle.is_finite()) {
            player.view.angle = angle;
        }
        Ok(())
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.store.players.contains_key(player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerView> {
        self.store.players.get(player_id).map(|player| &player.view)
    }

    /// Players in join order.
    pub fn players(&self) -> Vec<PlayerView> {
        let mut players: Vec<PlayerView> = self
            .store
            .players
            .values()
            .map(|player| player.view.clone())
            .collect();
        players.sort_by_key(|player| entity_order_key(&player.id));
        players
    }

    pub fn bullets(&self) -> Vec<BulletView> {
        let mut bullets: Vec<BulletView> = self
            .store
            .bullets
            .values()
            .map(|bullet| bullet.view.clone())
            .collect();
        bullets.sort_by_key(|bullet| entity_order_key(&bullet.id));
        bullets
    }

    pub fn power_ups(&self) -> Vec<PowerUpView> {
        let mut power_ups: Vec<PowerUpView> = self.store.power_ups.values().cloned().collect();
        power_ups.sort_by_key(|power_up| entity_order_key(&power_up.id));
        power_ups
    }

    pub fn bot_count(&self) -> usize {
        self.store.bot_count()
    }

    pub fn join_snapshot(&self, player_id: &str) -> JoinSnapshot {
        JoinSnapshot {
            player_id: player_id.to_string(),
            players: self.players(),
            bullets: self.bullets(),
            power_ups: self.power_ups(),
            walls: self.world.walls.clone(),
            map_width: self.world.width,
            map_height: self.world.height,
            classes: catalog(),
        }
    }

    pub fn build_update(&self) -> WorldUpdate {
        WorldUpdate {
            tick: self.tick_counter,
            players: self.players(),
            bullets: self.bullets(),
        }
    }

    /// Private authoritative state used by a client to correct prediction
    /// drift. `None` once the player is gone.
    pub fn correction_for(&self, player_id: &str) -> Option<Correction> {
        let player = self.store.players.get(player_id)?;
        Some(Correction {
            x: player.view.x,
            y: player.view.y,
            health: player.view.health,
            ammo: player.view.ammo,
            reserve: player.view.reserve,
            timestamp: wall_clock_ms(),
        })
    }

    pub fn scoreboard(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .store
            .players
            .values()
            .map(|player| ScoreEntry {
                id: player.view.id.clone(),
                name: player.view.name.clone(),
                class: player.view.class,
                score: player.view.score,
                kills: player.view.kills,
                is_bot: player.is_bot(),
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    pub fn drain_events(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, audience: Audience, event: ServerEvent) {
        self.events.push(OutboundEvent { audience, event });
    }

    fn make_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id_counter);
        self.next_id_counter = self.next_id_counter.saturating_add(1);
        id
    }
}
