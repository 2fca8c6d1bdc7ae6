use super::*;

use tracing::{debug, info};

use crate::collision::distance_sq;
use crate::constants::{
    BOT_AIM_JITTER, BOT_ARRIVE_DISTANCE, BOT_ENGAGE_RANGE, BOT_NAMES, BOT_RETARGET_CHANCE,
};

use super::utils::{angle_between, random_class, step_toward};

impl GameEngine {
    pub(super) fn spawn_bot(&mut self) -> String {
        let id = self.make_id("bot");
        let name = BOT_NAMES[self.rng.pick_index(BOT_NAMES.len())];
        let class = random_class(&mut self.rng);
        let bot = self.create_player(&id, name, class, Some(BotBrain::default()));
        info!(bot_id = %id, name, class = class.as_str(), "bot spawned");
        self.emit(
            Audience::All,
            ServerEvent::PlayerJoined {
                player: bot.view.clone(),
            },
        );
        self.store.insert_player(bot);
        self.stats.bots_spawned += 1;
        id
    }

    pub(super) fn update_bots(&mut self, frame: f32, now_ms: u64) {
        let player_ids = self.store.sorted_player_ids();
        for bot_id in self.store.sorted_bot_ids() {
            self.wander(&bot_id, frame);
            self.engage(&bot_id, &player_ids, now_ms);
        }
    }

    /// Drifts toward a wander target, picking a fresh one on arrival, on a
    /// wall bump, or at random.
    fn wander(&mut self, bot_id: &str, frame: f32) {
        let Some(bot) = self.store.players.get(bot_id) else {
            return;
        };
        let (x, y, speed) = (bot.view.x, bot.view.y, bot.view.speed);
        let current = bot.bot.as_ref().and_then(|brain| brain.wander_target);

        let target = match current {
            Some(target) if !self.rng.chance(BOT_RETARGET_CHANCE) => target,
            _ => self.world.random_open_position(PLAYER_SIZE, &mut self.rng),
        };

        let (dx, dy) = step_toward(x, y, target.x, target.y, speed * frame);
        let outcome = resolve_movement(x, y, dx, dy, PLAYER_SIZE, &self.world.walls);
        let (nx, ny) = self.world.clamp_to_arena(outcome.x, outcome.y);

        let arrived =
            distance_sq(nx, ny, target.x, target.y) <= BOT_ARRIVE_DISTANCE * BOT_ARRIVE_DISTANCE;
        let next_target = if outcome.blocked || arrived {
            Some(self.world.random_open_position(PLAYER_SIZE, &mut self.rng))
        } else {
            Some(target)
        };

        if let Some(bot) = self.store.players.get_mut(bot_id) {
            bot.view.x = nx;
            bot.view.y = ny;
            if let Some(brain) = bot.bot.as_mut() {
                brain.wander_target = next_target;
            }
        }
    }

    /// Faces the nearest opponent and shoots when it is in range and the
    /// weapon is ready. Empties trigger a reload.
    fn engage(&mut self, bot_id: &str, player_ids: &[String], now_ms: u64) {
        let Some(bot) = self.store.players.get(bot_id) else {
            return;
        };
        let (x, y) = (bot.view.x, bot.view.y);
        let config = class_config(bot.view.class);
        let needs_reload = bot.view.ammo == 0 && bot.view.reserve > 0 && !bot.view.is_reloading;
        let weapon_ready = bot.view.ammo > 0
            && !bot.view.is_reloading
            && bot
                .last_shot_at
                .map_or(true, |last| now_ms.saturating_sub(last) >= config.fire_rate_ms);

        if needs_reload {
            if let Err(err) = self.reload(bot_id) {
                debug!(bot_id, %err, "bot could not reload");
            }
            return;
        }

        let nearest = player_ids
            .iter()
            .filter(|id| id.as_str() != bot_id)
            .filter_map(|id| {
                let other = self.store.players.get(id)?;
                Some((distance_sq(x, y, other.view.x, other.view.y), other.view.x, other.view.y))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        let Some((dist_sq, tx, ty)) = nearest else {
            return;
        };

        let angle = angle_between(x, y, tx, ty);
        if let Some(bot) = self.store.players.get_mut(bot_id) {
            bot.view.angle = angle;
        }
        if weapon_ready && dist_sq <= BOT_ENGAGE_RANGE * BOT_ENGAGE_RANGE {
            let aim = angle + self.rng.centered(BOT_AIM_JITTER);
            if let Err(err) = self.fire(bot_id, aim) {
                debug!(bot_id, %err, "bot could not fire");
            }
        }
    }
}
