use tracing::{debug, info};

use crate::classes::{class_config, ClassConfig};
use crate::collision::{bullet_hits_player, collides};
use crate::constants::{BULLET_SIZE, KILL_SCORE};
use crate::error::{CommandError, CommandResult};
use crate::rng::Rng;
use crate::types::{Audience, BulletView, PlayerClass, ServerEvent, Vec2};

use super::store::BulletInternal;
use super::timers::{TimerKey, TimerKind};
use super::GameEngine;

/// Firing angles for one trigger pull. Multi-projectile weapons fan out
/// evenly, `spread` apart; single-projectile weapons get a random jitter
/// of up to half the spread either way.
pub fn spread_angles(angle: f32, config: &ClassConfig, rng: &mut Rng) -> Vec<f32> {
    let count = config.bullet_count.max(1);
    if count > 1 {
        let center = (count - 1) as f32 / 2.0;
        return (0..count)
            .map(|i| angle + (i as f32 - center) * config.spread)
            .collect();
    }
    if config.spread > 0.0 {
        vec![angle + rng.centered(config.spread)]
    } else {
        vec![angle]
    }
}

impl GameEngine {
    /// Fires the player's weapon at `angle`, returning the ids of the
    /// projectiles created. One round is spent per trigger pull.
    pub fn fire(&mut self, player_id: &str, angle: f32) -> CommandResult<Vec<String>> {
        let now_ms = self.elapsed_ms;
        let player = self
            .store
            .players
            .get(player_id)
            .ok_or_else(|| CommandError::PlayerNotFound(player_id.to_string()))?;
        if player.view.is_reloading {
            return Err(CommandError::Reloading);
        }
        if player.view.ammo == 0 {
            return Err(CommandError::OutOfAmmo);
        }
        let config = class_config(player.view.class);
        if let Some(last) = player.last_shot_at {
            if now_ms.saturating_sub(last) < config.fire_rate_ms {
                return Err(CommandError::FireCooldown);
            }
        }

        let origin = Vec2::new(player.view.x, player.view.y);
        let color = player.view.color.clone();
        let class = player.view.class;
        let angles = spread_angles(angle, config, &mut self.rng);

        if let Some(player) = self.store.players.get_mut(player_id) {
            player.view.ammo -= 1;
            player.view.angle = angle;
            player.last_shot_at = Some(now_ms);
        }

        let mut ids = Vec::with_capacity(angles.len());
        for shot_angle in angles {
            let id = self.make_id("bullet");
            let bullet = BulletInternal {
                view: BulletView {
                    id: id.clone(),
                    x: origin.x,
                    y: origin.y,
                    velocity_x: shot_angle.cos() * config.bullet_speed,
                    velocity_y: shot_angle.sin() * config.bullet_speed,
                    owner_id: player_id.to_string(),
                    color: color.clone(),
                    damage: config.muzzle_damage(),
                    class,
                },
                origin,
                max_range: config.max_range(),
            };
            self.emit(
                Audience::All,
                ServerEvent::BulletFired {
                    bullet: bullet.view.clone(),
                },
            );
            self.store.insert_bullet(bullet);
            ids.push(id);
        }
        self.stats.shots_fired += 1;
        Ok(ids)
    }

    /// Starts a reload. Completion is deferred by the class reload time.
    pub fn reload(&mut self, player_id: &str) -> CommandResult<()> {
        let due_ms = {
            let player = self
                .store
                .players
                .get_mut(player_id)
                .ok_or_else(|| CommandError::PlayerNotFound(player_id.to_string()))?;
            let config = class_config(player.view.class);
            if player.view.is_reloading {
                return Err(CommandError::Reloading);
            }
            if player.view.ammo >= config.max_ammo {
                return Err(CommandError::MagazineFull);
            }
            if player.view.reserve == 0 {
                return Err(CommandError::NoReserve);
            }
            player.view.is_reloading = true;
            self.elapsed_ms + config.reload_time_ms
        };
        self.timers.schedule(
            TimerKey::new(TimerKind::ReloadComplete, player_id),
            due_ms,
        );
        Ok(())
    }

    pub(super) fn complete_reload(&mut self, player_id: &str) {
        let Some(player) = self.store.players.get_mut(player_id) else {
            return;
        };
        let config = class_config(player.view.class);
        let transfer = config
            .max_ammo
            .saturating_sub(player.view.ammo)
            .min(player.view.reserve);
        player.view.ammo += transfer;
        player.view.reserve -= transfer;
        player.view.is_reloading = false;
    }

    /// Moves every projectile one step and resolves what it runs into.
    pub(super) fn advance_bullets(&mut self, frame: f32) {
        let player_ids = self.store.sorted_player_ids();
        for bullet_id in self.store.sorted_bullet_ids() {
            let Some(bullet) = self.store.bullets.get_mut(&bullet_id) else {
                continue;
            };
            bullet.view.x += bullet.view.velocity_x * frame;
            bullet.view.y += bullet.view.velocity_y * frame;

            let (x, y) = (bullet.view.x, bullet.view.y);
            let burned_out = bullet
                .max_range
                .is_some_and(|range| bullet.travel_distance() > range);
            if burned_out
                || self.world.is_out_of_bounds(x, y)
                || collides(x, y, BULLET_SIZE, &self.world.walls)
            {
                self.store.bullets.remove(&bullet_id);
                continue;
            }

            let owner_id = bullet.view.owner_id.clone();
            let target = player_ids.iter().find(|id| {
                **id != owner_id
                    && self
                        .store
                        .players
                        .get(id.as_str())
                        .is_some_and(|player| bullet_hits_player(x, y, player.view.x, player.view.y))
            });
            if let Some(target_id) = target.cloned() {
                self.apply_hit(&bullet_id, &target_id);
            }
        }
    }

    /// Consumes the projectile and applies its damage to `target_id`.
    fn apply_hit(&mut self, bullet_id: &str, target_id: &str) {
        let Some(bullet) = self.store.bullets.remove(bullet_id) else {
            return;
        };
        let damage = class_config(bullet.view.class).damage_at(bullet.travel_distance());
        self.stats.bullets_hit += 1;
        self.emit(
            Audience::All,
            ServerEvent::BulletHit {
                id: bullet_id.to_string(),
                target_id: target_id.to_string(),
            },
        );

        let Some(target) = self.store.players.get_mut(target_id) else {
            return;
        };
        target.view.health = (target.view.health - damage).max(0);
        debug!(
            bullet_id,
            target_id,
            damage,
            health = target.view.health,
            "projectile hit"
        );
        if target.view.health <= 0 {
            self.kill_player(target_id, &bullet.view.owner_id, bullet.view.class);
        }
    }

    /// Credits the killer, removes the victim and schedules a bot
    /// replacement when the victim was a bot.
    pub(super) fn kill_player(&mut self, victim_id: &str, killer_id: &str, killer_class: PlayerClass) {
        let Some(victim) = self.take_player(victim_id) else {
            return;
        };
        if let Some(killer) = self.store.players.get_mut(killer_id) {
            killer.view.kills += 1;
            killer.view.score += KILL_SCORE;
        }
        self.stats.kills += 1;
        info!(
            killer_id,
            victim_id,
            killer_class = killer_class.as_str(),
            victim_is_bot = victim.is_bot(),
            "player killed"
        );

        self.emit(
            Audience::All,
            ServerEvent::PlayerKilled {
                killer_id: killer_id.to_string(),
                victim_id: victim_id.to_string(),
            },
        );
        if victim.is_bot() {
            self.timers.schedule(
                TimerKey::new(TimerKind::BotRespawn, victim_id),
                self.elapsed_ms + crate::constants::BOT_RESPAWN_DELAY_MS,
            );
        } else {
            self.emit(
                Audience::Only(victim_id.to_string()),
                ServerEvent::YouDied {
                    killer_id: killer_id.to_string(),
                    killer_class,
                },
            );
        }
    }
}
