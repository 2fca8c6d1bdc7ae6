use super::*;

use crate::collision::distance_sq;
use crate::constants::{
    AMMO_PACK_AMOUNT, HEALTH_PACK_AMOUNT, MAX_POWER_UPS, PICKUP_RADIUS_SQ,
    SPEED_BOOST_DURATION_MS, SPEED_BOOST_FACTOR,
};
use crate::types::PowerUpType;

use super::timers::TimerKey;
use super::utils::random_power_up_type;

impl GameEngine {
    /// Drops one power-up of random type at a wall-free point, unless the
    /// arena already holds the maximum.
    pub(super) fn spawn_power_up(&mut self) -> Option<String> {
        if self.store.power_ups.len() >= MAX_POWER_UPS {
            return None;
        }
        let kind = random_power_up_type(&mut self.rng);
        let at = self.world.random_open_position(PLAYER_SIZE, &mut self.rng);
        let id = self.make_id("powerup");
        let power_up = PowerUpView {
            id: id.clone(),
            x: at.x,
            y: at.y,
            kind,
        };
        self.emit(
            Audience::All,
            ServerEvent::PowerUpSpawned {
                power_up: power_up.clone(),
            },
        );
        self.store.insert_power_up(power_up);
        Some(id)
    }

    pub(super) fn update_power_up_spawner(&mut self, now_ms: u64) {
        if now_ms < self.next_power_up_at {
            return;
        }
        self.next_power_up_at = now_ms.saturating_add(POWER_UP_INTERVAL_MS);
        self.spawn_power_up();
    }

    /// Every living player picks up every power-up within reach.
    pub(super) fn resolve_power_up_pickups(&mut self) {
        for player_id in self.store.sorted_player_ids() {
            for power_up_id in self.store.sorted_power_up_ids() {
                if self.in_pickup_reach(&player_id, &power_up_id) {
                    self.consume_power_up(&player_id, &power_up_id);
                }
            }
        }
    }

    /// Explicit pickup request. Rejected when the power-up is gone or out of
    /// reach, so a second request for the same id does nothing.
    pub fn collect_power_up(&mut self, player_id: &str, power_up_id: &str) -> CommandResult<()> {
        if !self.store.players.contains_key(player_id) {
            return Err(CommandError::PlayerNotFound(player_id.to_string()));
        }
        if !self.store.power_ups.contains_key(power_up_id) {
            return Err(CommandError::PowerUpMissing(power_up_id.to_string()));
        }
        if !self.in_pickup_reach(player_id, power_up_id) {
            return Err(CommandError::OutOfReach(power_up_id.to_string()));
        }
        self.consume_power_up(player_id, power_up_id);
        Ok(())
    }

    fn in_pickup_reach(&self, player_id: &str, power_up_id: &str) -> bool {
        match (
            self.store.players.get(player_id),
            self.store.power_ups.get(power_up_id),
        ) {
            (Some(player), Some(power_up)) => {
                distance_sq(player.view.x, player.view.y, power_up.x, power_up.y)
                    < PICKUP_RADIUS_SQ
            }
            _ => false,
        }
    }

    fn consume_power_up(&mut self, player_id: &str, power_up_id: &str) {
        let Some(power_up) = self.store.power_ups.remove(power_up_id) else {
            return;
        };
        self.apply_power_up(player_id, power_up.kind);
        self.stats.power_ups_collected += 1;
        self.emit(
            Audience::All,
            ServerEvent::PowerUpCollected {
                id: power_up_id.to_string(),
                player_id: player_id.to_string(),
            },
        );
    }

    fn apply_power_up(&mut self, player_id: &str, kind: PowerUpType) {
        let now_ms = self.elapsed_ms;
        let Some(player) = self.store.players.get_mut(player_id) else {
            return;
        };
        let config = class_config(player.view.class);
        match kind {
            PowerUpType::Health => {
                player.view.health =
                    (player.view.health + HEALTH_PACK_AMOUNT).min(player.view.max_health);
            }
            PowerUpType::Speed => {
                let boosted = config.base_speed() * SPEED_BOOST_FACTOR;
                player.view.speed = (player.view.speed * SPEED_BOOST_FACTOR).min(boosted);
                self.timers.schedule(
                    TimerKey::new(TimerKind::SpeedBoostExpired, player_id),
                    now_ms + SPEED_BOOST_DURATION_MS,
                );
            }
            PowerUpType::Ammo => {
                player.view.reserve =
                    (player.view.reserve + AMMO_PACK_AMOUNT).min(config.max_reserve);
            }
        }
    }

    pub(super) fn expire_speed_boost(&mut self, player_id: &str) {
        if let Some(player) = self.store.players.get_mut(player_id) {
            player.view.speed = class_config(player.view.class).base_speed();
        }
    }
}
