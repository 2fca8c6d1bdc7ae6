use std::collections::HashMap;

use crate::types::{BulletView, PlayerView, PowerUpView, Vec2};

/// Bot-only decision state.
#[derive(Clone, Debug, Default)]
pub(crate) struct BotBrain {
    pub wander_target: Option<Vec2>,
}

#[derive(Clone, Debug)]
pub(crate) struct PlayerInternal {
    pub view: PlayerView,
    pub last_shot_at: Option<u64>,
    pub bot: Option<BotBrain>,
}

impl PlayerInternal {
    pub fn is_bot(&self) -> bool {
        self.bot.is_some()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BulletInternal {
    pub view: BulletView,
    pub origin: Vec2,
    pub max_range: Option<f32>,
}

impl BulletInternal {
    pub fn travel_distance(&self) -> f32 {
        let dx = self.view.x - self.origin.x;
        let dy = self.view.y - self.origin.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Every mutable entity in the arena, keyed by id.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityStore {
    pub players: HashMap<String, PlayerInternal>,
    pub bullets: HashMap<String, BulletInternal>,
    pub power_ups: HashMap<String, PowerUpView>,
}

impl EntityStore {
    pub fn insert_player(&mut self, player: PlayerInternal) {
        self.players.insert(player.view.id.clone(), player);
    }

    pub fn remove_player(&mut self, id: &str) -> Option<PlayerInternal> {
        self.players.remove(id)
    }

    pub fn insert_bullet(&mut self, bullet: BulletInternal) {
        self.bullets.insert(bullet.view.id.clone(), bullet);
    }

    pub fn insert_power_up(&mut self, power_up: PowerUpView) {
        self.power_ups.insert(power_up.id.clone(), power_up);
    }

    pub fn bot_count(&self) -> usize {
        self.players.values().filter(|player| player.is_bot()).count()
    }

    /// Ids in a stable order so a seeded run replays identically.
    pub fn sorted_player_ids(&self) -> Vec<String> {
        sorted_keys(&self.players)
    }

    pub fn sorted_bot_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .players
            .values()
            .filter(|player| player.is_bot())
            .map(|player| player.view.id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn sorted_bullet_ids(&self) -> Vec<String> {
        sorted_keys(&self.bullets)
    }

    pub fn sorted_power_up_ids(&self) -> Vec<String> {
        sorted_keys(&self.power_ups)
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut ids: Vec<String> = map.keys().cloned().collect();
    ids.sort_unstable();
    ids
}
