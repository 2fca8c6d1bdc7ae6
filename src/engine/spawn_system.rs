use super::*;

use crate::collision::collides;
use crate::types::Vec2;

impl GameEngine {
    /// Next clear entry of the spawn table, walking it round-robin. Falls
    /// back to the last candidate examined when every entry is blocked, and
    /// to a random open point when the table is empty.
    pub(super) fn next_spawn_position(&mut self) -> Vec2 {
        let table_len = self.world.spawn_points.len();
        if table_len == 0 {
            return self.world.random_open_position(PLAYER_SIZE, &mut self.rng);
        }

        let mut last = None;
        for _ in 0..table_len {
            let candidate = self.world.spawn_points[self.spawn_cursor % table_len];
            self.spawn_cursor = (self.spawn_cursor + 1) % table_len;
            if !collides(candidate.x, candidate.y, PLAYER_SIZE, &self.world.walls) {
                return candidate;
            }
            last = Some(candidate);
        }
        last.unwrap_or_default()
    }
}
