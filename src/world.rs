use crate::collision::collides;
use crate::constants::{
    BORDER_THICKNESS, MAP_HEIGHT, MAP_WIDTH, PLAYER_SIZE, SPAWN_ATTEMPTS, SPAWN_MARGIN,
};
use crate::rng::Rng;
use crate::types::{Vec2, Wall};

const fn wall(x: f32, y: f32, width: f32, height: f32) -> Wall {
    Wall {
        x,
        y,
        width,
        height,
    }
}

const WALLS: [Wall; 14] = [
    wall(0.0, 0.0, MAP_WIDTH, BORDER_THICKNESS),
    wall(0.0, MAP_HEIGHT - BORDER_THICKNESS, MAP_WIDTH, BORDER_THICKNESS),
    wall(0.0, 0.0, BORDER_THICKNESS, MAP_HEIGHT),
    wall(MAP_WIDTH - BORDER_THICKNESS, 0.0, BORDER_THICKNESS, MAP_HEIGHT),
    wall(400.0, 200.0, 200.0, 40.0),
    wall(800.0, 400.0, 40.0, 300.0),
    wall(1200.0, 300.0, 300.0, 40.0),
    wall(600.0, 800.0, 40.0, 400.0),
    wall(1400.0, 600.0, 400.0, 40.0),
    wall(1000.0, 1000.0, 40.0, 300.0),
    wall(300.0, 1200.0, 500.0, 40.0),
    wall(1600.0, 800.0, 40.0, 400.0),
    wall(1800.0, 300.0, 300.0, 40.0),
    wall(500.0, 1400.0, 600.0, 40.0),
];

const SPAWN_POINTS: [Vec2; 12] = [
    Vec2::new(150.0, 150.0),
    Vec2::new(2250.0, 1650.0),
    Vec2::new(2250.0, 150.0),
    Vec2::new(150.0, 1650.0),
    Vec2::new(1200.0, 900.0),
    Vec2::new(1200.0, 150.0),
    Vec2::new(1200.0, 1650.0),
    Vec2::new(700.0, 600.0),
    Vec2::new(1900.0, 1100.0),
    Vec2::new(150.0, 900.0),
    Vec2::new(2000.0, 600.0),
    Vec2::new(400.0, 1600.0),
];

/// Immutable arena: bounds, obstacles and the spawn-point table.
#[derive(Clone, Debug)]
pub struct StaticWorld {
    pub width: f32,
    pub height: f32,
    pub walls: Vec<Wall>,
    pub spawn_points: Vec<Vec2>,
}

impl Default for StaticWorld {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            walls: WALLS.to_vec(),
            spawn_points: SPAWN_POINTS.to_vec(),
        }
    }
}

impl StaticWorld {
    pub fn is_out_of_bounds(&self, x: f32, y: f32) -> bool {
        x < 0.0 || x > self.width || y < 0.0 || y > self.height
    }

    pub fn clamp_to_arena(&self, x: f32, y: f32) -> (f32, f32) {
        let half = PLAYER_SIZE / 2.0;
        (
            x.clamp(half, self.width - half),
            y.clamp(half, self.height - half),
        )
    }

    /// Random wall-free point for a body of `size`. Gives up after
    /// `SPAWN_ATTEMPTS` and returns the last candidate.
    pub fn random_open_position(&self, size: f32, rng: &mut Rng) -> Vec2 {
        let mut candidate = Vec2::default();
        for _ in 0..SPAWN_ATTEMPTS {
            candidate = Vec2::new(
                rng.range(SPAWN_MARGIN, self.width - SPAWN_MARGIN),
                rng.range(SPAWN_MARGIN, self.height - SPAWN_MARGIN),
            );
            if !collides(candidate.x, candidate.y, size, &self.walls) {
                break;
            }
        }
        candidate
    }
}
