//! Axis-aligned collision queries against the static walls.

use crate::constants::HIT_RADIUS_SQ;
use crate::types::Wall;

/// True iff the square of side `size` centred on `(x, y)` strictly overlaps
/// a wall on both axes. Touching edges do not collide.
pub fn collides(x: f32, y: f32, size: f32, walls: &[Wall]) -> bool {
    let half = size / 2.0;
    let left = x - half;
    let right = x + half;
    let top = y - half;
    let bottom = y + half;

    walls.iter().any(|wall| {
        right > wall.x
            && left < wall.x + wall.width
            && bottom > wall.y
            && top < wall.y + wall.height
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub x: f32,
    pub y: f32,
    /// The full diagonal move was rejected; the result may still have slid
    /// along one axis.
    pub blocked: bool,
}

/// Attempts the full move, then X-only and Y-only moves so bodies slide
/// along walls instead of sticking.
pub fn resolve_movement(
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    size: f32,
    walls: &[Wall],
) -> MoveOutcome {
    let nx = x + dx;
    let ny = y + dy;
    if !collides(nx, ny, size, walls) {
        return MoveOutcome {
            x: nx,
            y: ny,
            blocked: false,
        };
    }

    let mut rx = x;
    let mut ry = y;
    if dx != 0.0 && !collides(nx, ry, size, walls) {
        rx = nx;
    }
    if dy != 0.0 && !collides(rx, ny, size, walls) {
        ry = ny;
    }
    MoveOutcome {
        x: rx,
        y: ry,
        blocked: true,
    }
}

pub fn distance_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Discrete point-in-circle test for a projectile against a player centre.
pub fn bullet_hits_player(bullet_x: f32, bullet_y: f32, player_x: f32, player_y: f32) -> bool {
    distance_sq(bullet_x, bullet_y, player_x, player_y) < HIT_RADIUS_SQ
}
