use chrono::Utc;

use crate::constants::PLAYER_COLORS;
use crate::rng::Rng;
use crate::types::{PlayerClass, PowerUpType};

pub(super) fn wall_clock_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub(super) fn angle_between(from_x: f32, from_y: f32, to_x: f32, to_y: f32) -> f32 {
    (to_y - from_y).atan2(to_x - from_x)
}

/// Step of at most `max_step` from `(x, y)` toward the target.
pub(super) fn step_toward(x: f32, y: f32, target_x: f32, target_y: f32, max_step: f32) -> (f32, f32) {
    let dx = target_x - x;
    let dy = target_y - y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f32::EPSILON {
        return (0.0, 0.0);
    }
    let step = dist.min(max_step);
    (dx / dist * step, dy / dist * step)
}

pub(super) fn random_color(rng: &mut Rng) -> String {
    PLAYER_COLORS[rng.pick_index(PLAYER_COLORS.len())].to_string()
}

pub(super) fn random_class(rng: &mut Rng) -> PlayerClass {
    PlayerClass::ALL[rng.pick_index(PlayerClass::ALL.len())]
}

pub(super) fn random_power_up_type(rng: &mut Rng) -> PowerUpType {
    PowerUpType::ALL[rng.pick_index(PowerUpType::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_does_not_overshoot() {
        let (dx, dy) = step_toward(0.0, 0.0, 3.0, 4.0, 10.0);
        assert!((dx - 3.0).abs() < 1e-5);
        assert!((dy - 4.0).abs() < 1e-5);

        let (dx, dy) = step_toward(0.0, 0.0, 30.0, 40.0, 5.0);
        assert!((dx - 3.0).abs() < 1e-5);
        assert!((dy - 4.0).abs() < 1e-5);

        assert_eq!(step_toward(1.0, 1.0, 1.0, 1.0, 5.0), (0.0, 0.0));
    }

    #[test]
    fn angle_between_points_right_and_down() {
        assert!(angle_between(0.0, 0.0, 10.0, 0.0).abs() < 1e-6);
        assert!((angle_between(0.0, 0.0, 0.0, 10.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
