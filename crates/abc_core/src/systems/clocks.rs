use abc_data::{ClockState, Clocks, Spaceship};

use crate::math::lorentz_factor;

/// Spaceship x-coordinate beyond which it wraps around.
pub const WRAP_EXTENT: f64 = 1.2;
const SHIP_SPEED_SCALE: f64 = 0.01;
const CLOCK_LABELS: [char; 3] = ['a', 'b', 'c'];

/// Three-state label for a clock reading.
#[must_use]
pub fn clock_label(ticks: f64) -> char {
    if !ticks.is_finite() || ticks < 0.0 {
        return CLOCK_LABELS[0];
    }
    CLOCK_LABELS[(ticks.floor() as u64 % 3) as usize]
}

pub fn advance_spaceship(ship: &mut Spaceship, speed: f64, dt: f64) {
    ship.v = speed;
    ship.x += speed * SHIP_SPEED_SCALE * dt;
    if ship.x > WRAP_EXTENT {
        ship.x = -WRAP_EXTENT;
    }
}

/// Earth advances by `dt`, the rocket by `dt / γ`.
///
/// Returns the Lorentz factor used.
pub fn advance_clocks(clocks: &mut Clocks, speed: f64, dt: f64) -> f64 {
    let gamma = lorentz_factor(speed);
    tick(&mut clocks.earth, dt, 1.0);
    tick(&mut clocks.rocket, dt / gamma, gamma);
    gamma
}

fn tick(clock: &mut ClockState, dt: f64, dilation: f64) {
    clock.ticks += dt;
    clock.state = clock_label(clock.ticks);
    clock.dilation = dilation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rocket_runs_slow_at_point_eight() {
        let mut clocks = Clocks::default();
        for _ in 0..100 {
            advance_clocks(&mut clocks, 0.8, 0.05);
        }
        let gamma = 5.0 / 3.0;
        assert!((clocks.earth.ticks - 5.0).abs() < 1e-9);
        assert!((clocks.rocket.ticks * gamma - clocks.earth.ticks).abs() < 1e-9);
        assert!((clocks.rocket.dilation - gamma).abs() < 1e-12);
        assert_eq!(clocks.earth.dilation, 1.0);
    }

    #[test]
    fn test_labels_cycle() {
        assert_eq!(clock_label(0.2), 'a');
        assert_eq!(clock_label(1.0), 'b');
        assert_eq!(clock_label(2.9), 'c');
        assert_eq!(clock_label(3.1), 'a');
        assert_eq!(clock_label(f64::NAN), 'a');
    }

    #[test]
    fn test_spaceship_wraps() {
        let mut ship = Spaceship::new(0.9);
        ship.x = 1.199;
        advance_spaceship(&mut ship, 0.9, 1.0);
        assert_eq!(ship.x, -WRAP_EXTENT);
    }
}
