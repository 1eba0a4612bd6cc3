use abc_data::{Atom, Molecule, Quark, Vec2};
use rand::Rng;

use super::REFERENCE_DT;
use crate::math::{finite_or_zero, gaussian, EPSILON};

/// Anything with a position and velocity that moves as a rigid point.
pub trait Body {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    fn set_motion(&mut self, position: Vec2, velocity: Vec2);
}

macro_rules! impl_body {
    ($($ty:ty),*) => {
        $(impl Body for $ty {
            fn position(&self) -> Vec2 {
                self.position
            }
            fn velocity(&self) -> Vec2 {
                self.velocity
            }
            fn set_motion(&mut self, position: Vec2, velocity: Vec2) {
                self.position = position;
                self.velocity = velocity;
            }
        })*
    };
}

impl_body!(Quark, Atom, Molecule);

/// Pairwise force law and damping for a population of bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    /// Pairs further apart than this do not interact.
    pub interaction_radius: f64,
    /// Pairs closer than this repel instead of attract.
    pub core_radius: f64,
    pub attraction: f64,
    pub repulsion: f64,
    /// Velocity factor per [`REFERENCE_DT`].
    pub drag: f64,
    /// Bodies bounce off `|x| > bound` and `|y| > bound`.
    pub bound: f64,
    /// Thermal noise amplitude per unit time.
    pub jitter: f64,
}

impl BodyParams {
    /// Strong-force confinement between quarks.
    #[must_use]
    pub fn quarks(strong_energy: f64, weak_energy: f64) -> Self {
        Self {
            interaction_radius: 0.3,
            core_radius: 0.02,
            attraction: 0.02 * finite_or_zero(strong_energy).max(0.0),
            repulsion: 0.05,
            drag: 0.98,
            bound: 0.9,
            jitter: 0.001 * finite_or_zero(weak_energy).max(0.0),
        }
    }

    /// Residual bonding between atoms.
    #[must_use]
    pub fn atoms() -> Self {
        Self {
            interaction_radius: 0.4,
            core_radius: 0.05,
            attraction: 0.01,
            repulsion: 0.02,
            drag: 0.99,
            bound: 0.95,
            jitter: 0.0,
        }
    }

    /// Free drift for molecules.
    #[must_use]
    pub fn molecules() -> Self {
        Self {
            interaction_radius: 0.0,
            core_radius: 0.0,
            attraction: 0.0,
            repulsion: 0.0,
            drag: 0.995,
            bound: 0.95,
            jitter: 0.0,
        }
    }
}

/// Pairwise forces, thermal jitter, integration, drag and boundary bounce.
pub fn integrate_bodies<T: Body, R: Rng + ?Sized>(
    bodies: &mut [T],
    params: &BodyParams,
    dt: f64,
    rng: &mut R,
) {
    if dt <= 0.0 {
        return;
    }
    let mut accel = vec![Vec2::ZERO; bodies.len()];
    if params.interaction_radius > 0.0 {
        for i in 0..bodies.len() {
            for j in i + 1..bodies.len() {
                let delta = bodies[j].position() - bodies[i].position();
                let dist = delta.length();
                if dist >= params.interaction_radius {
                    continue;
                }
                let dir = delta * (1.0 / dist.max(EPSILON));
                let strength = if dist < params.core_radius {
                    -params.repulsion
                } else {
                    params.attraction
                };
                accel[i] += dir * strength;
                accel[j] -= dir * strength;
            }
        }
    }

    let damping = params.drag.powf(dt / REFERENCE_DT);
    let jitter = params.jitter * dt;
    for (body, a) in bodies.iter_mut().zip(accel) {
        let mut v = body.velocity() + a * dt;
        if jitter > 0.0 {
            v += Vec2::new(gaussian(rng), gaussian(rng)) * jitter;
        }
        let mut p = body.position() + v * dt;
        v = v * damping;

        if p.x.abs() > params.bound {
            v.x = -v.x;
            p.x = p.x.clamp(-params.bound, params.bound);
        }
        if p.y.abs() > params.bound {
            v.y = -v.y;
            p.y = p.y.clamp(-params.bound, params.bound);
        }
        if !v.is_finite() {
            v = Vec2::ZERO;
        }
        if !p.is_finite() {
            p = body.position();
        }
        body.set_motion(p, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_data::QuarkFlavor;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quark(id: u64, x: f64, y: f64, vx: f64) -> Quark {
        Quark {
            id,
            flavor: QuarkFlavor::Up,
            charge: 2.0 / 3.0,
            constituents: vec![],
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, 0.0),
            color: String::new(),
        }
    }

    #[test]
    fn test_confined_quarks_attract() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut quarks = vec![quark(1, 0.0, 0.0, 0.0), quark(2, 0.2, 0.0, 0.0)];
        integrate_bodies(&mut quarks, &BodyParams::quarks(1.0, 0.0), 0.1, &mut rng);
        assert!(quarks[0].velocity.x > 0.0);
        assert!(quarks[1].velocity.x < 0.0);
    }

    #[test]
    fn test_hard_core_repels() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut quarks = vec![quark(1, 0.0, 0.0, 0.0), quark(2, 0.01, 0.0, 0.0)];
        integrate_bodies(&mut quarks, &BodyParams::quarks(1.0, 0.0), 0.1, &mut rng);
        assert!(quarks[0].velocity.x < 0.0);
    }

    #[test]
    fn test_drag_and_bounce() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut quarks = vec![quark(1, 0.89, 0.0, 1.0)];
        integrate_bodies(&mut quarks, &BodyParams::quarks(0.0, 0.0), 0.1, &mut rng);
        assert!(quarks[0].velocity.x < 0.0);
        assert!(quarks[0].velocity.x.abs() < 1.0);
        assert!(quarks[0].position.x <= 0.9);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut quarks = vec![quark(1, 0.1, 0.1, 0.5)];
        let before = quarks.clone();
        integrate_bodies(&mut quarks, &BodyParams::quarks(5.0, 5.0), 0.0, &mut rng);
        assert_eq!(quarks, before);
    }
}
