use abc_data::{Node, Vec2};
use rand::Rng;

use crate::math::{finite_or_zero, gaussian, reflect, refract, EPSILON};

pub const VIBRATION_RATE: f64 = 10.0;
pub const GRAVITY_COUPLING: f64 = 0.0005;
/// No central pull inside this radius.
pub const MIN_FORCE_RADIUS: f64 = 0.1;
pub const ACTION_SOFTENING: f64 = 0.01;
pub const REFRACTION_BOUNDARY: f64 = 0.5;
pub const INDEX_INSIDE: f64 = 1.5;
pub const INDEX_OUTSIDE: f64 = 1.0;
pub const DOMAIN_EXTENT: f64 = 1.0;
pub const BOUNDARY_DAMPING: f64 = 0.99;
pub const THERMAL_JITTER: f64 = 0.001;
pub const SUPERPOSITION_RATE: f64 = 0.5;

pub struct NodeContext {
    pub central_mass: f64,
    pub weak_energy: f64,
    pub dt: f64,
}

/// Advances every free node by one tick. Collapsed nodes are not touched.
pub fn integrate<R: Rng + ?Sized>(nodes: &mut [Node], ctx: &NodeContext, rng: &mut R) {
    let mass = finite_or_zero(ctx.central_mass);
    let jitter = finite_or_zero(ctx.weak_energy * THERMAL_JITTER * ctx.dt);
    let dt = ctx.dt;

    for node in nodes.iter_mut().filter(|n| !n.collapsed) {
        node.phase = (node.phase + node.frequency * dt * VIBRATION_RATE)
            .rem_euclid(std::f64::consts::TAU);

        let r = node.position.length();
        let potential = mass / (r + ACTION_SOFTENING);
        node.action += (node.kinetic_energy() - potential) * dt;

        if r > MIN_FORCE_RADIUS {
            let accel = mass * GRAVITY_COUPLING / (r * r);
            node.velocity -= node.position * (accel * dt / r);
        }

        if jitter != 0.0 {
            node.velocity += Vec2::new(gaussian(rng), gaussian(rng)) * jitter;
        }

        refract_at_boundary(node, dt);

        node.position += node.velocity * dt;
        bounce(node);

        node.topological_charge = match node.position.cross(node.velocity) {
            c if c > 0.0 => 1,
            c if c < 0.0 => -1,
            _ => 0,
        };
        node.action = finite_or_zero(node.action);
        if !node.velocity.is_finite() {
            node.velocity = Vec2::ZERO;
        }
        if !node.position.is_finite() {
            node.position = Vec2::ZERO;
        }
    }
}

/// Snell refraction when the next position crosses the index boundary.
fn refract_at_boundary(node: &mut Node, dt: f64) {
    let dist = node.position.length();
    let next = (node.position + node.velocity * dt).length();
    let crossing = (dist > REFRACTION_BOUNDARY && next < REFRACTION_BOUNDARY)
        || (dist < REFRACTION_BOUNDARY && next > REFRACTION_BOUNDARY);
    if !crossing || dist < EPSILON {
        return;
    }

    let entering = dist > REFRACTION_BOUNDARY;
    let (n1, n2) = if entering {
        (INDEX_OUTSIDE, INDEX_INSIDE)
    } else {
        (INDEX_INSIDE, INDEX_OUTSIDE)
    };
    let mut normal = node.position.normalize_or_zero();
    if node.velocity.dot(normal) > 0.0 {
        normal = -normal;
    }
    node.velocity = match refract(node.velocity, normal, n1, n2) {
        Some(v) => v,
        None => reflect(node.velocity, normal),
    };
}

fn bounce(node: &mut Node) {
    if node.position.x.abs() > DOMAIN_EXTENT {
        node.velocity.x = -node.velocity.x;
        node.position.x = node.position.x.clamp(-DOMAIN_EXTENT, DOMAIN_EXTENT) * BOUNDARY_DAMPING;
    }
    if node.position.y.abs() > DOMAIN_EXTENT {
        node.velocity.y = -node.velocity.y;
        node.position.y = node.position.y.clamp(-DOMAIN_EXTENT, DOMAIN_EXTENT) * BOUNDARY_DAMPING;
    }
}

/// Adds collapse pressure proportional to the number of free neighbours
/// within `threshold`.
pub fn accumulate_superposition(nodes: &mut [Node], threshold: f64, weak_energy: f64, dt: f64) {
    let rate = finite_or_zero(SUPERPOSITION_RATE * weak_energy * dt);
    if rate <= 0.0 || threshold <= 0.0 {
        return;
    }
    let t2 = threshold * threshold;
    let counts: Vec<usize> = nodes
        .iter()
        .map(|a| {
            if a.collapsed {
                return 0;
            }
            nodes
                .iter()
                .filter(|b| {
                    b.id != a.id && !b.collapsed && (a.position - b.position).length_squared() < t2
                })
                .count()
        })
        .collect();
    for (node, count) in nodes.iter_mut().zip(counts) {
        if !node.collapsed {
            node.superposition += rate * count as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_data::NodeKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(mass: f64) -> NodeContext {
        NodeContext {
            central_mass: mass,
            weak_energy: 0.0,
            dt: 0.1,
        }
    }

    #[test]
    fn test_collapsed_node_is_frozen() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut nodes = vec![Node::new(
            1,
            NodeKind::A,
            Vec2::new(0.3, 0.2),
            Vec2::new(0.1, 0.0),
        )];
        nodes[0].collapsed = true;
        let before = nodes[0].clone();
        integrate(&mut nodes, &ctx(5.0), &mut rng);
        assert_eq!(nodes[0], before);
    }

    #[test]
    fn test_central_mass_pulls_inward() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut nodes = vec![Node::new(1, NodeKind::A, Vec2::new(0.8, 0.0), Vec2::ZERO)];
        integrate(&mut nodes, &ctx(10.0), &mut rng);
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[0].action < 0.0);
    }

    #[test]
    fn test_domain_bounce_reverses_velocity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut nodes = vec![Node::new(
            1,
            NodeKind::B,
            Vec2::new(0.99, 0.0),
            Vec2::new(1.0, 0.0),
        )];
        integrate(&mut nodes, &ctx(0.0), &mut rng);
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[0].position.x <= DOMAIN_EXTENT);
    }

    #[test]
    fn test_entering_dense_core_bends_toward_normal() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let v = Vec2::new(-1.0, 1.0);
        let mut nodes = vec![Node::new(1, NodeKind::C, Vec2::new(0.55, 0.0), v)];
        integrate(&mut nodes, &ctx(0.0), &mut rng);
        let out = nodes[0].velocity;
        // Tangential component shrinks by n1/n2.
        assert!((out.y - v.y * INDEX_OUTSIDE / INDEX_INSIDE).abs() < 1e-9);
        assert!(out.x < 0.0);
    }

    #[test]
    fn test_topological_charge_sign() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut nodes = vec![Node::new(
            1,
            NodeKind::A,
            Vec2::new(0.2, 0.0),
            Vec2::new(0.0, 0.01),
        )];
        integrate(&mut nodes, &ctx(0.0), &mut rng);
        assert_eq!(nodes[0].topological_charge, 1);
    }

    #[test]
    fn test_superposition_counts_neighbours() {
        let mut nodes = vec![
            Node::new(1, NodeKind::A, Vec2::ZERO, Vec2::ZERO),
            Node::new(2, NodeKind::B, Vec2::new(0.05, 0.0), Vec2::ZERO),
            Node::new(3, NodeKind::C, Vec2::new(0.9, 0.9), Vec2::ZERO),
        ];
        accumulate_superposition(&mut nodes, 0.15, 2.0, 0.5);
        assert_eq!(nodes[0].superposition, 0.5);
        assert_eq!(nodes[1].superposition, 0.5);
        assert_eq!(nodes[2].superposition, 0.0);

        accumulate_superposition(&mut nodes, 0.15, 0.0, 0.5);
        assert_eq!(nodes[0].superposition, 0.5);
    }
}
