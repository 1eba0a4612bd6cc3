use abc_data::Vec2;
use rand::Rng;

/// Denominator guard for near-zero distances.
pub const EPSILON: f64 = 1e-9;

/// Largest speed fraction accepted by [`lorentz_factor`].
pub const MAX_SPEED_FRACTION: f64 = 0.999;

/// Standard normal sample (Box-Muller).
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); flip it so ln never sees zero.
    let u = 1.0 - rng.gen::<f64>();
    let v = rng.gen::<f64>();
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// Refracts `incident` through a surface with unit `normal` going from index
/// `n1` into `n2`. Returns `None` on total internal reflection.
#[must_use]
pub fn refract(incident: Vec2, normal: Vec2, n1: f64, n2: f64) -> Option<Vec2> {
    if n2.abs() < EPSILON {
        return None;
    }
    let r = n1 / n2;
    let c = -incident.dot(normal);
    let discriminant = 1.0 - r * r * (1.0 - c * c);
    if discriminant < 0.0 {
        return None;
    }
    Some(incident * r + normal * (r * c - discriminant.sqrt()))
}

/// Mirror reflection `v - 2(v·n)n`.
#[must_use]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - normal * (2.0 * v.dot(normal))
}

#[must_use]
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
    sum * (1.0 / points.len() as f64)
}

/// Lorentz factor `1/√(1−v²)` for a speed given as a fraction of c.
///
/// `v` is clamped to `[0, MAX_SPEED_FRACTION]`; non-finite input yields 1.
#[must_use]
pub fn lorentz_factor(v: f64) -> f64 {
    let v = finite_or_zero(v).clamp(0.0, MAX_SPEED_FRACTION);
    1.0 / (1.0 - v * v).sqrt()
}

#[inline]
#[must_use]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Probability clamped into `[0, 1]`; NaN maps to 0.
#[inline]
#[must_use]
pub fn probability(p: f64) -> f64 {
    finite_or_zero(p).clamp(0.0, 1.0)
}
