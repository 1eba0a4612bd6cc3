use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 2D vector in normalized world coordinates (the domain is `[-1, 1]²`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of two planar vectors.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// The three primordial node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    A,
    B,
    C,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::A, NodeKind::B, NodeKind::C];

    /// Round-robin kind for the `index`-th node.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 3]
    }

    /// Charge in units of the elementary charge.
    ///
    /// A full A+B+C triad sums to +2/3, B+B+C to -1/3 and A+B+B to +1/3.
    #[must_use]
    pub fn charge(self) -> f64 {
        match self {
            NodeKind::A => 7.0 / 9.0,
            NodeKind::B => -2.0 / 9.0,
            NodeKind::C => 1.0 / 9.0,
        }
    }

    /// Base energy as a fraction of the Planck energy.
    #[must_use]
    pub fn energy_fraction(self) -> f64 {
        match self {
            NodeKind::A => 1.0,
            NodeKind::B => 0.1,
            NodeKind::C => 0.01,
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            NodeKind::A => "#FF4444",
            NodeKind::B => "#4444FF",
            NodeKind::C => "#44FF44",
        }
    }
}

/// Primordial particle-like unit.
///
/// Once `collapsed` is set the node is frozen: kinematics skip it and the
/// formation rules never consider it again. Nodes are only removed by a full
/// reinitialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub kind: NodeKind,
    pub charge: f64,
    pub base_energy: f64,
    pub color: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub phase: f64,
    pub frequency: f64,
    /// Running integral of the Lagrangian `T - V`.
    pub action: f64,
    /// Sign of `position × velocity`: -1, 0 or +1.
    pub topological_charge: i8,
    /// Collapse pressure, starts at 0.
    pub superposition: f64,
    pub collapsed: bool,
}

impl Node {
    #[must_use]
    pub fn new(id: u64, kind: NodeKind, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            kind,
            charge: kind.charge(),
            base_energy: kind.energy_fraction() * crate::PLANCK_ENERGY,
            color: kind.color().to_string(),
            position,
            velocity,
            phase: 0.0,
            frequency: 1.0,
            action: 0.0,
            topological_charge: 0,
            superposition: 0.0,
            collapsed: false,
        }
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.length_squared()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuarkFlavor {
    Up,
    Down,
    Strange,
    Unknown,
}

impl QuarkFlavor {
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            QuarkFlavor::Up => "#FF5555",
            QuarkFlavor::Down => "#5555FF",
            QuarkFlavor::Strange => "#55FF55",
            QuarkFlavor::Unknown => "#888888",
        }
    }
}

/// Emergent structure built from collapsed nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quark {
    pub id: u64,
    pub flavor: QuarkFlavor,
    pub charge: f64,
    /// Ids of the constituent nodes (two for a collapse pair, three for a triad).
    pub constituents: Vec<u64>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    Proton,
    Neutron,
}

impl AtomKind {
    #[must_use]
    pub fn charge(self) -> f64 {
        match self {
            AtomKind::Proton => 1.0,
            AtomKind::Neutron => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: u64,
    pub kind: AtomKind,
    pub quarks: [u64; 3],
    pub charge: f64,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoleculeKind {
    Simple,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: u64,
    pub kind: MoleculeKind,
    pub atoms: Vec<u64>,
    pub bonds: u32,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Entangled node pair with a decaying strength in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntangledPair {
    pub a: u64,
    pub b: u64,
    pub strength: f64,
}

impl EntangledPair {
    #[must_use]
    pub fn involves(&self, id: u64) -> bool {
        self.a == id || self.b == id
    }
}

/// Transient marker left where a formation collapsed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollapseMarker {
    pub position: Vec2,
    pub time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.dot(Vec2::new(1.0, 0.0)), 3.0);
        assert_eq!(Vec2::new(1.0, 0.0).cross(Vec2::new(0.0, 1.0)), 1.0);
        assert_eq!(a - a, Vec2::ZERO);
        assert_eq!(-a, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
        let n = Vec2::new(0.0, 2.0).normalize_or_zero();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_triad_charges() {
        let abc: f64 = NodeKind::ALL.iter().map(|k| k.charge()).sum();
        assert!((abc - 2.0 / 3.0).abs() < 1e-12);
        let bbc = 2.0 * NodeKind::B.charge() + NodeKind::C.charge();
        assert!((bbc + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_node_new_uses_lookup_table() {
        let n = Node::new(7, NodeKind::B, Vec2::ZERO, Vec2::new(0.1, 0.0));
        assert_eq!(n.charge, NodeKind::B.charge());
        assert_eq!(n.color, "#4444FF");
        assert!(!n.collapsed);
        assert_eq!(n.superposition, 0.0);
        assert!((n.kinetic_energy() - 0.005).abs() < 1e-12);
    }
}
