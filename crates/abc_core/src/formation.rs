//! Formation rules.
//!
//! A rule inspects a candidate pool and reports the first qualifying group in
//! iteration order (lexicographic over indices). What happens to the inputs is
//! a separate decision exposed through [`FormationRule::consumption`], so the
//! engine applies it uniformly and tests can exercise rules in isolation.

use abc_data::{Atom, AtomKind, EntangledPair, MoleculeKind, Node, NodeKind, Quark, QuarkFlavor};

/// Half-width of the charge bands used to classify quark flavors.
pub const FLAVOR_TOLERANCE: f64 = 0.1;
/// Superposition a node must reach before it can collapse.
pub const COLLAPSE_LIMIT: f64 = 1.0;
/// Maximum pairwise quark distance inside an atom.
pub const ATOM_PROXIMITY: f64 = 0.12;
/// Maximum distance between two atoms forming a molecule.
pub const MOLECULE_PROXIMITY: f64 = 0.2;

/// What a successful match does to its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumption {
    /// Inputs stay in their collection, frozen.
    MarkCollapsed,
    /// Inputs leave their collection.
    Remove,
}

pub trait FormationRule {
    type Candidate;
    type Match;

    fn find_match(&self, pool: &[Self::Candidate]) -> Option<Self::Match>;
    fn consumption(&self) -> Consumption;
}

#[must_use]
pub fn classify_flavor(charge: f64) -> QuarkFlavor {
    let near = |target: f64| (charge - target).abs() < FLAVOR_TOLERANCE;
    if near(2.0 / 3.0) {
        QuarkFlavor::Up
    } else if near(-1.0 / 3.0) {
        QuarkFlavor::Down
    } else if near(1.0 / 3.0) {
        QuarkFlavor::Strange
    } else {
        QuarkFlavor::Unknown
    }
}

/// At least two distinct kinds among `kinds`.
#[must_use]
pub fn is_type_diverse(kinds: &[NodeKind]) -> bool {
    kinds
        .split_first()
        .is_some_and(|(first, rest)| rest.iter().any(|k| k != first))
}

/// `uud` binds to a proton, `udd` to a neutron. Order does not matter.
#[must_use]
pub fn atom_kind(flavors: [QuarkFlavor; 3]) -> Option<AtomKind> {
    let ups = flavors.iter().filter(|f| **f == QuarkFlavor::Up).count();
    let downs = flavors.iter().filter(|f| **f == QuarkFlavor::Down).count();
    match (ups, downs) {
        (2, 1) => Some(AtomKind::Proton),
        (1, 2) => Some(AtomKind::Neutron),
        _ => None,
    }
}

#[must_use]
pub fn molecule_kind(a: AtomKind, b: AtomKind) -> MoleculeKind {
    if a == b {
        MoleculeKind::Simple
    } else {
        MoleculeKind::Complex
    }
}

#[inline]
fn within(a: abc_data::Vec2, b: abc_data::Vec2, threshold: f64) -> bool {
    (a - b).length_squared() < threshold * threshold
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriadMatch {
    pub indices: [usize; 3],
    pub flavor: QuarkFlavor,
    pub charge: f64,
}

/// Three free nodes, pairwise within `threshold`, of at least two kinds and
/// with a summed charge inside a known flavor band.
#[derive(Debug, Clone, Copy)]
pub struct TriadRule {
    pub threshold: f64,
}

impl FormationRule for TriadRule {
    type Candidate = Node;
    type Match = TriadMatch;

    fn find_match(&self, nodes: &[Node]) -> Option<TriadMatch> {
        if self.threshold <= 0.0 {
            return None;
        }
        let free: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.collapsed)
            .map(|(i, _)| i)
            .collect();

        for (x, &i) in free.iter().enumerate() {
            let near: Vec<usize> = free[x + 1..]
                .iter()
                .copied()
                .filter(|&j| within(nodes[i].position, nodes[j].position, self.threshold))
                .collect();
            for (y, &j) in near.iter().enumerate() {
                for &k in &near[y + 1..] {
                    if !within(nodes[j].position, nodes[k].position, self.threshold) {
                        continue;
                    }
                    if !is_type_diverse(&[nodes[i].kind, nodes[j].kind, nodes[k].kind]) {
                        continue;
                    }
                    let charge = nodes[i].charge + nodes[j].charge + nodes[k].charge;
                    let flavor = classify_flavor(charge);
                    if flavor != QuarkFlavor::Unknown {
                        return Some(TriadMatch {
                            indices: [i, j, k],
                            flavor,
                            charge,
                        });
                    }
                }
            }
        }
        None
    }

    fn consumption(&self) -> Consumption {
        Consumption::MarkCollapsed
    }
}

/// Two free nodes within `threshold` whose superposition both reached
/// [`COLLAPSE_LIMIT`].
#[derive(Debug, Clone, Copy)]
pub struct CollapseRule {
    pub threshold: f64,
}

impl FormationRule for CollapseRule {
    type Candidate = Node;
    type Match = [usize; 2];

    fn find_match(&self, nodes: &[Node]) -> Option<[usize; 2]> {
        let ready: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.collapsed && n.superposition >= COLLAPSE_LIMIT)
            .map(|(i, _)| i)
            .collect();
        for (x, &i) in ready.iter().enumerate() {
            for &j in &ready[x + 1..] {
                if within(nodes[i].position, nodes[j].position, self.threshold) {
                    return Some([i, j]);
                }
            }
        }
        None
    }

    fn consumption(&self) -> Consumption {
        Consumption::MarkCollapsed
    }
}

/// Three quarks pairwise within `threshold` forming `uud` or `udd`.
#[derive(Debug, Clone, Copy)]
pub struct AtomRule {
    pub threshold: f64,
}

impl Default for AtomRule {
    fn default() -> Self {
        Self {
            threshold: ATOM_PROXIMITY,
        }
    }
}

impl FormationRule for AtomRule {
    type Candidate = Quark;
    type Match = ([usize; 3], AtomKind);

    fn find_match(&self, quarks: &[Quark]) -> Option<([usize; 3], AtomKind)> {
        let n = quarks.len();
        for i in 0..n {
            for j in i + 1..n {
                if !within(quarks[i].position, quarks[j].position, self.threshold) {
                    continue;
                }
                for k in j + 1..n {
                    if !within(quarks[i].position, quarks[k].position, self.threshold)
                        || !within(quarks[j].position, quarks[k].position, self.threshold)
                    {
                        continue;
                    }
                    let flavors = [quarks[i].flavor, quarks[j].flavor, quarks[k].flavor];
                    if let Some(kind) = atom_kind(flavors) {
                        return Some(([i, j, k], kind));
                    }
                }
            }
        }
        None
    }

    fn consumption(&self) -> Consumption {
        Consumption::Remove
    }
}

/// Two atoms within `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct MoleculeRule {
    pub threshold: f64,
}

impl Default for MoleculeRule {
    fn default() -> Self {
        Self {
            threshold: MOLECULE_PROXIMITY,
        }
    }
}

impl FormationRule for MoleculeRule {
    type Candidate = Atom;
    type Match = ([usize; 2], MoleculeKind);

    fn find_match(&self, atoms: &[Atom]) -> Option<([usize; 2], MoleculeKind)> {
        for i in 0..atoms.len() {
            for j in i + 1..atoms.len() {
                if within(atoms[i].position, atoms[j].position, self.threshold) {
                    return Some(([i, j], molecule_kind(atoms[i].kind, atoms[j].kind)));
                }
            }
        }
        None
    }

    fn consumption(&self) -> Consumption {
        Consumption::Remove
    }
}

/// First pair of free, not yet entangled nodes within `radius`.
#[must_use]
pub fn find_entanglement_pair(
    nodes: &[Node],
    entangled: &[EntangledPair],
    radius: f64,
) -> Option<[usize; 2]> {
    let taken = |id: u64| entangled.iter().any(|p| p.involves(id));
    let eligible: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.collapsed && !taken(n.id))
        .map(|(i, _)| i)
        .collect();
    for (x, &i) in eligible.iter().enumerate() {
        for &j in &eligible[x + 1..] {
            if within(nodes[i].position, nodes[j].position, radius) {
                return Some([i, j]);
            }
        }
    }
    None
}
