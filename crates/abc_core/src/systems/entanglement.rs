use abc_data::{EntangledPair, Node};

pub const COHERENCE_DECAY: f64 = 0.5;
/// Pairs weaker than this are dropped.
pub const MIN_STRENGTH: f64 = 0.05;
/// Entanglement reaches twice the formation proximity.
pub const RANGE_FACTOR: f64 = 2.0;

/// Looks up a node by id. Node ids are assigned monotonically and nodes are
/// only appended, so the slice is sorted by id.
#[must_use]
pub fn find_node(nodes: &[Node], id: u64) -> Option<&Node> {
    nodes
        .binary_search_by_key(&id, |n| n.id)
        .ok()
        .map(|idx| &nodes[idx])
}

/// Decays every pair and drops weak pairs and pairs with a collapsed or
/// missing member.
pub fn decay(pairs: &mut Vec<EntangledPair>, nodes: &[Node], dt: f64) {
    let factor = (-COHERENCE_DECAY * dt.max(0.0)).exp();
    pairs.retain_mut(|pair| {
        pair.strength *= factor;
        let alive = |id| find_node(nodes, id).is_some_and(|n| !n.collapsed);
        pair.strength >= MIN_STRENGTH && alive(pair.a) && alive(pair.b)
    });
}
