use abc_data::{Atom, CollapseMarker, EntangledPair, Molecule, Quark, Vec2};
use rand::Rng;

use crate::events::EvolutionEvent;
use crate::formation::{
    self, AtomRule, CollapseRule, Consumption, FormationRule, MoleculeRule, TriadRule,
};
use crate::math::{centroid, finite_or_zero, probability};
use crate::stats::{self, StatsContext};
use crate::systems::composites::{self, BodyParams};
use crate::systems::{clocks, entanglement, nodes};
use crate::world::{World, ENTANGLE_GATE_RATE, QUARK_GATE_RATE};

impl World {
    /// Advances the simulation by one tick.
    ///
    /// Queued mailbox messages are drained first, whether or not the world
    /// is running. While running, the pipeline then executes in order:
    /// - time and deformation field
    /// - node kinematics and superposition
    /// - collapse pairs and the gated triad rule (node -> quark)
    /// - entanglement
    /// - quark motion, atom formation, atom motion, molecule formation
    /// - spaceship and relativistic clocks
    /// - rigidity decay and phase transitions
    /// - statistics, then collapse-marker expiry
    ///
    /// # Returns
    /// The events emitted during this tick. They are also appended to the
    /// bounded history and mirrored into the mailbox evolution log.
    pub fn step(&mut self, dt: f64) -> Vec<EvolutionEvent> {
        let mut events: Vec<EvolutionEvent> = self
            .mailbox
            .drain()
            .into_iter()
            .map(|text| EvolutionEvent::ActionReceived {
                text,
                time: self.time,
            })
            .collect();

        if !self.running {
            self.record(&events);
            return events;
        }

        let dt = self.params.effective_dt(dt);
        self.time += dt;

        self.fabric.update(self.params.central_mass);

        let node_ctx = nodes::NodeContext {
            central_mass: self.params.central_mass,
            weak_energy: self.params.weak_energy,
            dt,
        };
        nodes::integrate(&mut self.nodes, &node_ctx, &mut self.rng);
        let threshold = self.params.proximity_threshold();
        nodes::accumulate_superposition(&mut self.nodes, threshold, self.params.weak_energy, dt);

        self.form_collapse_pairs(threshold, &mut events);
        self.form_triad(threshold, dt, &mut events);
        self.update_entanglement(threshold, dt, &mut events);

        let quark_params = BodyParams::quarks(self.params.strong_energy, self.params.weak_energy);
        composites::integrate_bodies(&mut self.quarks, &quark_params, dt, &mut self.rng);
        self.form_atoms(&mut events);
        composites::integrate_bodies(&mut self.atoms, &BodyParams::atoms(), dt, &mut self.rng);
        self.form_molecules(&mut events);
        composites::integrate_bodies(
            &mut self.molecules,
            &BodyParams::molecules(),
            dt,
            &mut self.rng,
        );

        let speed = self.params.speed_fraction();
        clocks::advance_spaceship(&mut self.spaceship, speed, dt);
        clocks::advance_clocks(&mut self.clocks, speed, dt);

        self.advance_rigidity(dt, &mut events);

        self.statistics = stats::aggregate(&StatsContext {
            nodes: &self.nodes,
            quark_count: self.quarks.len(),
            atom_count: self.atoms.len(),
            molecule_count: self.molecules.len(),
            entangled: &self.entangled,
        });

        let ttl = self.engine.collapse_marker_ttl;
        let now = self.time;
        self.collapse_markers.retain(|m| now - m.time <= ttl);

        self.record(&events);
        events
    }

    fn form_collapse_pairs(&mut self, threshold: f64, events: &mut Vec<EvolutionEvent>) {
        let rule = CollapseRule { threshold };
        while let Some(pair) = rule.find_match(&self.nodes) {
            let quark = self.quark_from_nodes(&pair);
            let node_ids = [self.nodes[pair[0]].id, self.nodes[pair[1]].id];
            self.collapse_nodes(&pair);
            self.collapse_markers.push(CollapseMarker {
                position: quark.position,
                time: self.time,
            });
            tracing::debug!(quark = quark.id, nodes = ?node_ids, "Collapse");
            events.push(EvolutionEvent::Collapse {
                quark_id: quark.id,
                nodes: node_ids,
                position: quark.position,
                time: self.time,
            });
            self.quarks.push(quark);
        }
    }

    fn form_triad(&mut self, threshold: f64, dt: f64, events: &mut Vec<EvolutionEvent>) {
        let gate = probability(QUARK_GATE_RATE * self.params.strong_energy * dt);
        if self.rng.gen::<f64>() >= gate {
            return;
        }
        let rule = TriadRule { threshold };
        let Some(found) = rule.find_match(&self.nodes) else {
            return;
        };
        let quark = self.quark_from_nodes(&found.indices);
        self.collapse_nodes(&found.indices);
        self.collapse_markers.push(CollapseMarker {
            position: quark.position,
            time: self.time,
        });
        tracing::debug!(quark = quark.id, flavor = ?quark.flavor, "Quark formed");
        events.push(EvolutionEvent::QuarkFormed {
            quark_id: quark.id,
            flavor: quark.flavor,
            constituents: quark.constituents.clone(),
            position: quark.position,
            time: self.time,
        });
        self.quarks.push(quark);
    }

    fn quark_from_nodes(&mut self, indices: &[usize]) -> Quark {
        let members: Vec<_> = indices.iter().map(|&i| &self.nodes[i]).collect();
        let charge: f64 = members.iter().map(|n| n.charge).sum();
        let positions: Vec<Vec2> = members.iter().map(|n| n.position).collect();
        let velocities: Vec<Vec2> = members.iter().map(|n| n.velocity).collect();
        let constituents = members.iter().map(|n| n.id).collect();
        let flavor = formation::classify_flavor(charge);
        Quark {
            id: self.next_id(),
            flavor,
            charge,
            constituents,
            position: centroid(&positions),
            velocity: centroid(&velocities),
            color: flavor.color().to_string(),
        }
    }

    /// Nodes are never removed on their own; a consumed node stays in place,
    /// frozen.
    fn collapse_nodes(&mut self, indices: &[usize]) {
        for &i in indices {
            self.nodes[i].collapsed = true;
        }
    }

    fn update_entanglement(&mut self, threshold: f64, dt: f64, events: &mut Vec<EvolutionEvent>) {
        entanglement::decay(&mut self.entangled, &self.nodes, dt);

        let gate = probability(ENTANGLE_GATE_RATE * self.params.weak_energy * dt);
        if self.rng.gen::<f64>() >= gate {
            return;
        }
        let radius = threshold * entanglement::RANGE_FACTOR;
        if let Some([i, j]) = formation::find_entanglement_pair(&self.nodes, &self.entangled, radius)
        {
            let (a, b) = (self.nodes[i].id, self.nodes[j].id);
            self.entangled.push(EntangledPair {
                a,
                b,
                strength: 1.0,
            });
            events.push(EvolutionEvent::Entangled {
                a,
                b,
                time: self.time,
            });
        }
    }

    fn form_atoms(&mut self, events: &mut Vec<EvolutionEvent>) {
        let rule = AtomRule::default();
        while let Some((indices, kind)) = rule.find_match(&self.quarks) {
            let quark_ids = indices.map(|i| self.quarks[i].id);
            let positions = indices.map(|i| self.quarks[i].position);
            let velocities = indices.map(|i| self.quarks[i].velocity);
            let atom = Atom {
                id: self.next_id(),
                kind,
                quarks: quark_ids,
                charge: kind.charge(),
                position: centroid(&positions),
                velocity: centroid(&velocities),
            };
            if rule.consumption() == Consumption::Remove {
                remove_indices(&mut self.quarks, &indices);
            }
            tracing::debug!(atom = atom.id, kind = ?kind, "Atom formed");
            events.push(EvolutionEvent::AtomFormed {
                atom_id: atom.id,
                kind,
                quarks: quark_ids,
                time: self.time,
            });
            self.atoms.push(atom);
        }
    }

    fn form_molecules(&mut self, events: &mut Vec<EvolutionEvent>) {
        let rule = MoleculeRule::default();
        while let Some((indices, kind)) = rule.find_match(&self.atoms) {
            let atom_ids: Vec<u64> = indices.iter().map(|&i| self.atoms[i].id).collect();
            let positions = indices.map(|i| self.atoms[i].position);
            let velocities = indices.map(|i| self.atoms[i].velocity);
            let molecule = Molecule {
                id: self.next_id(),
                kind,
                atoms: atom_ids.clone(),
                bonds: 1,
                position: centroid(&positions),
                velocity: centroid(&velocities),
            };
            if rule.consumption() == Consumption::Remove {
                remove_indices(&mut self.atoms, &indices);
            }
            tracing::debug!(molecule = molecule.id, kind = ?kind, "Molecule formed");
            events.push(EvolutionEvent::MoleculeFormed {
                molecule_id: molecule.id,
                kind,
                atoms: atom_ids,
                time: self.time,
            });
            self.molecules.push(molecule);
        }
    }

    fn advance_rigidity(&mut self, dt: f64, events: &mut Vec<EvolutionEvent>) {
        let rate = finite_or_zero(self.params.evolution_rate);
        let next = self.rigidity * (-rate * dt).exp();
        if next.is_finite() {
            self.rigidity = next;
        }
        for to in stats::phase_transitions(self.phase, self.rigidity) {
            tracing::info!(
                from = %self.phase,
                to = %to,
                rigidity = self.rigidity,
                time = self.time,
                "Phase transition"
            );
            events.push(EvolutionEvent::PhaseTransition {
                from: self.phase,
                to,
                rigidity: self.rigidity,
                time: self.time,
            });
            self.phase = to;
        }
    }
}

/// Removes the given indices, preserving the order of what remains.
fn remove_indices<T>(items: &mut Vec<T>, indices: &[usize]) {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    for i in sorted {
        if i < items.len() {
            items.remove(i);
        }
    }
}
