mod common;

use abc_sim_lib::model::config::{KindAssignment, Layout, SimulationParameters};
use abc_sim_lib::model::world::World;
use common::{run_ticks, EngineBuilder};

#[test]
fn test_same_seed_same_trajectory() {
    let mut a = EngineBuilder::stock(40.0, 12345).build();
    let mut b = EngineBuilder::stock(40.0, 12345).build();

    let events_a = run_ticks(&mut a, 200, 0.016);
    let events_b = run_ticks(&mut b, 200, 0.016);

    assert_eq!(events_a, events_b);
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.quarks(), b.quarks());
    assert_eq!(a.metrics(), b.metrics());
}

#[test]
fn test_different_seeds_diverge() {
    let a = EngineBuilder::stock(20.0, 1).build();
    let b = EngineBuilder::stock(20.0, 2).build();
    assert_ne!(a.nodes(), b.nodes());
}

#[test]
fn test_random_kind_assignment_is_seeded() {
    let build = || {
        EngineBuilder::stock(20.0, 99)
            .with_engine(|e| {
                e.kind_assignment = KindAssignment::Random;
                e.layout = Layout::Grid;
            })
            .build()
    };
    assert_eq!(build().nodes(), build().nodes());
}

#[test]
fn test_reset_reproduces_construction() {
    let params = SimulationParameters {
        n_abc: 30.0,
        seed: Some(77),
        ..SimulationParameters::default()
    };
    let fresh = World::new(params.clone());
    let mut world = World::new(params);
    world.start();
    run_ticks(&mut world, 150, 0.016);
    assert_ne!(world.metrics(), fresh.metrics());

    world.reset();
    assert!(!world.is_running());
    assert_eq!(world.nodes(), fresh.nodes());
    assert_eq!(world.metrics(), fresh.metrics());
    assert!(world.quarks().is_empty());
    assert!(world.history().is_empty());
}

#[test]
fn test_reset_is_idempotent() {
    let mut world = EngineBuilder::stock(15.0, 3).build();
    run_ticks(&mut world, 40, 0.016);
    world.reset();
    let once = (world.nodes().to_vec(), world.metrics());
    world.reset();
    assert_eq!(world.nodes(), &once.0[..]);
    assert_eq!(world.metrics(), once.1);
}

#[test]
fn test_unseeded_world_remembers_its_seed() {
    let mut world = World::new(SimulationParameters {
        n_abc: 10.0,
        seed: None,
        ..SimulationParameters::default()
    });
    let initial = world.nodes().to_vec();
    world.start();
    run_ticks(&mut world, 10, 0.016);
    world.reset();
    assert_eq!(world.nodes(), &initial[..]);
}
