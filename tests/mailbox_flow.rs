mod common;

use abc_sim_lib::model::config::ParameterPatch;
use abc_sim_lib::model::events::EvolutionEvent;
use abc_sim_lib::model::mailbox::MailboxError;
use common::{run_ticks, EngineBuilder};

#[test]
fn test_actions_arrive_in_order_and_uninterpreted() {
    let mut world = EngineBuilder::stock(3.0, 1).build();
    let handle = world.mailbox_handle();
    handle.post_action("COLLAPSE EVERYTHING").unwrap();
    handle.post_action("raise rigidity").unwrap();
    let params_before = world.parameters().clone();

    let events = world.step(0.016);
    let texts: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            EvolutionEvent::ActionReceived { text, time } => {
                assert_eq!(*time, 0.0);
                Some(text.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["COLLAPSE EVERYTHING", "raise rigidity"]);
    assert_eq!(world.parameters(), &params_before);
    assert_eq!(
        world.shared_memory().pending_actions.iter().collect::<Vec<_>>(),
        vec!["COLLAPSE EVERYTHING", "raise rigidity"]
    );
    assert_eq!(world.take_pending_actions().len(), 2);
    assert!(world.shared_memory().pending_actions.is_empty());
}

#[test]
fn test_full_channel_reports_backpressure() {
    let world = EngineBuilder::new()
        .with_engine(|e| e.mailbox_capacity = 2)
        .build();
    let handle = world.mailbox_handle();
    handle.post_action("one").unwrap();
    handle.post_action("two").unwrap();
    assert_eq!(handle.post_action("three"), Err(MailboxError::Full));
}

#[test]
fn test_pending_actions_are_bounded() {
    let mut world = EngineBuilder::new()
        .with_engine(|e| e.action_capacity = 3)
        .build();
    let handle = world.mailbox_handle();
    for i in 0..5 {
        handle.post_action(format!("a{i}")).unwrap();
    }
    world.step(0.016);
    assert_eq!(world.take_pending_actions(), vec!["a2", "a3", "a4"]);
}

#[test]
fn test_evolution_log_is_bounded() {
    let mut world = EngineBuilder::new()
        .with_engine(|e| e.log_capacity = 4)
        .build();
    let handle = world.mailbox_handle();
    for round in 0..3 {
        for i in 0..3 {
            handle.post_action(format!("r{round}-{i}")).unwrap();
        }
        world.step(0.016);
    }
    let log = world.drain_evolution_log();
    assert_eq!(log.len(), 4);
    assert!(log[3].contains("r2-2"));
}

#[test]
fn test_reset_keeps_deduction_only() {
    let mut world = EngineBuilder::stock(2.0, 1).build();
    let handle = world.mailbox_handle();
    handle.post_deduction("strong force dominates").unwrap();
    handle.post_action("scan").unwrap();
    run_ticks(&mut world, 2, 0.016);

    world.reset();
    let memory = world.shared_memory();
    assert_eq!(memory.user_deduction, "strong force dominates");
    assert!(memory.pending_actions.is_empty());
    assert!(memory.evolution_log.is_empty());
}

#[test]
fn test_patch_from_front_end_json() {
    let patch = ParameterPatch::from_json(
        r#"{"radioPi": 2.5, "timeSpeed": 3, "n_abc": 12, "colorScheme": "neon"}"#,
    )
    .unwrap();
    let mut world = EngineBuilder::stock(4.0, 1).paused().build();
    let rebuilt = world.update_parameters(&patch);

    assert!(rebuilt);
    let params = world.parameters();
    assert_eq!(params.radio_pi, 2.5);
    assert_eq!(params.time_speed, 3.0);
    assert_eq!(params.n_abc, 12.0);
    assert_eq!(params.strong_energy, 1.0);
    assert_eq!(world.nodes().len(), 36);
}

#[test]
fn test_mistyped_front_end_field_keeps_the_rest() {
    let patch = ParameterPatch::from_json(
        r#"{"density": "high", "strongEnergy": 4.0, "timeSpeed": "fast", "n_abc": 5}"#,
    )
    .unwrap();
    let mut world = EngineBuilder::stock(4.0, 1).paused().build();
    let before = world.parameters().clone();
    assert!(world.update_parameters(&patch));

    let params = world.parameters();
    assert_eq!(params.strong_energy, 4.0);
    assert_eq!(params.n_abc, 5.0);
    assert_eq!(params.density, before.density);
    assert_eq!(params.time_speed, before.time_speed);
    assert_eq!(world.nodes().len(), 15);
}

#[test]
fn test_empty_patch_changes_nothing() {
    let mut world = EngineBuilder::stock(4.0, 1).paused().build();
    let before = world.parameters().clone();
    let patch = ParameterPatch::from_json("{}").unwrap();
    assert!(patch.is_empty());
    assert!(!world.update_parameters(&patch));
    assert_eq!(world.parameters(), &before);
}
