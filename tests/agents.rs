use abc_sim_lib::app::App;
use abc_sim_lib::model::entity::AgentStatus;
use abc_sim_lib::model::observer::BroadcastTelemetry;
use abc_sim_lib::model::{AppConfig, EvolutionEvent};
use std::sync::Arc;

fn council_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.n_abc = 0.0;
    config.simulation.seed = Some(3);
    config.agents.enabled = true;
    config.agents.interval_ticks = 2;
    config.agents.timeout_ms = 1_000;
    config
}

/// Steps the app, yielding to the agent worker between ticks.
async fn drive(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.step_once(0.016).unwrap();
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_council_actions_reach_the_engine() {
    let mut app = App::new(council_config(), None).unwrap();
    app.world.start();

    let mut rounds = 0;
    while app.perf().counter("actions") < 8 && rounds < 500 {
        drive(&mut app, 1).await;
        rounds += 1;
    }
    assert!(app.perf().counter("actions") >= 8);

    let posted: Vec<&str> = app
        .world
        .history()
        .iter()
        .filter_map(|e| match e {
            EvolutionEvent::ActionReceived { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(posted.len() >= 8);
    assert!(posted.iter().all(|t| t.starts_with("IA")));
    assert!(posted.iter().any(|t| t.starts_with("IA1: ")));
    assert!(posted.iter().any(|t| t.starts_with("IA8: ")));

    let council = app.council().unwrap();
    let answered = council
        .states()
        .into_iter()
        .filter(|s| s.last_response.is_some())
        .count();
    assert!(answered > 0);
    assert!(app.consensus() > 0.0);
    assert!(app.consensus() <= 1.0);
}

#[tokio::test]
async fn test_fast_ticks_do_not_pile_up_agent_rounds() {
    let mut config = council_config();
    config.agents.interval_ticks = 1;
    let mut app = App::new(config, None).unwrap();
    app.world.start();

    // No yields: the worker cannot finish anything while these ticks run.
    for _ in 0..50 {
        app.step_once(0.016).unwrap();
    }
    assert!(app.agent_states().iter().all(|s| s.running));

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    app.world.pause();
    app.step_once(0.016).unwrap();
    assert_eq!(app.perf().counter("actions"), 8);
}

#[tokio::test]
async fn test_agents_idle_between_intervals() {
    let mut config = council_config();
    config.agents.interval_ticks = 1_000;
    let mut app = App::new(config, None).unwrap();
    app.world.start();
    drive(&mut app, 20).await;

    assert_eq!(app.perf().counter("actions"), 0);
    assert!(app
        .agent_states()
        .iter()
        .all(|s| s.status == AgentStatus::Idle && !s.running));
}

#[tokio::test]
async fn test_injected_telemetry_sink_receives_payloads() {
    let sink = Arc::new(BroadcastTelemetry::new(8));
    let mut rx = sink.subscribe();
    let mut app = App::new(council_config(), None)
        .unwrap()
        .with_telemetry(sink.clone());
    app.world.start();

    drive(&mut app, 3).await;

    // The throttle lets the first tick through and holds the rest.
    let payload = rx.try_recv().unwrap();
    assert_eq!(payload.tick, 1);
    assert!(payload.gamma >= 1.0);
    assert!(payload.score >= 0.0 && payload.score <= 100.0);
    assert!(rx.try_recv().is_err());
    assert_eq!(sink.listener_count(), 1);
}
