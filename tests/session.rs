mod common;

use abc_sim_lib::app::{load_config, App, ConfigOverrides, RunOptions, ShutdownManager};
use abc_sim_lib::model::export::{decode_sip, encode_sip, read_sip};
use abc_sim_lib::model::history::LOG_FILE_NAME;
use abc_sim_lib::model::world::World;
use abc_sim_lib::model::{AppConfig, EvolutionEvent};
use common::scratch_dir;

fn seeded_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.n_abc = 20.0;
    config.simulation.strong_energy = 5.0;
    config.simulation.seed = Some(2024);
    config
}

#[tokio::test]
async fn test_export_on_shutdown_and_reimport() {
    let dir = scratch_dir("session_export");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("run.sip.gz");

    let mut app = App::new(seeded_config(), Some(dir.as_path())).unwrap();
    app.world
        .mailbox_handle()
        .post_deduction("quarks cluster near the core")
        .unwrap();
    app.world.mailbox_handle().post_action("observe").unwrap();
    let shutdown = ShutdownManager::new(Some(path.clone()));
    let options = RunOptions {
        ticks: Some(60),
        ..RunOptions::default()
    };
    app.run(&options, &shutdown).await.unwrap();

    let export = read_sip(&path).unwrap();
    assert_eq!(export.version, "3.0");
    assert_eq!(export.payload.parameters, *app.world.parameters());
    assert_eq!(export.payload.metrics, app.world.metrics());
    assert_eq!(export.payload.agents.len(), 8);
    assert_eq!(export.payload.user_deduction, "quarks cluster near the core");
    // The host leaves the bounded engine log in place for the export.
    let log: Vec<String> = app.world.shared_memory().evolution_log.iter().cloned().collect();
    assert!(!log.is_empty());
    assert_eq!(export.payload.evolution_log, log);

    // The exported parameters rebuild the same initial population.
    let original = World::new(seeded_config().simulation);
    let restored = World::new(export.payload.parameters.clone());
    assert_eq!(restored.nodes(), original.nodes());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_event_log_records_step_events() {
    let dir = scratch_dir("session_log");
    let mut app = App::new(seeded_config(), Some(dir.as_path())).unwrap();
    app.world.mailbox_handle().post_action("observe").unwrap();
    app.world.start();
    for _ in 0..80 {
        app.step_once(0.016).unwrap();
    }

    let records = app.event_log().read_events().unwrap();
    assert!(dir.join(LOG_FILE_NAME).exists());
    assert_eq!(records.len(), app.world.history().len());
    assert_eq!(records[0].tick, 1);
    assert!(matches!(
        &records[0].event,
        EvolutionEvent::ActionReceived { text, .. } if text == "observe"
    ));
    assert!(records.windows(2).all(|w| w[0].tick <= w[1].tick));
    assert!(records.iter().all(|r| r.tick >= 1 && r.tick <= 80));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_sip_text_survives_reencoding() {
    let app = App::new(seeded_config(), None).unwrap();
    let export = app.session_export().unwrap();
    let text = encode_sip(&export).unwrap();
    assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(decode_sip(&text).unwrap(), export);
}

#[test]
fn test_config_layers() {
    let dir = scratch_dir("session_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        "target_fps = 30\n[simulation]\nn_abc = 7.0\n[agents]\ntimeout_ms = 500\n",
    )
    .unwrap();

    let config = load_config(Some(path.as_path()), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.target_fps, 30);
    assert_eq!(config.simulation.n_abc, 7.0);
    assert_eq!(config.agents.timeout_ms, 500);
    assert!(!config.agents.enabled);

    let overrides = ConfigOverrides {
        preset: Some("black_hole".into()),
        seed: Some(5),
        agents: true,
    };
    let config = load_config(Some(path.as_path()), &overrides).unwrap();
    assert_eq!(config.simulation.central_mass, 15.0);
    assert_eq!(config.simulation.seed, Some(5));
    assert!(config.agents.enabled);
    assert_eq!(config.target_fps, 30);

    let bad = ConfigOverrides {
        preset: Some("warp_drive".into()),
        ..ConfigOverrides::default()
    };
    assert!(load_config(None, &bad).is_err());
    assert!(load_config(Some(dir.join("missing.toml").as_path()), &ConfigOverrides::default()).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
