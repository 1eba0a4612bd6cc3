use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use abc_sim_lib::app::{load_config, App, ConfigOverrides, RunOptions, ShutdownManager};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless ABC particle simulator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks (runs until Ctrl-C when omitted)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Time step per tick, before time_speed scaling
    #[arg(long, default_value_t = 0.016)]
    dt: f64,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Named parameter preset (planck_soup, atomic_formation, black_hole, ...)
    #[arg(short, long)]
    preset: Option<String>,

    /// Write a .sip session export on exit (gzip when the name ends in .gz)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Directory for the JSONL evolution-event log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable the agent council
    #[arg(long)]
    agents: bool,

    /// Pace ticks to the configured target FPS
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    abc_core::init_logging();
    let args = Args::parse();

    let overrides = ConfigOverrides {
        preset: args.preset.clone(),
        seed: args.seed,
        agents: args.agents,
    };
    let config = load_config(args.config.as_deref(), &overrides)?;
    let mut app = App::new(config, args.log_dir.as_deref())?;

    let shutdown = ShutdownManager::new(args.export.clone());
    shutdown.listen_for_ctrl_c();

    let options = RunOptions {
        ticks: args.ticks,
        dt: args.dt,
        realtime: args.realtime,
    };
    if let Err(e) = app.run(&options, &shutdown).await {
        tracing::error!(error = %e, "Application error");
        return Err(e);
    }
    Ok(())
}
