//! Ctrl-C handling and the export-on-exit step.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::App;

pub struct ShutdownManager {
    requested: Arc<AtomicBool>,
    export_path: Option<PathBuf>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ShutdownManager {
    pub fn new(export_path: Option<PathBuf>) -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            export_path,
        }
    }

    /// Spawns a task that flips the shutdown flag on Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let requested = Arc::clone(&self.requested);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current tick");
                requested.store(true, Ordering::SeqCst);
            }
        });
    }

    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        tracing::info!("Stop requested");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn export_path(&self) -> Option<&PathBuf> {
        self.export_path.as_ref()
    }

    /// Stops pending agent work and writes the session export, if one was asked for.
    pub fn cleanup(&self, app: &mut App) -> Result<()> {
        tracing::info!(tick = app.tick, "Stopping simulation");
        app.world.pause();
        if let Some(council) = &app.council {
            council.cancel_all();
        }
        if let Some(path) = &self.export_path {
            app.export_session(path)?;
        }
        tracing::info!(exported = self.export_path.is_some(), "Shutdown cleanup finished");
        Ok(())
    }
}
