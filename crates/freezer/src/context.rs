//! Wiring shared by the commands

use crate::ServerArgs;
use anyhow::Context;
use freezer_config::{FreezerConfig, Settings};
use freezer_core::{DumpStore, Freezer, PollConfig};
use freezer_hcloud::HetznerCloud;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Merge the command line, the config file and the defaults
pub fn load_settings(output_dir: Option<PathBuf>) -> anyhow::Result<Settings> {
    let file = FreezerConfig::discover().context("failed to load config file")?;
    let settings = Settings::resolve(&file, output_dir)?;
    tracing::debug!("Settings: {:?}", settings);
    Ok(settings)
}

/// Orchestrator for one run against the Hetzner Cloud API
pub fn build_freezer(settings: &Settings, server: &ServerArgs) -> anyhow::Result<Freezer> {
    let cloud = HetznerCloud::new(server.token.clone())?.with_endpoint(settings.endpoint.clone())?;
    let store = DumpStore::new(&settings.output_dir, server.project.clone());
    let poll = PollConfig {
        interval: settings.poll_interval,
        deadline: settings.poll_deadline,
    };

    Ok(Freezer::new(Arc::new(cloud), store)
        .with_poll_config(poll)
        .with_cancellation(cancel_on_ctrl_c()))
}

/// Receiver that turns `true` on the first Ctrl-C
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling pending wait");
            let _ = tx.send(true);
        }
    });
    rx
}
