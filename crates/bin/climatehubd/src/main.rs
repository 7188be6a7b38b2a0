//! # climatehubd
//!
//! Composition root that wires the adapters into the climate runtime.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Construct the virtual house, the tokio scheduler and the notifier
//! - Run the climate runtime and the mode announcer
//! - Stop on SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use climatehub_adapter_virtual::{TracingNotifier, VirtualHome};
use climatehub_app::mode_engine::announce_changes;
use climatehub_app::runtime::ClimateRuntime;
use climatehub_app::scheduler::TokioScheduler;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let settings = config.climate_settings();
    let recovery = config.recovery();
    tracing::info!(
        activation = %settings.night.activation_time,
        failsafe = %settings.night.failsafe_time,
        fallback_wake = %recovery.fallback_wake,
        "configuration loaded"
    );

    // Platform
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let home = Arc::new(VirtualHome::new(
        config.simulation.home_state(),
        events_tx.clone(),
    ));
    let scheduler = TokioScheduler::new(events_tx);

    // Runtime
    let runtime = ClimateRuntime::new(Arc::clone(&home), scheduler, settings);
    tracing::info!(mode = %runtime.mode(), "initial occupancy mode");

    let notifier = Arc::new(TracingNotifier::default());
    let announcer = tokio::spawn(announce_changes(runtime.engine().changes(), notifier));
    let mut worker = tokio::spawn(runtime.run(events_rx));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupt received, shutting down");
        }
        _ = &mut worker => tracing::warn!("climate runtime stopped unexpectedly"),
    }

    worker.abort();
    announcer.abort();
    Ok(())
}
