//! Headless driver for the Outbreak lattice epidemic engine.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `outbreak-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Build and seed the engine from a seeded random source
//! 4. Run the paced simulation loop until the epidemic ends, the tick
//!    limit is reached, or Ctrl-C is pressed
//! 5. Log the result

mod error;
mod report_callback;

use std::path::{Path, PathBuf};

use outbreak_core::config::SimulationConfig;
use outbreak_core::engine::Engine;
use outbreak_core::runner;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::report_callback::ReportCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "outbreak-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the engine
/// rejects it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet; the level comes from it.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("outbreak-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        viruses = config.viruses.len(),
        "Run parameters"
    );

    // 3. Build the engine.
    let rng = StdRng::seed_from_u64(config.world.seed);
    let mut engine = Engine::new(&config.engine_config(), rng).map_err(AppError::from)?;

    // 4. Run until done or interrupted.
    let bounds = config.run_bounds();
    let mut callback = ReportCallback::new(config.logging.report_every_ticks);
    let outcome = tokio::select! {
        result = runner::run_simulation(&mut engine, &bounds, &mut callback) => Some(result),
        Ok(()) = tokio::signal::ctrl_c() => None,
    };

    // 5. Log the result.
    match outcome {
        Some(result) => runner::log_simulation_end(&result),
        None => info!(
            tick = engine.tick(),
            dead = engine.report().dead_count,
            infected = engine.report().infected_total,
            "Interrupted, stopping"
        ),
    }
    info!(
        history_len = engine.history().len(),
        reports_logged = callback.logged(),
        "outbreak-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), AppError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
