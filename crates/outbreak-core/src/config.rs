//! Configuration loading and typed config structures for the Outbreak engine.
//!
//! The canonical configuration lives in `outbreak-config.yaml` at the
//! project root. Every field has a default, so a partial file (or none at
//! all) still yields a runnable configuration.

use std::path::Path;

use outbreak_lattice::{DEFAULT_MAX_CELLS, NeighborMode};
use outbreak_types::Virus;
use outbreak_types::presets::default_viruses;
use serde::Deserialize;

use crate::engine::EngineConfig;
use crate::runner::RunBounds;
use crate::transmission::TransmissionStrategy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `outbreak-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, pacing and tick limit.
    #[serde(default)]
    pub world: WorldConfig,

    /// Lattice shape and adjacency.
    #[serde(default)]
    pub lattice: LatticeConfig,

    /// Initial infections.
    #[serde(default)]
    pub seeding: SeedingConfig,

    /// Infection strategy.
    #[serde(default)]
    pub transmission: TransmissionConfig,

    /// Report history retention.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Viruses in seeding order. Defaults to the built-in presets.
    #[serde(default = "default_viruses")]
    pub viruses: Vec<Virus>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            lattice: LatticeConfig::default(),
            seeding: SeedingConfig::default(),
            transmission: TransmissionConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
            viruses: default_viruses(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Engine inputs described by this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            side_length: self.lattice.side_length,
            dimensions: self.lattice.dimensions,
            initial_infected_per_virus: self.seeding.initial_infected_per_virus,
            viruses: self.viruses.clone(),
            neighbor_mode: self.lattice.neighbor_mode,
            transmission: self.transmission.strategy,
            max_cells: self.lattice.max_cells,
            history_capacity: self.history.capacity,
        }
    }

    /// Pacing and tick limit for the run loop.
    pub const fn run_bounds(&self) -> RunBounds {
        RunBounds {
            max_ticks: self.world.max_ticks,
            tick_interval_ms: self.world.tick_interval_ms,
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks (0 = run flat out).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Maximum ticks before the run is cut short (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: 0,
            max_ticks: default_max_ticks(),
        }
    }
}

/// Lattice shape configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatticeConfig {
    /// Cells per axis.
    #[serde(default = "default_side_length")]
    pub side_length: usize,

    /// Number of axes.
    #[serde(default = "default_dimensions")]
    pub dimensions: u32,

    /// Largest allowed total cell count.
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,

    /// Adjacency rule: `flat` or `bounded`.
    #[serde(default)]
    pub neighbor_mode: NeighborMode,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            side_length: default_side_length(),
            dimensions: default_dimensions(),
            max_cells: default_max_cells(),
            neighbor_mode: NeighborMode::default(),
        }
    }
}

/// Seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedingConfig {
    /// Cells seeded per virus before the first tick.
    #[serde(default = "default_initial_infected")]
    pub initial_infected_per_virus: usize,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            initial_infected_per_virus: default_initial_infected(),
        }
    }
}

/// Transmission configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransmissionConfig {
    /// `first_match` or `pooled`.
    #[serde(default)]
    pub strategy: TransmissionStrategy,
}

/// Report history configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Reports kept in memory. Omitted or null keeps every report.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log a tick report every N ticks (0 = never).
    #[serde(default = "default_report_every_ticks")]
    pub report_every_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            report_every_ticks: default_report_every_ticks(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    10_000
}

const fn default_side_length() -> usize {
    100
}

const fn default_dimensions() -> u32 {
    2
}

const fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS
}

const fn default_initial_infected() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_report_every_ticks() -> u64 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use outbreak_types::presets::FATAL_NAME;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.lattice.side_length, 100);
        assert_eq!(config.lattice.dimensions, 2);
        assert_eq!(config.seeding.initial_infected_per_virus, 1);
        assert_eq!(config.viruses.len(), 1);
        assert_eq!(config.viruses[0].name, FATAL_NAME);
        assert!(config.engine_config().validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r##"
world:
  seed: 7
  tick_interval_ms: 50
  max_ticks: 200

lattice:
  side_length: 20
  dimensions: 3
  max_cells: 100000
  neighbor_mode: bounded

seeding:
  initial_infected_per_virus: 4

transmission:
  strategy: pooled

history:
  capacity: 500

logging:
  level: debug
  report_every_ticks: 5

viruses:
  - name: "alpha"
    color: "#00ff00"
    infection_chance: 0.2
    recovery_duration: 6
    immunity_duration: 12
    mortality_chance: 0.01
  - name: "beta"
    color: "#0000ff"
    infection_chance: 0.4
    recovery_duration: 3
    immunity_duration: 0
    mortality_chance: 0.0
"##;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.tick_interval_ms, 50);
        assert_eq!(config.lattice.neighbor_mode, NeighborMode::Bounded);
        assert_eq!(config.transmission.strategy, TransmissionStrategy::Pooled);
        assert_eq!(config.history.capacity, Some(500));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.viruses.len(), 2);
        assert_eq!(config.viruses[1].name, "beta");

        let engine = config.engine_config();
        assert_eq!(engine.side_length, 20);
        assert_eq!(engine.dimensions, 3);
        assert_eq!(engine.initial_infected_per_virus, 4);
        assert_eq!(engine.max_cells, 100_000);
        assert!(engine.validate().is_ok());

        let bounds = config.run_bounds();
        assert_eq!(bounds.max_ticks, 200);
        assert_eq!(bounds.tick_interval_ms, 50);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  seed: 9\n";
        let config = SimulationConfig::parse(yaml).unwrap();

        // Seed is overridden
        assert_eq!(config.world.seed, 9);
        // Everything else uses defaults
        assert_eq!(config.world.max_ticks, 10_000);
        assert_eq!(config.lattice.neighbor_mode, NeighborMode::Flat);
        assert_eq!(config.history.capacity, None);
        assert_eq!(config.viruses[0].name, FATAL_NAME);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn explicit_empty_virus_list_is_kept_and_rejected_later() {
        let config = SimulationConfig::parse("viruses: []\n").unwrap();
        assert!(config.viruses.is_empty());
        assert!(config.engine_config().validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = SimulationConfig::parse("lattice:\n  side_length: [1, 2\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/outbreak-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("outbreak-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
