//! The step scheduler: one atomic pass over the lattice per tick.
//!
//! # State machine
//!
//! ```text
//! NotStarted --step()--> Running --step() with no infectious cell--> Ended
//! ```
//!
//! Each [`Engine::step`] visits every cell in index order:
//!
//! 1. Dead cells are skipped.
//! 2. Infectious cells roll against their virus's `mortality_chance`. A
//!    success kills the cell; otherwise it counts as infected.
//! 3. Cells that are neither infectious nor immune go through the
//!    [`TransmissionModel`]. A newly infected cell counts as infected and
//!    is visible as infectious to the cells visited after it.
//! 4. Everything else (immune, alive) counts as healthy.
//!
//! The run ends on the first tick with no infected cell. Calling
//! [`Engine::step`] after that is a no-op that returns the final report.
//!
//! The random source is injected at construction. A seeded generator
//! reproduces a run exactly, since cells are visited and draws are made in
//! a fixed order.

use std::collections::BTreeSet;

use outbreak_lattice::{
    Cell, DEFAULT_MAX_CELLS, Geometry, LatticeError, LatticeStore, NeighborMode,
};
use outbreak_types::{CellDisplayState, Tick, TickReport, Virus, VirusId};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, History};
use crate::transmission::{TransmissionModel, TransmissionStrategy};

/// Tick number of the seeding snapshot.
pub const SEEDING_TICK: Tick = 0;

/// First tick processed by [`Engine::step`].
pub const FIRST_TICK: Tick = 1;

/// Errors raised while constructing an engine.
///
/// A constructed engine never fails; every tick is total.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid lattice shape, seed count or virus list.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The requested lattice does not fit in the configured buffer.
    #[error("capacity error: {source}")]
    Capacity {
        /// The underlying lattice error.
        source: LatticeError,
    },
}

/// Classify an error from [`Geometry::new`], which fails only on shape
/// (`InvalidGeometry`) or size (`CapacityExceeded`, `SizeOverflow`).
fn geometry_error(source: LatticeError) -> EngineError {
    match source {
        LatticeError::InvalidGeometry { reason } => EngineError::Configuration { reason },
        size => EngineError::Capacity { source: size },
    }
}

/// Inputs of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Side length `S` of every axis.
    pub side_length: usize,
    /// Number of dimensions `D`.
    pub dimensions: u32,
    /// Cells seeded as infectious per virus before tick 1.
    pub initial_infected_per_virus: usize,
    /// Ordered virus list. Seeding follows this order.
    pub viruses: Vec<Virus>,
    /// Adjacency rule.
    pub neighbor_mode: NeighborMode,
    /// How infectious neighbors are combined.
    pub transmission: TransmissionStrategy,
    /// Largest allowed `S^D`.
    pub max_cells: usize,
    /// Retention bound of the report history (`None` keeps everything).
    pub history_capacity: Option<usize>,
}

impl EngineConfig {
    /// A configuration with flat adjacency, first-match transmission, the
    /// default cell budget and unbounded history.
    pub fn new(
        side_length: usize,
        dimensions: u32,
        initial_infected_per_virus: usize,
        viruses: Vec<Virus>,
    ) -> Self {
        Self {
            side_length,
            dimensions,
            initial_infected_per_virus,
            viruses,
            neighbor_mode: NeighborMode::Flat,
            transmission: TransmissionStrategy::FirstMatch,
            max_cells: DEFAULT_MAX_CELLS,
            history_capacity: None,
        }
    }

    /// Check the seed count and the virus list.
    ///
    /// Lattice shape is checked when the lattice is built.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] describing the first problem
    /// found.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.initial_infected_per_virus == 0 {
            return Err(configuration(
                "initial_infected_per_virus must be at least 1",
            ));
        }
        if self.viruses.is_empty() {
            return Err(configuration("at least one virus must be configured"));
        }
        if VirusId::try_from(self.viruses.len().saturating_sub(1)).is_err() {
            return Err(configuration(format!(
                "too many viruses: {} (max {})",
                self.viruses.len(),
                u32::from(u16::MAX).saturating_add(1)
            )));
        }

        let mut names = BTreeSet::new();
        for virus in &self.viruses {
            if virus.name.is_empty() {
                return Err(configuration("virus name must not be empty"));
            }
            if !names.insert(virus.name.as_str()) {
                return Err(configuration(format!(
                    "duplicate virus name: {}",
                    virus.name
                )));
            }
            if !is_probability(virus.infection_chance) {
                return Err(configuration(format!(
                    "virus {}: infection_chance must be within [0, 1], got {}",
                    virus.name, virus.infection_chance
                )));
            }
            if !is_probability(virus.mortality_chance) {
                return Err(configuration(format!(
                    "virus {}: mortality_chance must be within [0, 1], got {}",
                    virus.name, virus.mortality_chance
                )));
            }
        }
        Ok(())
    }
}

fn configuration(reason: impl Into<String>) -> EngineError {
    EngineError::Configuration {
        reason: reason.into(),
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Seeded, no tick processed yet.
    NotStarted,
    /// At least one tick processed and infections remain.
    Running,
    /// A tick finished with no infectious cell. Terminal.
    Ended,
}

/// The lattice epidemic engine.
#[derive(Debug)]
pub struct Engine<R> {
    store: LatticeStore,
    viruses: Vec<Virus>,
    transmission: TransmissionModel,
    aggregator: Aggregator,
    initial_infected_per_virus: usize,
    /// Last completed tick ([`SEEDING_TICK`] before the first step).
    tick: Tick,
    phase: Phase,
    rng: R,
}

impl<R: Rng> Engine<R> {
    /// Validate `config`, allocate the lattice and seed every virus.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] for an invalid shape, seed
    /// count or virus list, and [`EngineError::Capacity`] if `S^D` exceeds
    /// `config.max_cells`.
    pub fn new(config: &EngineConfig, rng: R) -> Result<Self, EngineError> {
        config.validate()?;
        let geometry = Geometry::new(
            config.side_length,
            config.dimensions,
            config.max_cells,
            config.neighbor_mode,
        )
        .map_err(geometry_error)?;
        let total_cells =
            u64::try_from(geometry.total_cells()).map_err(|_err| EngineError::Capacity {
                source: LatticeError::SizeOverflow,
            })?;
        let dimensions = geometry.dimensions();
        let store = LatticeStore::new(geometry);

        let mut engine = Self {
            store,
            viruses: config.viruses.clone(),
            transmission: TransmissionModel::new(config.transmission, dimensions),
            aggregator: Aggregator::new(&config.viruses, total_cells, config.history_capacity),
            initial_infected_per_virus: config.initial_infected_per_virus,
            tick: SEEDING_TICK,
            phase: Phase::NotStarted,
            rng,
        };
        engine.seed();

        info!(
            side_length = config.side_length,
            dimensions,
            total_cells,
            viruses = engine.viruses.len(),
            neighbor_mode = ?config.neighbor_mode,
            transmission = ?config.transmission,
            initially_infected = engine.aggregator.latest().infected_total,
            "Engine initialized"
        );
        Ok(engine)
    }

    /// Discard the run and start a new one on the same lattice.
    ///
    /// Every cell returns to the pristine state and every virus is seeded
    /// again, drawing from the same random source.
    pub fn reset(&mut self) {
        self.store.reset();
        self.aggregator.reset();
        self.tick = SEEDING_TICK;
        self.phase = Phase::NotStarted;
        self.seed();
        info!(
            initially_infected = self.aggregator.latest().infected_total,
            "Engine reset"
        );
    }

    /// Process one tick and return its report.
    ///
    /// After the run has ended this returns the final report without
    /// advancing the tick or drawing random numbers.
    pub fn step(&mut self) -> &TickReport {
        if self.phase == Phase::Ended {
            return self.aggregator.latest();
        }

        let tick = self.tick.saturating_add(1);
        let Self {
            store,
            viruses,
            transmission,
            aggregator,
            rng,
            ..
        } = self;

        aggregator.begin_tick();
        for index in 0..store.len() {
            let Some(cell) = store.cell(index) else {
                continue;
            };
            if cell.dead {
                continue;
            }

            if cell.infectious_until >= tick {
                let mortality = cell
                    .virus
                    .and_then(|id| viruses.get(id.index()))
                    .map_or(0.0, |virus| virus.mortality_chance);
                if rng.random::<f64>() < mortality {
                    let dead = Cell { dead: true, ..cell };
                    if store.set_cell(index, dead).is_ok() {
                        aggregator.record_death(cell.virus);
                    }
                    continue;
                }
                aggregator.record_infected(cell.virus);
            } else if cell.immune_until < tick {
                if let Some(virus) = transmission.try_infect(store, index, tick, viruses, rng) {
                    aggregator.record_infected(Some(virus));
                }
            }
        }

        let infected = aggregator.infected_total();
        let dead = aggregator.dead_count();
        let ended = infected == 0;

        self.tick = tick;
        self.phase = if ended { Phase::Ended } else { Phase::Running };
        debug!(tick, infected, dead, "Tick processed");
        if ended {
            info!(tick, dead, "No infectious cells remain, run ended");
        }

        self.aggregator.finish_tick(tick, ended)
    }

    /// Seed `initial_infected_per_virus` cells for each virus, in list
    /// order, and publish the seeding snapshot.
    fn seed(&mut self) {
        for (position, virus) in self.viruses.iter().enumerate() {
            let Ok(id) = VirusId::try_from(position) else {
                continue;
            };
            let outcome = self.store.seed_infections(
                id,
                virus.recovery_duration,
                self.initial_infected_per_virus,
                &mut self.rng,
            );
            if outcome.overwritten > 0 {
                warn!(
                    virus = virus.name,
                    overwritten = outcome.overwritten,
                    "Seeds landed on already-seeded cells"
                );
            }
        }

        self.aggregator.begin_tick();
        for cell in self.store.cells() {
            if cell.is_infectious(FIRST_TICK) {
                self.aggregator.record_infected(cell.virus);
            }
        }
        self.aggregator.finish_tick(SEEDING_TICK, false);
    }
}

impl<R> Engine<R> {
    /// Current lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the run has ended.
    pub const fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended)
    }

    /// Last completed tick ([`SEEDING_TICK`] before the first step).
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// The most recent report.
    pub const fn report(&self) -> &TickReport {
        self.aggregator.latest()
    }

    /// Report time series, starting with the seeding snapshot.
    pub const fn history(&self) -> &History {
        self.aggregator.history()
    }

    /// The cell buffer, read-only.
    pub const fn store(&self) -> &LatticeStore {
        &self.store
    }

    /// Number of cells, `S^D`.
    pub fn total_cells(&self) -> usize {
        self.store.len()
    }

    /// The run's virus list.
    pub fn viruses(&self) -> &[Virus] {
        &self.viruses
    }

    /// Look up a virus by id.
    pub fn virus(&self, id: VirusId) -> Option<&Virus> {
        self.viruses.get(id.index())
    }

    /// Display state of cell `index` at the last completed tick.
    ///
    /// Before the first step the seeded cells already show as infected.
    pub fn cell_display_state(&self, index: usize) -> Option<CellDisplayState> {
        let cell = self.store.cell(index)?;
        let infected = cell.is_infectious(self.tick.max(FIRST_TICK));
        Some(CellDisplayState {
            alive: !cell.dead,
            infected,
            virus: if infected { cell.virus } else { None },
        })
    }
}
