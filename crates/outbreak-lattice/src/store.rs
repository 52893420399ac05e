//! Per-cell state buffer.
//!
//! [`LatticeStore`] owns one [`Cell`] per lattice index in a single flat
//! `Vec`, allocated once at construction. Resetting a run reuses the buffer.
//!
//! A dead cell is terminal: [`LatticeStore::set_cell`] refuses to write it,
//! and only [`LatticeStore::reset`] returns it to the pristine state.

use outbreak_types::{NEVER, Tick, VirusId};
use rand::Rng;
use tracing::debug;

use crate::error::LatticeError;
use crate::geometry::{Geometry, NeighborMode};

/// State of one agent on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Last tick of the infectious window, or [`NEVER`].
    pub infectious_until: Tick,
    /// Last tick of the immunity window, or [`NEVER`].
    pub immune_until: Tick,
    /// Whether the agent has died. Terminal.
    pub dead: bool,
    /// Virus the agent carries or last carried.
    pub virus: Option<VirusId>,
}

impl Cell {
    /// Never infected, not immune, alive, no virus.
    pub const PRISTINE: Self = Self {
        infectious_until: NEVER,
        immune_until: NEVER,
        dead: false,
        virus: None,
    };

    /// Whether the cell can transmit at `tick`.
    pub const fn is_infectious(&self, tick: Tick) -> bool {
        !self.dead && self.infectious_until >= tick
    }

    /// Whether the cell is protected from reinfection at `tick`.
    pub const fn is_immune(&self, tick: Tick) -> bool {
        !self.dead && self.immune_until >= tick
    }

    /// Alive, not infectious and not immune at `tick`.
    pub const fn is_susceptible(&self, tick: Tick) -> bool {
        !self.dead && self.infectious_until < tick && self.immune_until < tick
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::PRISTINE
    }
}

/// Result of seeding one virus into the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Number of seeds drawn.
    pub requested: usize,
    /// Seeds that landed on a cell already carrying a seeded virus.
    pub overwritten: usize,
}

/// Flat buffer of lattice cells.
#[derive(Debug, Clone)]
pub struct LatticeStore {
    /// Shape and adjacency of the lattice.
    geometry: Geometry,
    /// One entry per linear index.
    cells: Vec<Cell>,
}

impl LatticeStore {
    /// Allocate a pristine store for the given geometry.
    pub fn new(geometry: Geometry) -> Self {
        let cells = vec![Cell::PRISTINE; geometry.total_cells()];
        Self { geometry, cells }
    }

    /// Validate the shape and allocate a pristine store for `S^D` cells.
    ///
    /// # Errors
    ///
    /// Propagates the [`LatticeError`] from [`Geometry::new`].
    pub fn initialize(
        side_length: usize,
        dimensions: u32,
        max_cells: usize,
        mode: NeighborMode,
    ) -> Result<Self, LatticeError> {
        let geometry = Geometry::new(side_length, dimensions, max_cells, mode)?;
        Ok(Self::new(geometry))
    }

    /// The lattice shape.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store has no cells. Never true for a valid geometry.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Snapshot of cell `index`.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Overwrite cell `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::CellOutOfRange`] for an index outside the
    /// lattice and [`LatticeError::CellFrozen`] if the cell is dead.
    pub fn set_cell(&mut self, index: usize, cell: Cell) -> Result<(), LatticeError> {
        let len = self.cells.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(LatticeError::CellOutOfRange { index, len })?;
        if slot.dead {
            return Err(LatticeError::CellFrozen { index });
        }
        *slot = cell;
        Ok(())
    }

    /// Return every cell to [`Cell::PRISTINE`] without reallocating.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::PRISTINE);
    }

    /// Seed `count` infections of `virus` at uniformly drawn indices.
    ///
    /// Indices are drawn with replacement. Each seeded cell becomes
    /// infectious until tick `recovery_duration`; its immunity window is
    /// left closed. A seed landing on an already-seeded cell replaces the
    /// earlier virus.
    pub fn seed_infections<R: Rng>(
        &mut self,
        virus: VirusId,
        recovery_duration: u32,
        count: usize,
        rng: &mut R,
    ) -> SeedOutcome {
        let mut outcome = SeedOutcome {
            requested: count,
            overwritten: 0,
        };
        let len = self.cells.len();
        if len == 0 {
            return outcome;
        }

        for _ in 0..count {
            let index = rng.random_range(0..len);
            if let Some(cell) = self.cells.get_mut(index) {
                if cell.virus.is_some() {
                    outcome.overwritten = outcome.overwritten.saturating_add(1);
                }
                cell.infectious_until = Tick::from(recovery_duration);
                cell.virus = Some(virus);
            }
        }

        debug!(
            %virus,
            requested = outcome.requested,
            overwritten = outcome.overwritten,
            "Seeded infections"
        );
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::geometry::DEFAULT_MAX_CELLS;

    fn store(side: usize, dims: u32) -> LatticeStore {
        LatticeStore::initialize(side, dims, DEFAULT_MAX_CELLS, NeighborMode::Flat).unwrap()
    }

    #[test]
    fn new_store_is_pristine() {
        let store = store(4, 3);
        assert_eq!(store.len(), 64);
        assert!(!store.is_empty());
        assert!(store.cells().iter().all(|c| *c == Cell::PRISTINE));
    }

    #[test]
    fn pristine_cell_is_susceptible_from_tick_one() {
        let cell = Cell::PRISTINE;
        assert!(cell.is_susceptible(1));
        assert!(!cell.is_infectious(1));
        assert!(!cell.is_immune(1));
    }

    #[test]
    fn windows_are_inclusive() {
        let cell = Cell {
            infectious_until: 5,
            immune_until: 9,
            dead: false,
            virus: Some(VirusId(0)),
        };
        assert!(cell.is_infectious(5));
        assert!(!cell.is_infectious(6));
        assert!(cell.is_immune(9));
        assert!(!cell.is_susceptible(9));
        assert!(cell.is_susceptible(10));
    }

    #[test]
    fn dead_cell_is_neither_infectious_nor_immune() {
        let cell = Cell {
            infectious_until: 50,
            immune_until: 60,
            dead: true,
            virus: Some(VirusId(0)),
        };
        assert!(!cell.is_infectious(10));
        assert!(!cell.is_immune(10));
        assert!(!cell.is_susceptible(10));
    }

    #[test]
    fn set_cell_round_trips() {
        let mut store = store(5, 2);
        let cell = Cell {
            infectious_until: 3,
            immune_until: 8,
            dead: false,
            virus: Some(VirusId(1)),
        };
        store.set_cell(7, cell).unwrap();
        assert_eq!(store.cell(7), Some(cell));
        assert_eq!(store.cell(25), None);
    }

    #[test]
    fn set_cell_rejects_out_of_range() {
        let mut store = store(5, 2);
        let result = store.set_cell(25, Cell::PRISTINE);
        assert!(matches!(
            result,
            Err(LatticeError::CellOutOfRange { index: 25, len: 25 })
        ));
    }

    #[test]
    fn dead_cells_are_frozen() {
        let mut store = store(5, 1);
        let dead = Cell {
            dead: true,
            ..Cell::PRISTINE
        };
        store.set_cell(2, dead).unwrap();
        let result = store.set_cell(2, Cell::PRISTINE);
        assert!(matches!(result, Err(LatticeError::CellFrozen { index: 2 })));
        assert_eq!(store.cell(2), Some(dead));
    }

    #[test]
    fn reset_restores_pristine_cells() {
        let mut store = store(5, 1);
        store
            .set_cell(
                0,
                Cell {
                    dead: true,
                    ..Cell::PRISTINE
                },
            )
            .unwrap();
        store.reset();
        assert!(store.cells().iter().all(|c| *c == Cell::PRISTINE));
    }

    #[test]
    fn seeding_marks_cells_infectious_until_recovery() {
        let mut store = store(10, 1);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = store.seed_infections(VirusId(0), 7, 3, &mut rng);
        assert_eq!(outcome.requested, 3);

        let seeded: Vec<&Cell> = store.cells().iter().filter(|c| c.virus.is_some()).collect();
        assert!(!seeded.is_empty());
        assert!(seeded.len() <= 3);
        assert_eq!(seeded.len().saturating_add(outcome.overwritten), 3);
        for cell in seeded {
            assert_eq!(cell.infectious_until, 7);
            assert_eq!(cell.immune_until, NEVER);
            assert!(cell.is_infectious(1));
        }
    }

    #[test]
    fn later_seeding_overwrites_earlier_virus() {
        // A single-cell lattice forces every seed onto the same index.
        let mut store = store(1, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let first = store.seed_infections(VirusId(0), 4, 1, &mut rng);
        let second = store.seed_infections(VirusId(1), 9, 1, &mut rng);
        assert_eq!(first.overwritten, 0);
        assert_eq!(second.overwritten, 1);
        let cell = store.cell(0).unwrap();
        assert_eq!(cell.virus, Some(VirusId(1)));
        assert_eq!(cell.infectious_until, 9);
    }
}
