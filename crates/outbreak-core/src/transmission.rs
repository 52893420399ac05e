//! Infection decisions for susceptible cells.
//!
//! A susceptible cell looks at its `2·D` lattice neighbors. Each neighbor
//! that is infectious at the current tick may pass on its virus with that
//! virus's `infection_chance`.
//!
//! # Strategies
//!
//! - [`TransmissionStrategy::FirstMatch`] walks the neighbors in a random
//!   order and stops at the first successful draw. The dimension order is
//!   forward or reversed with equal probability, and the two directions of
//!   each dimension are shuffled independently, so no axis or virus is
//!   favored when several viruses border the same cell.
//! - [`TransmissionStrategy::Pooled`] collects every infectious neighbor
//!   and draws once against `1 - Π(1 - p)`. The winning virus is picked
//!   with weight proportional to its chance.

use outbreak_lattice::{Cell, Direction, LatticeStore};
use outbreak_types::{Tick, Virus, VirusId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a susceptible cell combines its infectious neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionStrategy {
    /// Randomized neighbor walk, first successful draw wins.
    #[default]
    FirstMatch,
    /// One draw against the combined chance of all infectious neighbors.
    Pooled,
}

/// Return `pair` in its original or swapped order with equal probability.
pub fn shuffled_pair<T: Copy, R: Rng>(pair: [T; 2], rng: &mut R) -> [T; 2] {
    let [first, second] = pair;
    if rng.random_bool(0.5) {
        [second, first]
    } else {
        [first, second]
    }
}

/// Open the infectious and immunity windows of `cell` for `virus` at `tick`.
///
/// The cell is infectious through `tick + recovery_duration` and immune
/// through `tick` plus [`Virus::protected_duration`].
pub fn infect(cell: &mut Cell, virus_id: VirusId, virus: &Virus, tick: Tick) {
    let protected = Tick::try_from(virus.protected_duration()).unwrap_or(Tick::MAX);
    cell.infectious_until = tick.saturating_add(Tick::from(virus.recovery_duration));
    cell.immune_until = tick.saturating_add(protected);
    cell.virus = Some(virus_id);
}

/// An infectious neighbor considered by the pooled strategy.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    virus: VirusId,
    chance: f64,
}

/// Decides whether a susceptible cell is infected this tick.
///
/// Holds a scratch buffer sized for `2·D` neighbors so the pooled strategy
/// never allocates during a tick.
#[derive(Debug, Clone)]
pub struct TransmissionModel {
    strategy: TransmissionStrategy,
    candidates: Vec<Candidate>,
}

impl TransmissionModel {
    /// Create a model for a lattice with `dimensions` axes.
    pub fn new(strategy: TransmissionStrategy, dimensions: usize) -> Self {
        Self {
            strategy,
            candidates: Vec::with_capacity(dimensions.saturating_mul(2)),
        }
    }

    /// The strategy in effect.
    pub const fn strategy(&self) -> TransmissionStrategy {
        self.strategy
    }

    /// Try to infect cell `index` at `tick`.
    ///
    /// On success the cell's windows and virus are written to `store`
    /// immediately, so cells visited later in the same tick see it as
    /// infectious, and the infecting virus is returned. Returns `None` if
    /// the cell is not susceptible or no neighbor transmits.
    pub fn try_infect<R: Rng>(
        &mut self,
        store: &mut LatticeStore,
        index: usize,
        tick: Tick,
        viruses: &[Virus],
        rng: &mut R,
    ) -> Option<VirusId> {
        let mut cell = store.cell(index)?;
        if !cell.is_susceptible(tick) {
            return None;
        }

        let source = match self.strategy {
            TransmissionStrategy::FirstMatch => first_match(store, index, tick, viruses, rng),
            TransmissionStrategy::Pooled => self.pooled(store, index, tick, viruses, rng),
        }?;

        let virus = viruses.get(source.index())?;
        infect(&mut cell, source, virus, tick);
        store.set_cell(index, cell).ok()?;
        Some(source)
    }

    fn pooled<R: Rng>(
        &mut self,
        store: &LatticeStore,
        index: usize,
        tick: Tick,
        viruses: &[Virus],
        rng: &mut R,
    ) -> Option<VirusId> {
        let geometry = store.geometry();
        self.candidates.clear();
        let mut escape = 1.0_f64;

        for dim in 0..geometry.dimensions() {
            for direction in Direction::ALL {
                let Some(source) = infectious_source(store, index, dim, direction, tick) else {
                    continue;
                };
                let Some(virus) = viruses.get(source.index()) else {
                    continue;
                };
                escape *= 1.0 - virus.infection_chance;
                self.candidates.push(Candidate {
                    virus: source,
                    chance: virus.infection_chance,
                });
            }
        }

        if self.candidates.is_empty() || rng.random::<f64>() >= 1.0 - escape {
            return None;
        }

        let total: f64 = self.candidates.iter().map(|c| c.chance).sum();
        let mut pick = rng.random::<f64>() * total;
        for candidate in &self.candidates {
            if pick < candidate.chance {
                return Some(candidate.virus);
            }
            pick -= candidate.chance;
        }
        // Float rounding can leave `pick` just past the last bucket.
        self.candidates.last().map(|c| c.virus)
    }
}

fn first_match<R: Rng>(
    store: &LatticeStore,
    index: usize,
    tick: Tick,
    viruses: &[Virus],
    rng: &mut R,
) -> Option<VirusId> {
    let dimensions = store.geometry().dimensions();
    let reversed = rng.random_bool(0.5);

    for step in 0..dimensions {
        let dim = if reversed {
            dimensions.saturating_sub(1).saturating_sub(step)
        } else {
            step
        };
        for direction in shuffled_pair(Direction::ALL, rng) {
            let Some(source) = infectious_source(store, index, dim, direction, tick) else {
                continue;
            };
            let Some(virus) = viruses.get(source.index()) else {
                continue;
            };
            if rng.random::<f64>() < virus.infection_chance {
                return Some(source);
            }
        }
    }
    None
}

/// Virus of the neighbor of `index` along `dim`/`direction`, if that
/// neighbor exists and is infectious at `tick`.
fn infectious_source(
    store: &LatticeStore,
    index: usize,
    dim: usize,
    direction: Direction,
    tick: Tick,
) -> Option<VirusId> {
    let neighbor = store.geometry().neighbor(index, dim, direction)?;
    let cell = store.cell(neighbor)?;
    if cell.is_infectious(tick) {
        cell.virus
    } else {
        None
    }
}
