//! Read-side projections handed to consumers after each tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{Tick, VirusId};

/// Aggregate counts for one completed tick.
///
/// `dead_count + healthy_count + infected_total == total_cells` holds for
/// every report the engine emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickReport {
    /// The tick this report describes (0 for the seeding snapshot).
    pub tick: Tick,
    /// Number of cells in the lattice (`S^D`).
    pub total_cells: u64,
    /// Cumulative number of dead cells.
    pub dead_count: u64,
    /// Cells alive and not infectious this tick, including immune cells.
    pub healthy_count: u64,
    /// Cells infectious this tick, summed across all viruses.
    pub infected_total: u64,
    /// Infectious cells this tick, keyed by virus name.
    pub infected_by_virus: BTreeMap<String, u64>,
    /// Cumulative deaths, keyed by the name of the virus that killed.
    pub dead_by_virus: BTreeMap<String, u64>,
    /// Whether the run ended on this tick (no infectious cells remain).
    pub ended: bool,
}

impl TickReport {
    /// Fraction of all cells that are dead, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn mortality_fraction(&self) -> f64 {
        if self.total_cells == 0 {
            return 0.0;
        }
        self.dead_count as f64 / self.total_cells as f64
    }

    /// Infectious count for one virus, 0 if the name is unknown.
    pub fn infected_with(&self, name: &str) -> u64 {
        self.infected_by_virus.get(name).copied().unwrap_or(0)
    }
}

/// Display state of a single cell, for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellDisplayState {
    /// Whether the cell is alive.
    pub alive: bool,
    /// Whether the cell is infectious at the current tick.
    pub infected: bool,
    /// Color key: the virus currently carried, if infectious.
    pub virus: Option<VirusId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_report() -> TickReport {
        TickReport {
            tick: 3,
            total_cells: 100,
            dead_count: 25,
            healthy_count: 70,
            infected_total: 5,
            infected_by_virus: BTreeMap::from([("alpha".to_owned(), 5)]),
            dead_by_virus: BTreeMap::from([("alpha".to_owned(), 25)]),
            ended: false,
        }
    }

    #[test]
    fn infected_with_defaults_to_zero() {
        let report = sample_report();
        assert_eq!(report.infected_with("alpha"), 5);
        assert_eq!(report.infected_with("beta"), 0);
    }

    #[test]
    fn mortality_fraction_of_quarter() {
        let report = sample_report();
        assert!((report.mortality_fraction() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn report_serializes_virus_maps_by_name() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["infected_by_virus"]["alpha"], 5);
        assert_eq!(json["ended"], false);
    }
}
