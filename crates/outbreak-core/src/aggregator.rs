//! Per-tick counts and the report time series.
//!
//! The [`Aggregator`] is a read-side projection. The engine feeds it one
//! event per infected or dying cell during a pass and asks it for a
//! [`TickReport`] at the end. Counters are plain vectors indexed by
//! [`VirusId`] and are reset in place between ticks.

use std::collections::{BTreeMap, VecDeque};

use outbreak_types::{Tick, TickReport, Virus, VirusId};

/// Time series of tick reports, optionally bounded.
///
/// With a capacity, the oldest record is evicted once the series is full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    capacity: Option<usize>,
    records: VecDeque<TickReport>,
}

impl History {
    /// Create a history that keeps at most `capacity` records, or every
    /// record when `capacity` is `None`.
    pub const fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            records: VecDeque::new(),
        }
    }

    /// The retention bound, if any.
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Append a record, evicting the oldest one if the history is full.
    pub fn push(&mut self, report: TickReport) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.records.len() >= capacity {
                self.records.pop_front();
            }
        }
        self.records.push_back(report);
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record is retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TickReport> {
        self.records.iter()
    }

    /// The most recent `count` records, oldest first.
    pub fn window(&self, count: usize) -> impl Iterator<Item = &TickReport> {
        self.records
            .iter()
            .skip(self.records.len().saturating_sub(count))
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&TickReport> {
        self.records.back()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Accumulates counts for the tick in progress and publishes reports.
#[derive(Debug, Clone)]
pub struct Aggregator {
    /// Virus names, indexed by [`VirusId`].
    names: Vec<String>,
    total_cells: u64,
    /// Cumulative deaths.
    dead: u64,
    dead_by_virus: Vec<u64>,
    /// Infectious cells in the tick in progress.
    infected: u64,
    infected_by_virus: Vec<u64>,
    latest: TickReport,
    history: History,
}

impl Aggregator {
    /// Create an aggregator for `viruses` over a lattice of `total_cells`.
    pub fn new(viruses: &[Virus], total_cells: u64, history_capacity: Option<usize>) -> Self {
        let names: Vec<String> = viruses.iter().map(|v| v.name.clone()).collect();
        let count = names.len();
        let mut aggregator = Self {
            names,
            total_cells,
            dead: 0,
            dead_by_virus: vec![0; count],
            infected: 0,
            infected_by_virus: vec![0; count],
            latest: TickReport {
                tick: 0,
                total_cells,
                dead_count: 0,
                healthy_count: total_cells,
                infected_total: 0,
                infected_by_virus: BTreeMap::new(),
                dead_by_virus: BTreeMap::new(),
                ended: false,
            },
            history: History::new(history_capacity),
        };
        aggregator.latest = aggregator.build_report(0, false);
        aggregator
    }

    /// Zero the per-tick infection counters.
    pub fn begin_tick(&mut self) {
        self.infected = 0;
        self.infected_by_virus.fill(0);
    }

    /// Count one cell as infectious this tick.
    pub fn record_infected(&mut self, virus: Option<VirusId>) {
        self.infected = self.infected.saturating_add(1);
        if let Some(slot) = virus.and_then(|id| self.infected_by_virus.get_mut(id.index())) {
            *slot = slot.saturating_add(1);
        }
    }

    /// Count one death.
    pub fn record_death(&mut self, virus: Option<VirusId>) {
        self.dead = self.dead.saturating_add(1);
        if let Some(slot) = virus.and_then(|id| self.dead_by_virus.get_mut(id.index())) {
            *slot = slot.saturating_add(1);
        }
    }

    /// Publish the report for `tick` and append it to the history.
    pub fn finish_tick(&mut self, tick: Tick, ended: bool) -> &TickReport {
        let report = self.build_report(tick, ended);
        self.history.push(report.clone());
        self.latest = report;
        &self.latest
    }

    /// Infectious cells counted so far in the tick in progress.
    pub const fn infected_total(&self) -> u64 {
        self.infected
    }

    /// Cumulative deaths.
    pub const fn dead_count(&self) -> u64 {
        self.dead
    }

    /// The last published report.
    pub const fn latest(&self) -> &TickReport {
        &self.latest
    }

    /// The report time series.
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Zero every counter and clear the history.
    pub fn reset(&mut self) {
        self.dead = 0;
        self.dead_by_virus.fill(0);
        self.begin_tick();
        self.history.clear();
        self.latest = self.build_report(0, false);
    }

    fn build_report(&self, tick: Tick, ended: bool) -> TickReport {
        let by_name = |counts: &[u64]| -> BTreeMap<String, u64> {
            self.names
                .iter()
                .zip(counts)
                .map(|(name, &count)| (name.clone(), count))
                .collect()
        };
        TickReport {
            tick,
            total_cells: self.total_cells,
            dead_count: self.dead,
            healthy_count: self
                .total_cells
                .saturating_sub(self.dead)
                .saturating_sub(self.infected),
            infected_total: self.infected,
            infected_by_virus: by_name(&self.infected_by_virus),
            dead_by_virus: by_name(&self.dead_by_virus),
            ended,
        }
    }
}
