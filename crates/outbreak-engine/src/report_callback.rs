//! Tick callback that logs periodic progress reports.

use outbreak_core::runner::TickCallback;
use outbreak_types::TickReport;
use tracing::{debug, info};

/// Logs a summary line every `every` ticks and on the final tick.
pub struct ReportCallback {
    every: u64,
    logged: u64,
}

impl ReportCallback {
    /// Create a callback that logs every `every` ticks (0 disables the
    /// periodic line; the final tick is still logged).
    pub const fn new(every: u64) -> Self {
        Self { every, logged: 0 }
    }

    /// Number of reports logged at info level so far.
    pub const fn logged(&self) -> u64 {
        self.logged
    }

    fn is_due(&self, report: &TickReport) -> bool {
        if report.ended {
            return true;
        }
        let Ok(tick) = u64::try_from(report.tick) else {
            return false;
        };
        tick.checked_rem(self.every) == Some(0)
    }
}

impl TickCallback for ReportCallback {
    fn on_tick(&mut self, report: &TickReport) {
        if !self.is_due(report) {
            debug!(tick = report.tick, infected = report.infected_total, "Tick");
            return;
        }
        self.logged = self.logged.saturating_add(1);
        info!(
            tick = report.tick,
            infected = report.infected_total,
            healthy = report.healthy_count,
            dead = report.dead_count,
            by_virus = ?report.infected_by_virus,
            "Tick report"
        );
    }
}
