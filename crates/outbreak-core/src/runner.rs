//! Paced simulation loop.
//!
//! [`run_simulation`] drives [`Engine::step`] until the epidemic ends or
//! the tick limit is reached, sleeping `tick_interval_ms` between ticks and
//! handing every report to a [`TickCallback`].

use outbreak_types::{Tick, TickReport};
use rand::Rng;
use tracing::info;

use crate::engine::Engine;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// A tick finished with no infectious cell.
    EpidemicEnded,
    /// `max_ticks` ticks were processed first.
    MaxTicksReached,
}

/// Limits and pacing of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBounds {
    /// Maximum ticks to process (0 = unlimited).
    pub max_ticks: u64,
    /// Milliseconds to sleep between ticks (0 = no pacing).
    pub tick_interval_ms: u64,
}

/// Outcome of [`run_simulation`].
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// The reason the run stopped.
    pub end_reason: EndReason,
    /// The report of the last processed tick.
    pub final_report: TickReport,
    /// Ticks processed by this call.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called with the report of the tick that just ran.
    fn on_tick(&mut self, report: &TickReport);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport) {}
}

/// Run the engine until the epidemic ends or `bounds.max_ticks` is reached.
///
/// An engine that has already ended returns immediately with
/// [`EndReason::EpidemicEnded`] and zero ticks processed.
pub async fn run_simulation<R: Rng>(
    engine: &mut Engine<R>,
    bounds: &RunBounds,
    callback: &mut dyn TickCallback,
) -> SimulationResult {
    let mut total_ticks: u64 = 0;

    info!(
        start_tick = engine.tick(),
        max_ticks = bounds.max_ticks,
        tick_interval_ms = bounds.tick_interval_ms,
        "Simulation starting"
    );

    loop {
        if engine.is_ended() {
            return SimulationResult {
                end_reason: EndReason::EpidemicEnded,
                final_report: engine.report().clone(),
                total_ticks,
            };
        }

        let report = engine.step().clone();
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&report);

        if report.ended {
            return SimulationResult {
                end_reason: EndReason::EpidemicEnded,
                final_report: report,
                total_ticks,
            };
        }

        if bounds.max_ticks > 0 && total_ticks >= bounds.max_ticks {
            info!(
                tick = report.tick,
                max_ticks = bounds.max_ticks,
                "Tick limit reached"
            );
            return SimulationResult {
                end_reason: EndReason::MaxTicksReached,
                final_report: report,
                total_ticks,
            };
        }

        if bounds.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(bounds.tick_interval_ms)).await;
        }
    }
}

/// Log the outcome of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    let final_tick: Tick = result.final_report.tick;
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick,
        dead = result.final_report.dead_count,
        healthy = result.final_report.healthy_count,
        mortality = result.final_report.mortality_fraction(),
        "Simulation ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outbreak_types::Virus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::EngineConfig;

    struct Recorder {
        ticks: Vec<Tick>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, report: &TickReport) {
            self.ticks.push(report.tick);
        }
    }

    fn virus(recovery_duration: u32) -> Virus {
        Virus {
            name: "slow".to_owned(),
            color: "#222222".to_owned(),
            infection_chance: 0.0,
            recovery_duration,
            immunity_duration: 0,
            mortality_chance: 0.0,
        }
    }

    fn engine(recovery_duration: u32) -> Engine<StdRng> {
        let config = EngineConfig::new(5, 2, 1, vec![virus(recovery_duration)]);
        Engine::new(&config, StdRng::seed_from_u64(11)).unwrap()
    }

    #[tokio::test]
    async fn runs_until_epidemic_ends() {
        // No spread or death: the seed recovers after tick 4 and tick 5 is empty.
        let mut engine = engine(4);
        let mut recorder = Recorder { ticks: Vec::new() };
        let bounds = RunBounds {
            max_ticks: 0,
            tick_interval_ms: 0,
        };
        let result = run_simulation(&mut engine, &bounds, &mut recorder).await;

        assert_eq!(result.end_reason, EndReason::EpidemicEnded);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_report.tick, 5);
        assert!(result.final_report.ended);
        assert_eq!(recorder.ticks, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let mut engine = engine(100);
        let bounds = RunBounds {
            max_ticks: 3,
            tick_interval_ms: 0,
        };
        let result = run_simulation(&mut engine, &bounds, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(engine.tick(), 3);
        assert!(!engine.is_ended());
        log_simulation_end(&result);
    }

    #[tokio::test(start_paused = true)]
    async fn paces_ticks() {
        let mut engine = engine(2);
        let bounds = RunBounds {
            max_ticks: 0,
            tick_interval_ms: 100,
        };
        let started = tokio::time::Instant::now();
        let result = run_simulation(&mut engine, &bounds, &mut NoOpCallback).await;

        assert_eq!(result.total_ticks, 3);
        // Two sleeps: after tick 1 and after tick 2.
        assert!(started.elapsed() >= tokio::time::Duration::from_millis(200));
    }

    #[tokio::test]
    async fn ended_engine_returns_immediately() {
        let mut engine = engine(0);
        let bounds = RunBounds {
            max_ticks: 0,
            tick_interval_ms: 0,
        };
        let first = run_simulation(&mut engine, &bounds, &mut NoOpCallback).await;
        assert_eq!(first.total_ticks, 1);

        let second = run_simulation(&mut engine, &bounds, &mut NoOpCallback).await;
        assert_eq!(second.end_reason, EndReason::EpidemicEnded);
        assert_eq!(second.total_ticks, 0);
        assert_eq!(second.final_report, first.final_report);
    }
}
