//! The immutable virus parameter set.
//!
//! A [`Virus`] is read-only for the lifetime of a run and shared by every
//! cell it infects. Chances are per-tick probabilities in `[0, 1]`;
//! durations are tick counts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A named pathogen variant with independent transmission parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Virus {
    /// Identifier used as the aggregation key in reports. Unique per run.
    pub name: String,
    /// Display color (`#RRGGBB`). Not used by the simulation.
    pub color: String,
    /// Probability that one infectious neighbor transmits in one tick.
    pub infection_chance: f64,
    /// Number of ticks a cell stays infectious after infection.
    pub recovery_duration: u32,
    /// Number of ticks a cell stays immune after its infectious window.
    pub immunity_duration: u32,
    /// Probability that an infectious cell dies in one tick.
    pub mortality_chance: f64,
}

impl Virus {
    /// Length of the infectious window plus the immunity window, in ticks.
    pub fn protected_duration(&self) -> u64 {
        u64::from(self.recovery_duration).saturating_add(u64::from(self.immunity_duration))
    }
}

/// Format RGB components as an uppercase `#RRGGBB` color string.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}
