//! Tick numbering and virus identifiers.
//!
//! Ticks are signed so that the `-1` sentinel used by the lattice for
//! "never" is representable without a separate flag. A [`VirusId`] is the
//! position of a virus in the run's ordered virus list.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A discrete simulation time step.
///
/// Run ticks start at 1. Tick 0 is reserved for the seeding snapshot and
/// [`NEVER`] marks a window that was never opened.
pub type Tick = i64;

/// Sentinel for an infectious or immunity window that is not open.
pub const NEVER: Tick = -1;

/// Index of a virus within the ordered virus list of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VirusId(pub u16);

impl VirusId {
    /// Return the position of this virus in the virus list.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<usize> for VirusId {
    type Error = core::num::TryFromIntError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u16::try_from(index).map(Self)
    }
}

impl core::fmt::Display for VirusId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "virus#{}", self.0)
    }
}
