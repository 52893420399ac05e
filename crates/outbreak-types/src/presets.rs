//! Built-in virus presets.
//!
//! Used as the virus list when a configuration does not name any viruses.

use crate::virus::Virus;

/// Name of the fatal preset.
pub const FATAL_NAME: &str = "P01F";

/// A slow-spreading virus with a high per-tick mortality.
pub fn fatal() -> Virus {
    Virus {
        name: FATAL_NAME.to_owned(),
        color: "#ff0000".to_owned(),
        infection_chance: 0.05,
        recovery_duration: 7,
        immunity_duration: 5,
        mortality_chance: 0.1,
    }
}

/// The virus list used when none is configured.
pub fn default_viruses() -> Vec<Virus> {
    vec![fatal()]
}
