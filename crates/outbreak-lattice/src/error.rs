//! Error types for the `outbreak-lattice` crate.
//!
//! All fallible operations in this crate return [`LatticeError`].

/// Errors that can occur while building or writing the lattice.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    /// Side length or dimension count is out of range.
    #[error("invalid lattice geometry: {reason}")]
    InvalidGeometry {
        /// Explanation of what is wrong with the geometry.
        reason: String,
    },

    /// `S^D` exceeds the configured cell budget.
    #[error("lattice of {requested} cells exceeds the maximum of {max}")]
    CapacityExceeded {
        /// Number of cells requested (`S^D`).
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// `S^D` does not fit in the address space.
    #[error("lattice size overflows usize")]
    SizeOverflow,

    /// A cell index is outside `[0, S^D)`.
    #[error("cell index {index} out of range (len {len})")]
    CellOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of cells in the lattice.
        len: usize,
    },

    /// A write targeted a dead cell, whose state is frozen.
    #[error("cell {index} is dead and cannot change state")]
    CellFrozen {
        /// The dead cell.
        index: usize,
    },
}
