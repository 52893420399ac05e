//! Hypergrid cell storage and neighbor resolution for the Outbreak engine.
//!
//! The lattice is a D-dimensional cube of side length S, stored as one flat
//! buffer of `S^D` cells addressed by a single linear index. Neighbors are
//! found with a constant stride per dimension (`S^dim`), so no coordinates
//! are materialized on the hot path.
//!
//! # Modules
//!
//! - [`error`] -- Error types for lattice construction and cell writes.
//! - [`geometry`] -- [`Geometry`] strides, [`NeighborMode`] adjacency rules
//!   and per-axis edge checks.
//! - [`store`] -- [`LatticeStore`], the per-cell state buffer, and seeding.

pub mod error;
pub mod geometry;
pub mod store;

// Re-export primary types at crate root.
pub use error::LatticeError;
pub use geometry::{DEFAULT_MAX_CELLS, Direction, Geometry, MAX_DIMENSIONS, NeighborMode};
pub use store::{Cell, LatticeStore, SeedOutcome};
