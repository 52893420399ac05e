//! Shared type definitions for the Outbreak lattice epidemic engine.
//!
//! This crate is the single source of truth for the value types that cross
//! the boundary between the engine and its consumers. Types flow downstream
//! to `TypeScript` via `ts-rs` for the rendering layer.
//!
//! # Modules
//!
//! - [`ids`] -- [`Tick`] alias and the [`VirusId`] index wrapper
//! - [`virus`] -- The immutable [`Virus`] parameter set and color helpers
//! - [`report`] -- Per-tick [`TickReport`] and per-cell [`CellDisplayState`]
//! - [`presets`] -- Built-in virus presets

pub mod ids;
pub mod presets;
pub mod report;
pub mod virus;

// Re-export all public types at crate root for convenience.
pub use ids::{NEVER, Tick, VirusId};
pub use report::{CellDisplayState, TickReport};
pub use virus::{Virus, rgb_to_hex};
