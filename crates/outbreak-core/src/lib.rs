//! Transmission model, step scheduler, aggregation and run loop for the
//! Outbreak lattice epidemic engine.
//!
//! One tick is one synchronous pass over every cell of the lattice, in
//! index order: infectious cells roll for death, susceptible cells roll
//! for infection from their neighbors, and the per-tick counts are
//! published as a [`TickReport`].
//!
//! # Modules
//!
//! - [`aggregator`] -- Per-tick counters, [`TickReport`] assembly and the
//!   bounded report [`History`].
//! - [`config`] -- Configuration loading from `outbreak-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- The [`Engine`] state machine and its [`EngineConfig`].
//! - [`runner`] -- Paced async run loop with [`TickCallback`] hooks.
//! - [`transmission`] -- Neighbor-walk infection decisions.
//!
//! [`TickReport`]: outbreak_types::TickReport
//! [`History`]: aggregator::History
//! [`Engine`]: engine::Engine
//! [`EngineConfig`]: engine::EngineConfig
//! [`TickCallback`]: runner::TickCallback

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod runner;
pub mod transmission;
