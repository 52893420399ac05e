//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Wraps each startup failure in a single type that `main` can propagate
/// with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: outbreak_core::config::ConfigError,
    },

    /// The engine rejected the configuration.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: outbreak_core::engine::EngineError,
    },
}
