#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the lapwatch timing registry.
//!
//! Measures wall-clock time for named keys, supports repeated and nested
//! timings through laps, and aggregates totals and averages. Intended for
//! ad-hoc profiling during development.

use tracing::{debug, instrument};

/// Registry configuration and environment overrides
pub mod config;
/// Error types for registry operations
pub mod error;
/// Scoped timing guards and macros
pub mod guard;
/// The timer registry and its state machine
pub mod registry;
/// Shared handles and the process-wide registry
pub mod shared;
/// Per-key timer state and snapshots
pub mod timer;

pub use config::{LapKeyStyle, RegistryConfig, TimeUnit};
pub use error::{TimerState, TimingError, TimingResult};
pub use guard::TimingGuard;
pub use registry::TimingRegistry;
pub use shared::{SharedRegistry, global, init_global};
pub use timer::TimerSnapshot;

/// Load configuration from file and environment and set up the global registry
#[instrument]
pub fn init() -> anyhow::Result<SharedRegistry> {
    debug!("Initializing lapwatch global registry");
    let config = RegistryConfig::load()?;
    Ok(init_global(config)?)
}
