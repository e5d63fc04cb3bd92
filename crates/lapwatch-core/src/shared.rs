//! Shared and process-wide access to a timing registry
//!
//! `SharedRegistry` is a cloneable handle around one `TimingRegistry` guarded
//! by a single registry-wide lock. Build one and pass clones to collaborators,
//! or use [`global`] for the lazily created process instance.

use crate::config::RegistryConfig;
use crate::error::{TimingError, TimingResult};
use crate::guard::TimingGuard;
use crate::registry::TimingRegistry;
use crate::timer::TimerSnapshot;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

static GLOBAL: OnceCell<SharedRegistry> = OnceCell::new();

/// Handle to the process-wide registry, created with defaults on first use
pub fn global() -> SharedRegistry {
    GLOBAL.get_or_init(|| SharedRegistry::from_registry(TimingRegistry::new())).clone()
}

/// Create the process-wide registry with `config`
///
/// Fails with `AlreadyInitialized` once [`global`] or this function has run.
pub fn init_global(config: RegistryConfig) -> TimingResult<SharedRegistry> {
    let registry = SharedRegistry::new(config)?;
    GLOBAL.set(registry.clone()).map_err(|_| TimingError::AlreadyInitialized)?;
    debug!("Global timing registry initialized");
    Ok(registry)
}

/// Thread-safe handle to a timing registry
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<TimingRegistry>>,
}

impl SharedRegistry {
    /// Create a new shared registry
    pub fn new(config: RegistryConfig) -> TimingResult<Self> {
        Ok(Self::from_registry(TimingRegistry::with_config(config)?))
    }

    /// Share an existing registry
    pub fn from_registry(registry: TimingRegistry) -> Self {
        Self { inner: Arc::new(Mutex::new(registry)) }
    }

    /// Run `f` with exclusive access to the registry
    pub fn with<T>(&self, f: impl FnOnce(&mut TimingRegistry) -> T) -> T {
        f(&mut self.lock())
    }

    /// Replace the registry with an empty one using `config`
    pub fn reconfigure(&self, config: RegistryConfig) -> TimingResult<()> {
        let registry = TimingRegistry::with_config(config)?;
        *self.lock() = registry;
        Ok(())
    }

    /// Whether two handles point at the same registry
    pub fn ptr_eq(&self, other: &SharedRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn config(&self) -> RegistryConfig {
        self.lock().config().clone()
    }

    pub fn start(&self, key: &str) -> TimingResult<()> {
        self.lock().start(key)
    }

    pub fn is_running(&self, key: &str) -> TimingResult<bool> {
        self.lock().is_running(key)
    }

    pub fn stop(&self, key: &str) -> Option<f64> {
        self.lock().stop(key)
    }

    pub fn stop_all(&self) {
        self.lock().stop_all()
    }

    pub fn lap(&self, key: &str, new_key: Option<&str>) -> TimingResult<f64> {
        self.lock().lap(key, new_key)
    }

    pub fn clock(&self, key: &str) -> TimingResult<f64> {
        self.lock().clock(key)
    }

    pub fn freeze(&self, key: &str, duration: Duration) -> TimingResult<f64> {
        self.lock().freeze(key, duration)
    }

    /// Time a closure under `key`
    ///
    /// The lock is released while the closure runs, so it may use this
    /// registry itself.
    pub fn time<T, F>(&self, key: &str, f: F) -> TimingResult<T>
    where
        F: FnOnce() -> T,
    {
        let _guard = TimingGuard::new(self, key)?;
        Ok(f())
    }

    pub fn elapsed_time(&self, key: &str) -> TimingResult<f64> {
        self.lock().elapsed_time(key)
    }

    pub fn average_lap_time(&self, key: &str) -> TimingResult<f64> {
        self.lock().average_lap_time(key)
    }

    pub fn laps(&self, key: &str) -> TimingResult<IndexMap<String, f64>> {
        self.lock().laps(key).cloned()
    }

    pub fn get(&self, key: &str) -> TimingResult<TimerSnapshot> {
        self.lock().get(key)
    }

    pub fn all(&self) -> IndexMap<String, f64> {
        self.lock().all()
    }

    pub fn all_average_lap_times(&self) -> IndexMap<String, f64> {
        self.lock().all_average_lap_times()
    }

    pub fn snapshots(&self) -> Vec<TimerSnapshot> {
        self.lock().snapshots()
    }

    pub fn stop_and_show(&self) -> IndexMap<String, f64> {
        self.lock().stop_and_show()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.lock().get_keys()
    }

    pub fn clear_key(&self, key: &str) -> bool {
        self.lock().clear_key(key)
    }

    pub fn reset(&self) {
        self.lock().reset()
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        self.lock().export_json()
    }

    // Registry operations never panic halfway through a mutation, so a
    // poisoned lock still guards a consistent registry.
    fn lock(&self) -> MutexGuard<'_, TimingRegistry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
