//! Scoped timing guards and convenience macros

use crate::error::TimingResult;
use crate::shared::SharedRegistry;
use tracing::warn;

/// Scoped timer that stops its key when dropped
#[derive(Debug)]
pub struct TimingGuard {
    registry: SharedRegistry,
    key: String,
}

impl TimingGuard {
    /// Start `key` on `registry`; the key is stopped when the guard drops
    pub fn new(registry: &SharedRegistry, key: impl Into<String>) -> TimingResult<Self> {
        let key = key.into();
        if let Err(err) = registry.start(&key) {
            warn!(key = %key, error = %err, "Could not start scoped timer");
            return Err(err);
        }
        Ok(Self { registry: registry.clone(), key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a lap on the guarded key without stopping it
    pub fn lap(&self, new_key: Option<&str>) -> TimingResult<f64> {
        self.registry.lap(&self.key, new_key)
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        self.registry.stop(&self.key);
    }
}

/// Time a block under a key and evaluate to its result
///
/// Expands to `TimingResult<T>`; the only failure is a frozen key.
#[macro_export]
macro_rules! time_block {
    ($registry:expr, $key:expr, $code:block) => {
        $registry.time($key, || $code)
    };
}

/// Time the rest of the enclosing scope under a key
///
/// Returns early from the enclosing function with the start error (a frozen
/// key), so it can only be used where `?` on a `TimingError` compiles.
#[macro_export]
macro_rules! time_scope {
    ($registry:expr, $key:expr) => {
        let _timing_guard = $crate::guard::TimingGuard::new(&$registry, $key)?;
    };
}
