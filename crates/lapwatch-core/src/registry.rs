//! Named stopwatch registry
//!
//! `TimingRegistry` owns every timer and implements the start/stop/lap state
//! machine. Keys are created on first reference and kept until cleared:
//!
//! ```text
//! UNSTARTED --start/lap--> RUNNING --stop--> STOPPED --start--> RUNNING
//! ```
//!
//! `lap` records a checkpoint measured from the last (re)start without
//! stopping the timer. A lap may also "graduate" into its own frozen key,
//! which is permanently stopped and seeded with the lap duration.

use crate::config::{RegistryConfig, TimeUnit};
use crate::error::{TimingError, TimingResult};
use crate::timer::{Timer, TimerSnapshot};
use indexmap::IndexMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Registry of named timers
#[derive(Debug, Clone, Default)]
pub struct TimingRegistry {
    /// Timers in order of first reference
    timers: IndexMap<String, Timer>,
    config: RegistryConfig,
}

impl TimingRegistry {
    /// Create a registry reporting in milliseconds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry reporting in the given unit
    pub fn with_unit(unit: TimeUnit) -> Self {
        Self { timers: IndexMap::new(), config: RegistryConfig::with_unit(unit) }
    }

    /// Create a registry with a custom configuration
    pub fn with_config(config: RegistryConfig) -> TimingResult<Self> {
        config.validate()?;
        Ok(Self { timers: IndexMap::new(), config })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Start (or re-arm) the timer for `key`
    ///
    /// Restarting an existing key only moves its start instant; totals and
    /// laps recorded so far are kept.
    pub fn start(&mut self, key: &str) -> TimingResult<()> {
        let now = Instant::now();

        match self.timers.get_mut(key) {
            Some(timer) if timer.frozen => return Err(TimingError::frozen_key(key)),
            Some(timer) => {
                timer.started_at = Some(now);
                timer.running = true;
            }
            None => {
                self.timers.insert(key.to_string(), Timer::started(now));
            }
        }

        debug!(key, "Timer started");
        Ok(())
    }

    /// Whether the timer for `key` is currently running
    pub fn is_running(&self, key: &str) -> TimingResult<bool> {
        Ok(self.timer(key)?.running)
    }

    /// Stop the timer for `key` and record the interval since its last start
    ///
    /// Stopping a key that is not running, or was never referenced, does
    /// nothing and returns `None`.
    pub fn stop(&mut self, key: &str) -> Option<f64> {
        let now = Instant::now();
        let timer = self.timers.get_mut(key)?;
        stop_at(&self.config, key, timer, now)
    }

    /// Stop every running timer
    pub fn stop_all(&mut self) {
        let now = Instant::now();
        let mut stopped = 0usize;

        for (key, timer) in self.timers.iter_mut() {
            if stop_at(&self.config, key, timer, now).is_some() {
                stopped += 1;
            }
        }

        debug!(stopped, "Stopped all running timers");
    }

    /// Record a lap for `key` and return its duration
    ///
    /// The lap is measured from the last (re)start, so successive laps are
    /// cumulative. Lapping a key that was never referenced starts it and
    /// records a zero-duration lap with sequence number 0. When `new_key` is
    /// given, the lap duration is also stored as a frozen timer under that
    /// name; an existing `new_key` is rejected before anything is recorded.
    pub fn lap(&mut self, key: &str, new_key: Option<&str>) -> TimingResult<f64> {
        let now = Instant::now();

        if let Some(new_key) = new_key {
            if new_key == key || self.timers.contains_key(new_key) {
                warn!(key, new_key, "Rejected lap into an existing key");
                return Err(TimingError::duplicate_frozen_key(new_key));
            }
        }

        let style = self.config.lap_key_style;
        let (lap_key, elapsed) = match self.timers.get_mut(key) {
            Some(timer) if timer.frozen => return Err(TimingError::frozen_key(key)),
            Some(timer) => {
                let started_at = timer.started_at.unwrap_or(now);
                let elapsed = self.config.scale(now.saturating_duration_since(started_at));
                timer.sequence += 1;
                let lap_key = style.lap_key(key, timer.sequence, new_key);
                timer.record(lap_key.clone(), elapsed);
                (lap_key, elapsed)
            }
            None => {
                let mut timer = Timer::started(now);
                let lap_key = style.lap_key(key, 0, new_key);
                timer.record(lap_key.clone(), 0.0);
                self.timers.insert(key.to_string(), timer);
                (lap_key, 0.0)
            }
        };

        debug!(key, lap_key = %lap_key, elapsed, "Lap recorded");

        if let Some(new_key) = new_key {
            self.timers.insert(new_key.to_string(), Timer::frozen(lap_key, elapsed));
            debug!(key = new_key, elapsed, "Frozen key created from lap");
        }

        Ok(elapsed)
    }

    /// Record an unlabelled lap for `key`
    pub fn clock(&mut self, key: &str) -> TimingResult<f64> {
        self.lap(key, None)
    }

    /// Create a frozen timer under `key` seeded with `duration`
    pub fn freeze(&mut self, key: &str, duration: Duration) -> TimingResult<f64> {
        if self.timers.contains_key(key) {
            warn!(key, "Rejected frozen key over an existing key");
            return Err(TimingError::duplicate_frozen_key(key));
        }

        let elapsed = self.config.scale(duration);
        let lap_key = self.config.lap_key_style.lap_key(key, 0, None);
        self.timers.insert(key.to_string(), Timer::frozen(lap_key, elapsed));

        debug!(key, elapsed, "Frozen key created");
        Ok(elapsed)
    }

    /// Time a closure under `key`; the key is stopped even if `f` panics
    pub fn time<T, F>(&mut self, key: &str, f: F) -> TimingResult<T>
    where
        F: FnOnce() -> T,
    {
        self.start(key)?;
        let _stop = StopOnDrop { registry: self, key };
        Ok(f())
    }

    /// Total time recorded for `key`
    pub fn elapsed_time(&self, key: &str) -> TimingResult<f64> {
        Ok(self.timer(key)?.total_elapsed)
    }

    /// Total time for `key` divided by its number of recorded intervals
    pub fn average_lap_time(&self, key: &str) -> TimingResult<f64> {
        Ok(self.timer(key)?.average())
    }

    /// Recorded laps for `key`, in recording order
    pub fn laps(&self, key: &str) -> TimingResult<&IndexMap<String, f64>> {
        Ok(&self.timer(key)?.lap_timings)
    }

    /// Full snapshot of one key
    pub fn get(&self, key: &str) -> TimingResult<TimerSnapshot> {
        Ok(self.timer(key)?.snapshot(key))
    }

    /// Total time of every key, in order of first reference
    pub fn all(&self) -> IndexMap<String, f64> {
        self.timers.iter().map(|(key, timer)| (key.clone(), timer.total_elapsed)).collect()
    }

    /// Average lap time of every key, in order of first reference
    pub fn all_average_lap_times(&self) -> IndexMap<String, f64> {
        self.timers.iter().map(|(key, timer)| (key.clone(), timer.average())).collect()
    }

    /// Snapshots of every key, in order of first reference
    pub fn snapshots(&self) -> Vec<TimerSnapshot> {
        self.timers.iter().map(|(key, timer)| timer.snapshot(key)).collect()
    }

    /// Stop every timer, then return the totals
    pub fn stop_and_show(&mut self) -> IndexMap<String, f64> {
        self.stop_all();
        self.all()
    }

    /// Tracked keys, in order of first reference
    pub fn get_keys(&self) -> Vec<String> {
        self.timers.keys().cloned().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.timers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Forget everything recorded for `key`
    pub fn clear_key(&mut self, key: &str) -> bool {
        let removed = self.timers.shift_remove(key).is_some();
        if removed {
            debug!(key, "Timer cleared");
        }
        removed
    }

    /// Forget every key
    pub fn reset(&mut self) {
        let cleared = self.timers.len();
        self.timers.clear();
        debug!(cleared, "Timing registry reset");
    }

    /// Export all snapshots as pretty-printed JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshots())
    }

    fn timer(&self, key: &str) -> TimingResult<&Timer> {
        self.timers.get(key).ok_or_else(|| TimingError::unknown_key(key))
    }
}

/// Stop `timer` at `now`, recording the interval as a lap entry
/// Stops its key when dropped, including during unwinding
struct StopOnDrop<'a> {
    registry: &'a mut TimingRegistry,
    key: &'a str,
}

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.registry.stop(self.key);
    }
}

fn stop_at(config: &RegistryConfig, key: &str, timer: &mut Timer, now: Instant) -> Option<f64> {
    if !timer.running {
        return None;
    }
    let started_at = timer.started_at?;

    let elapsed = config.scale(now.saturating_duration_since(started_at));
    timer.running = false;
    timer.sequence += 1;
    let lap_key = config.lap_key_style.lap_key(key, timer.sequence, None);
    timer.record(lap_key, elapsed);

    debug!(key, elapsed, total = timer.total_elapsed, "Timer stopped");
    Some(elapsed)
}
