//! Per-key timer state and the snapshots handed out to callers

use crate::error::TimerState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Stopwatch state tracked for one key
#[derive(Debug, Clone, Default)]
pub struct Timer {
    /// Captured on every (re)start; `None` for frozen timers
    pub(crate) started_at: Option<Instant>,
    pub(crate) running: bool,
    /// Accumulated duration in the registry unit
    pub(crate) total_elapsed: f64,
    pub(crate) lap_count: u64,
    /// Lap key -> duration, in recording order
    pub(crate) lap_timings: IndexMap<String, f64>,
    /// Sequence number of the most recent lap entry
    pub(crate) sequence: u64,
    pub(crate) frozen: bool,
}

impl Timer {
    /// A fresh, running timer started at `now`
    pub(crate) fn started(now: Instant) -> Self {
        Self { started_at: Some(now), running: true, ..Self::default() }
    }

    /// A permanently stopped timer seeded with a precomputed duration
    pub(crate) fn frozen(lap_key: String, elapsed: f64) -> Self {
        let mut lap_timings = IndexMap::new();
        lap_timings.insert(lap_key, elapsed);
        Self {
            started_at: None,
            running: false,
            total_elapsed: elapsed,
            lap_count: 1,
            lap_timings,
            sequence: 0,
            frozen: true,
        }
    }

    /// Record one measured interval under `lap_key`
    pub(crate) fn record(&mut self, lap_key: String, elapsed: f64) {
        self.lap_count += 1;
        self.total_elapsed += elapsed;
        self.lap_timings.insert(lap_key, elapsed);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    pub fn lap_count(&self) -> u64 {
        self.lap_count
    }

    /// Average per recorded interval; equals the total when nothing was recorded
    pub fn average(&self) -> f64 {
        self.total_elapsed / self.lap_count.max(1) as f64
    }

    pub fn state(&self) -> TimerState {
        if self.frozen {
            TimerState::Frozen
        } else if self.running {
            TimerState::Running
        } else {
            TimerState::Stopped
        }
    }

    pub(crate) fn snapshot(&self, key: &str) -> TimerSnapshot {
        TimerSnapshot {
            key: key.to_string(),
            started_at: self.started_at,
            state: self.state(),
            total_elapsed: self.total_elapsed,
            lap_count: self.lap_count,
            average: self.average(),
            laps: self.lap_timings.clone(),
        }
    }
}

/// Point-in-time view of one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub key: String,
    /// Last (re)start instant; not serialized since `Instant` is process-local
    #[serde(skip)]
    pub started_at: Option<Instant>,
    pub state: TimerState,
    pub total_elapsed: f64,
    pub lap_count: u64,
    pub average: f64,
    pub laps: IndexMap<String, f64>,
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_count_in_step_with_laps() {
        let mut timer = Timer::started(Instant::now());
        timer.record("a:1:".to_string(), 2.0);
        timer.record("a:2:".to_string(), 4.0);

        assert_eq!(timer.lap_count(), 2);
        assert_eq!(timer.lap_timings.len(), 2);
        assert_eq!(timer.total_elapsed(), 6.0);
        assert_eq!(timer.average(), 3.0);
    }

    #[test]
    fn test_average_without_laps_is_total() {
        let timer = Timer::started(Instant::now());
        assert_eq!(timer.average(), 0.0);
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_frozen_timer() {
        let timer = Timer::frozen("outer:1:inner".to_string(), 12.5);
        assert!(timer.is_frozen());
        assert!(!timer.is_running());
        assert_eq!(timer.lap_count(), 1);
        assert_eq!(timer.average(), 12.5);

        let snapshot = timer.snapshot("inner");
        assert_eq!(snapshot.state, TimerState::Frozen);
        assert_eq!(snapshot.started_at, None);
        assert_eq!(snapshot.laps.get("outer:1:inner"), Some(&12.5));
    }
}
