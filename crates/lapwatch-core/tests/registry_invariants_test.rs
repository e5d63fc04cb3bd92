//! Property tests for registry bookkeeping invariants

use lapwatch_core::{TimingError, TimingRegistry};
use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Start(usize),
    Stop(usize),
    Lap(usize),
    LapInto(usize, usize),
    Freeze(usize, u64),
    Clear(usize),
}

const KEYS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = 0..KEYS.len();
    prop_oneof![
        key.clone().prop_map(Op::Start),
        key.clone().prop_map(Op::Stop),
        key.clone().prop_map(Op::Lap),
        (key.clone(), key.clone()).prop_map(|(a, b)| Op::LapInto(a, b)),
        (key.clone(), 0u64..500).prop_map(|(k, micros)| Op::Freeze(k, micros)),
        key.prop_map(Op::Clear),
    ]
}

fn apply(registry: &mut TimingRegistry, op: &Op) -> Result<(), TimingError> {
    match *op {
        Op::Start(k) => registry.start(KEYS[k]),
        Op::Stop(k) => {
            registry.stop(KEYS[k]);
            Ok(())
        }
        Op::Lap(k) => registry.clock(KEYS[k]).map(|_| ()),
        Op::LapInto(k, n) => registry.lap(KEYS[k], Some(KEYS[n])).map(|_| ()),
        Op::Freeze(k, micros) => {
            registry.freeze(KEYS[k], Duration::from_micros(micros)).map(|_| ())
        }
        Op::Clear(k) => {
            registry.clear_key(KEYS[k]);
            Ok(())
        }
    }
}

proptest! {
    #[test]
    fn lap_count_and_average_stay_consistent(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut registry = TimingRegistry::new();

        for op in &ops {
            // Misuse errors are expected; the invariants must hold regardless
            let _ = apply(&mut registry, op);

            for snapshot in registry.snapshots() {
                prop_assert_eq!(snapshot.lap_count as usize, snapshot.laps.len());
                prop_assert_eq!(
                    snapshot.average,
                    snapshot.total_elapsed / snapshot.lap_count.max(1) as f64
                );
                prop_assert!(snapshot.total_elapsed >= 0.0);
            }
        }
    }

    #[test]
    fn totals_never_decrease(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut registry = TimingRegistry::new();
        let mut previous: HashMap<String, f64> = HashMap::new();

        for op in &ops {
            let _ = apply(&mut registry, op);
            if let Op::Clear(k) = op {
                previous.remove(KEYS[*k]);
            }

            for (key, total) in registry.all() {
                if let Some(before) = previous.get(&key) {
                    prop_assert!(total >= *before, "{} went from {} to {}", key, before, total);
                }
                previous.insert(key, total);
            }
        }
    }

    #[test]
    fn rejected_lap_into_existing_key_mutates_nothing(source in 0..KEYS.len(), target in 0..KEYS.len()) {
        let mut registry = TimingRegistry::new();
        for key in KEYS {
            registry.start(key).unwrap();
        }
        let before = registry.get(KEYS[source]).unwrap();

        let result = registry.lap(KEYS[source], Some(KEYS[target]));

        let is_duplicate_frozen_key = matches!(result, Err(TimingError::DuplicateFrozenKey { .. }));
        prop_assert!(is_duplicate_frozen_key);
        let after = registry.get(KEYS[source]).unwrap();
        prop_assert_eq!(after.lap_count, before.lap_count);
        prop_assert_eq!(after.total_elapsed, before.total_elapsed);
    }
}
