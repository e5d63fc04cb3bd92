//! Process-wide registry access
//!
//! All tests in this binary share one global registry, so they run serially
//! and reset it before use.

use lapwatch_core::{RegistryConfig, TimeUnit, TimingError, global, init_global};
use serial_test::serial;
use std::thread::sleep;
use std::time::Duration;

fn micros_config() -> RegistryConfig {
    RegistryConfig::with_unit(TimeUnit::Microseconds)
}

/// Whichever test runs first initializes the global registry in microseconds
fn fresh_global() -> lapwatch_core::SharedRegistry {
    let _ = init_global(micros_config());
    let registry = global();
    registry.reset();
    registry
}

#[test]
#[serial]
fn test_global_is_a_single_instance() {
    let first = fresh_global();
    let second = global();

    assert!(first.ptr_eq(&second));
    assert_eq!(second.config().unit(), Some(TimeUnit::Microseconds));

    first.start("shared_key").unwrap();
    assert!(second.is_running("shared_key").unwrap());
}

#[test]
#[serial]
fn test_second_initialization_is_rejected() {
    let _ = fresh_global();
    assert_eq!(
        init_global(RegistryConfig::default()).unwrap_err(),
        TimingError::AlreadyInitialized
    );
    assert_eq!(global().config().unit(), Some(TimeUnit::Microseconds));
}

#[test]
#[serial]
fn test_global_reset_between_cases() {
    let registry = fresh_global();
    registry.start("a").unwrap();
    registry.start("b").unwrap();

    global().reset();
    assert!(registry.get_keys().is_empty());
}

#[test]
#[serial]
fn test_global_can_be_rebound_for_a_test() {
    let registry = fresh_global();
    registry.start("old").unwrap();

    registry.reconfigure(RegistryConfig::default()).unwrap();
    assert!(global().get_keys().is_empty());
    assert_eq!(global().config().unit(), Some(TimeUnit::Milliseconds));

    // Restore for the other cases
    registry.reconfigure(micros_config()).unwrap();
}

#[test]
#[serial]
fn test_global_timing_in_microseconds() {
    let registry = fresh_global();
    registry.start("A").unwrap();
    sleep(Duration::from_millis(20));
    registry.stop("A");

    let elapsed = registry.elapsed_time("A").unwrap();
    assert!(elapsed > 10_000.0 && elapsed < 300_000.0, "elapsed was {elapsed}us");
}
