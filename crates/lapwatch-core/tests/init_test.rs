//! Crate entry point `init()`
//!
//! Runs in its own binary so the global registry is still unset when the
//! first test starts.

use lapwatch_core::{RegistryConfig, TimingError, global, init};
use serial_test::serial;

#[test]
#[serial]
fn test_init_configures_global_once() {
    let registry = init().unwrap();

    assert!(registry.ptr_eq(&global()));
    assert_eq!(registry.config(), RegistryConfig::load().unwrap());

    registry.start("after_init").unwrap();
    registry.stop("after_init");
    assert_eq!(global().get("after_init").unwrap().lap_count, 1);

    let err = init().unwrap_err();
    assert_eq!(err.downcast_ref::<TimingError>(), Some(&TimingError::AlreadyInitialized));
    assert!(registry.ptr_eq(&global()));
}
