//! Shared test utilities for config module tests.

use std::sync::Mutex;

/// Mutex to serialize environment variable tests and prevent race conditions.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variables read by memtree config.
pub const ENV_VARS: &[&str] = &["MEMTREE_DATA_DIR", "MEMTREE_DEFAULT_STORE", "MEMTREE_CONFIG"];

/// Clean up environment variables used by memtree config.
///
/// Callers must hold [`ENV_MUTEX`].
pub fn cleanup_env_vars(vars: &[&str]) {
    for var in vars {
        // SAFETY: env access is serialized by ENV_MUTEX
        unsafe { std::env::remove_var(var) };
    }
}

/// Set an environment variable. Callers must hold [`ENV_MUTEX`].
pub fn set_env_var(name: &str, value: &str) {
    // SAFETY: env access is serialized by ENV_MUTEX
    unsafe { std::env::set_var(name, value) };
}
