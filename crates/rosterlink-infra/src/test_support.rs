//! Shared helpers for tests that mutate process environment variables.
//!
//! Environment mutation is process-global, so every test touching env
//! vars takes `ENV_LOCK` first and uses [`EnvGuard`] to restore the
//! previous value on drop.

use std::sync::Mutex;

use once_cell::sync::Lazy;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Sets an environment variable for the duration of a scope.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key: key.to_string(), previous }
    }

    pub fn unset(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key: key.to_string(), previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => std::env::set_var(&self.key, value),
            None => std::env::remove_var(&self.key),
        }
    }
}
