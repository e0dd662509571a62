//! Runtime-tunable settings consumed by the access key engine.
//!
//! The session timeout lives in an external configuration store in a full
//! deployment; the engine reads it through this accessor at call time so
//! tests can control it deterministically.

use std::fmt::Debug;
use std::sync::RwLock;

use chrono::Duration;

/// Session timeout applied when no explicit value is configured (20 minutes)
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: i64 = 1200;

/// Accessor for the engine's tunable settings, read at call time
pub trait AuthSettings: Send + Sync + Debug {
    /// Lifetime granted to a session key on issue or renewal
    fn session_timeout(&self) -> Duration;
}

/// Settings held in memory, mutable at runtime
#[derive(Debug)]
pub struct InMemorySettings {
    session_timeout_seconds: RwLock<i64>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self {
            session_timeout_seconds: RwLock::new(DEFAULT_SESSION_TIMEOUT_SECONDS),
        }
    }

    pub fn with_session_timeout_seconds(seconds: i64) -> Self {
        Self {
            session_timeout_seconds: RwLock::new(seconds),
        }
    }

    pub fn set_session_timeout_seconds(&self, seconds: i64) {
        *self
            .session_timeout_seconds
            .write()
            .expect("settings lock poisoned") = seconds;
    }
}

impl Default for InMemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSettings for InMemorySettings {
    fn session_timeout(&self) -> Duration {
        Duration::seconds(
            *self
                .session_timeout_seconds
                .read()
                .expect("settings lock poisoned"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_timeout() {
        let settings = InMemorySettings::new();
        assert_eq!(settings.session_timeout(), Duration::seconds(1200));
    }

    #[test]
    fn test_session_timeout_updates_take_effect() {
        let settings = InMemorySettings::new();
        settings.set_session_timeout_seconds(60);
        assert_eq!(settings.session_timeout(), Duration::seconds(60));
    }
}
