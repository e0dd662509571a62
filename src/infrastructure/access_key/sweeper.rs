//! Periodic cleanup of expired access keys.
//!
//! Callers reject expired keys at use time; the sweep only reclaims the
//! storage they occupy, so it runs on a long interval (weekly by default).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::access_key::AccessKeyRepository;

use super::service::AccessKeyService;

/// Default sweep interval: one week
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Background task that periodically removes expired access keys.
///
/// The task is aborted when the sweeper is dropped.
#[derive(Debug)]
pub struct ExpiredKeySweeper {
    handle: JoinHandle<()>,
}

impl ExpiredKeySweeper {
    /// Spawn a sweep loop with the default weekly interval
    pub fn spawn<R>(service: Arc<AccessKeyService<R>>) -> Self
    where
        R: AccessKeyRepository + 'static,
    {
        Self::spawn_with_interval(service, DEFAULT_SWEEP_INTERVAL)
    }

    /// Spawn a sweep loop firing at the given interval
    pub fn spawn_with_interval<R>(service: Arc<AccessKeyService<R>>, interval: Duration) -> Self
    where
        R: AccessKeyRepository + 'static,
    {
        info!(interval_secs = interval.as_secs(), "Starting expired key sweeper");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so startup does not
            // race test fixtures still seeding data
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(err) = service.remove_expired_keys().await {
                    error!(error = %err, "Expired key sweep failed");
                }
            }
        });

        Self { handle }
    }

    /// Stop the sweep loop
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ExpiredKeySweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
