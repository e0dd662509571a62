//! Trait seams for the external user and device services.
//!
//! The permission evaluator falls back to these when a permission field is
//! the wildcard sentinel: the key then grants no more than what the owning
//! user could already do.

use async_trait::async_trait;
use std::fmt::Debug;

use super::device::Device;
use super::network::Network;
use super::user::UserId;
use super::DomainError;

/// Entitlement source backing the wildcard fallback path
#[async_trait]
pub trait EntitlementOracle: Send + Sync + Debug {
    /// Whether the user can reach the given network on their own
    async fn user_has_network_access(
        &self,
        user_id: UserId,
        network: &Network,
    ) -> Result<bool, DomainError>;

    /// Whether the user can reach the given device on their own
    async fn user_has_device_access(
        &self,
        user_id: UserId,
        device_guid: &str,
    ) -> Result<bool, DomainError>;

    /// Whether the user holds the administrator role
    async fn user_is_admin(&self, user_id: UserId) -> Result<bool, DomainError>;

    /// The networks the user is directly assigned to
    async fn user_assigned_networks(&self, user_id: UserId) -> Result<Vec<Network>, DomainError>;
}

/// Resolves a device and its owning network
#[async_trait]
pub trait DeviceRegistry: Send + Sync + Debug {
    async fn find_device(&self, device_guid: &str) -> Result<Option<Device>, DomainError>;
}
