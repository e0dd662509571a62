//! In-memory entitlement and device directory
//!
//! Stands in for the external user and device management services when the
//! engine is embedded or under test: admin flags, per-user network
//! assignments, and a device registry.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::device::Device;
use crate::domain::entitlement::{DeviceRegistry, EntitlementOracle};
use crate::domain::network::{Network, NetworkId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct DirectoryState {
    admins: HashSet<UserId>,
    assignments: HashMap<UserId, HashMap<NetworkId, Network>>,
    devices: HashMap<String, Device>,
}

/// In-memory implementation of EntitlementOracle and DeviceRegistry
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn grant_admin(&self, user_id: UserId) {
        self.state.write().await.admins.insert(user_id);
    }

    pub async fn assign_network(&self, user_id: UserId, network: Network) {
        self.state
            .write()
            .await
            .assignments
            .entry(user_id)
            .or_default()
            .insert(network.id, network);
    }

    pub async fn unassign_network(&self, user_id: UserId, network_id: NetworkId) {
        if let Some(networks) = self.state.write().await.assignments.get_mut(&user_id) {
            networks.remove(&network_id);
        }
    }

    pub async fn register_device(&self, device: Device) {
        self.state
            .write()
            .await
            .devices
            .insert(device.guid.clone(), device);
    }
}

#[async_trait]
impl EntitlementOracle for InMemoryDirectory {
    async fn user_has_network_access(
        &self,
        user_id: UserId,
        network: &Network,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        if state.admins.contains(&user_id) {
            return Ok(true);
        }
        Ok(state
            .assignments
            .get(&user_id)
            .is_some_and(|nets| nets.contains_key(&network.id)))
    }

    async fn user_has_device_access(
        &self,
        user_id: UserId,
        device_guid: &str,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        if state.admins.contains(&user_id) {
            return Ok(true);
        }
        // A client user reaches a device through its owning network
        let Some(device) = state.devices.get(device_guid) else {
            return Ok(false);
        };
        let Some(network) = &device.network else {
            return Ok(false);
        };
        Ok(state
            .assignments
            .get(&user_id)
            .is_some_and(|nets| nets.contains_key(&network.id)))
    }

    async fn user_is_admin(&self, user_id: UserId) -> Result<bool, DomainError> {
        Ok(self.state.read().await.admins.contains(&user_id))
    }

    async fn user_assigned_networks(&self, user_id: UserId) -> Result<Vec<Network>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .get(&user_id)
            .map(|nets| nets.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDirectory {
    async fn find_device(&self, device_guid: &str) -> Result<Option<Device>, DomainError> {
        Ok(self.state.read().await.devices.get(device_guid).cloned())
    }
}
