//! Permission evaluation
//!
//! Decides whether an access key may act on a network or device. Decisions
//! merge the key's own rule restrictions with the owning user's
//! entitlements: an absent rule field is a wildcard that defers entirely to
//! what the user could already reach, while a present set restricts the key
//! to its members. Evaluation is a pure read; the key's stored permission
//! set is never modified.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::access_key::AccessKey;
use crate::domain::entitlement::{DeviceRegistry, EntitlementOracle};
use crate::domain::network::{Network, NetworkId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Authorization decision engine over an access key's permission rules
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    entitlements: Arc<dyn EntitlementOracle>,
    devices: Arc<dyn DeviceRegistry>,
}

impl PermissionEvaluator {
    pub fn new(entitlements: Arc<dyn EntitlementOracle>, devices: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            entitlements,
            devices,
        }
    }

    /// Whether the key may act on the target network.
    ///
    /// Any rule with an absent network set short-circuits the whole decision
    /// to the owner's own network entitlement. Otherwise the target must be
    /// in the union of the rules' network ids, and the owner must be an
    /// admin or assigned to the target.
    pub async fn has_access_to_network(
        &self,
        key: &AccessKey,
        target: &Network,
    ) -> Result<bool, DomainError> {
        let owner = key.user_id();

        if key.has_network_wildcard() {
            return self.entitlements.user_has_network_access(owner, target).await;
        }

        let allowed: HashSet<NetworkId> = key
            .permissions()
            .iter()
            .filter_map(|p| p.network_ids.as_ref())
            .flatten()
            .copied()
            .collect();

        if !allowed.contains(&target.id) {
            debug!(
                network_id = target.id,
                "Network not in key's allowed set, denying"
            );
            return Ok(false);
        }

        Ok(self.owner_reaches_network(owner, target.id).await?)
    }

    /// Whether the key may act on the target device.
    ///
    /// The device gate passes when some rule is a device wildcard or names
    /// the guid, and the owner can reach the device. The network gate then
    /// passes when some rule is a network wildcard (owner must still be
    /// admin or assigned), or the device's network is in the union of
    /// matching rules' network ids. A device with no owning network has no
    /// network gate to fail.
    pub async fn has_access_to_device(
        &self,
        key: &AccessKey,
        device_guid: &str,
    ) -> Result<bool, DomainError> {
        let owner = key.user_id();

        let Some(device) = self.devices.find_device(device_guid).await? else {
            debug!(device_guid, "Unknown device, denying");
            return Ok(false);
        };

        let mut device_wildcard = false;
        let mut allowed_devices: HashSet<&str> = HashSet::new();
        let mut network_wildcard = false;
        let mut allowed_networks: HashSet<NetworkId> = HashSet::new();

        // One pass over a local view of the rules; each field matches
        // independently and non-matching rules simply contribute nothing.
        for rule in key.permissions() {
            match &rule.device_guids {
                None => device_wildcard = true,
                Some(guids) => {
                    if guids.contains(device_guid) {
                        allowed_devices.extend(guids.iter().map(String::as_str));
                    }
                }
            }
            match &rule.network_ids {
                None => network_wildcard = true,
                Some(ids) => {
                    if let Some(network) = &device.network {
                        if ids.contains(&network.id) {
                            allowed_networks.extend(ids.iter().copied());
                        }
                    }
                }
            }
        }

        let device_allowed = device_wildcard || allowed_devices.contains(device_guid);
        if !device_allowed {
            debug!(device_guid, "Device not in key's allowed set, denying");
            return Ok(false);
        }
        if !self
            .entitlements
            .user_has_device_access(owner, device_guid)
            .await?
        {
            debug!(device_guid, "Owner has no access to device, denying");
            return Ok(false);
        }

        let Some(network) = &device.network else {
            // No owning network: nothing left to check
            return Ok(true);
        };

        let owner_reaches = self.owner_reaches_network(owner, network.id).await?;
        Ok(if network_wildcard {
            owner_reaches
        } else {
            owner_reaches && allowed_networks.contains(&network.id)
        })
    }

    /// Admin, or directly assigned to the network
    async fn owner_reaches_network(
        &self,
        owner: UserId,
        network_id: NetworkId,
    ) -> Result<bool, DomainError> {
        if self.entitlements.user_is_admin(owner).await? {
            return Ok(true);
        }
        let assigned = self.entitlements.user_assigned_networks(owner).await?;
        Ok(assigned.iter().any(|n| n.id == network_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access_key::{AccessKeyPermission, AccessKeyType};
    use crate::domain::device::Device;
    use crate::infrastructure::directory::InMemoryDirectory;

    const OWNER: i64 = 10;

    fn key_with(rules: Vec<AccessKeyPermission>) -> AccessKey {
        AccessKey::new(OWNER, "key", AccessKeyType::Default).with_permissions(rules)
    }

    async fn directory_with_network(network: &Network) -> Arc<InMemoryDirectory> {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.assign_network(OWNER, network.clone()).await;
        directory
    }

    fn evaluator(directory: &Arc<InMemoryDirectory>) -> PermissionEvaluator {
        PermissionEvaluator::new(directory.clone(), directory.clone())
    }

    #[tokio::test]
    async fn test_network_restriction_matches_assigned_network() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_network(&network).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new().with_network_ids([5])]);
        assert!(eval.has_access_to_network(&key, &network).await.unwrap());

        let other = key_with(vec![AccessKeyPermission::new().with_network_ids([6])]);
        assert!(!eval.has_access_to_network(&other, &network).await.unwrap());
    }

    #[tokio::test]
    async fn test_network_access_tracks_user_assignment() {
        // Allow, unassign -> deny, reassign -> allow again
        let network = Network::new(5, "floor-5");
        let directory = directory_with_network(&network).await;
        let eval = evaluator(&directory);
        let key = key_with(vec![AccessKeyPermission::new().with_network_ids([5])]);

        assert!(eval.has_access_to_network(&key, &network).await.unwrap());

        directory.unassign_network(OWNER, 5).await;
        assert!(!eval.has_access_to_network(&key, &network).await.unwrap());

        directory.assign_network(OWNER, network.clone()).await;
        assert!(eval.has_access_to_network(&key, &network).await.unwrap());
    }

    #[tokio::test]
    async fn test_network_wildcard_defers_to_entitlements() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_network(&network).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new()]);
        assert!(eval.has_access_to_network(&key, &network).await.unwrap());
        assert!(!eval
            .has_access_to_network(&key, &Network::new(6, "other"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_rule_dominates_restricted_rules() {
        // One wildcard rule short-circuits to user entitlements regardless
        // of what the other rules say
        let network = Network::new(5, "floor-5");
        let directory = directory_with_network(&network).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![
            AccessKeyPermission::new().with_network_ids([7]),
            AccessKeyPermission::new(),
        ]);
        // Rule 1 alone would deny network 5, but the wildcard defers to the
        // owner's assignment
        assert!(eval.has_access_to_network(&key, &network).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_network_set_denies_everything() {
        // Present-but-empty is not a wildcard: it matches no network at all,
        // even for an admin owner
        let network = Network::new(5, "floor-5");
        let directory = directory_with_network(&network).await;
        directory.grant_admin(OWNER).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new().with_network_ids([])]);
        assert!(!eval.has_access_to_network(&key, &network).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_still_needs_network_in_allowed_set() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.grant_admin(OWNER).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new().with_network_ids([5])]);
        assert!(eval
            .has_access_to_network(&key, &Network::new(5, "in-set"))
            .await
            .unwrap());
        assert!(!eval
            .has_access_to_network(&key, &Network::new(6, "not-in-set"))
            .await
            .unwrap());
    }

    async fn directory_with_device(guid: &str, network: &Network) -> Arc<InMemoryDirectory> {
        let directory = directory_with_network(network).await;
        directory
            .register_device(Device::new(guid, "sensor").with_network(network.clone()))
            .await;
        directory
    }

    #[tokio::test]
    async fn test_device_guid_restriction() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_device("d-1", &network).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new().with_device_guids(["d-1"])]);
        assert!(eval.has_access_to_device(&key, "d-1").await.unwrap());

        let other = key_with(vec![AccessKeyPermission::new().with_device_guids(["d-2"])]);
        assert!(!eval.has_access_to_device(&other, "d-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_device_wildcard_defers_to_entitlements() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_device("d-1", &network).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new()]);
        assert!(eval.has_access_to_device(&key, "d-1").await.unwrap());

        // Owner loses the device's network: wildcard now denies too
        directory.unassign_network(OWNER, 5).await;
        assert!(!eval.has_access_to_device(&key, "d-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_device_network_gate() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_device("d-1", &network).await;
        let eval = evaluator(&directory);

        // Device matches but the rule restricts networks to a different one
        let key = key_with(vec![AccessKeyPermission::new()
            .with_device_guids(["d-1"])
            .with_network_ids([6])]);
        assert!(!eval.has_access_to_device(&key, "d-1").await.unwrap());

        // Same rule with the right network passes both gates
        let key = key_with(vec![AccessKeyPermission::new()
            .with_device_guids(["d-1"])
            .with_network_ids([5])]);
        assert!(eval.has_access_to_device(&key, "d-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_device_without_network_skips_network_gate() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.grant_admin(OWNER).await;
        directory.register_device(Device::new("d-0", "orphan")).await;
        let eval = evaluator(&directory);

        // Network restriction present, but the device has no owning network
        let key = key_with(vec![AccessKeyPermission::new()
            .with_device_guids(["d-0"])
            .with_network_ids([5])]);
        assert!(eval.has_access_to_device(&key, "d-0").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_device_denied() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.grant_admin(OWNER).await;
        let eval = evaluator(&directory);

        let key = key_with(vec![AccessKeyPermission::new()]);
        assert!(!eval.has_access_to_device(&key, "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_evaluation_does_not_mutate_the_key() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_device("d-1", &network).await;
        let eval = evaluator(&directory);

        // Second rule matches nothing and must survive the evaluation
        let key = key_with(vec![
            AccessKeyPermission::new().with_device_guids(["d-1"]),
            AccessKeyPermission::new()
                .with_device_guids(["unrelated"])
                .with_network_ids([99]),
        ]);
        let before = key.permissions().to_vec();

        assert!(eval.has_access_to_device(&key, "d-1").await.unwrap());
        assert_eq!(key.permissions(), before.as_slice());
    }

    #[tokio::test]
    async fn test_mixed_rules_union_devices() {
        let network = Network::new(5, "floor-5");
        let directory = directory_with_device("d-1", &network).await;
        directory
            .register_device(Device::new("d-2", "sensor-2").with_network(network.clone()))
            .await;
        let eval = evaluator(&directory);

        let key = key_with(vec![
            AccessKeyPermission::new().with_device_guids(["d-1"]),
            AccessKeyPermission::new().with_device_guids(["d-2"]),
        ]);
        assert!(eval.has_access_to_device(&key, "d-1").await.unwrap());
        assert!(eval.has_access_to_device(&key, "d-2").await.unwrap());
        assert!(!eval.has_access_to_device(&key, "d-3").await.unwrap());
    }
}
