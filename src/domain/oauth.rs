//! OAuth grant types from which access keys are derived.
//!
//! The OAuth handshake itself is external; this crate only consumes the
//! completed grant when minting or refreshing the derived key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::access_key::AccessKeyId;
use super::network::NetworkId;
use super::subnet::Subnet;

/// Grant access type, which drives the derived key's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Short-lived: the derived key expires 10 minutes after issue
    Online,
    /// Long-lived: the derived key never expires
    Offline,
}

/// The OAuth client a grant was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClient {
    pub name: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Subnet>,
}

impl OAuthClient {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            subnet: None,
        }
    }

    pub fn with_subnet(mut self, subnet: Subnet) -> Self {
        self.subnet = Some(subnet);
        self
    }
}

/// A completed OAuth grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthGrant {
    pub client: OAuthClient,
    pub access_type: AccessType,
    /// Space-separated action names granted to the client
    pub scope: String,
    /// Networks the grant is restricted to; `None` defers to the user's own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_ids: Option<HashSet<NetworkId>>,
    /// The access key previously minted for this grant, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<AccessKeyId>,
}

impl OAuthGrant {
    pub fn new(client: OAuthClient, access_type: AccessType, scope: impl Into<String>) -> Self {
        Self {
            client,
            access_type,
            scope: scope.into(),
            network_ids: None,
            access_key_id: None,
        }
    }

    pub fn with_network_ids(mut self, network_ids: HashSet<NetworkId>) -> Self {
        self.network_ids = Some(network_ids);
        self
    }

    pub fn with_access_key_id(mut self, id: AccessKeyId) -> Self {
        self.access_key_id = Some(id);
        self
    }

    /// Split the scope string into individual action names
    pub fn scope_actions(&self) -> HashSet<String> {
        self.scope
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_actions() {
        let grant = OAuthGrant::new(
            OAuthClient::new("dashboard", "example.com"),
            AccessType::Online,
            "GetDevice GetNetwork  CreateDeviceCommand",
        );

        let actions = grant.scope_actions();
        assert_eq!(actions.len(), 3);
        assert!(actions.contains("GetDevice"));
        assert!(actions.contains("GetNetwork"));
        assert!(actions.contains("CreateDeviceCommand"));
    }

    #[test]
    fn test_empty_scope() {
        let grant = OAuthGrant::new(
            OAuthClient::new("dashboard", "example.com"),
            AccessType::Offline,
            "",
        );
        assert!(grant.scope_actions().is_empty());
    }
}
