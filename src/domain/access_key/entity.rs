//! Access key entity and related types

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::network::NetworkId;
use crate::domain::subnet::Subnet;
use crate::domain::user::UserId;

/// Store-assigned access key identifier
pub type AccessKeyId = i64;

/// Kind of credential an access key represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessKeyType {
    /// Ordinary long-lived API credential
    #[default]
    Default,
    /// Login session credential with sliding expiration
    Session,
    /// Credential minted from a completed OAuth grant
    #[serde(rename = "oauth")]
    OAuth,
}

/// One permission rule of an access key.
///
/// Every field is optional, and absence is load-bearing: an absent field is
/// a wildcard that defers to the owning user's own entitlements, while a
/// present-but-empty set matches nothing. The two must never be conflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccessKeyPermission {
    /// Allowed API action names; absent = all actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<HashSet<String>>,
    /// Allowed referrer/OAuth domains; absent = unrestricted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<HashSet<String>>,
    /// Allowed client subnets; absent = unrestricted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<HashSet<Subnet>>,
    /// Allowed network ids; absent = defer to the user's networks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_ids: Option<HashSet<NetworkId>>,
    /// Allowed device guids; absent = defer to the user's devices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_guids: Option<HashSet<String>>,
}

impl AccessKeyPermission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_domains(mut self, domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_subnets(mut self, subnets: impl IntoIterator<Item = Subnet>) -> Self {
        self.subnets = Some(subnets.into_iter().collect());
        self
    }

    pub fn with_network_ids(mut self, ids: impl IntoIterator<Item = NetworkId>) -> Self {
        self.network_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_device_guids(mut self, guids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.device_guids = Some(guids.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this rule defers network decisions to the user's entitlements
    pub fn is_network_wildcard(&self) -> bool {
        self.network_ids.is_none()
    }

    /// Whether this rule defers device decisions to the user's entitlements
    pub fn is_device_wildcard(&self) -> bool {
        self.device_guids.is_none()
    }

    /// Whitelist copy: rebuild the rule from its five recognized fields.
    ///
    /// Anything else a client managed to attach to a submitted permission
    /// (ids, versions, back references) is discarded here, so stored rules
    /// only ever carry server-controlled state.
    pub fn normalized(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            domains: self.domains.clone(),
            subnets: self.subnets.clone(),
            network_ids: self.network_ids.clone(),
            device_guids: self.device_guids.clone(),
        }
    }
}

/// Access key entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    /// Store-assigned identifier; `None` until persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<AccessKeyId>,
    /// Opaque bearer token, generated server-side, globally unique
    key: String,
    /// Display label, unique per owning user
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    /// Credential kind
    #[serde(rename = "type")]
    key_type: AccessKeyType,
    /// Expiration timestamp; `None` = never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_date: Option<DateTime<Utc>>,
    /// Owning user
    user_id: UserId,
    /// Permission rules; non-empty once created
    permissions: Vec<AccessKeyPermission>,
}

impl AccessKey {
    pub fn new(user_id: UserId, label: impl Into<String>, key_type: AccessKeyType) -> Self {
        Self {
            id: None,
            key: String::new(),
            label: Some(label.into()),
            key_type,
            expiration_date: None,
            user_id,
            permissions: Vec::new(),
        }
    }

    pub fn with_expiration(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration_date);
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<AccessKeyPermission>) -> Self {
        self.permissions = permissions;
        self
    }

    // Getters

    pub fn id(&self) -> Option<AccessKeyId> {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn key_type(&self) -> AccessKeyType {
        self.key_type
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn permissions(&self) -> &[AccessKeyPermission] {
        &self.permissions
    }

    // Mutators

    pub fn set_id(&mut self, id: AccessKeyId) {
        self.id = Some(id);
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn set_type(&mut self, key_type: AccessKeyType) {
        self.key_type = key_type;
    }

    pub fn set_expiration_date(&mut self, expiration_date: Option<DateTime<Utc>>) {
        self.expiration_date = expiration_date;
    }

    pub fn set_permissions(&mut self, permissions: Vec<AccessKeyPermission>) {
        self.permissions = permissions;
    }

    // Status checks

    /// Whether the key has an expiration in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiration_date {
            Some(expires) => expires < now,
            None => false,
        }
    }

    /// Whether any rule defers network decisions to the user's entitlements
    pub fn has_network_wildcard(&self) -> bool {
        self.permissions.iter().any(|p| p.is_network_wildcard())
    }
}

/// Client-facing creation payload for an access key.
///
/// Carries an optional id so creation can reject client-supplied ids
/// explicitly rather than silently ignoring them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessKeyDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AccessKeyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub key_type: AccessKeyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub permissions: Vec<AccessKeyPermission>,
}

impl AccessKeyDraft {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, key_type: AccessKeyType) -> Self {
        self.key_type = key_type;
        self
    }

    pub fn with_expiration(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration_date);
        self
    }

    pub fn with_permission(mut self, permission: AccessKeyPermission) -> Self {
        self.permissions.push(permission);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_permission_wildcards() {
        let wildcard = AccessKeyPermission::new();
        assert!(wildcard.is_network_wildcard());
        assert!(wildcard.is_device_wildcard());

        let restricted = AccessKeyPermission::new()
            .with_network_ids([1, 2])
            .with_device_guids(["guid-1"]);
        assert!(!restricted.is_network_wildcard());
        assert!(!restricted.is_device_wildcard());
    }

    #[test]
    fn test_empty_set_is_not_wildcard() {
        let empty = AccessKeyPermission::new().with_network_ids([]);
        assert!(!empty.is_network_wildcard());
        assert_eq!(empty.network_ids, Some(HashSet::new()));
    }

    #[test]
    fn test_normalized_preserves_fields() {
        let rule = AccessKeyPermission::new()
            .with_actions(["GetDevice"])
            .with_domains(["example.com"])
            .with_network_ids([7]);

        let copy = rule.normalized();
        assert_eq!(copy, rule);
        assert!(copy.subnets.is_none());
        assert!(copy.device_guids.is_none());
    }

    #[test]
    fn test_permission_ignores_unknown_json_fields() {
        // Extra client-supplied state must not survive deserialization
        let json = r#"{"actions":["GetDevice"],"id":99,"entityVersion":3}"#;
        let rule: AccessKeyPermission = serde_json::from_str(json).unwrap();
        let expected = AccessKeyPermission::new().with_actions(["GetDevice"]);
        assert_eq!(rule.normalized(), expected);
    }

    #[test]
    fn test_key_expiry() {
        let now = Utc::now();
        let expired = AccessKey::new(1, "old", AccessKeyType::Default)
            .with_expiration(now - Duration::seconds(1));
        let live = AccessKey::new(1, "new", AccessKeyType::Default)
            .with_expiration(now + Duration::seconds(1));
        let eternal = AccessKey::new(1, "forever", AccessKeyType::Default);

        assert!(expired.is_expired(now));
        assert!(!live.is_expired(now));
        assert!(!eternal.is_expired(now));
    }

    #[test]
    fn test_network_wildcard_across_rules() {
        let key = AccessKey::new(1, "k", AccessKeyType::Default).with_permissions(vec![
            AccessKeyPermission::new().with_network_ids([5]),
            AccessKeyPermission::new(),
        ]);
        assert!(key.has_network_wildcard());

        let restricted = AccessKey::new(1, "k2", AccessKeyType::Default)
            .with_permissions(vec![AccessKeyPermission::new().with_network_ids([5])]);
        assert!(!restricted.has_network_wildcard());
    }

    #[test]
    fn test_draft_type_defaults() {
        let draft: AccessKeyDraft = serde_json::from_str(r#"{"label":"ci"}"#).unwrap();
        assert_eq!(draft.key_type, AccessKeyType::Default);
        assert!(draft.permissions.is_empty());

        let session: AccessKeyDraft =
            serde_json::from_str(r#"{"label":"s","type":"session"}"#).unwrap();
        assert_eq!(session.key_type, AccessKeyType::Session);
    }
}
