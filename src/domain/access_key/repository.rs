//! Access key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::entity::{AccessKey, AccessKeyId, AccessKeyType};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Sort key for access key listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessKeySortField {
    #[default]
    Label,
    ExpirationDate,
    Type,
}

/// Filter and paging parameters for access key listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessKeyQuery {
    /// Restrict to keys owned by this user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Exact label match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Label substring match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_pattern: Option<String>,
    /// Restrict to keys of this type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<AccessKeyType>,
    #[serde(default)]
    pub sort_field: AccessKeySortField,
    #[serde(default = "default_sort_asc")]
    pub sort_asc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
}

fn default_sort_asc() -> bool {
    true
}

impl Default for AccessKeyQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            label: None,
            label_pattern: None,
            key_type: None,
            sort_field: AccessKeySortField::default(),
            sort_asc: true,
            take: None,
            skip: None,
        }
    }
}

impl AccessKeyQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.label_pattern = Some(pattern.into());
        self
    }

    pub fn with_type(mut self, key_type: AccessKeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    pub fn sorted_by(mut self, field: AccessKeySortField, asc: bool) -> Self {
        self.sort_field = field;
        self.sort_asc = asc;
        self
    }

    pub fn paged(mut self, take: usize, skip: usize) -> Self {
        self.take = Some(take);
        self.skip = Some(skip);
        self
    }
}

/// Repository trait for access key storage.
///
/// `persist` and `merge` write the whole key aggregate, permission rules
/// included, as one atomic unit; a store-backed implementation must wrap
/// the permission delete-and-insert in a single transaction so a crash can
/// never leave a key with zero rules.
#[async_trait]
pub trait AccessKeyRepository: Send + Sync + Debug {
    /// Look up a key by its opaque token
    async fn find_by_token(&self, token: &str) -> Result<Option<AccessKey>, DomainError>;

    /// Look up a key by owner and exact label
    async fn find_by_label_and_owner(
        &self,
        user_id: UserId,
        label: &str,
    ) -> Result<Option<AccessKey>, DomainError>;

    /// Look up a key by id, scoped to its owner
    async fn find_by_id(
        &self,
        id: AccessKeyId,
        user_id: UserId,
    ) -> Result<Option<AccessKey>, DomainError>;

    /// Store a new key, assigning its id; fails on token collision
    async fn persist(&self, key: AccessKey) -> Result<AccessKey, DomainError>;

    /// Overwrite an existing key aggregate atomically
    async fn merge(&self, key: &AccessKey) -> Result<AccessKey, DomainError>;

    /// Conditionally advance a key's expiration: succeeds only if the stored
    /// expiration still equals `expected`. This is the optimistic-concurrency
    /// primitive behind sliding session renewal.
    async fn compare_and_set_expiration(
        &self,
        id: AccessKeyId,
        expected: Option<DateTime<Utc>>,
        new_expiration: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError>;

    /// Delete a key by id regardless of owner; returns whether one was removed
    async fn delete_by_id(&self, id: AccessKeyId) -> Result<bool, DomainError>;

    /// Delete a key by id only if owned by the given user
    async fn delete_by_id_and_owner(
        &self,
        id: AccessKeyId,
        user_id: UserId,
    ) -> Result<bool, DomainError>;

    /// Bulk-delete keys whose expiration lies strictly before the timestamp
    async fn delete_expired_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Filtered, sorted, paged listing
    async fn list(&self, query: &AccessKeyQuery) -> Result<Vec<AccessKey>, DomainError>;
}
