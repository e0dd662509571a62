//! In-memory access key repository implementation
//!
//! Backs tests and embedded deployments. All aggregate writes happen under
//! one lock acquisition, which gives `merge` and the expiration
//! compare-and-set the atomicity the lifecycle contract requires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::access_key::{
    AccessKey, AccessKeyId, AccessKeyQuery, AccessKeyRepository, AccessKeySortField,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    keys: HashMap<AccessKeyId, AccessKey>,
    token_index: HashMap<String, AccessKeyId>,
}

/// In-memory implementation of AccessKeyRepository
#[derive(Debug, Default)]
pub struct InMemoryAccessKeyRepository {
    store: RwLock<Store>,
    id_sequence: AtomicI64,
}

impl InMemoryAccessKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> AccessKeyId {
        self.id_sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn matches(key: &AccessKey, query: &AccessKeyQuery) -> bool {
    if let Some(user_id) = query.user_id {
        if key.user_id() != user_id {
            return false;
        }
    }
    if let Some(label) = &query.label {
        if key.label() != Some(label.as_str()) {
            return false;
        }
    }
    if let Some(pattern) = &query.label_pattern {
        match key.label() {
            Some(l) if l.contains(pattern.as_str()) => {}
            _ => return false,
        }
    }
    if let Some(key_type) = query.key_type {
        if key.key_type() != key_type {
            return false;
        }
    }
    true
}

fn sort(keys: &mut [AccessKey], field: AccessKeySortField, asc: bool) {
    keys.sort_by(|a, b| {
        let ordering = match field {
            AccessKeySortField::Label => a.label().cmp(&b.label()),
            AccessKeySortField::ExpirationDate => a.expiration_date().cmp(&b.expiration_date()),
            AccessKeySortField::Type => (a.key_type() as u8).cmp(&(b.key_type() as u8)),
        };
        if asc {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

#[async_trait]
impl AccessKeyRepository for InMemoryAccessKeyRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<AccessKey>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .token_index
            .get(token)
            .and_then(|id| store.keys.get(id))
            .cloned())
    }

    async fn find_by_label_and_owner(
        &self,
        user_id: UserId,
        label: &str,
    ) -> Result<Option<AccessKey>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .keys
            .values()
            .find(|k| k.user_id() == user_id && k.label() == Some(label))
            .cloned())
    }

    async fn find_by_id(
        &self,
        id: AccessKeyId,
        user_id: UserId,
    ) -> Result<Option<AccessKey>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .keys
            .get(&id)
            .filter(|k| k.user_id() == user_id)
            .cloned())
    }

    async fn persist(&self, mut key: AccessKey) -> Result<AccessKey, DomainError> {
        let mut store = self.store.write().await;

        if store.token_index.contains_key(key.key()) {
            return Err(DomainError::conflict("Access key token already exists"));
        }

        let id = self.next_id();
        key.set_id(id);
        store.token_index.insert(key.key().to_string(), id);
        store.keys.insert(id, key.clone());

        Ok(key)
    }

    async fn merge(&self, key: &AccessKey) -> Result<AccessKey, DomainError> {
        let id = key
            .id()
            .ok_or_else(|| DomainError::validation("Cannot merge an unpersisted access key"))?;

        let mut store = self.store.write().await;
        let previous = store
            .keys
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("Access key {id} not found")))?;

        // Token rotation must keep the index consistent
        if previous.key() != key.key() {
            if store.token_index.contains_key(key.key()) {
                return Err(DomainError::conflict("Access key token already exists"));
            }
            let old_token = previous.key().to_string();
            store.token_index.remove(&old_token);
            store.token_index.insert(key.key().to_string(), id);
        }

        store.keys.insert(id, key.clone());
        Ok(key.clone())
    }

    async fn compare_and_set_expiration(
        &self,
        id: AccessKeyId,
        expected: Option<DateTime<Utc>>,
        new_expiration: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        let key = store
            .keys
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("Access key {id} not found")))?;

        if key.expiration_date() != expected {
            return Ok(false);
        }
        key.set_expiration_date(new_expiration);
        Ok(true)
    }

    async fn delete_by_id(&self, id: AccessKeyId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        match store.keys.remove(&id) {
            Some(key) => {
                store.token_index.remove(key.key());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id_and_owner(
        &self,
        id: AccessKeyId,
        user_id: UserId,
    ) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        match store.keys.get(&id) {
            Some(key) if key.user_id() == user_id => {}
            _ => return Ok(false),
        }
        if let Some(key) = store.keys.remove(&id) {
            store.token_index.remove(key.key());
        }
        Ok(true)
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut store = self.store.write().await;
        let expired: Vec<AccessKeyId> = store
            .keys
            .values()
            .filter(|k| k.expiration_date().is_some_and(|e| e < before))
            .filter_map(|k| k.id())
            .collect();

        for id in &expired {
            if let Some(key) = store.keys.remove(id) {
                store.token_index.remove(key.key());
            }
        }
        Ok(expired.len() as u64)
    }

    async fn list(&self, query: &AccessKeyQuery) -> Result<Vec<AccessKey>, DomainError> {
        let store = self.store.read().await;
        let mut result: Vec<AccessKey> = store
            .keys
            .values()
            .filter(|k| matches(k, query))
            .cloned()
            .collect();

        sort(&mut result, query.sort_field, query.sort_asc);

        let skip = query.skip.unwrap_or(0);
        let take = query.take.unwrap_or(usize::MAX);
        Ok(result.into_iter().skip(skip).take(take).collect())
    }
}
