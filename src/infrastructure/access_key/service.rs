//! Access key lifecycle service
//!
//! High-level operations for issuing, renewing, updating and retiring
//! access keys. Token values are never logged.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::config::AuthSettings;
use crate::domain::access_key::{
    validate_draft, validate_label, validate_permission_set, AccessKey, AccessKeyDraft,
    AccessKeyId, AccessKeyPatch, AccessKeyPermission, AccessKeyQuery, AccessKeyRepository,
    AccessKeyType, FieldPatch,
};
use crate::domain::oauth::{AccessType, OAuthGrant};
use crate::domain::time::Clock;
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

use super::generator::AccessTokenGenerator;

/// Lifetime of a key derived from an online OAuth grant
const OAUTH_ONLINE_KEY_LIFETIME_SECONDS: i64 = 600;

/// Upper bound on renewal retries when concurrent authentications collide.
/// Each retry re-reads the key, and a lost race leaves the key outside the
/// renewal window, so in practice one retry settles it.
const MAX_RENEWAL_ATTEMPTS: u32 = 5;

/// Access key lifecycle service
#[derive(Debug)]
pub struct AccessKeyService<R>
where
    R: AccessKeyRepository,
{
    repository: Arc<R>,
    generator: AccessTokenGenerator,
    clock: Arc<dyn Clock>,
    settings: Arc<dyn AuthSettings>,
}

impl<R: AccessKeyRepository> AccessKeyService<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, settings: Arc<dyn AuthSettings>) -> Self {
        Self {
            repository,
            generator: AccessTokenGenerator::new(),
            clock,
            settings,
        }
    }

    /// Create with a custom token generator
    pub fn with_generator(mut self, generator: AccessTokenGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create a new access key for the given user.
    ///
    /// Validates the draft up front and persists nothing on failure. The
    /// submitted permissions pass through a whitelist copy so only the
    /// recognized rule fields reach storage.
    pub async fn create(&self, user: &User, draft: AccessKeyDraft) -> Result<AccessKey, DomainError> {
        validate_label(draft.label.as_deref())?;
        let label = draft.label.as_deref().unwrap_or_default();

        if self
            .repository
            .find_by_label_and_owner(user.id, label)
            .await?
            .is_some()
        {
            warn!(user_id = user.id, label, "Duplicate access key label");
            return Err(DomainError::conflict(format!(
                "Access key with label '{label}' already exists"
            )));
        }

        validate_draft(&draft)?;

        let permissions: Vec<AccessKeyPermission> =
            draft.permissions.iter().map(|p| p.normalized()).collect();

        let token = self.generator.generate();
        info!(
            user_id = user.id,
            label,
            token_digest = %AccessTokenGenerator::digest(&token),
            "Creating access key"
        );

        let mut key = AccessKey::new(user.id, label, draft.key_type).with_permissions(permissions);
        key.set_expiration_date(draft.expiration_date);
        key.set_key(token);

        let persisted = self.repository.persist(key).await?;
        let id = persisted
            .id()
            .ok_or_else(|| DomainError::internal("Persisted access key carries no id"))?;

        // Return the canonical stored form
        self.repository
            .find_by_id(id, user.id)
            .await?
            .ok_or_else(|| DomainError::internal(format!("Access key {id} vanished after persist")))
    }

    /// Apply a partial update to a key owned by the given user.
    ///
    /// Returns `Ok(false)` when the key does not exist for that owner and
    /// `Ok(true)` for an absent patch, which acts as a found check. All
    /// validation happens before any state is written.
    pub async fn update(
        &self,
        user_id: UserId,
        key_id: AccessKeyId,
        patch: Option<AccessKeyPatch>,
    ) -> Result<bool, DomainError> {
        let Some(mut existing) = self.repository.find_by_id(key_id, user_id).await? else {
            return Ok(false);
        };
        let Some(patch) = patch else {
            return Ok(true);
        };

        let new_permissions = match &patch.permissions {
            FieldPatch::Keep => None,
            FieldPatch::Clear => {
                return Err(DomainError::validation(
                    "Access key permissions cannot be cleared",
                ));
            }
            FieldPatch::Set(rules) => {
                validate_permission_set(rules)?;
                Some(rules.iter().map(|p| p.normalized()).collect::<Vec<_>>())
            }
        };

        info!(user_id, key_id, "Updating access key");

        if !patch.label.is_keep() {
            existing.set_label(patch.label.apply(existing.label().map(str::to_string)));
        }
        if !patch.expiration_date.is_keep() {
            existing.set_expiration_date(patch.expiration_date.apply(existing.expiration_date()));
        }
        match patch.key_type {
            FieldPatch::Keep => {}
            FieldPatch::Clear => existing.set_type(AccessKeyType::Default),
            FieldPatch::Set(key_type) => existing.set_type(key_type),
        }
        if let Some(permissions) = new_permissions {
            // Full replacement; merge writes the aggregate atomically
            existing.set_permissions(permissions);
        }

        self.repository.merge(&existing).await?;
        Ok(true)
    }

    /// Resolve a token to its access key.
    ///
    /// A miss is a normal outcome, not an error. A session key inside the
    /// second half of its lifetime gets its expiration slid forward to
    /// `now + session_timeout`; the write is a compare-and-set on the
    /// previously read value, so concurrent authentications extend the
    /// window at most once and losers observe the winner's value.
    pub async fn authenticate(&self, token: &str) -> Result<Option<AccessKey>, DomainError> {
        for _ in 0..MAX_RENEWAL_ATTEMPTS {
            let Some(key) = self.repository.find_by_token(token).await? else {
                return Ok(None);
            };

            let Some(expiration) = key.expiration_date() else {
                return Ok(Some(key));
            };
            if key.key_type() != AccessKeyType::Session {
                return Ok(Some(key));
            }

            let timeout = self.settings.session_timeout();
            let now = self.clock.now();
            let remaining = expiration - now;
            if remaining <= Duration::zero() || remaining >= timeout / 2 {
                return Ok(Some(key));
            }

            let Some(id) = key.id() else {
                return Ok(Some(key));
            };
            let new_expiration = now + timeout;
            if self
                .repository
                .compare_and_set_expiration(id, Some(expiration), Some(new_expiration))
                .await?
            {
                debug!(key_id = id, "Session expiration renewed");
                let mut renewed = key;
                renewed.set_expiration_date(Some(new_expiration));
                return Ok(Some(renewed));
            }
            // Lost the renewal race; re-read to observe the winner's value
        }

        warn!("Session renewal contention exceeded retry budget");
        self.repository.find_by_token(token).await
    }

    /// Look up a key by id, scoped to its owner
    pub async fn find(
        &self,
        key_id: AccessKeyId,
        user_id: UserId,
    ) -> Result<Option<AccessKey>, DomainError> {
        self.repository.find_by_id(key_id, user_id).await
    }

    /// Plain token lookup without renewal
    pub async fn get_by_token(&self, token: &str) -> Result<Option<AccessKey>, DomainError> {
        self.repository.find_by_token(token).await
    }

    /// Mint a new OAUTH-type key representing a completed grant
    pub async fn create_from_oauth_grant(
        &self,
        grant: &OAuthGrant,
        user: &User,
    ) -> Result<AccessKey, DomainError> {
        let now = self.clock.now();

        let mut draft = AccessKeyDraft::new(oauth_grant_label(grant, now.timestamp_millis()))
            .with_type(AccessKeyType::OAuth)
            .with_permission(oauth_grant_permission(grant));
        if grant.access_type == AccessType::Online {
            draft.expiration_date =
                Some(now + Duration::seconds(OAUTH_ONLINE_KEY_LIFETIME_SECONDS));
        }

        self.create(user, draft).await
    }

    /// Refresh the key previously minted for a grant: new label, new
    /// expiration per the grant's access type, one rebuilt permission rule,
    /// and a rotated token.
    pub async fn update_from_oauth_grant(
        &self,
        grant: &OAuthGrant,
        user: &User,
    ) -> Result<AccessKey, DomainError> {
        let key_id = grant.access_key_id.ok_or_else(|| {
            DomainError::validation("OAuth grant has no associated access key")
        })?;

        let mut existing = self
            .repository
            .find_by_id(key_id, user.id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Access key {key_id} not found for user {}", user.id))
            })?;

        let permission = oauth_grant_permission(grant);
        validate_permission_set(std::slice::from_ref(&permission))?;

        let now = self.clock.now();
        existing.set_expiration_date(match grant.access_type {
            AccessType::Online => Some(now + Duration::seconds(OAUTH_ONLINE_KEY_LIFETIME_SECONDS)),
            AccessType::Offline => None,
        });
        existing.set_label(Some(oauth_grant_label(grant, now.timestamp_millis())));
        existing.set_permissions(vec![permission]);
        let token = self.generator.generate();
        info!(
            user_id = user.id,
            key_id,
            token_digest = %AccessTokenGenerator::digest(&token),
            "Refreshing OAuth access key"
        );
        existing.set_key(token);

        self.repository.merge(&existing).await
    }

    /// Delete a key. With an owner id the deletion is owner-scoped; without
    /// one it is the administrative by-id path.
    pub async fn delete(
        &self,
        user_id: Option<UserId>,
        key_id: AccessKeyId,
    ) -> Result<bool, DomainError> {
        info!(key_id, "Deleting access key");
        match user_id {
            Some(user_id) => self.repository.delete_by_id_and_owner(key_id, user_id).await,
            None => self.repository.delete_by_id(key_id).await,
        }
    }

    /// Remove every key whose expiration has passed. Idempotent.
    pub async fn remove_expired_keys(&self) -> Result<u64, DomainError> {
        debug!("Removing expired access keys");
        let removed = self
            .repository
            .delete_expired_before(self.clock.now())
            .await?;
        info!(removed, "Removed expired access keys");
        Ok(removed)
    }

    /// Filtered listing pass-through
    pub async fn list(&self, query: &AccessKeyQuery) -> Result<Vec<AccessKey>, DomainError> {
        self.repository.list(query).await
    }
}

fn oauth_grant_label(grant: &OAuthGrant, epoch_millis: i64) -> String {
    format!("OAuth grant for {} @ {}", grant.client.name, epoch_millis)
}

fn oauth_grant_permission(grant: &OAuthGrant) -> AccessKeyPermission {
    let mut permission = AccessKeyPermission::new()
        .with_domains([grant.client.domain.clone()])
        .with_actions(grant.scope_actions());
    if let Some(subnet) = grant.client.subnet {
        permission = permission.with_subnets([subnet]);
    }
    permission.network_ids = grant.network_ids.clone();
    permission
}
