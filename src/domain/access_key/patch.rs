//! Partial-update payload with unambiguous three-state field semantics.
//!
//! A patch field is one of `Keep` (absent from the request), `Clear`
//! (present as `null`) or `Set` (present with a value). Modeling this as a
//! tagged variant keeps "absent" and "null" distinct, which nested
//! `Option`s cannot express.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::entity::{AccessKeyPermission, AccessKeyType};

/// One field of a partial update
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldPatch<T> {
    /// Field absent from the patch: leave the stored value unchanged
    #[default]
    Keep,
    /// Field present as `null`: clear the stored value
    Clear,
    /// Field present with a value: overwrite the stored value
    Set(T),
}

impl<T> FieldPatch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// The new value if this patch sets one
    pub fn set_value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Resolve against the currently stored value
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Decode a patch field: callers must pair this with `#[serde(default)]`
    /// so an absent field becomes `Keep` while an explicit `null` becomes
    /// `Clear`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

/// Partial update for an access key.
///
/// `permissions` participates for symmetry but may never be cleared: a key
/// must always keep at least one rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessKeyPatch {
    #[serde(default, deserialize_with = "FieldPatch::deserialize")]
    pub label: FieldPatch<String>,
    #[serde(default, deserialize_with = "FieldPatch::deserialize")]
    pub expiration_date: FieldPatch<DateTime<Utc>>,
    #[serde(rename = "type", default, deserialize_with = "FieldPatch::deserialize")]
    pub key_type: FieldPatch<AccessKeyType>,
    #[serde(default, deserialize_with = "FieldPatch::deserialize")]
    pub permissions: FieldPatch<Vec<AccessKeyPermission>>,
}

impl AccessKeyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = FieldPatch::Set(label.into());
        self
    }

    pub fn with_expiration(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = FieldPatch::Set(expiration_date);
        self
    }

    pub fn clear_expiration(mut self) -> Self {
        self.expiration_date = FieldPatch::Clear;
        self
    }

    pub fn with_type(mut self, key_type: AccessKeyType) -> Self {
        self.key_type = FieldPatch::Set(key_type);
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<AccessKeyPermission>) -> Self {
        self.permissions = FieldPatch::Set(permissions);
        self
    }
}
