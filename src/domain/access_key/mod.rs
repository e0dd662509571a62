//! Access key domain
//!
//! Domain types and traits for access key credentials: the key aggregate,
//! its permission rules with absent-is-wildcard semantics, the three-state
//! update patch, and the storage trait.

mod entity;
mod patch;
mod repository;
mod validation;

pub use entity::{
    AccessKey, AccessKeyDraft, AccessKeyId, AccessKeyPermission, AccessKeyType,
};
pub use patch::{AccessKeyPatch, FieldPatch};
pub use repository::{AccessKeyQuery, AccessKeyRepository, AccessKeySortField};
pub use validation::{validate_actions, validate_draft, validate_label, validate_permission_set};
