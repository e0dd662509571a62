//! Device Hub Access
//!
//! Access key permission engine for a device hub backend:
//! - Credential lifecycle: creation, partial update, deletion and expiry
//! - Multi-dimensional permission rules over actions, domains, subnets,
//!   networks and devices, where an absent field is a wildcard and an
//!   empty set matches nothing
//! - Sliding session renewal with optimistic concurrency
//! - Keys minted from completed OAuth grants
//! - Side-effect-free authorization evaluation against the owner's own
//!   entitlements

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AuthSettings, InMemorySettings, DEFAULT_SESSION_TIMEOUT_SECONDS};
pub use domain::{
    AccessKey, AccessKeyDraft, AccessKeyId, AccessKeyPatch, AccessKeyPermission, AccessKeyQuery,
    AccessKeyRepository, AccessKeySortField, AccessKeyType, AccessType, Clock, Device,
    DeviceRegistry, DomainError, EntitlementOracle, FieldPatch, Network, NetworkId, OAuthClient,
    OAuthGrant, Subnet, SystemClock, User, UserId, UserRole,
};
pub use infrastructure::{
    AccessKeyService, AccessTokenGenerator, ExpiredKeySweeper, InMemoryAccessKeyRepository,
    InMemoryDirectory, PermissionEvaluator,
};
