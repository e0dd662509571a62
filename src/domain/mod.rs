//! Domain layer - Core business logic and entities

pub mod access_key;
pub mod actions;
pub mod device;
pub mod entitlement;
pub mod error;
pub mod network;
pub mod oauth;
pub mod subnet;
pub mod time;
pub mod user;

pub use access_key::{
    AccessKey, AccessKeyDraft, AccessKeyId, AccessKeyPatch, AccessKeyPermission, AccessKeyQuery,
    AccessKeyRepository, AccessKeySortField, AccessKeyType, FieldPatch,
};
pub use device::Device;
pub use entitlement::{DeviceRegistry, EntitlementOracle};
pub use error::DomainError;
pub use network::{Network, NetworkId};
pub use oauth::{AccessType, OAuthClient, OAuthGrant};
pub use subnet::{Subnet, SubnetParseError};
pub use time::{Clock, FixedClock, SystemClock};
pub use user::{User, UserId, UserRole};
