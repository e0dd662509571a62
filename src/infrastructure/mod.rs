//! Infrastructure layer - Concrete implementations of domain traits

pub mod access_key;
pub mod directory;
pub mod logging;

pub use access_key::{
    AccessKeyService, AccessTokenGenerator, ExpiredKeySweeper, InMemoryAccessKeyRepository,
    PermissionEvaluator,
};
pub use directory::InMemoryDirectory;
pub use logging::{init_logging, LogFormat, LoggingConfig};
