//! Access key infrastructure
//!
//! Concrete services behind the access key domain: token generation, the
//! in-memory repository, the lifecycle service, the pure-read permission
//! evaluator, and the background expiry sweeper.

mod evaluator;
mod generator;
mod repository;
mod service;
mod sweeper;

pub use evaluator::PermissionEvaluator;
pub use generator::AccessTokenGenerator;
pub use repository::InMemoryAccessKeyRepository;
pub use service::AccessKeyService;
pub use sweeper::{ExpiredKeySweeper, DEFAULT_SWEEP_INTERVAL};
