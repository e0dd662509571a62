//! Network reference type.

use serde::{Deserialize, Serialize};

/// Identifier of a device network
pub type NetworkId = i64;

/// A device network as seen by the access key engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: NetworkId,
    pub name: String,
}

impl Network {
    pub fn new(id: NetworkId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
