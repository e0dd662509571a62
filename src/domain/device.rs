//! Device reference type.

use serde::{Deserialize, Serialize};

use super::network::Network;

/// A device as seen by the access key engine.
///
/// A device may exist without an owning network; the evaluator treats that
/// case as having no network restriction to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub guid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
}

impl Device {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            network: None,
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }
}
