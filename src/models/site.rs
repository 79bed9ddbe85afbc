//! Site data model.

use super::AddressBlock;
use serde::{Deserialize, Serialize};

/// A physical or logical location that owns a set of VLANs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Session-local identity (replaced by a persisted id on commit).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Root block for this site only. Falls back to the design supernet.
    #[serde(default)]
    pub supernet: Option<AddressBlock>,
}

impl Site {
    pub fn new(id: &str, name: &str) -> Site {
        Site {
            id: id.to_string(),
            name: name.to_string(),
            supernet: None,
        }
    }

    pub fn with_supernet(mut self, supernet: AddressBlock) -> Site {
        self.supernet = Some(supernet);
        self
    }

    /// The block this site allocates from.
    pub fn effective_supernet(&self, global: AddressBlock) -> AddressBlock {
        self.supernet.unwrap_or(global)
    }
}
