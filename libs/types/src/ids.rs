//! Identifier types
//!
//! Orders are identified by their EIP-712 digest. Settlements get a UUID v7
//! so emitted events sort chronologically.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order identity: the chain- and contract-scoped typed-data digest.
pub type OrderHash = B256;

/// Unique identifier for one `matchOrders` settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(Uuid);

impl SettlementId {
    /// Create a new SettlementId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_id_creation() {
        let id1 = SettlementId::new();
        let id2 = SettlementId::new();
        assert_ne!(id1, id2, "SettlementIds should be unique");
    }

    #[test]
    fn test_settlement_id_serialization() {
        let id = SettlementId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: SettlementId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
