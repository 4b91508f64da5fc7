//! Engine configuration
//!
//! One engine instance settles orders for exactly one deployment: a chain id
//! plus the verifying contract address that makers put in their EIP-712
//! domain. Orders bound to any other deployment are rejected.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION};
use crate::errors::ConfigError;

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Chain the engine settles on
    pub chain_id: u64,
    /// Contract address orders are signed against
    pub verifying_contract: Address,
    /// EIP-712 domain name
    pub domain_name: String,
    /// EIP-712 domain version
    pub domain_version: String,
    /// Receives the spread of a favorable crossing; `None` = the caller
    pub spread_recipient: Option<Address>,
    /// Also accept EIP-155 style `v = chainId * 2 + 35/36`
    pub allow_eip155_v: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            verifying_contract: address!("Def1C0ded9bec7F1a1670819833240f027b25EfF"),
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            domain_version: DEFAULT_DOMAIN_VERSION.to_string(),
            spread_recipient: None,
            allow_eip155_v: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration bound to a specific deployment.
    pub fn for_deployment(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }
        if self.verifying_contract == Address::ZERO {
            return Err(ConfigError::ZeroVerifyingContract);
        }
        if self.domain_name.trim().is_empty() {
            return Err(ConfigError::EmptyDomainName);
        }
        Ok(())
    }
}
