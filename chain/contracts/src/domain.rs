//! Order hashing — EIP-712 typed-data digest
//!
//! `orderHash = keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(order))`
//! where the domain binds name, version, chain id and verifying contract.
//! The same digest is the state-store key and the message makers sign, so an
//! order signed for one deployment can never be replayed on another.

use std::borrow::Cow;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use types::ids::OrderHash;
use types::order::Order;

pub const DEFAULT_DOMAIN_NAME: &str = "ZeroEx";
pub const DEFAULT_DOMAIN_VERSION: &str = "1.0.0";

sol! {
    /// EIP-712 struct makers sign. Chain id and verifying contract are not
    /// struct members; they enter through the domain separator.
    struct LimitOrder {
        address makerToken;
        address takerToken;
        uint128 makerAmount;
        uint128 takerAmount;
        uint128 takerTokenFeeAmount;
        address maker;
        address taker;
        address sender;
        address feeRecipient;
        bytes32 pool;
        uint64 expiry;
        uint256 salt;
    }
}

impl From<&Order> for LimitOrder {
    fn from(order: &Order) -> Self {
        Self {
            makerToken: order.maker_token,
            takerToken: order.taker_token,
            makerAmount: order.maker_amount,
            takerAmount: order.taker_amount,
            takerTokenFeeAmount: order.taker_token_fee_amount,
            maker: order.maker,
            taker: order.taker,
            sender: order.sender,
            feeRecipient: order.fee_recipient,
            pool: order.pool,
            expiry: order.expiry,
            salt: order.salt,
        }
    }
}

/// Computes deployment-scoped order hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHasher {
    name: Cow<'static, str>,
    version: Cow<'static, str>,
}

impl Default for OrderHasher {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_DOMAIN_NAME),
            version: Cow::Borrowed(DEFAULT_DOMAIN_VERSION),
        }
    }
}

impl OrderHasher {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            version: Cow::Owned(version.into()),
        }
    }

    /// EIP-712 domain for one deployment.
    pub fn domain(&self, chain_id: u64, verifying_contract: Address) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone()),
            Some(self.version.clone()),
            Some(U256::from(chain_id)),
            Some(verifying_contract),
            None,
        )
    }

    pub fn domain_separator(&self, chain_id: u64, verifying_contract: Address) -> B256 {
        self.domain(chain_id, verifying_contract).separator()
    }

    /// `hashStruct(order)`; independent of the deployment.
    pub fn hash_struct(order: &Order) -> B256 {
        LimitOrder::from(order).eip712_hash_struct()
    }

    /// Full signing digest, using the order's own chain id and contract.
    pub fn order_hash(&self, order: &Order) -> OrderHash {
        let domain = self.domain(order.chain_id, order.verifying_contract);
        LimitOrder::from(order).eip712_signing_hash(&domain)
    }
}
