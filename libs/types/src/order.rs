//! Signed limit order
//!
//! An order is created and signed off-system by its maker and never mutated
//! afterwards. Everything that changes over its life (fills, cancellation)
//! lives in [`crate::state::OrderState`], keyed by the order hash.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::numeric::{amount_serde, Amount};

/// Limit order as signed by the maker.
///
/// Field names serialize in camelCase to match the JSON order payloads that
/// makers and relayers exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Token the maker gives
    pub maker_token: Address,
    /// Token the maker wants in return
    pub taker_token: Address,
    #[serde(with = "amount_serde")]
    pub maker_amount: Amount,
    #[serde(with = "amount_serde")]
    pub taker_amount: Amount,
    pub maker: Address,
    /// Restricts who may take the order; zero = anyone
    pub taker: Address,
    /// Grouping key for shared liquidity/fee accounting
    pub pool: B256,
    /// Unix timestamp (seconds); the order is dead from this instant on
    pub expiry: u64,
    pub salt: U256,
    pub chain_id: u64,
    pub verifying_contract: Address,
    /// Full fee owed in taker token when the order fills completely
    #[serde(with = "amount_serde")]
    pub taker_token_fee_amount: Amount,
    /// Restricts who may submit the settlement; zero = anyone
    pub sender: Address,
    pub fee_recipient: Address,
}

impl Order {
    /// Expired once `now` reaches `expiry`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }

    /// Whether `caller` may submit a settlement for this order.
    pub fn allows_sender(&self, caller: Address) -> bool {
        self.sender == Address::ZERO || self.sender == caller
    }

    /// Whether any of `candidates` satisfies the taker restriction.
    pub fn allows_taker(&self, candidates: &[Address]) -> bool {
        self.taker == Address::ZERO || candidates.contains(&self.taker)
    }

    /// Both amounts positive and the two tokens distinct.
    pub fn is_well_formed(&self) -> bool {
        self.maker_amount > 0 && self.taker_amount > 0 && self.maker_token != self.taker_token
    }

    /// True when `other` trades the same pair in the opposite direction.
    pub fn is_counter_to(&self, other: &Order) -> bool {
        self.maker_token == other.taker_token && self.taker_token == other.maker_token
    }
}
