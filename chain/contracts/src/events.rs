//! Engine events
//!
//! Immutable records emitted by successful state-changing operations, in
//! the order the operations completed. Aborted settlements emit nothing.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use types::ids::{OrderHash, SettlementId};
use types::numeric::{amount_serde, Amount};

/// One side of a settlement executed against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub settlement_id: SettlementId,
    pub order_hash: OrderHash,
    pub maker: Address,
    /// Caller of the settlement
    pub taker: Address,
    pub fee_recipient: Address,
    pub maker_token: Address,
    pub taker_token: Address,
    #[serde(with = "amount_serde")]
    pub maker_filled: Amount,
    #[serde(with = "amount_serde")]
    pub taker_filled: Amount,
    #[serde(with = "amount_serde")]
    pub fee_paid: Amount,
    pub pool: B256,
}

/// Two orders settled against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersMatched {
    pub settlement_id: SettlementId,
    pub left_order_hash: OrderHash,
    pub right_order_hash: OrderHash,
    pub caller: Address,
    #[serde(with = "amount_serde")]
    pub left_maker_spread: Amount,
    #[serde(with = "amount_serde")]
    pub right_maker_spread: Amount,
    pub spread_recipient: Address,
    /// Unix seconds, from the engine clock
    pub matched_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_hash: OrderHash,
    pub maker: Address,
}

/// Every order of `maker` on this pair with `salt < min_valid_salt` is void.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCancelled {
    pub maker: Address,
    pub maker_token: Address,
    pub taker_token: Address,
    pub min_valid_salt: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSignerRegistered {
    pub maker: Address,
    pub signer: Address,
    pub allowed: bool,
}

/// Enum wrapper for all engine events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    OrderFilled(OrderFilled),
    OrdersMatched(OrdersMatched),
    OrderCancelled(OrderCancelled),
    PairCancelled(PairCancelled),
    OrderSignerRegistered(OrderSignerRegistered),
}
