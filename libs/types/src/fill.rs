//! Fill results returned by a settlement

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::ids::{OrderHash, SettlementId};
use crate::numeric::{amount_serde, Amount};

/// What one side of a match executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FillResults {
    /// Maker token the order's maker gave
    #[serde(with = "amount_serde")]
    pub maker_filled: Amount,
    /// Taker token the order's maker received
    #[serde(with = "amount_serde")]
    pub taker_filled: Amount,
    /// Taker-token fee charged for this fill
    #[serde(with = "amount_serde")]
    pub fee_paid: Amount,
}

impl FillResults {
    pub fn is_zero(&self) -> bool {
        self.maker_filled == 0 && self.taker_filled == 0
    }
}

/// Outcome of one `matchOrders` call.
///
/// A zero fill is a successful result: the orders were live and authentic but
/// nothing could execute (incompatible rates, exhausted remaining amounts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub settlement_id: SettlementId,
    pub left_order_hash: OrderHash,
    pub right_order_hash: OrderHash,
    pub left: FillResults,
    pub right: FillResults,
    /// Surplus in the left maker token after the right maker got its price
    #[serde(with = "amount_serde")]
    pub left_maker_spread: Amount,
    /// Surplus in the right maker token after the left maker got its price
    #[serde(with = "amount_serde")]
    pub right_maker_spread: Amount,
    pub spread_recipient: Address,
}

impl MatchResult {
    pub fn is_zero_fill(&self) -> bool {
        self.left.is_zero() && self.right.is_zero()
    }
}
