//! Per-order fill state
//!
//! `OrderState` is the only mutable thing about an order. It is created lazily
//! (the default is "nothing filled, not cancelled") and never deleted.

use serde::{Deserialize, Serialize};

use crate::errors::TypesError;
use crate::ids::OrderHash;
use crate::numeric::{amount_serde, Amount};

/// Cumulative fill and cancellation flag for one order hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderState {
    /// Cumulative filled amount in maker-token units
    #[serde(with = "amount_serde")]
    pub filled: Amount,
    pub cancelled: bool,
}

impl OrderState {
    /// Maker amount still available out of `total`.
    pub fn remaining(&self, total: Amount) -> Amount {
        total.saturating_sub(self.filled)
    }

    /// Add `amount` to the cumulative fill.
    ///
    /// Rejects with `OverFill` (leaving the state untouched) if the new total
    /// would exceed the order's maker amount.
    pub fn apply_fill(&mut self, amount: Amount, total: Amount) -> Result<(), TypesError> {
        let overfill = TypesError::OverFill {
            filled: self.filled,
            attempted: amount,
            total,
        };
        let next = self.filled.checked_add(amount).ok_or_else(|| overfill.clone())?;
        if next > total {
            return Err(overfill);
        }
        self.filled = next;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_fully_filled(&self, total: Amount) -> bool {
        self.filled >= total
    }
}

/// Externally visible order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Zero amounts, identical tokens, or bound to another deployment
    Invalid,
    /// Can still be (partially) filled
    Fillable,
    /// Terminal: maker amount exhausted
    Filled,
    /// Terminal: cancelled by the maker, directly or by salt floor
    Cancelled,
    /// Terminal: expiry reached
    Expired,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Fillable)
    }
}

/// Snapshot of an order's status and fill state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order_hash: OrderHash,
    pub status: OrderStatus,
    #[serde(with = "amount_serde")]
    pub filled: Amount,
    #[serde(with = "amount_serde")]
    pub remaining: Amount,
}
