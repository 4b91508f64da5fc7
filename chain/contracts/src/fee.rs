//! Taker-token fees
//!
//! Each order may carry a `takerTokenFeeAmount`, owed in full once the order
//! has filled completely and pro rata before that (rounded down). The share is
//! taken on the order's cumulative fill, so however many partial fills an
//! order sees, the fees charged on it add up to at most `takerTokenFeeAmount`.
//! The caller submits the match, so it is the taker of both orders and pays
//! both fees; it funds them from the spread it receives.

use alloy_primitives::Address;
use types::numeric::{mul_div_floor, Amount};
use types::order::Order;

use crate::fill::MatchedFill;
use crate::ledger::Transfer;

/// Fee owed on `order` once `filled` maker tokens have been filled in total.
fn cumulative_fee(order: &Order, filled: Amount) -> Amount {
    let fee = order.taker_token_fee_amount;
    mul_div_floor(fee, filled.min(order.maker_amount), order.maker_amount).unwrap_or(0)
}

/// Fee owed on `order` for a fill of `maker_filled` on top of `filled_before`.
pub fn taker_fee(order: &Order, filled_before: Amount, maker_filled: Amount) -> Amount {
    if order.taker_token_fee_amount == 0 || maker_filled == 0 {
        return 0;
    }
    let filled_after = filled_before.saturating_add(maker_filled);
    cumulative_fee(order, filled_after) - cumulative_fee(order, filled_before)
}

/// Fill in `fee_paid` on both sides of `fill`, given what each order had
/// filled before it.
pub fn apply_fees(
    fill: &mut MatchedFill,
    left: &Order,
    left_filled_before: Amount,
    right: &Order,
    right_filled_before: Amount,
) {
    fill.left.fee_paid = taker_fee(left, left_filled_before, fill.left.maker_filled);
    fill.right.fee_paid = taker_fee(right, right_filled_before, fill.right.maker_filled);
}

/// Caller → fee recipient payments for `fill`, zero amounts omitted.
///
/// A zero fee recipient is honoured literally: the fee is sent to the zero
/// address and thereby burned.
pub fn fee_transfers(fill: &MatchedFill, left: &Order, right: &Order, caller: Address) -> Vec<Transfer> {
    [
        Transfer::new(left.taker_token, caller, left.fee_recipient, fill.left.fee_paid),
        Transfer::new(right.taker_token, caller, right.fee_recipient, fill.right.fee_paid),
    ]
    .into_iter()
    .filter(|t| t.amount > 0)
    .collect()
}
