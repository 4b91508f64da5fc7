//! Matched fill calculation
//!
//! Given two crossing orders and their remaining maker amounts, decides how
//! much each maker gives and receives. Every maker receives at least its own
//! limit price; rounding always favours the maker on the receiving end. What
//! is left over after both prices are met is the spread.
//!
//! Notation: the left maker gives X and wants Y, the right maker gives Y and
//! wants X. `lm`/`lt` and `rm`/`rt` are the signed maker/taker amounts.

use types::fill::FillResults;
use types::numeric::{mul_div_ceil, mul_div_floor, ratio_gte, Amount};
use types::order::Order;

use crate::errors::MatchError;

/// How to size a match when neither order fills completely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Fill the limiting order completely at the other order's price; the
    /// spread accrues in the left maker token only.
    #[default]
    Standard,
    /// Fill as much of both orders as possible; spread may accrue on either side.
    MaximalFill,
}

/// Amounts moved by one match, before fees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchedFill {
    pub left: FillResults,
    pub right: FillResults,
    /// Surplus X after the right maker got its price
    pub left_maker_spread: Amount,
    /// Surplus Y after the left maker got its price
    pub right_maker_spread: Amount,
}

impl MatchedFill {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.left.is_zero() && self.right.is_zero()
    }
}

/// Compute the matched fill of `left` against `right`.
///
/// `left_remaining` and `right_remaining` are the makers' unfilled amounts.
/// Non-crossing prices or exhausted orders yield [`MatchedFill::zero`]; only
/// a token pair that cannot trade at all is an error.
pub fn calculate_matched_fill(
    left: &Order,
    right: &Order,
    left_remaining: Amount,
    right_remaining: Amount,
    mode: MatchMode,
) -> Result<MatchedFill, MatchError> {
    if !left.is_counter_to(right) || left.maker_token == left.taker_token {
        return Err(MatchError::TokenMismatch);
    }

    let (lm, lt) = (left.maker_amount, left.taker_amount);
    let (rm, rt) = (right.maker_amount, right.taker_amount);
    if lm == 0 || lt == 0 || rm == 0 || rt == 0 || left_remaining == 0 || right_remaining == 0 {
        return Ok(MatchedFill::zero());
    }
    // lm / lt >= rt / rm: the left maker gives at least as much X per Y as
    // the right maker asks for
    if !ratio_gte(lm, lt, rt, rm) {
        return Ok(MatchedFill::zero());
    }

    let fill = match mode {
        MatchMode::Standard => standard(lm, lt, rm, rt, left_remaining, right_remaining),
        MatchMode::MaximalFill => maximal(lm, lt, rm, rt, left_remaining, right_remaining),
    };
    Ok(fill.filter(is_executable).unwrap_or_default())
}

fn fill(maker_filled: Amount, taker_filled: Amount) -> FillResults {
    FillResults {
        maker_filled,
        taker_filled,
        fee_paid: 0,
    }
}

fn standard(lm: Amount, lt: Amount, rm: Amount, rt: Amount, rl: Amount, rr: Amount) -> Option<MatchedFill> {
    let (left, right) = if ratio_gte(rl, lm, rr, lt) {
        // rr * lm <= rl * lt: the right order is the smaller one and fills
        // completely; the left order trades at the right maker's size
        let right = fill(rr, mul_div_ceil(rr, rt, rm)?);
        let left = fill(mul_div_floor(rr, lm, lt)?, rr);
        (left, right)
    } else {
        let left = fill(rl, mul_div_ceil(rl, lt, lm)?);
        let right_maker = left.taker_filled;
        let right = fill(right_maker, mul_div_ceil(right_maker, rt, rm)?);
        (left, right)
    };
    let left_maker_spread = left.maker_filled.checked_sub(right.taker_filled)?;
    Some(MatchedFill {
        left,
        right,
        left_maker_spread,
        right_maker_spread: 0,
    })
}

fn maximal(lm: Amount, lt: Amount, rm: Amount, rt: Amount, rl: Amount, rr: Amount) -> Option<MatchedFill> {
    let left_wants = mul_div_ceil(rl, lt, lm)?;
    let right_wants = mul_div_ceil(rr, rt, rm)?;

    if rl >= right_wants && rr >= left_wants {
        return Some(MatchedFill {
            left: fill(rl, left_wants),
            right: fill(rr, right_wants),
            left_maker_spread: rl - right_wants,
            right_maker_spread: rr - left_wants,
        });
    }

    if rl < right_wants {
        // Left runs out of X first: all of it goes to the right maker, who
        // pays at its own price; the left maker takes what it asked for
        let left = fill(rl, left_wants);
        let right = fill(mul_div_floor(rl, rm, rt)?, rl);
        let right_maker_spread = right.maker_filled.checked_sub(left_wants)?;
        Some(MatchedFill {
            left,
            right,
            left_maker_spread: 0,
            right_maker_spread,
        })
    } else {
        let right = fill(rr, right_wants);
        let left = fill(mul_div_floor(rr, lm, lt)?, rr);
        let left_maker_spread = left.maker_filled.checked_sub(right_wants)?;
        Some(MatchedFill {
            left,
            right,
            left_maker_spread,
            right_maker_spread: 0,
        })
    }
}

/// Rounding can leave one leg empty on dust-sized orders; never execute a
/// one-sided transfer.
fn is_executable(fill: &MatchedFill) -> bool {
    fill.left.maker_filled > 0
        && fill.left.taker_filled > 0
        && fill.right.maker_filled > 0
        && fill.right.taker_filled > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    const X: Address = Address::repeat_byte(0x0A);
    const Y: Address = Address::repeat_byte(0x0B);
    const E18: Amount = 1_000_000_000_000_000_000;

    fn order(maker_token: Address, taker_token: Address, maker_amount: Amount, taker_amount: Amount) -> Order {
        Order {
            maker_token,
            taker_token,
            maker_amount,
            taker_amount,
            maker: Address::repeat_byte(1),
            taker: Address::ZERO,
            pool: B256::ZERO,
            expiry: u64::MAX,
            salt: U256::ZERO,
            chain_id: 1,
            verifying_contract: Address::repeat_byte(0xEE),
            taker_token_fee_amount: 0,
            sender: Address::ZERO,
            fee_recipient: Address::ZERO,
        }
    }

    fn calc(left: &Order, right: &Order, mode: MatchMode) -> MatchedFill {
        calculate_matched_fill(left, right, left.maker_amount, right.maker_amount, mode).unwrap()
    }

    #[test]
    fn test_equal_prices_fill_completely() {
        let left = order(X, Y, E18, E18);
        let right = order(Y, X, E18, E18);
        let fill = calc(&left, &right, MatchMode::Standard);

        assert_eq!(fill.left, FillResults { maker_filled: E18, taker_filled: E18, fee_paid: 0 });
        assert_eq!(fill.right, FillResults { maker_filled: E18, taker_filled: E18, fee_paid: 0 });
        assert_eq!(fill.left_maker_spread, 0);
        assert_eq!(fill.right_maker_spread, 0);
    }

    #[test]
    fn test_spread_goes_to_left_maker_token() {
        // Left sells 10 X for 2 Y, right sells 2 Y for 8 X
        let left = order(X, Y, 10, 2);
        let right = order(Y, X, 2, 8);
        let fill = calc(&left, &right, MatchMode::Standard);

        assert_eq!(fill.left.maker_filled, 10);
        assert_eq!(fill.left.taker_filled, 2);
        assert_eq!(fill.right.maker_filled, 2);
        assert_eq!(fill.right.taker_filled, 8);
        assert_eq!(fill.left_maker_spread, 2);
        assert_eq!(fill.right_maker_spread, 0);
    }

    #[test]
    fn test_right_order_limits() {
        // Left: 100 X for 50 Y. Right only has 10 Y, wants 15 X.
        let left = order(X, Y, 100, 50);
        let right = order(Y, X, 10, 15);
        let fill = calc(&left, &right, MatchMode::Standard);

        assert_eq!(fill.right.maker_filled, 10);
        assert_eq!(fill.right.taker_filled, 15);
        assert_eq!(fill.left.taker_filled, 10);
        assert_eq!(fill.left.maker_filled, 20);
        assert_eq!(fill.left_maker_spread, 5);
    }

    #[test]
    fn test_left_order_limits() {
        // Left: 10 X for 5 Y. Right: 100 Y for 100 X.
        let left = order(X, Y, 10, 5);
        let right = order(Y, X, 100, 100);
        let fill = calc(&left, &right, MatchMode::Standard);

        assert_eq!(fill.left.maker_filled, 10);
        assert_eq!(fill.left.taker_filled, 5);
        assert_eq!(fill.right.maker_filled, 5);
        assert_eq!(fill.right.taker_filled, 5);
        assert_eq!(fill.left_maker_spread, 5);
    }

    #[test]
    fn test_non_crossing_is_zero_fill() {
        // Left wants 2 Y per X, right gives 1 Y per X
        let left = order(X, Y, 1, 2);
        let right = order(Y, X, 1, 1);
        assert!(calc(&left, &right, MatchMode::Standard).is_zero());
        assert!(calc(&left, &right, MatchMode::MaximalFill).is_zero());
    }

    #[test]
    fn test_exhausted_order_is_zero_fill() {
        let left = order(X, Y, E18, E18);
        let right = order(Y, X, E18, E18);
        let fill = calculate_matched_fill(&left, &right, 0, E18, MatchMode::Standard).unwrap();
        assert!(fill.is_zero());
        let fill = calculate_matched_fill(&left, &right, E18, 0, MatchMode::Standard).unwrap();
        assert!(fill.is_zero());
    }

    #[test]
    fn test_zero_amounts_are_zero_fill() {
        let left = order(X, Y, 0, 5);
        let right = order(Y, X, 5, 5);
        assert!(calc(&left, &right, MatchMode::Standard).is_zero());
    }

    #[test]
    fn test_token_mismatch() {
        let z = Address::repeat_byte(0x0C);
        let left = order(X, Y, 10, 10);
        let right = order(Y, z, 10, 10);
        assert_eq!(
            calculate_matched_fill(&left, &right, 10, 10, MatchMode::Standard),
            Err(MatchError::TokenMismatch)
        );

        let same_left = order(X, X, 10, 10);
        let same_right = order(X, X, 10, 10);
        assert_eq!(
            calculate_matched_fill(&same_left, &same_right, 10, 10, MatchMode::Standard),
            Err(MatchError::TokenMismatch)
        );
    }

    #[test]
    fn test_partially_filled_remaining_is_respected() {
        let left = order(X, Y, 100, 100);
        let right = order(Y, X, 100, 100);
        let fill = calculate_matched_fill(&left, &right, 30, 100, MatchMode::Standard).unwrap();
        assert_eq!(fill.left.maker_filled, 30);
        assert_eq!(fill.right.maker_filled, 30);
    }

    #[test]
    fn test_maximal_fill_both_complete() {
        let left = order(X, Y, 10, 2);
        let right = order(Y, X, 3, 8);
        let fill = calc(&left, &right, MatchMode::MaximalFill);

        assert_eq!(fill.left, FillResults { maker_filled: 10, taker_filled: 2, fee_paid: 0 });
        assert_eq!(fill.right, FillResults { maker_filled: 3, taker_filled: 8, fee_paid: 0 });
        assert_eq!(fill.left_maker_spread, 2);
        assert_eq!(fill.right_maker_spread, 1);
    }

    #[test]
    fn test_maximal_fill_left_short() {
        // Right wants 100 X for 100 Y, left only gives 10 X (for 5 Y)
        let left = order(X, Y, 10, 5);
        let right = order(Y, X, 100, 100);
        let fill = calc(&left, &right, MatchMode::MaximalFill);

        assert_eq!(fill.left, FillResults { maker_filled: 10, taker_filled: 5, fee_paid: 0 });
        assert_eq!(fill.right, FillResults { maker_filled: 10, taker_filled: 10, fee_paid: 0 });
        assert_eq!(fill.left_maker_spread, 0);
        assert_eq!(fill.right_maker_spread, 5);
    }

    #[test]
    fn test_maximal_fill_right_short() {
        let left = order(X, Y, 100, 50);
        let right = order(Y, X, 10, 15);
        let fill = calc(&left, &right, MatchMode::MaximalFill);

        assert_eq!(fill.right, FillResults { maker_filled: 10, taker_filled: 15, fee_paid: 0 });
        assert_eq!(fill.left, FillResults { maker_filled: 20, taker_filled: 10, fee_paid: 0 });
        assert_eq!(fill.left_maker_spread, 5);
        assert_eq!(fill.right_maker_spread, 0);
    }

    fn gets_its_price(results: &FillResults, order: &Order) -> bool {
        // taker_filled / maker_filled >= taker_amount / maker_amount
        U256::from(results.taker_filled) * U256::from(order.maker_amount)
            >= U256::from(results.maker_filled) * U256::from(order.taker_amount)
    }

    fn check_fill(
        (lm, lt, rm, rt): (Amount, Amount, Amount, Amount),
        l_frac: u128,
        r_frac: u128,
        maximal: bool,
    ) -> Result<(), TestCaseError> {
        let left = order(X, Y, lm, lt);
        let right = order(Y, X, rm, rt);
        let rl = (lm * l_frac / 100).max(1);
        let rr = (rm * r_frac / 100).max(1);
        let mode = if maximal { MatchMode::MaximalFill } else { MatchMode::Standard };

        let fill = calculate_matched_fill(&left, &right, rl, rr, mode).unwrap();
        if !fill.is_zero() {
            prop_assert!(fill.left.maker_filled <= rl);
            prop_assert!(fill.right.maker_filled <= rr);
            prop_assert!(gets_its_price(&fill.left, &left));
            prop_assert!(gets_its_price(&fill.right, &right));
            prop_assert_eq!(
                fill.left.maker_filled,
                fill.right.taker_filled + fill.left_maker_spread
            );
            prop_assert_eq!(
                fill.right.maker_filled,
                fill.left.taker_filled + fill.right_maker_spread
            );
            if !maximal {
                prop_assert_eq!(fill.right_maker_spread, 0);
            }
        }
        if !ratio_gte(lm, lt, rt, rm) {
            prop_assert!(fill.is_zero());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_fill_is_safe_and_conserving(
            lm in 1u128..1_000_000_000,
            lt in 1u128..1_000_000_000,
            rm in 1u128..1_000_000_000,
            rt in 1u128..1_000_000_000,
            l_frac in 1u128..=100,
            r_frac in 1u128..=100,
            maximal in any::<bool>(),
        ) {
            check_fill((lm, lt, rm, rt), l_frac, r_frac, maximal)?;
        }

        // 18-decimal tokens up to a trillion whole units: products only fit
        // after widening
        #[test]
        fn prop_fill_is_safe_at_token_scale(
            lm in 1_000_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000_000_000,
            lt in 1_000_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000_000_000,
            rm in 1_000_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000_000_000,
            rt in 1_000_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000_000_000,
            l_frac in 1u128..=100,
            r_frac in 1u128..=100,
            maximal in any::<bool>(),
        ) {
            check_fill((lm, lt, rm, rt), l_frac, r_frac, maximal)?;
        }
    }
}
