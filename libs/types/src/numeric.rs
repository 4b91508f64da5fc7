//! Integer amount arithmetic
//!
//! Token amounts are raw base units (`u128`, the width the signed order struct
//! declares). Products are widened to `U256` before dividing so `a * b` can
//! never overflow, and every rounding direction is chosen explicitly by the
//! caller. No floating point anywhere.

use alloy_primitives::U256;

/// Token amount in base units.
pub type Amount = u128;

/// `floor(a * b / d)`.
///
/// Returns `None` when `d == 0` or when the quotient does not fit in `u128`.
pub fn mul_div_floor(a: Amount, b: Amount, d: Amount) -> Option<Amount> {
    if d == 0 {
        return None;
    }
    let q = U256::from(a) * U256::from(b) / U256::from(d);
    u128::try_from(q).ok()
}

/// `ceil(a * b / d)`.
///
/// Returns `None` when `d == 0` or when the quotient does not fit in `u128`.
pub fn mul_div_ceil(a: Amount, b: Amount, d: Amount) -> Option<Amount> {
    if d == 0 {
        return None;
    }
    let d = U256::from(d);
    let q = (U256::from(a) * U256::from(b) + d - U256::from(1u8)) / d;
    u128::try_from(q).ok()
}

/// `a_num / a_den >= b_num / b_den`, compared by cross-multiplication.
///
/// Denominators are assumed non-zero.
pub fn ratio_gte(a_num: Amount, a_den: Amount, b_num: Amount, b_den: Amount) -> bool {
    U256::from(a_num) * U256::from(b_den) >= U256::from(b_num) * U256::from(a_den)
}

/// Serde adapter for amounts: written as decimal strings, read from strings or
/// JSON integers. Order payloads in the wild carry 18-decimal amounts as
/// strings because they overflow JavaScript numbers.
pub mod amount_serde {
    use super::Amount;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a base-unit amount as a decimal string or non-negative integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("negative amount: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.trim()
                .parse::<Amount>()
                .map_err(|e| E::custom(format!("invalid amount {v:?}: {e}")))
        }
    }
}
