//! Types library for the two-sided order matching engine
//!
//! Plain data shared between makers, relayers and the settlement engine.
//! Nothing here performs I/O or cryptography.
//!
//! # Modules
//! - `ids`: Order hash alias and settlement identifiers
//! - `numeric`: Integer amounts and explicit-rounding arithmetic
//! - `order`: The signed limit order
//! - `signature`: Signature record and scheme discriminator
//! - `state`: Per-order fill state, status and info snapshot
//! - `fill`: Fill results returned by a settlement
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod signature;
pub mod state;
pub mod fill;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::fill::*;
    pub use crate::ids::*;
    pub use crate::numeric::{Amount, mul_div_ceil, mul_div_floor, ratio_gte};
    pub use crate::order::*;
    pub use crate::signature::*;
    pub use crate::state::*;
}
