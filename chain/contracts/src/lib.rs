//! Two-sided signed limit-order settlement
//!
//! A caller (relayer or solver) submits two signed orders trading the same
//! pair in opposite directions. The engine checks both are authentic and
//! live, computes how much each fills against the other, charges fees and
//! settles all transfers in one atomic step.
//!
//! # Modules
//! - `domain`: EIP-712 order hashing bound to one deployment
//! - `signature`: Signer recovery (EIP-712, EthSign, contract wallets)
//! - `signers`: Signers a maker delegates to
//! - `state`: Per-order fill state and salt floors
//! - `fill`: Matched fill calculation
//! - `fee`: Taker-token fees
//! - `ledger`: Token transfer backend
//! - `settlement`: The `matchOrders` coordinator
//! - `events`: Engine events
//! - `config`: Engine configuration
//! - `clock`: Time source
//! - `errors`: Error types

pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod fee;
pub mod fill;
pub mod ledger;
pub mod settlement;
pub mod signature;
pub mod signers;
pub mod state;

pub use config::EngineConfig;
pub use errors::MatchError;
pub use settlement::MatchOrdersEngine;

/// Engine ABI version — frozen after release
pub const ENGINE_ABI_VERSION: &str = "1.0.0";
