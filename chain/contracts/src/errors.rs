//! Engine error types
//!
//! `MatchError` is what callers of the settlement entry points see. Every
//! variant aborts the whole settlement; none is retried internally. The other
//! enums belong to the collaborators and convert into `MatchError`.

use alloy_primitives::{Address, U256};
use thiserror::Error;
use types::errors::TypesError;
use types::ids::OrderHash;
use types::numeric::Amount;

/// Settlement errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid signature type: {0}")]
    InvalidSignatureType(u8),

    #[error("Invalid signature for order {order_hash}")]
    InvalidSignature { order_hash: OrderHash },

    #[error("Order {order_hash} expired at {expiry}")]
    OrderExpired { order_hash: OrderHash, expiry: u64 },

    #[error("Order {order_hash} is cancelled")]
    OrderCancelled { order_hash: OrderHash },

    #[error("Sender {caller} not authorized for order {order_hash}")]
    SenderNotAuthorized {
        order_hash: OrderHash,
        caller: Address,
    },

    #[error("Taker not authorized for order {order_hash}: restricted to {taker}")]
    TakerNotAuthorized {
        order_hash: OrderHash,
        taker: Address,
    },

    #[error("Orders are not a mutually fillable token pair")]
    TokenMismatch,

    #[error("Order {order_hash} is bound to chain {chain_id} / contract {verifying_contract}")]
    DomainMismatch {
        order_hash: OrderHash,
        chain_id: u64,
        verifying_contract: Address,
    },

    #[error("Only the maker {maker} or its signers may act on order {order_hash}, not {caller}")]
    OnlyOrderMakerAllowed {
        order_hash: OrderHash,
        maker: Address,
        caller: Address,
    },

    #[error("Overfill on order {order_hash}: filled {filled} + {attempted} exceeds {total}")]
    OverFill {
        order_hash: OrderHash,
        filled: Amount,
        attempted: Amount,
        total: Amount,
    },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    #[error("Order state error: {0}")]
    State(StateError),
}

impl MatchError {
    /// Attach the order a data-model error refers to.
    pub fn from_types(err: TypesError, order_hash: OrderHash) -> Self {
        match err {
            TypesError::UnknownSignatureType(t) => MatchError::InvalidSignatureType(t),
            TypesError::OverFill {
                filled,
                attempted,
                total,
            } => MatchError::OverFill {
                order_hash,
                filled,
                attempted,
                total,
            },
        }
    }
}

impl From<StateError> for MatchError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::OverFill {
                order_hash,
                filled,
                attempted,
                total,
            } => MatchError::OverFill {
                order_hash,
                filled,
                attempted,
                total,
            },
            other => MatchError::State(other),
        }
    }
}

/// Signature verification failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureError {
    #[error("Illegal signature type")]
    Illegal,

    #[error("Signature explicitly marked invalid")]
    AlwaysInvalid,

    #[error("Invalid recovery id v = {0}")]
    InvalidV(u8),

    #[error("r or s outside the canonical range")]
    NonCanonicalScalar,

    #[error("Signer recovery failed: {0}")]
    Recovery(String),

    #[error("Wallet {wallet} rejected the signature")]
    WalletRejected { wallet: Address },
}

impl SignatureError {
    /// Map onto the settlement taxonomy for the order being authenticated.
    pub fn into_match_error(self, order_hash: OrderHash) -> MatchError {
        match self {
            SignatureError::Illegal => MatchError::InvalidSignatureType(0),
            _ => MatchError::InvalidSignature { order_hash },
        }
    }
}

/// Order state store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Overfill on order {order_hash}: filled {filled} + {attempted} exceeds {total}")]
    OverFill {
        order_hash: OrderHash,
        filled: Amount,
        attempted: Amount,
        total: Amount,
    },

    #[error("Order {order_hash} cannot be matched against itself")]
    DuplicateOrder { order_hash: OrderHash },

    #[error("Pair cancellation salt {attempted} must exceed the current floor {current}")]
    CancelSaltTooLow { current: U256, attempted: U256 },
}

/// Ledger (token transfer) errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance of {token} for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Token {token} rejected the transfer")]
    Rejected { token: Address },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(String),

    #[error("Chain id must be non-zero")]
    ZeroChainId,

    #[error("Verifying contract must be non-zero")]
    ZeroVerifyingContract,

    #[error("EIP-712 domain name must not be empty")]
    EmptyDomainName,
}
