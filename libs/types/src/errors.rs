//! Error types for the order data model

use thiserror::Error;

use crate::numeric::Amount;

/// Data-model errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Unknown signature type: {0}")]
    UnknownSignatureType(u8),

    #[error("Overfill: filled {filled} + {attempted} exceeds maker amount {total}")]
    OverFill {
        filled: Amount,
        attempted: Amount,
        total: Amount,
    },
}
