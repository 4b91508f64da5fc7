//! Signature record submitted alongside an order

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::errors::TypesError;

/// Signature scheme discriminator, encoded on the wire as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SignatureType {
    /// 0: never valid, rejected as an unsupported type
    Illegal = 0,
    /// 1: explicitly invalid, always fails verification
    Invalid = 1,
    /// 2: ECDSA over the raw EIP-712 digest
    Eip712 = 2,
    /// 3: ECDSA over the `personal_sign`-prefixed digest
    EthSign = 3,
    /// 4: validated by the maker's wallet contract
    Wallet = 4,
}

impl TryFrom<u8> for SignatureType {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Illegal),
            1 => Ok(Self::Invalid),
            2 => Ok(Self::Eip712),
            3 => Ok(Self::EthSign),
            4 => Ok(Self::Wallet),
            other => Err(TypesError::UnknownSignatureType(other)),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(value: SignatureType) -> Self {
        value as u8
    }
}

/// `{v, r, s, signatureType}` as produced by the maker's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
    pub signature_type: SignatureType,
}

impl Signature {
    pub fn new(signature_type: SignatureType, v: u8, r: B256, s: B256) -> Self {
        Self {
            v,
            r,
            s,
            signature_type,
        }
    }
}
