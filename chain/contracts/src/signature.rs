//! Signature verification
//!
//! Recovers the signer of an order digest under one of the supported schemes:
//! - `Eip712`: secp256k1 ECDSA directly over the order hash
//! - `EthSign`: ECDSA over `keccak256("\x19Ethereum Signed Message:\n32" ‖ hash)`
//! - `Wallet`: delegated to a [`WalletValidator`] (smart-contract wallets)
//!
//! `Illegal` and `Invalid` never verify. `r` and `s` must lie in `(0, n)`;
//! high-s values are accepted and normalised before recovery.

use std::collections::HashSet;

use alloy_primitives::{eip191_hash_message, uint, Address, B256, U256};
use dashmap::DashMap;
use types::ids::OrderHash;
use types::signature::{Signature, SignatureType};

use crate::errors::{MatchError, SignatureError};
use crate::signers::SignerRegistry;

/// secp256k1 group order
const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Validates signatures on behalf of contract wallets.
pub trait WalletValidator: Send + Sync {
    /// Whether `wallet` accepts `signature` over `digest`.
    ///
    /// `chain_id` is set when the engine accepts EIP-155 recovery ids, and
    /// wallets that recover an ECDSA owner should accept them too.
    fn is_valid_signature(
        &self,
        wallet: Address,
        digest: B256,
        signature: &Signature,
        chain_id: Option<u64>,
    ) -> bool;
}

/// Rejects every wallet signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallets;

impl WalletValidator for NoWallets {
    fn is_valid_signature(
        &self,
        _wallet: Address,
        _digest: B256,
        _signature: &Signature,
        _chain_id: Option<u64>,
    ) -> bool {
        false
    }
}

/// Multi-owner wallets that accept an ECDSA signature from any registered owner.
#[derive(Debug, Default)]
pub struct WalletRegistry {
    owners: DashMap<Address, HashSet<Address>>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owner(&self, wallet: Address, owner: Address) {
        self.owners.entry(wallet).or_default().insert(owner);
    }

    pub fn remove_owner(&self, wallet: Address, owner: Address) {
        if let Some(mut owners) = self.owners.get_mut(&wallet) {
            owners.remove(&owner);
        }
    }

    pub fn is_owner(&self, wallet: Address, owner: Address) -> bool {
        self.owners
            .get(&wallet)
            .is_some_and(|owners| owners.contains(&owner))
    }
}

impl WalletValidator for WalletRegistry {
    fn is_valid_signature(
        &self,
        wallet: Address,
        digest: B256,
        signature: &Signature,
        chain_id: Option<u64>,
    ) -> bool {
        match recover_ecdsa(digest, signature, chain_id) {
            Ok(owner) => self.is_owner(wallet, owner),
            Err(_) => false,
        }
    }
}

/// Recovers order signers.
#[derive(Debug, Default)]
pub struct SignatureVerifier<W = NoWallets> {
    wallets: W,
    /// When set, `v = chain_id * 2 + 35/36` is accepted besides 27/28
    chain_id: Option<u64>,
}

impl SignatureVerifier<NoWallets> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<W: WalletValidator> SignatureVerifier<W> {
    pub fn with_wallets(wallets: W) -> Self {
        Self {
            wallets,
            chain_id: None,
        }
    }

    /// Accept EIP-155 style recovery ids for `chain_id`.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn wallets(&self) -> &W {
        &self.wallets
    }

    /// Resolve the address that produced `signature` over `digest`.
    ///
    /// `claimed` is the expected signer; only the wallet scheme needs it,
    /// since a contract wallet has no key to recover.
    pub fn recover(
        &self,
        digest: B256,
        signature: &Signature,
        claimed: Address,
    ) -> Result<Address, SignatureError> {
        match signature.signature_type {
            SignatureType::Illegal => Err(SignatureError::Illegal),
            SignatureType::Invalid => Err(SignatureError::AlwaysInvalid),
            SignatureType::Eip712 => recover_ecdsa(digest, signature, self.chain_id),
            SignatureType::EthSign => {
                recover_ecdsa(eip191_hash_message(digest), signature, self.chain_id)
            }
            SignatureType::Wallet => {
                if self
                    .wallets
                    .is_valid_signature(claimed, digest, signature, self.chain_id)
                {
                    Ok(claimed)
                } else {
                    Err(SignatureError::WalletRejected { wallet: claimed })
                }
            }
        }
    }

    /// True iff `signature` over `digest` resolves to `expected`.
    pub fn verify(&self, digest: B256, signature: &Signature, expected: Address) -> bool {
        matches!(self.recover(digest, signature, expected), Ok(signer) if signer == expected)
    }

    /// Authenticate an order: the signer must be its maker or a signer the
    /// maker registered. Returns the recovered signer.
    pub fn validate(
        &self,
        order_hash: OrderHash,
        signature: &Signature,
        maker: Address,
        signers: &SignerRegistry,
    ) -> Result<Address, MatchError> {
        let signer = self
            .recover(order_hash, signature, maker)
            .map_err(|e| e.into_match_error(order_hash))?;
        if signers.is_allowed(maker, signer) {
            Ok(signer)
        } else {
            Err(MatchError::InvalidSignature { order_hash })
        }
    }
}

/// y-parity from a recovery id byte.
fn parity_from_v(v: u8, chain_id: Option<u64>) -> Result<bool, SignatureError> {
    match v {
        27 => return Ok(false),
        28 => return Ok(true),
        _ => {}
    }
    if let Some(chain_id) = chain_id {
        let base = chain_id.checked_mul(2).and_then(|c| c.checked_add(35));
        if let Some(base) = base {
            if u64::from(v) == base {
                return Ok(false);
            }
            if Some(u64::from(v)) == base.checked_add(1) {
                return Ok(true);
            }
        }
    }
    Err(SignatureError::InvalidV(v))
}

fn is_canonical_scalar(x: &B256) -> bool {
    let value = U256::from_be_bytes(x.0);
    !value.is_zero() && value < SECP256K1_N
}

/// Plain secp256k1 recovery of `prehash` under `(v, r, s)`.
pub fn recover_ecdsa(
    prehash: B256,
    signature: &Signature,
    chain_id: Option<u64>,
) -> Result<Address, SignatureError> {
    let parity = parity_from_v(signature.v, chain_id)?;
    if !is_canonical_scalar(&signature.r) || !is_canonical_scalar(&signature.s) {
        return Err(SignatureError::NonCanonicalScalar);
    }
    let ecdsa = alloy_primitives::Signature::new(
        U256::from_be_bytes(signature.r.0),
        U256::from_be_bytes(signature.s.0),
        parity,
    );
    ecdsa
        .recover_address_from_prehash(&prehash)
        .map_err(|e| SignatureError::Recovery(e.to_string()))
}
