//! Delegated order signers
//!
//! A maker may authorize other addresses to sign (and cancel) orders on its
//! behalf. Signatures from an allowed signer are as good as the maker's own.

use std::collections::HashSet;

use alloy_primitives::Address;
use dashmap::DashMap;

/// maker -> addresses allowed to sign for it
#[derive(Debug, Default)]
pub struct SignerRegistry {
    signers: DashMap<Address, HashSet<Address>>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or revoke `signer` for `maker`.
    pub fn register(&self, maker: Address, signer: Address, allowed: bool) {
        if allowed {
            self.signers.entry(maker).or_default().insert(signer);
        } else if let Some(mut signers) = self.signers.get_mut(&maker) {
            signers.remove(&signer);
        }
    }

    /// The maker itself is always allowed.
    pub fn is_allowed(&self, maker: Address, signer: Address) -> bool {
        maker == signer
            || self
                .signers
                .get(&maker)
                .is_some_and(|signers| signers.contains(&signer))
    }
}
