//! Token ledger — the transfer primitive settlements execute against
//!
//! The engine never holds funds itself. Each settlement is a short list of
//! [`Transfer`]s between makers, the caller and fee/spread recipients; a
//! [`Ledger`] executes them one at a time and may refuse any of them.

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use types::numeric::{amount_serde, Amount};

use crate::errors::LedgerError;

/// Move `amount` of `token` from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    #[serde(with = "amount_serde")]
    pub amount: Amount,
}

impl Transfer {
    pub fn new(token: Address, from: Address, to: Address, amount: Amount) -> Self {
        Self {
            token,
            from,
            to,
            amount,
        }
    }

    /// The transfer that undoes this one.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..*self
        }
    }
}

/// Token transfer backend.
pub trait Ledger: Send + Sync {
    /// Execute one transfer atomically, or fail without effect.
    fn transfer(&self, transfer: &Transfer) -> Result<(), LedgerError>;
}

#[derive(Debug, Default)]
struct Books {
    /// owner -> (token -> balance)
    balances: HashMap<Address, HashMap<Address, Amount>>,
    /// Tokens whose transfers always fail
    blocked: HashSet<Address>,
    /// Executed transfers, oldest first
    history: Vec<Transfer>,
}

/// Process-local balance book.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    books: Mutex<Books>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `owner` out of thin air.
    pub fn mint(&self, token: Address, owner: Address, amount: Amount) -> Result<(), LedgerError> {
        let mut books = self.books.lock();
        Self::safe_credit(&mut books, token, owner, amount)
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> Amount {
        let books = self.books.lock();
        books
            .balances
            .get(&owner)
            .and_then(|tokens| tokens.get(&token))
            .copied()
            .unwrap_or(0)
    }

    /// Make every transfer of `token` fail, as a token contract that reverts would.
    pub fn block_token(&self, token: Address) {
        self.books.lock().blocked.insert(token);
    }

    pub fn unblock_token(&self, token: Address) {
        self.books.lock().blocked.remove(&token);
    }

    /// Executed transfers, oldest first. Unwinds appear as reversed entries.
    pub fn history(&self) -> Vec<Transfer> {
        self.books.lock().history.clone()
    }

    // ───────────────────────── Internal Helpers ─────────────────────────

    fn safe_credit(
        books: &mut Books,
        token: Address,
        owner: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let balance = books
            .balances
            .entry(owner)
            .or_default()
            .entry(token)
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn safe_debit(
        books: &mut Books,
        token: Address,
        owner: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let balance = books
            .balances
            .get_mut(&owner)
            .and_then(|tokens| tokens.get_mut(&token));
        let available = balance.as_deref().copied().unwrap_or(0);
        match balance {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                Ok(())
            }
            _ => Err(LedgerError::InsufficientBalance {
                token,
                owner,
                required: amount,
                available,
            }),
        }
    }
}

impl Ledger for InMemoryLedger {
    fn transfer(&self, transfer: &Transfer) -> Result<(), LedgerError> {
        let mut books = self.books.lock();
        if books.blocked.contains(&transfer.token) {
            return Err(LedgerError::Rejected {
                token: transfer.token,
            });
        }

        if transfer.from != transfer.to {
            // Check the credit side first so a failed credit never strands a debit
            let to_balance = books
                .balances
                .get(&transfer.to)
                .and_then(|tokens| tokens.get(&transfer.token))
                .copied()
                .unwrap_or(0);
            to_balance
                .checked_add(transfer.amount)
                .ok_or(LedgerError::Overflow)?;

            Self::safe_debit(&mut books, transfer.token, transfer.from, transfer.amount)?;
            Self::safe_credit(&mut books, transfer.token, transfer.to, transfer.amount)?;
        }

        books.history.push(*transfer);
        Ok(())
    }
}
