//! Order state tracking
//!
//! Cumulative fills and cancellation flags keyed by order hash, plus the
//! per-pair salt floor used for bulk cancellation. Entries are created lazily
//! and never removed; filled amounts only ever grow.
//!
//! # Concurrency
//! Each order hash owns a `parking_lot::Mutex`. A settlement touches two
//! orders, so [`OrderStateStore::transact`] locks both in ascending hash
//! order. Two settlements sharing an order therefore serialise on it, while
//! unrelated settlements run in parallel.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use parking_lot::Mutex;
use types::ids::OrderHash;
use types::numeric::Amount;
use types::state::OrderState;

use crate::errors::StateError;

/// Storage for per-order fill state.
pub trait OrderStateStore: Send + Sync {
    /// Snapshot; unknown hashes read as the default state.
    fn state(&self, order_hash: OrderHash) -> OrderState;

    fn remaining_fillable(&self, order_hash: OrderHash, total: Amount) -> Amount {
        self.state(order_hash).remaining(total)
    }

    fn is_cancelled(&self, order_hash: OrderHash) -> bool {
        self.state(order_hash).cancelled
    }

    /// Add `amount` to one order's cumulative fill.
    fn commit_fill(
        &self,
        order_hash: OrderHash,
        amount: Amount,
        total: Amount,
    ) -> Result<(), StateError>;

    /// Set the cancelled flag. Idempotent.
    fn cancel(&self, order_hash: OrderHash);

    /// Run `f` with exclusive access to the states of two distinct orders.
    ///
    /// `f` works on copies; they are written back only if it returns `Ok`,
    /// so an aborted settlement leaves no trace in the store.
    fn transact<T, E, F>(&self, left: OrderHash, right: OrderHash, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut OrderState, &mut OrderState) -> Result<T, E>,
        E: From<StateError>;

    /// Orders of this maker and pair with a lower salt count as cancelled.
    fn min_valid_salt(&self, maker: Address, maker_token: Address, taker_token: Address) -> U256;

    /// Raise the salt floor. It may only move up.
    fn raise_min_valid_salt(
        &self,
        maker: Address,
        maker_token: Address,
        taker_token: Address,
        min_valid_salt: U256,
    ) -> Result<(), StateError>;
}

type Slot = Arc<Mutex<OrderState>>;

/// Process-local [`OrderStateStore`].
#[derive(Debug, Default)]
pub struct InMemoryOrderStateStore {
    orders: DashMap<OrderHash, Slot>,
    salt_floors: DashMap<(Address, Address, Address), U256>,
}

impl InMemoryOrderStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders with recorded state.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // The DashMap shard guard is dropped before the slot is locked, so a
    // thread blocked on an order never holds up unrelated orders.
    fn slot(&self, order_hash: OrderHash) -> Slot {
        self.orders.entry(order_hash).or_default().clone()
    }
}

impl OrderStateStore for InMemoryOrderStateStore {
    fn state(&self, order_hash: OrderHash) -> OrderState {
        let slot = self.orders.get(&order_hash).map(|slot| slot.value().clone());
        match slot {
            Some(slot) => *slot.lock(),
            None => OrderState::default(),
        }
    }

    fn commit_fill(
        &self,
        order_hash: OrderHash,
        amount: Amount,
        total: Amount,
    ) -> Result<(), StateError> {
        let slot = self.slot(order_hash);
        let mut state = slot.lock();
        let before = state.filled;
        state
            .apply_fill(amount, total)
            .map_err(|_| StateError::OverFill {
                order_hash,
                filled: before,
                attempted: amount,
                total,
            })
    }

    fn cancel(&self, order_hash: OrderHash) {
        self.slot(order_hash).lock().cancel();
    }

    fn transact<T, E, F>(&self, left: OrderHash, right: OrderHash, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut OrderState, &mut OrderState) -> Result<T, E>,
        E: From<StateError>,
    {
        if left == right {
            return Err(StateError::DuplicateOrder { order_hash: left }.into());
        }

        let left_slot = self.slot(left);
        let right_slot = self.slot(right);

        let (mut left_guard, mut right_guard) = if left < right {
            let l = left_slot.lock();
            let r = right_slot.lock();
            (l, r)
        } else {
            let r = right_slot.lock();
            let l = left_slot.lock();
            (l, r)
        };

        let mut left_state = *left_guard;
        let mut right_state = *right_guard;
        let out = f(&mut left_state, &mut right_state)?;
        *left_guard = left_state;
        *right_guard = right_state;
        Ok(out)
    }

    fn min_valid_salt(&self, maker: Address, maker_token: Address, taker_token: Address) -> U256 {
        self.salt_floors
            .get(&(maker, maker_token, taker_token))
            .map(|floor| *floor)
            .unwrap_or(U256::ZERO)
    }

    fn raise_min_valid_salt(
        &self,
        maker: Address,
        maker_token: Address,
        taker_token: Address,
        min_valid_salt: U256,
    ) -> Result<(), StateError> {
        let mut floor = self
            .salt_floors
            .entry((maker, maker_token, taker_token))
            .or_insert(U256::ZERO);
        if min_valid_salt <= *floor {
            return Err(StateError::CancelSaltTooLow {
                current: *floor,
                attempted: min_valid_salt,
            });
        }
        *floor = min_valid_salt;
        Ok(())
    }
}
