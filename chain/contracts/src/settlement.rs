//! Settlement coordinator — `matchOrders`
//!
//! Settles two signed, crossing orders against each other in one atomic step:
//!
//! 1. Hash both orders and check they belong to this deployment
//! 2. Authenticate both signatures
//! 3. Check liveness (expiry, sender/taker restrictions, salt floor)
//! 4. Under both orders' locks: re-check cancellation, compute the fill,
//!    apply fees, update the fill state, execute the transfers, record events
//!
//! Any failure aborts the whole settlement. Order state is only written back
//! once every transfer has gone through, and transfers already executed when
//! a later one fails are unwound in reverse order.

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use types::fill::{FillResults, MatchResult};
use types::ids::{OrderHash, SettlementId};
use types::order::Order;
use types::signature::Signature;
use types::state::{OrderInfo, OrderStatus};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::domain::OrderHasher;
use crate::errors::{ConfigError, MatchError};
use crate::events::{
    ContractEvent, OrderCancelled, OrderFilled, OrderSignerRegistered, OrdersMatched,
    PairCancelled,
};
use crate::fee::{apply_fees, fee_transfers};
use crate::fill::{calculate_matched_fill, MatchMode, MatchedFill};
use crate::ledger::{Ledger, Transfer};
use crate::signature::{NoWallets, SignatureVerifier, WalletValidator};
use crate::signers::SignerRegistry;
use crate::state::OrderStateStore;

/// Two-sided order settlement engine.
///
/// Safe to share across threads: settlements touching disjoint orders run in
/// parallel, settlements sharing an order serialise on it.
pub struct MatchOrdersEngine<S, L, W = NoWallets, C = SystemClock> {
    config: EngineConfig,
    hasher: OrderHasher,
    verifier: SignatureVerifier<W>,
    signers: SignerRegistry,
    store: S,
    ledger: L,
    clock: C,
    /// Emitted events log (append-only until drained)
    events: Mutex<Vec<ContractEvent>>,
}

fn build_verifier<W: WalletValidator>(config: &EngineConfig, wallets: W) -> SignatureVerifier<W> {
    let verifier = SignatureVerifier::with_wallets(wallets);
    if config.allow_eip155_v {
        verifier.with_chain_id(config.chain_id)
    } else {
        verifier
    }
}

impl<S: OrderStateStore, L: Ledger> MatchOrdersEngine<S, L> {
    pub fn new(config: EngineConfig, store: S, ledger: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hasher: OrderHasher::new(config.domain_name.clone(), config.domain_version.clone()),
            verifier: build_verifier(&config, NoWallets),
            signers: SignerRegistry::new(),
            store,
            ledger,
            clock: SystemClock,
            events: Mutex::new(Vec::new()),
            config,
        })
    }
}

impl<S, L, W, C> MatchOrdersEngine<S, L, W, C>
where
    S: OrderStateStore,
    L: Ledger,
    W: WalletValidator,
    C: Clock,
{
    /// Swap in a contract-wallet validator.
    pub fn with_wallets<W2: WalletValidator>(self, wallets: W2) -> MatchOrdersEngine<S, L, W2, C> {
        MatchOrdersEngine {
            verifier: build_verifier(&self.config, wallets),
            config: self.config,
            hasher: self.hasher,
            signers: self.signers,
            store: self.store,
            ledger: self.ledger,
            clock: self.clock,
            events: self.events,
        }
    }

    /// Swap in a time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> MatchOrdersEngine<S, L, W, C2> {
        MatchOrdersEngine {
            clock,
            config: self.config,
            hasher: self.hasher,
            verifier: self.verifier,
            signers: self.signers,
            store: self.store,
            ledger: self.ledger,
            events: self.events,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn wallets(&self) -> &W {
        self.verifier.wallets()
    }

    pub fn order_hash(&self, order: &Order) -> OrderHash {
        self.hasher.order_hash(order)
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Settle `left` against `right`, filling the smaller order completely.
    ///
    /// `caller` submits the match and acts as taker of both orders: it pays
    /// both fees and, unless a spread recipient is configured, keeps the
    /// spread. A zero fill is `Ok` and changes nothing.
    pub fn match_orders(
        &self,
        caller: Address,
        left: &Order,
        right: &Order,
        left_signature: &Signature,
        right_signature: &Signature,
    ) -> Result<MatchResult, MatchError> {
        self.settle(caller, left, right, left_signature, right_signature, MatchMode::Standard)
    }

    /// Like [`Self::match_orders`], but fills as much of both orders as possible.
    pub fn match_orders_with_maximal_fill(
        &self,
        caller: Address,
        left: &Order,
        right: &Order,
        left_signature: &Signature,
        right_signature: &Signature,
    ) -> Result<MatchResult, MatchError> {
        self.settle(caller, left, right, left_signature, right_signature, MatchMode::MaximalFill)
    }

    fn settle(
        &self,
        caller: Address,
        left: &Order,
        right: &Order,
        left_signature: &Signature,
        right_signature: &Signature,
        mode: MatchMode,
    ) -> Result<MatchResult, MatchError> {
        let settlement_id = SettlementId::new();
        let left_hash = self.hasher.order_hash(left);
        let right_hash = self.hasher.order_hash(right);

        let outcome = self
            .authorize(caller, left, right, left_hash, right_hash, left_signature, right_signature)
            .and_then(|()| {
                self.execute(settlement_id, caller, left, right, left_hash, right_hash, mode)
            });

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    %settlement_id,
                    %left_hash,
                    %right_hash,
                    %caller,
                    error = %err,
                    "Settlement aborted"
                );
                return Err(err);
            }
        };

        if result.is_zero_fill() {
            debug!(%settlement_id, %left_hash, %right_hash, "Zero fill, nothing settled");
            return Ok(result);
        }

        info!(
            %settlement_id,
            %left_hash,
            %right_hash,
            %caller,
            left_maker_filled = %result.left.maker_filled,
            right_maker_filled = %result.right.maker_filled,
            left_maker_spread = %result.left_maker_spread,
            right_maker_spread = %result.right_maker_spread,
            "Orders matched"
        );
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn authorize(
        &self,
        caller: Address,
        left: &Order,
        right: &Order,
        left_hash: OrderHash,
        right_hash: OrderHash,
        left_signature: &Signature,
        right_signature: &Signature,
    ) -> Result<(), MatchError> {
        self.check_domain(left, left_hash)?;
        self.check_domain(right, right_hash)?;

        self.verifier
            .validate(left_hash, left_signature, left.maker, &self.signers)?;
        self.verifier
            .validate(right_hash, right_signature, right.maker, &self.signers)?;

        let now = self.clock.now();
        self.check_live(left, left_hash, caller, right.maker, now)?;
        self.check_live(right, right_hash, caller, left.maker, now)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        settlement_id: SettlementId,
        caller: Address,
        left: &Order,
        right: &Order,
        left_hash: OrderHash,
        right_hash: OrderHash,
        mode: MatchMode,
    ) -> Result<MatchResult, MatchError> {
        let spread_recipient = self.spread_recipient(caller);
        let match_result = |fill: &MatchedFill| MatchResult {
            settlement_id,
            left_order_hash: left_hash,
            right_order_hash: right_hash,
            left: fill.left,
            right: fill.right,
            left_maker_spread: fill.left_maker_spread,
            right_maker_spread: fill.right_maker_spread,
            spread_recipient,
        };

        self.store
            .transact(left_hash, right_hash, |left_state, right_state| {
                // A cancel that landed after `authorize` must still win
                if left_state.cancelled || self.is_below_salt_floor(left) {
                    return Err(MatchError::OrderCancelled {
                        order_hash: left_hash,
                    });
                }
                if right_state.cancelled || self.is_below_salt_floor(right) {
                    return Err(MatchError::OrderCancelled {
                        order_hash: right_hash,
                    });
                }

                let mut fill = calculate_matched_fill(
                    left,
                    right,
                    left_state.remaining(left.maker_amount),
                    right_state.remaining(right.maker_amount),
                    mode,
                )?;
                if fill.is_zero() {
                    return Ok(match_result(&fill));
                }
                apply_fees(&mut fill, left, left_state.filled, right, right_state.filled);

                left_state
                    .apply_fill(fill.left.maker_filled, left.maker_amount)
                    .map_err(|e| MatchError::from_types(e, left_hash))?;
                right_state
                    .apply_fill(fill.right.maker_filled, right.maker_amount)
                    .map_err(|e| MatchError::from_types(e, right_hash))?;

                let transfers = settlement_transfers(&fill, left, right, caller, spread_recipient);
                self.execute_transfers(settlement_id, &transfers)?;

                debug!(
                    %left_hash,
                    left_filled = %left_state.filled,
                    %right_hash,
                    right_filled = %right_state.filled,
                    "Fill state updated"
                );

                // Logged while both orders are still locked, so events on a
                // shared order follow its commit order
                let result = match_result(&fill);
                self.record_settlement(caller, left, right, &result);
                Ok(result)
            })
    }

    fn spread_recipient(&self, caller: Address) -> Address {
        self.config.spread_recipient.unwrap_or(caller)
    }

    fn check_domain(&self, order: &Order, order_hash: OrderHash) -> Result<(), MatchError> {
        if order.chain_id != self.config.chain_id
            || order.verifying_contract != self.config.verifying_contract
        {
            return Err(MatchError::DomainMismatch {
                order_hash,
                chain_id: order.chain_id,
                verifying_contract: order.verifying_contract,
            });
        }
        Ok(())
    }

    /// Expiry, sender and taker restrictions, salt floor. Cancellation is
    /// checked again under the order's lock.
    fn check_live(
        &self,
        order: &Order,
        order_hash: OrderHash,
        caller: Address,
        counter_maker: Address,
        now: u64,
    ) -> Result<(), MatchError> {
        if order.is_expired(now) {
            return Err(MatchError::OrderExpired {
                order_hash,
                expiry: order.expiry,
            });
        }
        if !order.allows_sender(caller) {
            return Err(MatchError::SenderNotAuthorized { order_hash, caller });
        }
        if !order.allows_taker(&[caller, counter_maker]) {
            return Err(MatchError::TakerNotAuthorized {
                order_hash,
                taker: order.taker,
            });
        }
        if self.is_below_salt_floor(order) {
            return Err(MatchError::OrderCancelled { order_hash });
        }
        Ok(())
    }

    fn is_below_salt_floor(&self, order: &Order) -> bool {
        order.salt
            < self
                .store
                .min_valid_salt(order.maker, order.maker_token, order.taker_token)
    }

    fn execute_transfers(
        &self,
        settlement_id: SettlementId,
        transfers: &[Transfer],
    ) -> Result<(), MatchError> {
        for (i, transfer) in transfers.iter().enumerate() {
            if let Err(err) = self.ledger.transfer(transfer) {
                warn!(
                    %settlement_id,
                    token = %transfer.token,
                    from = %transfer.from,
                    to = %transfer.to,
                    amount = %transfer.amount,
                    error = %err,
                    "Transfer failed, unwinding"
                );
                self.unwind(settlement_id, &transfers[..i]);
                return Err(MatchError::TransferFailed(err));
            }
        }
        Ok(())
    }

    fn unwind(&self, settlement_id: SettlementId, executed: &[Transfer]) {
        for transfer in executed.iter().rev() {
            if let Err(err) = self.ledger.transfer(&transfer.reversed()) {
                error!(
                    %settlement_id,
                    token = %transfer.token,
                    from = %transfer.from,
                    to = %transfer.to,
                    amount = %transfer.amount,
                    error = %err,
                    "Failed to unwind transfer"
                );
            }
        }
    }

    fn record_settlement(&self, caller: Address, left: &Order, right: &Order, result: &MatchResult) {
        let filled = |order: &Order, order_hash: OrderHash, fill: &FillResults| {
            ContractEvent::OrderFilled(OrderFilled {
                settlement_id: result.settlement_id,
                order_hash,
                maker: order.maker,
                taker: caller,
                fee_recipient: order.fee_recipient,
                maker_token: order.maker_token,
                taker_token: order.taker_token,
                maker_filled: fill.maker_filled,
                taker_filled: fill.taker_filled,
                fee_paid: fill.fee_paid,
                pool: order.pool,
            })
        };

        let mut events = self.events.lock();
        events.push(filled(left, result.left_order_hash, &result.left));
        events.push(filled(right, result.right_order_hash, &result.right));
        events.push(ContractEvent::OrdersMatched(OrdersMatched {
            settlement_id: result.settlement_id,
            left_order_hash: result.left_order_hash,
            right_order_hash: result.right_order_hash,
            caller,
            left_maker_spread: result.left_maker_spread,
            right_maker_spread: result.right_maker_spread,
            spread_recipient: result.spread_recipient,
            matched_at: self.clock.now(),
        }));
    }

    // ───────────────────────── Cancellation ─────────────────────────

    /// Cancel one order. Only its maker or a signer the maker registered may.
    pub fn cancel_order(&self, caller: Address, order: &Order) -> Result<OrderHash, MatchError> {
        let order_hash = self.hasher.order_hash(order);
        if !self.signers.is_allowed(order.maker, caller) {
            warn!(%order_hash, maker = %order.maker, %caller, "Cancel rejected");
            return Err(MatchError::OnlyOrderMakerAllowed {
                order_hash,
                maker: order.maker,
                caller,
            });
        }

        self.store.cancel(order_hash);
        self.events
            .lock()
            .push(ContractEvent::OrderCancelled(OrderCancelled {
                order_hash,
                maker: order.maker,
            }));
        debug!(%order_hash, maker = %order.maker, "Order cancelled");
        Ok(order_hash)
    }

    /// Cancel every order `caller` made on the (maker token, taker token) pair
    /// whose salt is below `min_valid_salt`. The floor only moves up.
    ///
    /// As with [`Self::register_allowed_order_signer`], `caller` must be the
    /// authenticated sender.
    pub fn cancel_pair_orders(
        &self,
        caller: Address,
        maker_token: Address,
        taker_token: Address,
        min_valid_salt: U256,
    ) -> Result<(), MatchError> {
        self.store
            .raise_min_valid_salt(caller, maker_token, taker_token, min_valid_salt)?;
        self.events
            .lock()
            .push(ContractEvent::PairCancelled(PairCancelled {
                maker: caller,
                maker_token,
                taker_token,
                min_valid_salt,
            }));
        debug!(maker = %caller, %maker_token, %taker_token, %min_valid_salt, "Pair cancelled");
        Ok(())
    }

    /// Let `signer` sign and cancel orders on behalf of `caller`, or revoke it.
    ///
    /// `caller` becomes the maker the signer acts for, so the embedding must
    /// pass the authenticated sender of the request, never a value taken
    /// from its payload.
    pub fn register_allowed_order_signer(&self, caller: Address, signer: Address, allowed: bool) {
        self.signers.register(caller, signer, allowed);
        self.events
            .lock()
            .push(ContractEvent::OrderSignerRegistered(OrderSignerRegistered {
                maker: caller,
                signer,
                allowed,
            }));
        info!(maker = %caller, %signer, allowed, "Order signer registered");
    }

    pub fn is_allowed_order_signer(&self, maker: Address, signer: Address) -> bool {
        self.signers.is_allowed(maker, signer)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Status and fill state of `order` as of now.
    pub fn order_info(&self, order: &Order) -> OrderInfo {
        let order_hash = self.hasher.order_hash(order);
        let state = self.store.state(order_hash);

        let status = if !order.is_well_formed() || self.check_domain(order, order_hash).is_err() {
            OrderStatus::Invalid
        } else if state.is_fully_filled(order.maker_amount) {
            OrderStatus::Filled
        } else if state.cancelled || self.is_below_salt_floor(order) {
            OrderStatus::Cancelled
        } else if order.is_expired(self.clock.now()) {
            OrderStatus::Expired
        } else {
            OrderStatus::Fillable
        };

        OrderInfo {
            order_hash,
            status,
            filled: state.filled,
            remaining: state.remaining(order.maker_amount),
        }
    }

    /// Get all emitted events.
    pub fn events(&self) -> Vec<ContractEvent> {
        self.events.lock().clone()
    }

    /// Drain events (for external consumption).
    pub fn drain_events(&self) -> Vec<ContractEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// Maker-to-maker legs first, then spreads, then the caller's fee payments.
fn settlement_transfers(
    fill: &MatchedFill,
    left: &Order,
    right: &Order,
    caller: Address,
    spread_recipient: Address,
) -> Vec<Transfer> {
    let mut transfers = vec![
        Transfer::new(left.maker_token, left.maker, right.maker, fill.right.taker_filled),
        Transfer::new(left.maker_token, left.maker, spread_recipient, fill.left_maker_spread),
        Transfer::new(right.maker_token, right.maker, left.maker, fill.left.taker_filled),
        Transfer::new(right.maker_token, right.maker, spread_recipient, fill.right_maker_spread),
    ];
    transfers.extend(fee_transfers(fill, left, right, caller));
    transfers.retain(|t| t.amount > 0);
    transfers
}
