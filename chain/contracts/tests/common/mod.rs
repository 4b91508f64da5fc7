//! Shared harness for the settlement integration tests

#![allow(dead_code)]

use alloy_primitives::{address, Address, B256, U256};
use k256::ecdsa::SigningKey;
use match_orders::clock::FixedClock;
use match_orders::ledger::InMemoryLedger;
use match_orders::state::InMemoryOrderStateStore;
use match_orders::{EngineConfig, MatchOrdersEngine};
use types::numeric::Amount;
use types::order::Order;
use types::signature::{Signature, SignatureType};

pub type Engine =
    MatchOrdersEngine<InMemoryOrderStateStore, InMemoryLedger, match_orders::signature::NoWallets, FixedClock>;

pub const E18: Amount = 1_000_000_000_000_000_000;
pub const CHAIN_ID: u64 = 15;
pub const VERIFYING_CONTRACT: Address = address!("d8a9465307a1bb5a2b7a4ed511ffae175b7d9bac");
pub const NOW: u64 = 1_666_000_000;

pub const TOKEN_X: Address = address!("849766c564ed666e198ea5ae42a4223b95faf64a");
pub const TOKEN_Y: Address = address!("0e4355d3cb1796bcf695c3172c43a151fbfde367");
pub const CALLER: Address = address!("00000000000000000000000000000000000000c0");
pub const FEE_RECIPIENT: Address = address!("00000000000000000000000000000000000000fe");

/// A maker with a real secp256k1 key.
pub struct TestWallet {
    pub key: SigningKey,
    pub address: Address,
}

impl TestWallet {
    pub fn from_seed(seed: u8) -> Self {
        let key = SigningKey::from_slice(&[seed; 32]).unwrap();
        let address = Address::from_private_key(&key);
        Self { key, address }
    }

    pub fn sign_digest(&self, digest: B256, signature_type: SignatureType) -> Signature {
        let (sig, recid) = self.key.sign_prehash_recoverable(digest.as_slice()).unwrap();
        let bytes = sig.to_bytes();
        Signature::new(
            signature_type,
            27 + recid.to_byte(),
            B256::from_slice(&bytes[..32]),
            B256::from_slice(&bytes[32..]),
        )
    }

    pub fn sign(&self, engine: &Engine, order: &Order) -> Signature {
        self.sign_digest(engine.order_hash(order), SignatureType::Eip712)
    }
}

/// Route engine logs to the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn engine() -> Engine {
    engine_with_config(EngineConfig::for_deployment(CHAIN_ID, VERIFYING_CONTRACT))
}

pub fn engine_with_config(config: EngineConfig) -> Engine {
    init_tracing();
    MatchOrdersEngine::new(config, InMemoryOrderStateStore::new(), InMemoryLedger::new())
        .unwrap()
        .with_clock(FixedClock::new(NOW))
}

/// Order on the test deployment, one hour from expiry.
pub fn order(
    maker: Address,
    maker_token: Address,
    taker_token: Address,
    maker_amount: Amount,
    taker_amount: Amount,
) -> Order {
    Order {
        maker_token,
        taker_token,
        maker_amount,
        taker_amount,
        maker,
        taker: Address::ZERO,
        pool: B256::ZERO,
        expiry: NOW + 3_600,
        salt: U256::from(1u64),
        chain_id: CHAIN_ID,
        verifying_contract: VERIFYING_CONTRACT,
        taker_token_fee_amount: 0,
        sender: Address::ZERO,
        fee_recipient: Address::ZERO,
    }
}

/// Two makers trading X <-> Y, each funded with what its order gives.
pub struct Pair {
    pub alice: TestWallet,
    pub bob: TestWallet,
    pub left: Order,
    pub right: Order,
}

impl Pair {
    /// Alice sells `lm` X for `lt` Y; Bob sells `rm` Y for `rt` X.
    pub fn new(engine: &Engine, lm: Amount, lt: Amount, rm: Amount, rt: Amount) -> Self {
        let alice = TestWallet::from_seed(0xA1);
        let bob = TestWallet::from_seed(0xB0);
        let left = order(alice.address, TOKEN_X, TOKEN_Y, lm, lt);
        let right = order(bob.address, TOKEN_Y, TOKEN_X, rm, rt);
        engine.ledger().mint(TOKEN_X, alice.address, lm).unwrap();
        engine.ledger().mint(TOKEN_Y, bob.address, rm).unwrap();
        Self {
            alice,
            bob,
            left,
            right,
        }
    }

    pub fn signatures(&self, engine: &Engine) -> (Signature, Signature) {
        (self.alice.sign(engine, &self.left), self.bob.sign(engine, &self.right))
    }
}
