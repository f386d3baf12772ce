//! Universal Gateway Contract - Cross-Chain Deposit and Withdrawal Vault
//!
//! This contract is the chain-local leg of a cross-chain gateway: deposits
//! are locked in the contract's own balance and recorded as canonical
//! events for relayers; withdrawals release vault funds under a per-deploy
//! authorization strategy.
//!
//! # Deposit Lanes
//! - Gas lane (capped): small native amounts funding the sender's
//!   counterpart identity, bounded by an inclusive USD window priced by a
//!   TWAP pool or a push-style feed
//! - Funds lane (uncapped): high-value native or whitelisted CW20
//!   transfers with an explicit recipient or a payload
//! - Swap lane: CW20 deposits swapped into native, then admitted through
//!   the capped gas lane on the measured proceeds
//!
//! # Security
//! - Inclusive USD cap window on the fast lane, enforced pre- and
//!   post-swap
//! - Sequencer liveness guard for rollup deployments
//! - Strict-nonce ECDSA withdrawal authorization with chain-id binding
//! - Nonce persisted before funds move
//! - Mutual exclusion between in-flight swaps and every other route
//! - Emergency pause functionality

pub mod auth;
pub mod caps;
pub mod contract;
pub mod error;
mod execute;
pub mod msg;
pub mod oracle;
mod query;
pub mod state;
pub mod swap;

pub use crate::auth::{keccak256, withdraw_message_hash, WithdrawKind};
pub use crate::error::ContractError;
pub use crate::oracle::PriceReading;
