//! State definitions for the Universal Gateway contract.
//!
//! The gateway's own balance is the vault: deposits accumulate here until a
//! withdrawal releases them.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Core Configuration
// ============================================================================

/// Contract configuration. Mutated only through admin-gated handlers that
/// re-validate invariants before saving.
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Pauser address (may pause; only admin unpauses)
    pub pauser: Addr,
    /// Whether the gateway is currently paused
    pub paused: bool,
    /// Withdrawal authorization strategy
    pub withdraw_authority: WithdrawAuthority,
    /// Minimum USD cap for fast-lane deposits (1e18 = $1)
    pub min_cap_usd: Uint128,
    /// Maximum USD cap for fast-lane deposits (1e18 = $1)
    pub max_cap_usd: Uint128,
    /// Bank denom of the chain's native asset
    pub native_denom: String,
    /// Decimals of the native asset
    pub native_decimals: u8,
    /// CW20 contract wrapping the native asset 1:1
    pub native_wrapper: Addr,
    /// Swap router contract
    pub swap_router: Addr,
    /// Pool factory contract
    pub swap_factory: Addr,
    /// Ordered fee tiers to search for pools
    pub fee_tiers: Vec<u32>,
    /// Deadline window substituted when a swap caller passes deadline = 0
    pub default_swap_deadline_secs: u64,
}

/// Withdrawal authorization strategy.
#[cw_serde]
pub enum WithdrawAuthority {
    /// Caller must be this local address; no hashing or nonce tracking.
    LocalRole { withdrawer: Addr },
    /// Calls carry an ECDSA signature verified against `TssState`.
    ExternalSigner,
}

/// Pending admin change proposal.
#[cw_serde]
pub struct PendingAdmin {
    /// Proposed new admin address
    pub new_address: Addr,
    /// Block time when the change can be executed
    pub execute_after: Timestamp,
}

// ============================================================================
// Price Source Configuration
// ============================================================================

/// The live price source. Exactly one variant per deployment generation;
/// switching is an explicit, attribute-logged admin action.
#[cw_serde]
pub enum PriceConfig {
    Twap {
        /// Pool pairing the native wrapper with the counter asset
        pool: Addr,
        /// USD-stable counter asset (CW20)
        counter_asset: Addr,
        /// Decimals of the counter asset (<= 18)
        counter_decimals: u8,
        /// TWAP window in seconds (>= 300)
        window_secs: u64,
        /// Minimum observation cardinality required of the pool
        min_cardinality: u16,
    },
    Feed {
        /// Push-style aggregator feed contract
        feed: Addr,
        /// Decimals of the feed answer (<= 18)
        feed_decimals: u8,
        /// Maximum allowed answer age; 0 disables the check
        stale_after_secs: u64,
        /// Rollup sequencer liveness feed, if any
        sequencer: Option<SequencerConfig>,
    },
}

/// Sequencer liveness feed parameters.
#[cw_serde]
pub struct SequencerConfig {
    pub feed: Addr,
    pub grace_secs: u64,
}

// ============================================================================
// Withdrawal Authorization State
// ============================================================================

/// External signer state. `nonce` increases by exactly 1 per successful
/// signature-authorized withdrawal and is the sole replay defense.
#[cw_serde]
pub struct TssState {
    /// Ethereum address the signature must recover to
    pub eth_address: [u8; 20],
    /// Chain id embedded in every signed message
    pub chain_id: u64,
    /// Next expected nonce
    pub nonce: u64,
}

// ============================================================================
// Swap-Lane In-Flight State
// ============================================================================

/// Which records to emit once the swap lane settles.
#[cw_serde]
pub enum PendingRoute {
    /// Capped gas lane, with or without a payload.
    Gas {
        payload: Option<crate::msg::UniversalPayload>,
    },
}

/// Context for a deposit whose swap/unwrap sub-messages are in flight.
/// Present only mid-call; doubles as the mutual-exclusion guard for the
/// admission family of entry points.
#[cw_serde]
pub struct PendingSwap {
    pub sender: Addr,
    pub route: PendingRoute,
    pub revert: crate::msg::RevertSettings,
    pub min_native_out: Uint128,
    /// Input token and amount, kept for the allowance revoke
    pub token_in: Addr,
    pub amount_in: Uint128,
    /// Wrapper balance before the swap was dispatched
    pub wrapper_balance_before: Uint128,
    /// Native bank balance before the unwrap was dispatched
    pub native_balance_before: Uint128,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:universal-gateway";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = "1.0.0";

/// 7 days in seconds for admin change timelock
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Hard floor for TWAP windows
pub const MIN_TWAP_WINDOW_SECS: u64 = 300;

/// Default TWAP window when none is configured
pub const DEFAULT_TWAP_WINDOW_SECS: u64 = 1_800;

// ============================================================================
// Storage
// ============================================================================

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pending admin proposal (if any)
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");

/// Live price source configuration
pub const PRICE_CONFIG: Item<PriceConfig> = Item::new("price_config");

/// External signer state (present iff authority is `ExternalSigner`)
pub const TSS: Item<TssState> = Item::new("tss");

/// Funds-lane token whitelist
/// Key: CW20 address, Value: supported
pub const WHITELIST: Map<&Addr, bool> = Map::new("whitelist");

/// In-flight swap-lane deposit (mutual-exclusion guard)
pub const PENDING_SWAP: Item<PendingSwap> = Item::new("pending_swap");
