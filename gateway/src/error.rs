//! Error types for the Universal Gateway contract.
//!
//! Every variant maps to one failure class: configuration, oracle, caps,
//! swap, deposit validation, or authorization. Authorization failures get
//! their own variants so they are distinguishable from ordinary validation
//! errors in transaction results.

use cosmwasm_std::{CheckedMultiplyRatioError, OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    MultiplyRatio(#[from] CheckedMultiplyRatioError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only pauser or admin can pause")]
    UnauthorizedPauser,

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    #[error("Invalid cap range: min {min} exceeds max {max}")]
    InvalidCapRange { min: Uint128, max: Uint128 },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid fee tiers: {reason}")]
    InvalidFeeTiers { reason: String },

    #[error("Invalid price config: {reason}")]
    InvalidPriceConfig { reason: String },

    #[error("Invalid swap config: {reason}")]
    InvalidSwapConfig { reason: String },

    #[error("Invalid length for {field}: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: String,
        expected: usize,
        got: usize,
    },

    // ========================================================================
    // Gateway State Errors
    // ========================================================================

    #[error("Gateway is paused")]
    GatewayPaused,

    #[error("Reentrant call: a swap deposit is already in flight")]
    ReentrantCall,

    #[error("Invalid funds: {reason}")]
    InvalidFunds { reason: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // ========================================================================
    // Oracle Errors
    // ========================================================================

    #[error("Insufficient observation history: current {current}, next {next}, required {required}")]
    InsufficientHistory {
        current: u16,
        next: u16,
        required: u16,
    },

    #[error("Pool does not pair the native wrapper with the configured counter asset")]
    InvalidPoolConfig,

    #[error("Computed price is zero")]
    NoValidPrice,

    #[error("Invalid feed answer")]
    InvalidAnswer,

    #[error("Stale price: {age_seconds}s old, limit {stale_after_seconds}s")]
    StalePrice {
        age_seconds: u64,
        stale_after_seconds: u64,
    },

    #[error("Sequencer is down")]
    SequencerDown,

    #[error("Sequencer restarted {up_for_seconds}s ago, still within the {grace_seconds}s grace window")]
    SequencerGracePeriod {
        up_for_seconds: u64,
        grace_seconds: u64,
    },

    // ========================================================================
    // Cap Violations
    // ========================================================================

    #[error("Amount below minimum cap: ${usd_value} < ${min_cap} (1e18 fixed)")]
    AmountBelowMin { usd_value: Uint128, min_cap: Uint128 },

    #[error("Amount above maximum cap: ${usd_value} > ${max_cap} (1e18 fixed)")]
    AmountAboveMax { usd_value: Uint128, max_cap: Uint128 },

    // ========================================================================
    // Swap Errors
    // ========================================================================

    #[error("No pool found for token {token} against the native wrapper")]
    NoPoolFound { token: String },

    #[error("Slippage exceeded: received {received}, minimum {min_out}")]
    SlippageExceeded {
        received: Uint128,
        min_out: Uint128,
    },

    #[error("Deadline expired: {deadline} <= {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("No pending swap for reply id {id}")]
    UnknownReply { id: u64 },

    // ========================================================================
    // Deposit Validation Errors
    // ========================================================================

    #[error("Token not whitelisted: {token}")]
    TokenNotWhitelisted { token: String },

    #[error("Recipient required for pure funds transfers")]
    RecipientRequired,

    #[error("Empty payload for a payload-carrying transaction type")]
    EmptyPayload,

    #[error("Invalid revert config: {reason}")]
    InvalidRevertConfig { reason: String },

    // ========================================================================
    // Authorization Errors (security-sensitive)
    // ========================================================================

    #[error("Unauthorized: only the configured withdrawer can withdraw")]
    UnauthorizedWithdrawer,

    #[error("External signer state not initialized")]
    TssNotInitialized,

    #[error("Withdrawal signature required for external-signer deployments")]
    MissingSignature,

    #[error("Invalid signature: recovered signer does not match")]
    InvalidSignature,

    #[error("Message hash mismatch")]
    MessageHashMismatch,

    #[error("Nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },

    #[error("Chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch { expected: u64, got: u64 },
}
