//! Message types for the Universal Gateway contract.
//!
//! This module defines instantiation, execution, and query messages, the
//! cross-chain payload types shared with relayers, and the query/execute
//! interfaces of the black-box price and swap backends.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Int128, Uint128};

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Pauser address (may pause; only admin unpauses)
    pub pauser: String,
    /// Withdrawal authorization strategy
    pub withdraw_authority: WithdrawAuthorityMsg,
    /// Minimum USD cap for fast-lane deposits (1e18 = $1)
    pub min_cap_usd: Uint128,
    /// Maximum USD cap for fast-lane deposits (1e18 = $1)
    pub max_cap_usd: Uint128,
    /// Bank denom of the chain's native asset
    pub native_denom: String,
    /// Decimals of the native asset
    pub native_decimals: u8,
    /// CW20 contract wrapping the native asset 1:1
    pub native_wrapper: String,
    /// Swap router contract
    pub swap_router: String,
    /// Pool factory contract
    pub swap_factory: String,
    /// Ordered fee tiers to search for pools (e.g. [500, 3000, 10000])
    pub fee_tiers: Vec<u32>,
    /// Deadline window substituted when a swap caller passes deadline = 0
    pub default_swap_deadline_secs: u64,
    /// Price source configuration
    pub price_config: PriceConfigMsg,
    /// External signer setup (required for `ExternalSigner` authority)
    pub tss: Option<TssSetupMsg>,
}

/// Withdrawal authorization strategy, chosen per deployment.
#[cw_serde]
pub enum WithdrawAuthorityMsg {
    /// Caller must be this local address.
    LocalRole { withdrawer: String },
    /// Calls carry an ECDSA signature from the configured external signer.
    ExternalSigner {},
}

/// External signer (TSS) parameters.
#[cw_serde]
pub struct TssSetupMsg {
    /// Ethereum address of the signer, 0x-prefixed hex
    pub eth_address: String,
    /// Chain id embedded in every signed withdrawal message
    pub chain_id: u64,
}

/// Price source selection. Exactly one variant is live per deployment
/// generation; switching is an explicit admin action.
#[cw_serde]
pub enum PriceConfigMsg {
    Twap {
        /// Pool pairing the native wrapper with the counter asset
        pool: String,
        /// USD-stable counter asset (CW20)
        counter_asset: String,
        /// Decimals of the counter asset (must be <= 18)
        counter_decimals: u8,
        /// TWAP window in seconds (minimum 300; None = default 1800)
        window_secs: Option<u64>,
        /// Minimum observation cardinality required of the pool
        min_cardinality: u16,
    },
    Feed {
        /// Push-style aggregator feed contract
        feed: String,
        /// Decimals of the feed answer (must be <= 18)
        feed_decimals: u8,
        /// Maximum allowed age of the answer; 0 disables the check
        stale_after_secs: u64,
        /// Rollup sequencer liveness feed, if deployed on a rollup
        sequencer: Option<SequencerConfigMsg>,
    },
}

/// Sequencer liveness feed parameters (rollup deployments only).
#[cw_serde]
pub struct SequencerConfigMsg {
    pub feed: String,
    pub grace_secs: u64,
}

// ============================================================================
// Cross-Chain Payload Types
// ============================================================================

/// Transaction types, mirrored on every chain the gateway runs on.
#[cw_serde]
#[derive(Copy)]
pub enum TxType {
    /// Fund the sender's counterpart identity with gas only (capped lane).
    Gas,
    /// Fund gas and execute a payload instantly (capped lane).
    GasAndPayload,
    /// Move high-value funds only; no payload, no caps, explicit recipient.
    Funds,
    /// Move funds and a payload; recipient is the sender's counterpart.
    FundsAndPayload,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Gas => "gas",
            TxType::GasAndPayload => "gas_and_payload",
            TxType::Funds => "funds",
            TxType::FundsAndPayload => "funds_and_payload",
        }
    }

    /// Whether records of this type carry a payload (and therefore may omit
    /// an explicit recipient).
    pub fn carries_payload(&self) -> bool {
        matches!(self, TxType::GasAndPayload | TxType::FundsAndPayload)
    }
}

/// How the destination chain verifies payload execution.
#[cw_serde]
#[derive(Copy)]
pub enum VerificationKind {
    SignedVerification,
    UniversalTxVerification,
}

/// Opaque instruction forwarded to the destination chain. The gateway never
/// interprets `data`; it only hashes or forwards it.
#[cw_serde]
pub struct UniversalPayload {
    pub to: String,
    pub value: Uint128,
    pub data: Binary,
    pub gas_limit: u64,
    pub max_fee_per_gas: Uint128,
    pub max_priority_fee_per_gas: Uint128,
    pub nonce: u64,
    pub deadline: u64,
    pub verification: VerificationKind,
}

/// Where refunded value goes if destination-side execution fails.
#[cw_serde]
pub struct RevertSettings {
    pub fund_recipient: String,
    pub revert_msg: Binary,
}

/// Signature material for external-signer withdrawals.
#[cw_serde]
pub struct TssAuth {
    /// 64-byte compact secp256k1 signature
    pub signature: Binary,
    /// Recovery id (0 or 1)
    pub recovery_id: u8,
    /// keccak-256 of the canonical withdrawal message
    pub message_hash: Binary,
    /// Expected current nonce
    pub nonce: u64,
    /// Chain id the signature was produced for
    pub chain_id: u64,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Deposits (native coin attached)
    // ========================================================================
    /// Fund the sender's counterpart with gas. Capped lane.
    SendGas { revert: RevertSettings },

    /// Fund gas and carry a payload for instant execution. Capped lane.
    SendTxWithGas {
        payload: UniversalPayload,
        revert: RevertSettings,
    },

    /// Move native funds to an explicit recipient. Uncapped slow lane.
    SendFundsNative {
        recipient: String,
        revert: RevertSettings,
    },

    /// Combined gas + funds + payload in one deposit. The attached coin is
    /// split: `gas_amount` takes the capped gas leg, the remainder the funds
    /// leg.
    SendTxWithFundsNative {
        payload: UniversalPayload,
        revert: RevertSettings,
        gas_amount: Uint128,
    },

    /// CW20 deposits arrive through the receiver hook with a `ReceiveMsg`.
    Receive(cw20::Cw20ReceiveMsg),

    // ========================================================================
    // Withdrawals
    // ========================================================================
    /// Withdraw native funds to `recipient`.
    Withdraw {
        recipient: String,
        amount: Uint128,
        auth: Option<TssAuth>,
    },

    /// Withdraw CW20 funds to `recipient`.
    WithdrawToken {
        token: String,
        recipient: String,
        amount: Uint128,
        auth: Option<TssAuth>,
    },

    /// Refund native funds to the deposit's revert recipient.
    RevertWithdraw {
        amount: Uint128,
        revert: RevertSettings,
        auth: Option<TssAuth>,
    },

    /// Refund CW20 funds to the deposit's revert recipient.
    RevertWithdrawToken {
        token: String,
        amount: Uint128,
        revert: RevertSettings,
        auth: Option<TssAuth>,
    },

    // ========================================================================
    // Admin
    // ========================================================================
    /// Set the USD cap window. Rejects `min > max`.
    SetCaps {
        min_cap_usd: Uint128,
        max_cap_usd: Uint128,
    },

    /// Swap the live price source variant. Never silent: attributes carry
    /// the old and new variants.
    SetPriceConfig { config: PriceConfigMsg },

    /// Replace the ordered fee-tier search list.
    SetFeeTiers { fee_tiers: Vec<u32> },

    /// Add or remove a token from the funds-lane whitelist.
    SetWhitelist { token: String, supported: bool },

    /// Update swap router/factory handles and the default deadline window.
    SetSwapConfig {
        router: String,
        factory: String,
        default_deadline_secs: u64,
    },

    /// Rotate the external signer address and/or chain id.
    UpdateTss { eth_address: String, chain_id: u64 },

    /// Reset the withdrawal nonce (recovery only).
    ResetNonce { nonce: u64 },

    /// Switch the withdrawal authorization strategy.
    SetWithdrawAuthority { authority: WithdrawAuthorityMsg },

    /// Propose a new admin (two-step, timelocked).
    ProposeAdmin { new_admin: String },

    /// Accept a pending admin proposal after the timelock.
    AcceptAdmin {},

    /// Cancel a pending admin proposal.
    CancelAdminProposal {},

    /// Pause all deposit and withdrawal routes. Pauser or admin.
    Pause {},

    /// Unpause. Admin only.
    Unpause {},
}

/// Hook messages embedded in `Cw20ReceiveMsg::msg`.
#[cw_serde]
pub enum ReceiveMsg {
    /// Move CW20 funds to an explicit recipient. Uncapped slow lane;
    /// whitelist enforced.
    SendFunds {
        recipient: String,
        revert: RevertSettings,
    },

    /// Move CW20 funds plus a payload. Whitelist enforced; recipient is the
    /// sender's counterpart identity.
    SendTxWithFunds {
        payload: UniversalPayload,
        revert: RevertSettings,
    },

    /// Swap the sent token to native and run the capped gas lane on the
    /// proceeds. `deadline = 0` substitutes the configured default window.
    SwapAndSendGas {
        payload: Option<UniversalPayload>,
        revert: RevertSettings,
        min_native_out: Uint128,
        deadline: u64,
    },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(PriceConfigResponse)]
    PriceConfig {},

    /// Current normalized price reading (runs the full oracle validation).
    #[returns(PriceResponse)]
    Price {},

    /// USD value of a native amount and whether it passes the caps.
    #[returns(CheckCapsResponse)]
    CheckCaps { amount: Uint128 },

    /// Native amounts corresponding to the cap bounds at the current price.
    /// Integer division rounds inward; the true boundary may be tighter.
    #[returns(MinMaxNativeResponse)]
    MinMaxNative {},

    #[returns(WhitelistResponse)]
    Whitelist { token: String },

    #[returns(TssStateResponse)]
    TssState {},

    /// Preview the canonical message hash an off-chain signer must sign.
    #[returns(WithdrawMessageHashResponse)]
    WithdrawMessageHash {
        kind: WithdrawKindMsg,
        amount: Uint128,
        /// Recipient address (native kinds) or token contract (token kinds)
        recipient_or_token: String,
        nonce: u64,
    },

    #[returns(PausedResponse)]
    Paused {},
}

/// Withdrawal instruction kinds, for hash preview queries.
#[cw_serde]
#[derive(Copy)]
pub enum WithdrawKindMsg {
    Native,
    Token,
    RevertNative,
    RevertToken,
}

#[cw_serde]
pub struct ConfigResponse {
    pub admin: String,
    pub pauser: String,
    pub paused: bool,
    pub min_cap_usd: Uint128,
    pub max_cap_usd: Uint128,
    pub native_denom: String,
    pub native_decimals: u8,
    pub native_wrapper: String,
    pub swap_router: String,
    pub swap_factory: String,
    pub fee_tiers: Vec<u32>,
    pub default_swap_deadline_secs: u64,
    pub withdraw_authority: String,
}

#[cw_serde]
pub enum PriceConfigResponse {
    Twap {
        pool: String,
        counter_asset: String,
        counter_decimals: u8,
        window_secs: u64,
        min_cardinality: u16,
    },
    Feed {
        feed: String,
        feed_decimals: u8,
        stale_after_secs: u64,
        sequencer_feed: Option<String>,
        sequencer_grace_secs: Option<u64>,
    },
}

#[cw_serde]
pub struct PriceResponse {
    /// USD per whole native unit, 1e18 fixed point
    pub usd_per_native: Uint128,
    /// Decimal count of the upstream source before normalization
    pub source_decimals: u8,
}

#[cw_serde]
pub struct CheckCapsResponse {
    pub usd_value: Uint128,
    pub accepted: bool,
}

#[cw_serde]
pub struct MinMaxNativeResponse {
    pub min_native: Uint128,
    pub max_native: Uint128,
}

#[cw_serde]
pub struct WhitelistResponse {
    pub supported: bool,
}

#[cw_serde]
pub struct TssStateResponse {
    /// 0x-prefixed hex
    pub eth_address: String,
    pub chain_id: u64,
    pub nonce: u64,
}

#[cw_serde]
pub struct WithdrawMessageHashResponse {
    /// 0x-prefixed hex of the keccak-256 message hash
    pub message_hash: String,
}

#[cw_serde]
pub struct PausedResponse {
    pub paused: bool,
}

// ============================================================================
// Backend Interfaces (black-box collaborators, mocked in tests)
// ============================================================================

/// Push-feed / sequencer-feed query surface.
#[cw_serde]
pub enum FeedQueryMsg {
    LatestRoundData {},
}

/// One aggregator round. For sequencer feeds, `answer == 0` means up.
#[cw_serde]
pub struct RoundDataResponse {
    pub round_id: u64,
    pub answer: Int128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

/// TWAP pool query surface.
#[cw_serde]
pub enum PoolQueryMsg {
    Metadata {},
    /// Arithmetic mean tick over the trailing `secs` window.
    Consult { secs: u64 },
}

#[cw_serde]
pub struct PoolMetadataResponse {
    pub token0: String,
    pub token1: String,
    pub observation_cardinality: u16,
    pub observation_cardinality_next: u16,
}

#[cw_serde]
pub struct ConsultResponse {
    pub arithmetic_mean_tick: i32,
}

/// Pool factory query surface.
#[cw_serde]
pub enum FactoryQueryMsg {
    Pool {
        token_a: String,
        token_b: String,
        fee: u32,
    },
}

#[cw_serde]
pub struct FactoryPoolResponse {
    pub pool: Option<String>,
}

/// Swap router surfaces. The router pulls `amount_in` of `token_in` from the
/// caller via its one-shot allowance.
#[cw_serde]
pub enum RouterExecuteMsg {
    SwapExactInputSingle {
        token_in: String,
        token_out: String,
        fee: u32,
        recipient: String,
        deadline: u64,
        amount_in: Uint128,
        amount_out_minimum: Uint128,
    },
}

#[cw_serde]
pub enum RouterQueryMsg {
    Quote {
        token_in: String,
        token_out: String,
        fee: u32,
        amount_in: Uint128,
    },
}

#[cw_serde]
pub struct QuoteResponse {
    pub amount_out: Uint128,
}

/// Native wrapper execute surface (beyond the standard cw20 interface).
#[cw_serde]
pub enum WrapperExecuteMsg {
    /// Burn wrapped tokens and send the equivalent native coin 1:1.
    Withdraw { amount: Uint128 },
}
