//! Query handlers.

use cosmwasm_std::{Deps, Env, StdResult, Uint128};

use crate::auth::{self, WithdrawKind};
use crate::caps;
use crate::error::ContractError;
use crate::msg::{
    CheckCapsResponse, ConfigResponse, MinMaxNativeResponse, PausedResponse, PriceConfigResponse,
    PriceResponse, TssStateResponse, WhitelistResponse, WithdrawKindMsg,
    WithdrawMessageHashResponse,
};
use crate::oracle;
use crate::state::{PriceConfig, WithdrawAuthority, CONFIG, PRICE_CONFIG, TSS, WHITELIST};

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin.to_string(),
        pauser: config.pauser.to_string(),
        paused: config.paused,
        min_cap_usd: config.min_cap_usd,
        max_cap_usd: config.max_cap_usd,
        native_denom: config.native_denom,
        native_decimals: config.native_decimals,
        native_wrapper: config.native_wrapper.to_string(),
        swap_router: config.swap_router.to_string(),
        swap_factory: config.swap_factory.to_string(),
        fee_tiers: config.fee_tiers,
        default_swap_deadline_secs: config.default_swap_deadline_secs,
        withdraw_authority: match config.withdraw_authority {
            WithdrawAuthority::LocalRole { .. } => "local_role".to_string(),
            WithdrawAuthority::ExternalSigner => "external_signer".to_string(),
        },
    })
}

pub fn query_price_config(deps: Deps) -> StdResult<PriceConfigResponse> {
    Ok(match PRICE_CONFIG.load(deps.storage)? {
        PriceConfig::Twap {
            pool,
            counter_asset,
            counter_decimals,
            window_secs,
            min_cardinality,
        } => PriceConfigResponse::Twap {
            pool: pool.to_string(),
            counter_asset: counter_asset.to_string(),
            counter_decimals,
            window_secs,
            min_cardinality,
        },
        PriceConfig::Feed {
            feed,
            feed_decimals,
            stale_after_secs,
            sequencer,
        } => PriceConfigResponse::Feed {
            feed: feed.to_string(),
            feed_decimals,
            stale_after_secs,
            sequencer_feed: sequencer.as_ref().map(|s| s.feed.to_string()),
            sequencer_grace_secs: sequencer.map(|s| s.grace_secs),
        },
    })
}

/// Runs the full oracle validation path, so a stale feed or a down
/// sequencer surfaces here exactly as it would on a deposit.
pub fn query_price(deps: Deps, env: &Env) -> Result<PriceResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let reading = oracle::price(deps, env, &config)?;
    Ok(PriceResponse {
        usd_per_native: reading.usd_per_native,
        source_decimals: reading.source_decimals,
    })
}

pub fn query_check_caps(
    deps: Deps,
    env: &Env,
    amount: Uint128,
) -> Result<CheckCapsResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let price = oracle::price(deps, env, &config)?;
    let usd_value = caps::usd_value(amount, config.native_decimals, &price)?;
    let accepted = usd_value >= config.min_cap_usd && usd_value <= config.max_cap_usd;
    Ok(CheckCapsResponse {
        usd_value,
        accepted,
    })
}

pub fn query_min_max_native(deps: Deps, env: &Env) -> Result<MinMaxNativeResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let price = oracle::price(deps, env, &config)?;
    let (min_native, max_native) = caps::min_max_native(&config, &price)?;
    Ok(MinMaxNativeResponse {
        min_native,
        max_native,
    })
}

pub fn query_whitelist(deps: Deps, token: String) -> StdResult<WhitelistResponse> {
    let token = deps.api.addr_validate(&token)?;
    let supported = WHITELIST.may_load(deps.storage, &token)?.unwrap_or(false);
    Ok(WhitelistResponse { supported })
}

pub fn query_tss_state(deps: Deps) -> Result<TssStateResponse, ContractError> {
    let tss = TSS.may_load(deps.storage)?.ok_or(ContractError::TssNotInitialized)?;
    Ok(TssStateResponse {
        eth_address: auth::eth_address_to_hex(&tss.eth_address),
        chain_id: tss.chain_id,
        nonce: tss.nonce,
    })
}

/// Hash preview for off-chain signers. The chain id comes from stored signer
/// state; the nonce is caller-supplied so signatures can be prepared ahead.
pub fn query_withdraw_message_hash(
    deps: Deps,
    kind: WithdrawKindMsg,
    amount: Uint128,
    recipient_or_token: String,
    nonce: u64,
) -> Result<WithdrawMessageHashResponse, ContractError> {
    let tss = TSS.may_load(deps.storage)?.ok_or(ContractError::TssNotInitialized)?;
    // Must match the canonicalization on the execute path
    let subject = deps.api.addr_validate(&recipient_or_token)?;
    let hash = auth::withdraw_message_hash(
        WithdrawKind::from(kind),
        tss.chain_id,
        nonce,
        amount.u128(),
        subject.as_bytes(),
    );
    Ok(WithdrawMessageHashResponse {
        message_hash: format!("0x{}", hex::encode(hash)),
    })
}

pub fn query_paused(deps: Deps) -> StdResult<PausedResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(PausedResponse {
        paused: config.paused,
    })
}
