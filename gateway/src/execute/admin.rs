//! Admin-gated configuration handlers.
//!
//! Admin rotation is two-step with a 7-day timelock. Pausing is available to
//! the dedicated pauser as well as the admin, but only the admin unpauses.

use cosmwasm_std::{Deps, DepsMut, Env, MessageInfo, Response, Uint128};

use crate::auth::{eth_address_to_hex, parse_eth_address};
use crate::error::ContractError;
use crate::msg::{PriceConfigMsg, WithdrawAuthorityMsg};
use crate::state::{
    Config, PendingAdmin, PriceConfig, SequencerConfig, WithdrawAuthority, ADMIN_TIMELOCK_DURATION,
    CONFIG, DEFAULT_TWAP_WINDOW_SECS, MIN_TWAP_WINDOW_SECS, PENDING_ADMIN, PRICE_CONFIG, TSS,
    WHITELIST,
};

// ============================================================================
// Caps & Price Source
// ============================================================================

pub fn execute_set_caps(
    deps: DepsMut,
    info: MessageInfo,
    min_cap_usd: Uint128,
    max_cap_usd: Uint128,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    if min_cap_usd > max_cap_usd {
        return Err(ContractError::InvalidCapRange {
            min: min_cap_usd,
            max: max_cap_usd,
        });
    }

    config.min_cap_usd = min_cap_usd;
    config.max_cap_usd = max_cap_usd;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_caps")
        .add_attribute("min_cap_usd", min_cap_usd.to_string())
        .add_attribute("max_cap_usd", max_cap_usd.to_string()))
}

/// Swap the live price source. The transition is logged with both variants
/// so a source change is never silent in the transaction record.
pub fn execute_set_price_config(
    deps: DepsMut,
    info: MessageInfo,
    msg: PriceConfigMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    let old = PRICE_CONFIG.load(deps.storage)?;
    let new = validate_price_config(deps.as_ref(), msg)?;
    PRICE_CONFIG.save(deps.storage, &new)?;

    Ok(Response::new()
        .add_attribute("action", "set_price_config")
        .add_attribute("old_source", price_variant(&old))
        .add_attribute("new_source", price_variant(&new)))
}

/// Validate and resolve a price source message into stored config.
pub fn validate_price_config(
    deps: Deps,
    msg: PriceConfigMsg,
) -> Result<PriceConfig, ContractError> {
    match msg {
        PriceConfigMsg::Twap {
            pool,
            counter_asset,
            counter_decimals,
            window_secs,
            min_cardinality,
        } => {
            let window_secs = window_secs.unwrap_or(DEFAULT_TWAP_WINDOW_SECS);
            if window_secs < MIN_TWAP_WINDOW_SECS {
                return Err(ContractError::InvalidPriceConfig {
                    reason: format!(
                        "twap window {window_secs}s below minimum {MIN_TWAP_WINDOW_SECS}s"
                    ),
                });
            }
            if counter_decimals > 18 {
                return Err(ContractError::InvalidPriceConfig {
                    reason: format!("counter decimals {counter_decimals} exceed 18"),
                });
            }
            if min_cardinality == 0 {
                return Err(ContractError::InvalidPriceConfig {
                    reason: "minimum cardinality must be at least 1".to_string(),
                });
            }
            Ok(PriceConfig::Twap {
                pool: deps.api.addr_validate(&pool)?,
                counter_asset: deps.api.addr_validate(&counter_asset)?,
                counter_decimals,
                window_secs,
                min_cardinality,
            })
        }
        PriceConfigMsg::Feed {
            feed,
            feed_decimals,
            stale_after_secs,
            sequencer,
        } => {
            if feed_decimals > 18 {
                return Err(ContractError::InvalidPriceConfig {
                    reason: format!("feed decimals {feed_decimals} exceed 18"),
                });
            }
            let sequencer = sequencer
                .map(|s| {
                    Ok::<_, ContractError>(SequencerConfig {
                        feed: deps.api.addr_validate(&s.feed)?,
                        grace_secs: s.grace_secs,
                    })
                })
                .transpose()?;
            Ok(PriceConfig::Feed {
                feed: deps.api.addr_validate(&feed)?,
                feed_decimals,
                stale_after_secs,
                sequencer,
            })
        }
    }
}

fn price_variant(config: &PriceConfig) -> &'static str {
    match config {
        PriceConfig::Twap { .. } => "twap",
        PriceConfig::Feed { .. } => "feed",
    }
}

// ============================================================================
// Swap Configuration
// ============================================================================

pub fn execute_set_fee_tiers(
    deps: DepsMut,
    info: MessageInfo,
    fee_tiers: Vec<u32>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    validate_fee_tiers(&fee_tiers)?;
    config.fee_tiers = fee_tiers.clone();
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_fee_tiers")
        .add_attribute(
            "fee_tiers",
            fee_tiers
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ))
}

/// Fee tiers must be non-empty and free of duplicates; order is the search
/// order and is preserved as given.
pub fn validate_fee_tiers(fee_tiers: &[u32]) -> Result<(), ContractError> {
    if fee_tiers.is_empty() {
        return Err(ContractError::InvalidFeeTiers {
            reason: "at least one fee tier required".to_string(),
        });
    }
    let mut seen = fee_tiers.to_vec();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != fee_tiers.len() {
        return Err(ContractError::InvalidFeeTiers {
            reason: "duplicate fee tiers".to_string(),
        });
    }
    Ok(())
}

pub fn execute_set_whitelist(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    supported: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    let token = deps.api.addr_validate(&token)?;
    WHITELIST.save(deps.storage, &token, &supported)?;

    Ok(Response::new()
        .add_attribute("action", "set_whitelist")
        .add_attribute("token", token)
        .add_attribute("supported", supported.to_string()))
}

pub fn execute_set_swap_config(
    deps: DepsMut,
    info: MessageInfo,
    router: String,
    factory: String,
    default_deadline_secs: u64,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    if default_deadline_secs == 0 {
        return Err(ContractError::InvalidSwapConfig {
            reason: "default deadline must be nonzero".to_string(),
        });
    }
    config.swap_router = deps.api.addr_validate(&router)?;
    config.swap_factory = deps.api.addr_validate(&factory)?;
    config.default_swap_deadline_secs = default_deadline_secs;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_swap_config")
        .add_attribute("router", config.swap_router)
        .add_attribute("factory", config.swap_factory)
        .add_attribute("default_deadline_secs", default_deadline_secs.to_string()))
}

// ============================================================================
// Withdrawal Authority
// ============================================================================

pub fn execute_update_tss(
    deps: DepsMut,
    info: MessageInfo,
    eth_address: String,
    chain_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    let mut tss = TSS.load(deps.storage)?;
    let old_address = eth_address_to_hex(&tss.eth_address);
    tss.eth_address = parse_eth_address(&eth_address)?;
    tss.chain_id = chain_id;
    TSS.save(deps.storage, &tss)?;

    Ok(Response::new()
        .add_attribute("action", "update_tss")
        .add_attribute("old_eth_address", old_address)
        .add_attribute("new_eth_address", eth_address_to_hex(&tss.eth_address))
        .add_attribute("chain_id", chain_id.to_string()))
}

/// Recovery hatch for a desynchronized signer. Breaks monotonicity, so it
/// stays behind the admin gate and logs loudly.
pub fn execute_reset_nonce(
    deps: DepsMut,
    info: MessageInfo,
    nonce: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    let mut tss = TSS.load(deps.storage)?;
    let old_nonce = tss.nonce;
    tss.nonce = nonce;
    TSS.save(deps.storage, &tss)?;

    Ok(Response::new()
        .add_attribute("action", "reset_nonce")
        .add_attribute("old_nonce", old_nonce.to_string())
        .add_attribute("new_nonce", nonce.to_string()))
}

pub fn execute_set_withdraw_authority(
    deps: DepsMut,
    info: MessageInfo,
    authority: WithdrawAuthorityMsg,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    config.withdraw_authority = match authority {
        WithdrawAuthorityMsg::LocalRole { withdrawer } => WithdrawAuthority::LocalRole {
            withdrawer: deps.api.addr_validate(&withdrawer)?,
        },
        WithdrawAuthorityMsg::ExternalSigner {} => {
            // Signer state must already exist before flipping over
            if TSS.may_load(deps.storage)?.is_none() {
                return Err(ContractError::TssNotInitialized);
            }
            WithdrawAuthority::ExternalSigner
        }
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_withdraw_authority")
        .add_attribute(
            "authority",
            match &config.withdraw_authority {
                WithdrawAuthority::LocalRole { .. } => "local_role",
                WithdrawAuthority::ExternalSigner => "external_signer",
            },
        ))
}

// ============================================================================
// Admin Rotation (two-step, timelocked)
// ============================================================================

pub fn execute_propose_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    new_admin: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    let new_address = deps.api.addr_validate(&new_admin)?;
    let execute_after = env.block.time.plus_seconds(ADMIN_TIMELOCK_DURATION);
    PENDING_ADMIN.save(
        deps.storage,
        &PendingAdmin {
            new_address: new_address.clone(),
            execute_after,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "propose_admin")
        .add_attribute("new_admin", new_address)
        .add_attribute("execute_after", execute_after.seconds().to_string()))
}

pub fn execute_accept_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let pending = PENDING_ADMIN
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingAdmin)?;

    if info.sender != pending.new_address {
        return Err(ContractError::UnauthorizedPendingAdmin);
    }
    if env.block.time < pending.execute_after {
        return Err(ContractError::TimelockNotExpired {
            remaining_seconds: pending.execute_after.seconds() - env.block.time.seconds(),
        });
    }

    let mut config = CONFIG.load(deps.storage)?;
    let old_admin = config.admin.clone();
    config.admin = pending.new_address;
    CONFIG.save(deps.storage, &config)?;
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new()
        .add_attribute("action", "accept_admin")
        .add_attribute("old_admin", old_admin)
        .add_attribute("new_admin", config.admin))
}

pub fn execute_cancel_admin_proposal(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    if PENDING_ADMIN.may_load(deps.storage)?.is_none() {
        return Err(ContractError::NoPendingAdmin);
    }
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new().add_attribute("action", "cancel_admin_proposal"))
}

// ============================================================================
// Pause Control
// ============================================================================

pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.pauser && info.sender != config.admin {
        return Err(ContractError::UnauthorizedPauser);
    }

    config.paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "pause")
        .add_attribute("by", info.sender))
}

pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info)?;

    config.paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "unpause"))
}

// ============================================================================
// Guards
// ============================================================================

fn ensure_admin(config: &Config, info: &MessageInfo) -> Result<(), ContractError> {
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}
