//! Withdrawal and refund routes.
//!
//! Two authorization strategies, chosen per deployment: a local withdrawer
//! role, or an external ECDSA signer whose signatures are replay-protected
//! by a strictly increasing nonce. For signature-authorized calls the nonce
//! increment is persisted before any transfer message is appended, so a
//! failed transfer can never leave a spent signature reusable.

use cosmwasm_std::{Addr, Deps, DepsMut, Env, Event, MessageInfo, Response, Uint128};

use common::{Asset, AssetInfo};

use crate::auth::{self, WithdrawKind};
use crate::error::ContractError;
use crate::msg::{RevertSettings, TssAuth};
use crate::state::{Config, WithdrawAuthority, CONFIG, PENDING_SWAP, TSS, WHITELIST};

/// Release native funds from the vault to an explicit recipient.
pub fn execute_withdraw(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
    auth: Option<TssAuth>,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let recipient = deps.api.addr_validate(&recipient)?;

    let nonce = authorize(
        deps,
        &info,
        &config,
        WithdrawKind::Native,
        amount,
        recipient.as_bytes(),
        auth.as_ref(),
    )?;

    let asset = Asset::new(AssetInfo::native(&config.native_denom), amount);
    settle("withdraw", WithdrawKind::Native, asset, &recipient, nonce)
}

/// Release CW20 funds from the vault to an explicit recipient.
pub fn execute_withdraw_token(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    token: String,
    recipient: String,
    amount: Uint128,
    auth: Option<TssAuth>,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let token = deps.api.addr_validate(&token)?;
    let recipient = deps.api.addr_validate(&recipient)?;
    ensure_whitelisted(deps.as_ref(), &token)?;

    let nonce = authorize(
        deps,
        &info,
        &config,
        WithdrawKind::Token,
        amount,
        token.as_bytes(),
        auth.as_ref(),
    )?;

    let asset = Asset::new(AssetInfo::cw20(token), amount);
    settle("withdraw_token", WithdrawKind::Token, asset, &recipient, nonce)
}

/// Refund native funds to a failed deposit's revert recipient.
pub fn execute_revert_withdraw(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    amount: Uint128,
    revert: RevertSettings,
    auth: Option<TssAuth>,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let recipient = validated_fund_recipient(deps.as_ref(), &revert)?;

    let nonce = authorize(
        deps,
        &info,
        &config,
        WithdrawKind::RevertNative,
        amount,
        recipient.as_bytes(),
        auth.as_ref(),
    )?;

    let asset = Asset::new(AssetInfo::native(&config.native_denom), amount);
    settle(
        "revert_withdraw",
        WithdrawKind::RevertNative,
        asset,
        &recipient,
        nonce,
    )
}

/// Refund CW20 funds to a failed deposit's revert recipient.
pub fn execute_revert_withdraw_token(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    revert: RevertSettings,
    auth: Option<TssAuth>,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let token = deps.api.addr_validate(&token)?;
    let recipient = validated_fund_recipient(deps.as_ref(), &revert)?;
    ensure_whitelisted(deps.as_ref(), &token)?;

    let nonce = authorize(
        deps,
        &info,
        &config,
        WithdrawKind::RevertToken,
        amount,
        token.as_bytes(),
        auth.as_ref(),
    )?;

    let asset = Asset::new(AssetInfo::cw20(token), amount);
    settle(
        "revert_withdraw_token",
        WithdrawKind::RevertToken,
        asset,
        &recipient,
        nonce,
    )
}

// ============================================================================
// Authorization
// ============================================================================

/// Authorize a withdrawal under the configured strategy.
///
/// Local-role deployments check the caller and ignore any attached
/// signature material. External-signer deployments verify the signature and
/// persist the nonce increment immediately, before the caller appends any
/// transfer message. Returns the nonce consumed, if any.
fn authorize(
    deps: DepsMut,
    info: &MessageInfo,
    config: &Config,
    kind: WithdrawKind,
    amount: Uint128,
    tail: &[u8],
    auth: Option<&TssAuth>,
) -> Result<Option<u64>, ContractError> {
    match &config.withdraw_authority {
        WithdrawAuthority::LocalRole { withdrawer } => {
            if info.sender != *withdrawer {
                return Err(ContractError::UnauthorizedWithdrawer);
            }
            Ok(None)
        }
        WithdrawAuthority::ExternalSigner => {
            let auth = auth.ok_or(ContractError::MissingSignature)?;
            let mut tss = TSS.load(deps.storage)?;
            auth::verify_tss(deps.api, &tss, kind, amount.u128(), tail, auth)?;

            // Nonce burns before funds move
            let consumed = tss.nonce;
            tss.nonce += 1;
            TSS.save(deps.storage, &tss)?;
            Ok(Some(consumed))
        }
    }
}

// ============================================================================
// Settlement
// ============================================================================

fn settle(
    action: &str,
    kind: WithdrawKind,
    asset: Asset,
    recipient: &Addr,
    nonce: Option<u64>,
) -> Result<Response, ContractError> {
    let mut event = Event::new("universal_withdraw")
        .add_attribute("kind", kind_str(kind))
        .add_attribute("recipient", recipient)
        .add_attribute("asset", asset.info.id())
        .add_attribute("amount", asset.amount.to_string());
    if let Some(nonce) = nonce {
        event = event.add_attribute("nonce", nonce.to_string());
    }

    Ok(Response::new()
        .add_message(asset.transfer_msg(recipient)?)
        .add_event(event)
        .add_attribute("action", action)
        .add_attribute("recipient", recipient)
        .add_attribute("amount", asset.amount.to_string()))
}

fn kind_str(kind: WithdrawKind) -> &'static str {
    match kind {
        WithdrawKind::Native => "native",
        WithdrawKind::Token => "token",
        WithdrawKind::RevertNative => "revert_native",
        WithdrawKind::RevertToken => "revert_token",
    }
}

// ============================================================================
// Guards
// ============================================================================

fn load_open_config(deps: Deps) -> Result<Config, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::GatewayPaused);
    }
    if PENDING_SWAP.may_load(deps.storage)?.is_some() {
        return Err(ContractError::ReentrantCall);
    }
    Ok(config)
}

fn ensure_whitelisted(deps: Deps, token: &Addr) -> Result<(), ContractError> {
    let supported = WHITELIST.may_load(deps.storage, token)?.unwrap_or(false);
    if !supported {
        return Err(ContractError::TokenNotWhitelisted {
            token: token.to_string(),
        });
    }
    Ok(())
}

fn validated_fund_recipient(deps: Deps, revert: &RevertSettings) -> Result<Addr, ContractError> {
    if revert.fund_recipient.is_empty() {
        return Err(ContractError::InvalidRevertConfig {
            reason: "fund recipient must be set".to_string(),
        });
    }
    deps.api
        .addr_validate(&revert.fund_recipient)
        .map_err(|_| ContractError::InvalidRevertConfig {
            reason: format!("invalid fund recipient: {}", revert.fund_recipient),
        })
}
