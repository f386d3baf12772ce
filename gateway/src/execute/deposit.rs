//! Deposit admission routes.
//!
//! Four transaction types share two event shapes: gas records (capped fast
//! lane) and funds records (uncapped slow lane). Combined deposits emit the
//! gas-leg record before the funds-leg record; relayers treat the gas leg as
//! a prerequisite signal. Any invariant violation aborts the whole call, so
//! either every leg of a combined deposit lands or none does.

use cosmwasm_std::{
    from_json, to_json_binary, Addr, Deps, DepsMut, Env, Event, MessageInfo, Response, SubMsg,
    Uint128,
};
use cw20::Cw20ReceiveMsg;

use common::AssetInfo;

use crate::auth::keccak256;
use crate::caps;
use crate::error::ContractError;
use crate::msg::{ReceiveMsg, RevertSettings, TxType, UniversalPayload};
use crate::oracle;
use crate::state::{Config, PendingRoute, PendingSwap, CONFIG, PENDING_SWAP, WHITELIST};
use crate::swap;

/// Reply id for the swap leg of a token deposit.
pub const SWAP_REPLY_ID: u64 = 1;
/// Reply id for the unwrap leg of a token deposit.
pub const UNWRAP_REPLY_ID: u64 = 2;

// ============================================================================
// Native-Coin Routes
// ============================================================================

/// Gas-only deposit. Capped lane.
pub fn execute_send_gas(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    revert: RevertSettings,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let amount = one_native_coin(&info, &config)?;

    let price = oracle::price(deps.as_ref(), &env, &config)?;
    let usd = caps::check_caps(&config, amount, &price)?;

    let event = gas_record(deps.as_ref(), &info.sender, None, amount, &revert, TxType::Gas)?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "send_gas")
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount.to_string())
        .add_attribute("usd_value", usd.to_string()))
}

/// Gas plus payload for instant destination-side execution. Capped lane.
pub fn execute_send_tx_with_gas(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    payload: UniversalPayload,
    revert: RevertSettings,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let amount = one_native_coin(&info, &config)?;

    let price = oracle::price(deps.as_ref(), &env, &config)?;
    let usd = caps::check_caps(&config, amount, &price)?;

    let event = gas_record(
        deps.as_ref(),
        &info.sender,
        Some(&payload),
        amount,
        &revert,
        TxType::GasAndPayload,
    )?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "send_tx_with_gas")
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount.to_string())
        .add_attribute("usd_value", usd.to_string()))
}

/// High-value native funds to an explicit recipient. Uncapped slow lane.
pub fn execute_send_funds_native(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    recipient: String,
    revert: RevertSettings,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let amount = one_native_coin(&info, &config)?;

    let event = funds_record(
        deps.as_ref(),
        &info.sender,
        Some(recipient),
        AssetInfo::native(&config.native_denom),
        amount,
        Uint128::zero(),
        None,
        &revert,
        TxType::Funds,
    )?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "send_funds_native")
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount.to_string()))
}

/// Combined gas + funds + payload. The attached coin is split into a capped
/// gas leg and an uncapped funds leg; the gas record is emitted first.
pub fn execute_send_tx_with_funds_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    payload: UniversalPayload,
    revert: RevertSettings,
    gas_amount: Uint128,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let total = one_native_coin(&info, &config)?;

    if gas_amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "gas amount must be greater than zero".to_string(),
        });
    }
    if total <= gas_amount {
        return Err(ContractError::InvalidAmount {
            reason: format!("attached {total} does not cover gas {gas_amount} plus funds"),
        });
    }
    let funds_amount = total - gas_amount;

    let price = oracle::price(deps.as_ref(), &env, &config)?;
    caps::check_caps(&config, gas_amount, &price)?;

    // The gas leg refunds to the sender; the funds leg uses the caller's
    // revert settings
    let gas_revert = RevertSettings {
        fund_recipient: info.sender.to_string(),
        revert_msg: Default::default(),
    };
    let gas_event = gas_record(
        deps.as_ref(),
        &info.sender,
        None,
        gas_amount,
        &gas_revert,
        TxType::Gas,
    )?;
    let funds_event = funds_record(
        deps.as_ref(),
        &info.sender,
        None,
        AssetInfo::native(&config.native_denom),
        funds_amount,
        gas_amount,
        Some(&payload),
        &revert,
        TxType::FundsAndPayload,
    )?;

    Ok(Response::new()
        .add_event(gas_event)
        .add_event(funds_event)
        .add_attribute("action", "send_tx_with_funds_native")
        .add_attribute("sender", info.sender)
        .add_attribute("gas_amount", gas_amount.to_string())
        .add_attribute("funds_amount", funds_amount.to_string()))
}

// ============================================================================
// CW20 Receiver Hook
// ============================================================================

/// CW20 deposits: the sending token contract is the asset.
pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = load_open_config(deps.as_ref())?;
    let token = info.sender.clone();
    let sender = deps.api.addr_validate(&cw20_msg.sender)?;
    let amount = cw20_msg.amount;

    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "deposit amount must be greater than zero".to_string(),
        });
    }

    match from_json(&cw20_msg.msg)? {
        ReceiveMsg::SendFunds { recipient, revert } => {
            ensure_whitelisted(deps.as_ref(), &token)?;
            let event = funds_record(
                deps.as_ref(),
                &sender,
                Some(recipient),
                AssetInfo::cw20(token),
                amount,
                Uint128::zero(),
                None,
                &revert,
                TxType::Funds,
            )?;
            Ok(Response::new()
                .add_event(event)
                .add_attribute("action", "send_funds")
                .add_attribute("sender", sender)
                .add_attribute("amount", amount.to_string()))
        }
        ReceiveMsg::SendTxWithFunds { payload, revert } => {
            ensure_whitelisted(deps.as_ref(), &token)?;
            let event = funds_record(
                deps.as_ref(),
                &sender,
                None,
                AssetInfo::cw20(token),
                amount,
                Uint128::zero(),
                Some(&payload),
                &revert,
                TxType::FundsAndPayload,
            )?;
            Ok(Response::new()
                .add_event(event)
                .add_attribute("action", "send_tx_with_funds")
                .add_attribute("sender", sender)
                .add_attribute("amount", amount.to_string()))
        }
        ReceiveMsg::SwapAndSendGas {
            payload,
            revert,
            min_native_out,
            deadline,
        } => start_swap_lane(
            deps,
            env,
            config,
            token,
            sender,
            amount,
            payload,
            revert,
            min_native_out,
            deadline,
        ),
    }
}

// ============================================================================
// Swap Lane
// ============================================================================

/// Swap a deposited token into native and run the capped gas lane on the
/// proceeds. The probable output is cap-checked before any message is
/// dispatched; the actual output is cap-checked again after settlement.
#[allow(clippy::too_many_arguments)]
fn start_swap_lane(
    deps: DepsMut,
    env: Env,
    config: Config,
    token: Addr,
    sender: Addr,
    amount: Uint128,
    payload: Option<UniversalPayload>,
    revert: RevertSettings,
    min_native_out: Uint128,
    deadline: u64,
) -> Result<Response, ContractError> {
    if PENDING_SWAP.may_load(deps.storage)?.is_some() {
        return Err(ContractError::ReentrantCall);
    }

    let price = oracle::price(deps.as_ref(), &env, &config)?;
    let contract = &env.contract.address;

    if token == config.native_wrapper {
        // Unwrap-only path: lossless 1:1, but the slippage floor and both
        // cap gates still run
        caps::check_caps(&config, amount, &price)?;
        let native_before = swap::native_balance(&deps.querier, &config, contract)?;

        PENDING_SWAP.save(
            deps.storage,
            &PendingSwap {
                sender,
                route: PendingRoute::Gas { payload },
                revert,
                min_native_out,
                token_in: token,
                amount_in: amount,
                wrapper_balance_before: Uint128::zero(),
                native_balance_before: native_before,
            },
        )?;

        Ok(Response::new()
            .add_submessage(SubMsg::reply_on_success(
                swap::unwrap_msg(&config, amount)?,
                UNWRAP_REPLY_ID,
            ))
            .add_attribute("action", "swap_and_send_gas")
            .add_attribute("path", "unwrap")
            .add_attribute("amount_in", amount.to_string()))
    } else {
        let (pool, fee) = swap::find_pool(deps.as_ref(), &config, &token)?;
        let deadline = swap::resolve_deadline(&env, &config, deadline)?;

        let estimate = swap::quote_native_out(deps.as_ref(), &config, &token, fee, amount)?;
        caps::check_caps(&config, estimate, &price)?;

        let wrapper_before = swap::wrapper_balance(&deps.querier, &config, contract)?;

        PENDING_SWAP.save(
            deps.storage,
            &PendingSwap {
                sender,
                route: PendingRoute::Gas { payload },
                revert,
                min_native_out,
                token_in: token.clone(),
                amount_in: amount,
                wrapper_balance_before: wrapper_before,
                native_balance_before: Uint128::zero(),
            },
        )?;

        Ok(Response::new()
            .add_message(swap::increase_allowance_msg(&config, &token, amount)?)
            .add_submessage(SubMsg::reply_on_success(
                swap::swap_exact_input_msg(
                    &env,
                    &config,
                    &token,
                    fee,
                    amount,
                    min_native_out,
                    deadline,
                )?,
                SWAP_REPLY_ID,
            ))
            .add_attribute("action", "swap_and_send_gas")
            .add_attribute("path", "swap")
            .add_attribute("pool", pool)
            .add_attribute("fee_tier", fee.to_string())
            .add_attribute("amount_in", amount.to_string())
            .add_attribute("estimated_native_out", estimate.to_string()))
    }
}

/// Swap settled: measure the wrapped-native delta from our own balance
/// (never trust the router's reported output), revoke any leftover
/// allowance, and dispatch the unwrap.
pub fn handle_swap_reply(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pending = PENDING_SWAP
        .may_load(deps.storage)?
        .ok_or(ContractError::UnknownReply { id: SWAP_REPLY_ID })?;
    let contract = &env.contract.address;

    let wrapper_now = swap::wrapper_balance(&deps.querier, &config, contract)?;
    let received = wrapper_now.checked_sub(pending.wrapper_balance_before)?;
    if received.is_zero() {
        return Err(ContractError::SlippageExceeded {
            received,
            min_out: pending.min_native_out,
        });
    }

    pending.native_balance_before = swap::native_balance(&deps.querier, &config, contract)?;
    PENDING_SWAP.save(deps.storage, &pending)?;

    let mut response = Response::new()
        .add_attribute("action", "swap_leg_settled")
        .add_attribute("wrapped_received", received.to_string());

    let leftover = swap::router_allowance(&deps.querier, &config, &pending.token_in, contract)?;
    if !leftover.is_zero() {
        response =
            response.add_message(swap::decrease_allowance_msg(&config, &pending.token_in, leftover)?);
    }

    Ok(response.add_submessage(SubMsg::reply_on_success(
        swap::unwrap_msg(&config, received)?,
        UNWRAP_REPLY_ID,
    )))
}

/// Unwrap settled: measure the actual native delta, enforce the slippage
/// floor and the post-swap cap gate, then emit the terminal gas record.
pub fn handle_unwrap_reply(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pending = PENDING_SWAP
        .may_load(deps.storage)?
        .ok_or(ContractError::UnknownReply { id: UNWRAP_REPLY_ID })?;
    let contract = &env.contract.address;

    let native_now = swap::native_balance(&deps.querier, &config, contract)?;
    let received = native_now.checked_sub(pending.native_balance_before)?;
    if received < pending.min_native_out {
        return Err(ContractError::SlippageExceeded {
            received,
            min_out: pending.min_native_out,
        });
    }

    let price = oracle::price(deps.as_ref(), &env, &config)?;
    let usd = caps::check_caps(&config, received, &price)?;

    PENDING_SWAP.remove(deps.storage);

    let PendingRoute::Gas { payload } = pending.route;
    let tx_type = if payload.is_some() {
        TxType::GasAndPayload
    } else {
        TxType::Gas
    };
    let event = gas_record(
        deps.as_ref(),
        &pending.sender,
        payload.as_ref(),
        received,
        &pending.revert,
        tx_type,
    )?;

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "swap_deposit_settled")
        .add_attribute("sender", pending.sender)
        .add_attribute("native_received", received.to_string())
        .add_attribute("usd_value", usd.to_string()))
}

// ============================================================================
// Record Emission
// ============================================================================

/// Canonical gas-lane record.
fn gas_record(
    deps: Deps,
    sender: &Addr,
    payload: Option<&UniversalPayload>,
    amount: Uint128,
    revert: &RevertSettings,
    tx_type: TxType,
) -> Result<Event, ContractError> {
    debug_assert!(matches!(tx_type, TxType::Gas | TxType::GasAndPayload));
    let fund_recipient = validated_fund_recipient(deps, revert)?;
    let payload_hash = match (tx_type.carries_payload(), payload) {
        (true, Some(payload)) => hash_payload(payload)?,
        (true, None) => return Err(ContractError::EmptyPayload),
        (false, _) => [0u8; 32],
    };

    Ok(Event::new("universal_tx_gas")
        .add_attribute("sender", sender)
        .add_attribute("payload_hash", hex::encode(payload_hash))
        .add_attribute("native_deposited", amount.to_string())
        .add_attribute("fund_recipient", fund_recipient)
        .add_attribute("tx_type", tx_type.as_str()))
}

/// Canonical funds-lane record. A missing recipient is only legal for
/// payload-carrying types; pure funds transfers need an explicit recipient.
#[allow(clippy::too_many_arguments)]
fn funds_record(
    deps: Deps,
    sender: &Addr,
    recipient: Option<String>,
    asset: AssetInfo,
    amount: Uint128,
    gas_amount: Uint128,
    payload: Option<&UniversalPayload>,
    revert: &RevertSettings,
    tx_type: TxType,
) -> Result<Event, ContractError> {
    debug_assert!(matches!(tx_type, TxType::Funds | TxType::FundsAndPayload));
    let fund_recipient = validated_fund_recipient(deps, revert)?;

    let recipient = match (recipient, tx_type.carries_payload()) {
        (Some(recipient), false) => Some(deps.api.addr_validate(&recipient)?),
        (None, true) => None,
        (None, false) => return Err(ContractError::RecipientRequired),
        (Some(_), true) => {
            return Err(ContractError::InvalidAddress {
                reason: "payload-carrying transfers route to the sender's counterpart".to_string(),
            })
        }
    };
    let data = match (tx_type.carries_payload(), payload) {
        (true, Some(payload)) => to_json_binary(payload)?,
        (true, None) => return Err(ContractError::EmptyPayload),
        (false, _) => Default::default(),
    };

    Ok(Event::new("universal_tx_funds")
        .add_attribute("sender", sender)
        .add_attribute(
            "recipient",
            recipient.map(|r| r.to_string()).unwrap_or_default(),
        )
        .add_attribute("asset", asset.id())
        .add_attribute("amount", amount.to_string())
        .add_attribute("gas_amount", gas_amount.to_string())
        .add_attribute("data", data.to_base64())
        .add_attribute("fund_recipient", fund_recipient)
        .add_attribute("tx_type", tx_type.as_str()))
}

/// Hash the payload for the gas record.
fn hash_payload(payload: &UniversalPayload) -> Result<[u8; 32], ContractError> {
    Ok(keccak256(to_json_binary(payload)?.as_slice()))
}

/// Revert settings are validated here, at the point of emission, not at
/// entry. A violation still rolls the whole call back.
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

// ============================================================================
// Shared Guards
// ============================================================================

/// Load config, rejecting paused state and in-flight swaps.
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

/// Require exactly one attached coin of the native denom.
fn one_native_coin(info: &MessageInfo, config: &Config) -> Result<Uint128, ContractError> {
    if info.funds.is_empty() {
        return Err(ContractError::InvalidFunds {
            reason: format!("expected {} attached", config.native_denom),
        });
    }
    if info.funds.len() > 1 {
        return Err(ContractError::InvalidFunds {
            reason: "only one coin type allowed per deposit".to_string(),
        });
    }
    let coin = &info.funds[0];
    if coin.denom != config.native_denom {
        return Err(ContractError::InvalidFunds {
            reason: format!("expected {}, got {}", config.native_denom, coin.denom),
        });
    }
    if coin.amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "deposit amount must be greater than zero".to_string(),
        });
    }
    Ok(coin.amount)
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
