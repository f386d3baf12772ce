//! Contract entry points.

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdError,
};
use cw2::set_contract_version;

use crate::auth::parse_eth_address;
use crate::error::ContractError;
use crate::execute::{admin, deposit, withdraw};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, WithdrawAuthorityMsg};
use crate::query;
use crate::state::{
    Config, TssState, WithdrawAuthority, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, PRICE_CONFIG,
    TSS,
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.min_cap_usd > msg.max_cap_usd {
        return Err(ContractError::InvalidCapRange {
            min: msg.min_cap_usd,
            max: msg.max_cap_usd,
        });
    }
    if msg.native_decimals > 18 {
        return Err(ContractError::InvalidPriceConfig {
            reason: format!("native decimals {} exceed 18", msg.native_decimals),
        });
    }
    admin::validate_fee_tiers(&msg.fee_tiers)?;
    if msg.default_swap_deadline_secs == 0 {
        return Err(ContractError::InvalidSwapConfig {
            reason: "default deadline must be nonzero".to_string(),
        });
    }

    let withdraw_authority = match msg.withdraw_authority {
        WithdrawAuthorityMsg::LocalRole { withdrawer } => WithdrawAuthority::LocalRole {
            withdrawer: deps.api.addr_validate(&withdrawer)?,
        },
        WithdrawAuthorityMsg::ExternalSigner {} => WithdrawAuthority::ExternalSigner,
    };

    // Signer state is stored whenever provided, but it is mandatory for
    // external-signer deployments
    match (&withdraw_authority, msg.tss) {
        (WithdrawAuthority::ExternalSigner, None) => {
            return Err(ContractError::TssNotInitialized)
        }
        (_, Some(tss)) => {
            TSS.save(
                deps.storage,
                &TssState {
                    eth_address: parse_eth_address(&tss.eth_address)?,
                    chain_id: tss.chain_id,
                    nonce: 0,
                },
            )?;
        }
        (_, None) => {}
    }

    let config = Config {
        admin: deps.api.addr_validate(&msg.admin)?,
        pauser: deps.api.addr_validate(&msg.pauser)?,
        paused: false,
        withdraw_authority,
        min_cap_usd: msg.min_cap_usd,
        max_cap_usd: msg.max_cap_usd,
        native_denom: msg.native_denom,
        native_decimals: msg.native_decimals,
        native_wrapper: deps.api.addr_validate(&msg.native_wrapper)?,
        swap_router: deps.api.addr_validate(&msg.swap_router)?,
        swap_factory: deps.api.addr_validate(&msg.swap_factory)?,
        fee_tiers: msg.fee_tiers,
        default_swap_deadline_secs: msg.default_swap_deadline_secs,
    };
    CONFIG.save(deps.storage, &config)?;

    let price_config = admin::validate_price_config(deps.as_ref(), msg.price_config)?;
    PRICE_CONFIG.save(deps.storage, &price_config)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("native_denom", config.native_denom))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Deposits
        ExecuteMsg::SendGas { revert } => deposit::execute_send_gas(deps, env, info, revert),
        ExecuteMsg::SendTxWithGas { payload, revert } => {
            deposit::execute_send_tx_with_gas(deps, env, info, payload, revert)
        }
        ExecuteMsg::SendFundsNative { recipient, revert } => {
            deposit::execute_send_funds_native(deps, env, info, recipient, revert)
        }
        ExecuteMsg::SendTxWithFundsNative {
            payload,
            revert,
            gas_amount,
        } => deposit::execute_send_tx_with_funds_native(deps, env, info, payload, revert, gas_amount),
        ExecuteMsg::Receive(cw20_msg) => deposit::execute_receive(deps, env, info, cw20_msg),

        // Withdrawals
        ExecuteMsg::Withdraw {
            recipient,
            amount,
            auth,
        } => withdraw::execute_withdraw(deps, env, info, recipient, amount, auth),
        ExecuteMsg::WithdrawToken {
            token,
            recipient,
            amount,
            auth,
        } => withdraw::execute_withdraw_token(deps, env, info, token, recipient, amount, auth),
        ExecuteMsg::RevertWithdraw {
            amount,
            revert,
            auth,
        } => withdraw::execute_revert_withdraw(deps, env, info, amount, revert, auth),
        ExecuteMsg::RevertWithdrawToken {
            token,
            amount,
            revert,
            auth,
        } => withdraw::execute_revert_withdraw_token(deps, env, info, token, amount, revert, auth),

        // Admin
        ExecuteMsg::SetCaps {
            min_cap_usd,
            max_cap_usd,
        } => admin::execute_set_caps(deps, info, min_cap_usd, max_cap_usd),
        ExecuteMsg::SetPriceConfig { config } => {
            admin::execute_set_price_config(deps, info, config)
        }
        ExecuteMsg::SetFeeTiers { fee_tiers } => {
            admin::execute_set_fee_tiers(deps, info, fee_tiers)
        }
        ExecuteMsg::SetWhitelist { token, supported } => {
            admin::execute_set_whitelist(deps, info, token, supported)
        }
        ExecuteMsg::SetSwapConfig {
            router,
            factory,
            default_deadline_secs,
        } => admin::execute_set_swap_config(deps, info, router, factory, default_deadline_secs),
        ExecuteMsg::UpdateTss {
            eth_address,
            chain_id,
        } => admin::execute_update_tss(deps, info, eth_address, chain_id),
        ExecuteMsg::ResetNonce { nonce } => admin::execute_reset_nonce(deps, info, nonce),
        ExecuteMsg::SetWithdrawAuthority { authority } => {
            admin::execute_set_withdraw_authority(deps, info, authority)
        }
        ExecuteMsg::ProposeAdmin { new_admin } => {
            admin::execute_propose_admin(deps, env, info, new_admin)
        }
        ExecuteMsg::AcceptAdmin {} => admin::execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => admin::execute_cancel_admin_proposal(deps, info),
        ExecuteMsg::Pause {} => admin::execute_pause(deps, info),
        ExecuteMsg::Unpause {} => admin::execute_unpause(deps, info),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        deposit::SWAP_REPLY_ID => deposit::handle_swap_reply(deps, env),
        deposit::UNWRAP_REPLY_ID => deposit::handle_unwrap_reply(deps, env),
        id => Err(ContractError::UnknownReply { id }),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Config {} => Ok(to_json_binary(&query::query_config(deps)?)?),
        QueryMsg::PriceConfig {} => Ok(to_json_binary(&query::query_price_config(deps)?)?),
        QueryMsg::Price {} => Ok(to_json_binary(&query::query_price(deps, &env)?)?),
        QueryMsg::CheckCaps { amount } => {
            Ok(to_json_binary(&query::query_check_caps(deps, &env, amount)?)?)
        }
        QueryMsg::MinMaxNative {} => {
            Ok(to_json_binary(&query::query_min_max_native(deps, &env)?)?)
        }
        QueryMsg::Whitelist { token } => Ok(to_json_binary(&query::query_whitelist(deps, token)?)?),
        QueryMsg::TssState {} => Ok(to_json_binary(&query::query_tss_state(deps)?)?),
        QueryMsg::WithdrawMessageHash {
            kind,
            amount,
            recipient_or_token,
            nonce,
        } => Ok(to_json_binary(&query::query_withdraw_message_hash(
            deps,
            kind,
            amount,
            recipient_or_token,
            nonce,
        )?)?),
        QueryMsg::Paused {} => Ok(to_json_binary(&query::query_paused(deps)?)?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let version = cw2::get_contract_version(deps.storage)?;
    if version.contract != CONTRACT_NAME {
        return Err(ContractError::Std(StdError::generic_err(
            "cannot migrate from a different contract",
        )));
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", version.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
