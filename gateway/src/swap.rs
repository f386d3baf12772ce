//! Swap-routing helpers for the token-to-native deposit lane.
//!
//! The router and factory are black-box contracts. Pool discovery walks the
//! configured fee tiers in order; the swap itself is dispatched as a
//! sub-message so the received amounts can be measured from balance deltas
//! rather than trusted from the router's reply.

use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, Deps, Env, QuerierWrapper, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};

use crate::error::ContractError;
use crate::msg::{
    FactoryPoolResponse, FactoryQueryMsg, QuoteResponse, RouterExecuteMsg, RouterQueryMsg,
    WrapperExecuteMsg,
};
use crate::state::Config;

/// Walk the configured fee tiers in order and return the first existing pool
/// between `token_in` and the native wrapper.
pub fn find_pool(deps: Deps, config: &Config, token_in: &Addr) -> Result<(String, u32), ContractError> {
    for &fee in &config.fee_tiers {
        let res: FactoryPoolResponse = deps.querier.query_wasm_smart(
            &config.swap_factory,
            &FactoryQueryMsg::Pool {
                token_a: token_in.to_string(),
                token_b: config.native_wrapper.to_string(),
                fee,
            },
        )?;
        if let Some(pool) = res.pool {
            return Ok((pool, fee));
        }
    }
    Err(ContractError::NoPoolFound {
        token: token_in.to_string(),
    })
}

/// Resolve the caller's deadline: zero substitutes the configured default
/// window; an explicit deadline in the past is rejected outright.
pub fn resolve_deadline(env: &Env, config: &Config, deadline: u64) -> Result<u64, ContractError> {
    let now = env.block.time.seconds();
    if deadline == 0 {
        return Ok(now + config.default_swap_deadline_secs);
    }
    if deadline <= now {
        return Err(ContractError::DeadlineExpired { deadline, now });
    }
    Ok(deadline)
}

/// Probable native output for `amount_in` of `token_in`, from the router's
/// quoter. Used for the pre-swap cap gate only; the post-swap gate measures
/// the actual delta.
pub fn quote_native_out(
    deps: Deps,
    config: &Config,
    token_in: &Addr,
    fee: u32,
    amount_in: Uint128,
) -> Result<Uint128, ContractError> {
    let res: QuoteResponse = deps.querier.query_wasm_smart(
        &config.swap_router,
        &RouterQueryMsg::Quote {
            token_in: token_in.to_string(),
            token_out: config.native_wrapper.to_string(),
            fee,
            amount_in,
        },
    )?;
    Ok(res.amount_out)
}

/// Current wrapped-native balance of `account`.
pub fn wrapper_balance(
    querier: &QuerierWrapper,
    config: &Config,
    account: &Addr,
) -> Result<Uint128, ContractError> {
    let res: BalanceResponse = querier.query_wasm_smart(
        &config.native_wrapper,
        &Cw20QueryMsg::Balance {
            address: account.to_string(),
        },
    )?;
    Ok(res.balance)
}

/// Current native bank balance of `account`.
pub fn native_balance(
    querier: &QuerierWrapper,
    config: &Config,
    account: &Addr,
) -> Result<Uint128, ContractError> {
    Ok(querier
        .query_balance(account, &config.native_denom)?
        .amount)
}

/// Remaining allowance granted by this contract to the router on `token`.
pub fn router_allowance(
    querier: &QuerierWrapper,
    config: &Config,
    token: &Addr,
    owner: &Addr,
) -> Result<Uint128, ContractError> {
    let res: cw20::AllowanceResponse = querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Allowance {
            owner: owner.to_string(),
            spender: config.swap_router.to_string(),
        },
    )?;
    Ok(res.allowance)
}

/// One-shot allowance grant for the router to pull the swap input.
pub fn increase_allowance_msg(
    config: &Config,
    token: &Addr,
    amount: Uint128,
) -> Result<CosmosMsg, ContractError> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::IncreaseAllowance {
            spender: config.swap_router.to_string(),
            amount,
            expires: None,
        })?,
        funds: vec![],
    }))
}

/// Revoke whatever allowance the router did not consume.
pub fn decrease_allowance_msg(
    config: &Config,
    token: &Addr,
    amount: Uint128,
) -> Result<CosmosMsg, ContractError> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::DecreaseAllowance {
            spender: config.swap_router.to_string(),
            amount,
            expires: None,
        })?,
        funds: vec![],
    }))
}

/// Exact-input-single swap of `amount_in` of `token_in` into wrapped native,
/// delivered to this contract.
pub fn swap_exact_input_msg(
    env: &Env,
    config: &Config,
    token_in: &Addr,
    fee: u32,
    amount_in: Uint128,
    amount_out_minimum: Uint128,
    deadline: u64,
) -> Result<CosmosMsg, ContractError> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.swap_router.to_string(),
        msg: to_json_binary(&RouterExecuteMsg::SwapExactInputSingle {
            token_in: token_in.to_string(),
            token_out: config.native_wrapper.to_string(),
            fee,
            recipient: env.contract.address.to_string(),
            deadline,
            amount_in,
            amount_out_minimum,
        })?,
        funds: vec![],
    }))
}

/// Unwrap wrapped native back into the bank denom, 1:1.
pub fn unwrap_msg(config: &Config, amount: Uint128) -> Result<CosmosMsg, ContractError> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.native_wrapper.to_string(),
        msg: to_json_binary(&WrapperExecuteMsg::Withdraw { amount })?,
        funds: vec![],
    }))
}
