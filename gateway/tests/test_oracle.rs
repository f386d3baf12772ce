//! Price source integration tests.
//!
//! Runs the gateway against a mock TWAP pool and mock aggregator feeds:
//! - Observation-history gating (either cardinality counter qualifies)
//! - Pool pairing validation
//! - Sequencer liveness guard (down, grace window, recovered)
//! - Price / CheckCaps / MinMaxNative queries
//! - Admin price-source switching

use cosmwasm_std::{coins, Addr, Binary, Int128, Uint128};
use cw_multi_test::{App, Contract, ContractWrapper, Executor};

use gateway::msg::{
    CheckCapsResponse, ExecuteMsg, InstantiateMsg, MinMaxNativeResponse, PriceConfigMsg,
    PriceResponse, QueryMsg, RevertSettings, SequencerConfigMsg, WithdrawAuthorityMsg,
};
use gateway::ContractError;

// ============================================================================
// Mock TWAP Pool
// ============================================================================

mod mock_pool {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
    };
    use cw_storage_plus::Item;

    use gateway::msg::{ConsultResponse, PoolMetadataResponse, PoolQueryMsg};

    #[cw_serde]
    pub struct InstantiateMsg {
        pub token0: String,
        pub token1: String,
        pub cardinality: u16,
        pub cardinality_next: u16,
        pub tick: i32,
    }

    #[cw_serde]
    pub enum ExecuteMsg {
        SetTick { tick: i32 },
        SetCardinality { current: u16, next: u16 },
    }

    const META: Item<PoolMetadataResponse> = Item::new("meta");
    const TICK: Item<i32> = Item::new("tick");

    pub fn instantiate(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        META.save(
            deps.storage,
            &PoolMetadataResponse {
                token0: msg.token0,
                token1: msg.token1,
                observation_cardinality: msg.cardinality,
                observation_cardinality_next: msg.cardinality_next,
            },
        )?;
        TICK.save(deps.storage, &msg.tick)?;
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        match msg {
            ExecuteMsg::SetTick { tick } => TICK.save(deps.storage, &tick)?,
            ExecuteMsg::SetCardinality { current, next } => {
                let mut meta = META.load(deps.storage)?;
                meta.observation_cardinality = current;
                meta.observation_cardinality_next = next;
                META.save(deps.storage, &meta)?;
            }
        }
        Ok(Response::new())
    }

    pub fn query(deps: Deps, _env: Env, msg: PoolQueryMsg) -> StdResult<Binary> {
        match msg {
            PoolQueryMsg::Metadata {} => to_json_binary(&META.load(deps.storage)?),
            PoolQueryMsg::Consult { secs: _ } => to_json_binary(&ConsultResponse {
                arithmetic_mean_tick: TICK.load(deps.storage)?,
            }),
        }
    }
}

// ============================================================================
// Mock Aggregator Feed (price or sequencer)
// ============================================================================

mod mock_feed {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Deps, DepsMut, Env, Int128, MessageInfo, Response, StdResult,
    };
    use cw_storage_plus::Item;

    use gateway::msg::{FeedQueryMsg, RoundDataResponse};

    #[cw_serde]
    pub struct InstantiateMsg {
        pub answer: Int128,
    }

    #[cw_serde]
    pub enum ExecuteMsg {
        SetRound { answer: Int128, updated_at: u64 },
    }

    const ROUND: Item<RoundDataResponse> = Item::new("round");

    pub fn instantiate(
        deps: DepsMut,
        env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        ROUND.save(
            deps.storage,
            &RoundDataResponse {
                round_id: 1,
                answer: msg.answer,
                started_at: env.block.time.seconds(),
                updated_at: env.block.time.seconds(),
                answered_in_round: 1,
            },
        )?;
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        let ExecuteMsg::SetRound { answer, updated_at } = msg;
        let mut round = ROUND.load(deps.storage)?;
        round.round_id += 1;
        round.answered_in_round = round.round_id;
        round.answer = answer;
        round.updated_at = updated_at;
        ROUND.save(deps.storage, &round)?;
        Ok(Response::new())
    }

    pub fn query(deps: Deps, _env: Env, msg: FeedQueryMsg) -> StdResult<Binary> {
        let FeedQueryMsg::LatestRoundData {} = msg;
        to_json_binary(&ROUND.load(deps.storage)?)
    }
}

// ============================================================================
// Test Setup
// ============================================================================

const NATIVE: &str = "unative";
const ONE_USD: u128 = 1_000_000_000_000_000_000;
const WRAPPER: &str = "wrapper0000";
const COUNTER: &str = "usdstable0000";

fn contract_gateway() -> Box<dyn Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        gateway::contract::execute,
        gateway::contract::instantiate,
        gateway::contract::query,
    )
    .with_reply(gateway::contract::reply);
    Box::new(contract)
}

fn contract_pool() -> Box<dyn Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(mock_pool::execute, mock_pool::instantiate, mock_pool::query);
    Box::new(contract)
}

fn contract_feed() -> Box<dyn Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(mock_feed::execute, mock_feed::instantiate, mock_feed::query);
    Box::new(contract)
}

fn instantiate_msg(price_config: PriceConfigMsg, admin: &Addr) -> InstantiateMsg {
    instantiate_msg_with_decimals(price_config, admin, 18)
}

fn instantiate_msg_with_decimals(
    price_config: PriceConfigMsg,
    admin: &Addr,
    native_decimals: u8,
) -> InstantiateMsg {
    InstantiateMsg {
        admin: admin.to_string(),
        pauser: admin.to_string(),
        withdraw_authority: WithdrawAuthorityMsg::LocalRole {
            withdrawer: admin.to_string(),
        },
        min_cap_usd: Uint128::new(ONE_USD),
        max_cap_usd: Uint128::new(10 * ONE_USD),
        native_denom: NATIVE.to_string(),
        native_decimals,
        native_wrapper: WRAPPER.to_string(),
        swap_router: "router0000".to_string(),
        swap_factory: "factory0000".to_string(),
        fee_tiers: vec![3000],
        default_swap_deadline_secs: 600,
        price_config,
        tss: None,
    }
}

struct TwapEnv {
    app: App,
    gateway: Addr,
    pool: Addr,
    admin: Addr,
    user: Addr,
}

/// Pool at tick 0 (unit price): 1 native = $1 with an 18-decimal counter.
fn setup_twap(token0: &str, token1: &str, cardinality: u16, next: u16) -> TwapEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("admin0000");
    let user = Addr::unchecked("user0000");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(1_000 * ONE_USD, NATIVE))
            .unwrap();
    });

    let pool_code = app.store_code(contract_pool());
    let pool = app
        .instantiate_contract(
            pool_code,
            admin.clone(),
            &mock_pool::InstantiateMsg {
                token0: token0.to_string(),
                token1: token1.to_string(),
                cardinality,
                cardinality_next: next,
                tick: 0,
            },
            &[],
            "pool",
            None,
        )
        .unwrap();

    let gateway_code = app.store_code(contract_gateway());
    let gateway = app
        .instantiate_contract(
            gateway_code,
            admin.clone(),
            &instantiate_msg(
                PriceConfigMsg::Twap {
                    pool: pool.to_string(),
                    counter_asset: COUNTER.to_string(),
                    counter_decimals: 18,
                    window_secs: Some(1_800),
                    min_cardinality: 10,
                },
                &admin,
            ),
            &[],
            "universal-gateway",
            None,
        )
        .unwrap();

    TwapEnv {
        app,
        gateway,
        pool,
        admin,
        user,
    }
}

fn revert_to(addr: &Addr) -> RevertSettings {
    RevertSettings {
        fund_recipient: addr.to_string(),
        revert_msg: Binary::default(),
    }
}

fn send_gas(env: &mut TwapEnv, amount: u128) -> Result<(), ContractError> {
    env.app
        .execute_contract(
            env.user.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&env.user),
            },
            &coins(amount, NATIVE),
        )
        .map(|_| ())
        .map_err(|e| e.downcast().unwrap())
}

// ============================================================================
// TWAP Source
// ============================================================================

#[test]
fn twap_unit_price_prices_deposits_at_par() {
    let mut env = setup_twap(WRAPPER, COUNTER, 100, 100);

    let price: PriceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.gateway, &QueryMsg::Price {})
        .unwrap();
    assert_eq!(price.usd_per_native, Uint128::new(ONE_USD));

    // $4 deposit at $1/native
    send_gas(&mut env, 4 * ONE_USD).unwrap();
    // $11 breaks the ceiling
    let err = send_gas(&mut env, 11 * ONE_USD).unwrap_err();
    assert!(matches!(err, ContractError::AmountAboveMax { .. }));
}

#[test]
fn twap_works_with_native_on_either_side_of_the_pool() {
    // Native as token1, tick 0 still quotes par
    let mut env = setup_twap(COUNTER, WRAPPER, 100, 100);
    let price: PriceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.gateway, &QueryMsg::Price {})
        .unwrap();
    assert_eq!(price.usd_per_native, Uint128::new(ONE_USD));
    send_gas(&mut env, 4 * ONE_USD).unwrap();
}

#[test]
fn thin_observation_history_blocks_the_gas_lane() {
    let mut env = setup_twap(WRAPPER, COUNTER, 4, 4);
    let err = send_gas(&mut env, 4 * ONE_USD).unwrap_err();
    assert!(matches!(
        err,
        ContractError::InsufficientHistory {
            current: 4,
            next: 4,
            required: 10
        }
    ));

    // A grown next-cardinality alone is enough to qualify
    env.app
        .execute_contract(
            env.admin.clone(),
            env.pool.clone(),
            &mock_pool::ExecuteMsg::SetCardinality {
                current: 4,
                next: 16,
            },
            &[],
        )
        .unwrap();
    send_gas(&mut env, 4 * ONE_USD).unwrap();
}

#[test]
fn mispaired_pool_is_rejected() {
    let mut env = setup_twap(WRAPPER, "othertoken0000", 100, 100);
    let err = send_gas(&mut env, 4 * ONE_USD).unwrap_err();
    assert_eq!(err, ContractError::InvalidPoolConfig);
}

// ============================================================================
// Sequencer Guard
// ============================================================================

struct FeedEnv {
    app: App,
    gateway: Addr,
    admin: Addr,
    user: Addr,
    sequencer: Addr,
}

fn setup_feed_with_sequencer(grace_secs: u64) -> FeedEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("admin0000");
    let user = Addr::unchecked("user0000");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(1_000 * ONE_USD, NATIVE))
            .unwrap();
    });

    let feed_code = app.store_code(contract_feed());
    // $2000 per native, 8 decimals
    let feed = app
        .instantiate_contract(
            feed_code,
            admin.clone(),
            &mock_feed::InstantiateMsg {
                answer: Int128::new(200_000_000_000),
            },
            &[],
            "price-feed",
            None,
        )
        .unwrap();
    // Sequencer up (answer 0) as of now
    let sequencer = app
        .instantiate_contract(
            feed_code,
            admin.clone(),
            &mock_feed::InstantiateMsg {
                answer: Int128::zero(),
            },
            &[],
            "sequencer-feed",
            None,
        )
        .unwrap();

    let gateway_code = app.store_code(contract_gateway());
    let gateway = app
        .instantiate_contract(
            gateway_code,
            admin.clone(),
            &instantiate_msg(
                PriceConfigMsg::Feed {
                    feed: feed.to_string(),
                    feed_decimals: 8,
                    stale_after_secs: 0,
                    sequencer: Some(SequencerConfigMsg {
                        feed: sequencer.to_string(),
                        grace_secs,
                    }),
                },
                &admin,
            ),
            &[],
            "universal-gateway",
            None,
        )
        .unwrap();

    FeedEnv {
        app,
        gateway,
        admin,
        user,
        sequencer,
    }
}

#[test]
fn sequencer_guard_enforces_down_and_grace_states() {
    let mut env = setup_feed_with_sequencer(3_600);
    let deposit = 2_000_000_000_000_000u128; // $4 at $2000

    // Fresh restart: inside the grace window
    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&env.user),
            },
            &coins(deposit, NATIVE),
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::SequencerGracePeriod { .. }
    ));

    // Past the grace window the lane opens
    env.app.update_block(|b| {
        b.time = b.time.plus_seconds(3_700);
        b.height += 1;
    });
    env.app
        .execute_contract(
            env.user.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&env.user),
            },
            &coins(deposit, NATIVE),
        )
        .unwrap();

    // Outage flips the guard to hard-down
    let now = env.app.block_info().time.seconds();
    env.app
        .execute_contract(
            env.admin.clone(),
            env.sequencer.clone(),
            &mock_feed::ExecuteMsg::SetRound {
                answer: Int128::one(),
                updated_at: now,
            },
            &[],
        )
        .unwrap();
    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&env.user),
            },
            &coins(deposit, NATIVE),
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::SequencerDown
    ));
}

// ============================================================================
// Cap Queries & Source Switching
// ============================================================================

#[test]
fn cap_queries_report_the_admission_window() {
    let env = setup_twap(WRAPPER, COUNTER, 100, 100);

    let bounds: MinMaxNativeResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.gateway, &QueryMsg::MinMaxNative {})
        .unwrap();
    assert_eq!(bounds.min_native, Uint128::new(ONE_USD));
    assert_eq!(bounds.max_native, Uint128::new(10 * ONE_USD));

    let inside: CheckCapsResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.gateway,
            &QueryMsg::CheckCaps {
                amount: Uint128::new(4 * ONE_USD),
            },
        )
        .unwrap();
    assert!(inside.accepted);
    assert_eq!(inside.usd_value, Uint128::new(4 * ONE_USD));

    let outside: CheckCapsResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.gateway,
            &QueryMsg::CheckCaps {
                amount: Uint128::new(11 * ONE_USD),
            },
        )
        .unwrap();
    assert!(!outside.accepted);
}

// ============================================================================
// Six-Decimal Denoms
// ============================================================================

#[test]
fn feed_caps_track_a_six_decimal_denom() {
    let mut app = App::default();
    let admin = Addr::unchecked("admin0000");
    let user = Addr::unchecked("user0000");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(1_000_000_000, NATIVE))
            .unwrap();
    });

    let feed_code = app.store_code(contract_feed());
    let feed = app
        .instantiate_contract(
            feed_code,
            admin.clone(),
            &mock_feed::InstantiateMsg {
                answer: Int128::new(200_000_000_000),
            },
            &[],
            "price-feed",
            None,
        )
        .unwrap();

    let gateway_code = app.store_code(contract_gateway());
    let gateway = app
        .instantiate_contract(
            gateway_code,
            admin.clone(),
            &instantiate_msg_with_decimals(
                PriceConfigMsg::Feed {
                    feed: feed.to_string(),
                    feed_decimals: 8,
                    stale_after_secs: 0,
                    sequencer: None,
                },
                &admin,
                6,
            ),
            &[],
            "universal-gateway",
            None,
        )
        .unwrap();

    // $2000 per whole native: the $1..$10 window is 500..5000 base units
    let bounds: MinMaxNativeResponse = app
        .wrap()
        .query_wasm_smart(&gateway, &QueryMsg::MinMaxNative {})
        .unwrap();
    assert_eq!(bounds.min_native, Uint128::new(500));
    assert_eq!(bounds.max_native, Uint128::new(5_000));

    let at_floor: CheckCapsResponse = app
        .wrap()
        .query_wasm_smart(
            &gateway,
            &QueryMsg::CheckCaps {
                amount: Uint128::new(500),
            },
        )
        .unwrap();
    assert!(at_floor.accepted);
    assert_eq!(at_floor.usd_value, Uint128::new(ONE_USD));

    // The floor itself clears, one base unit under it does not
    app.execute_contract(
        user.clone(),
        gateway.clone(),
        &ExecuteMsg::SendGas {
            revert: revert_to(&user),
        },
        &coins(500, NATIVE),
    )
    .unwrap();
    let err = app
        .execute_contract(
            user.clone(),
            gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&user),
            },
            &coins(499, NATIVE),
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::AmountBelowMin { .. }
    ));
}

#[test]
fn twap_caps_track_a_six_decimal_denom() {
    // 6-decimal native against a 6-decimal counter at tick 0: $1 per whole unit
    let mut app = App::default();
    let admin = Addr::unchecked("admin0000");
    let user = Addr::unchecked("user0000");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(1_000_000_000, NATIVE))
            .unwrap();
    });

    let pool_code = app.store_code(contract_pool());
    let pool = app
        .instantiate_contract(
            pool_code,
            admin.clone(),
            &mock_pool::InstantiateMsg {
                token0: WRAPPER.to_string(),
                token1: COUNTER.to_string(),
                cardinality: 100,
                cardinality_next: 100,
                tick: 0,
            },
            &[],
            "pool",
            None,
        )
        .unwrap();

    let gateway_code = app.store_code(contract_gateway());
    let gateway = app
        .instantiate_contract(
            gateway_code,
            admin.clone(),
            &instantiate_msg_with_decimals(
                PriceConfigMsg::Twap {
                    pool: pool.to_string(),
                    counter_asset: COUNTER.to_string(),
                    counter_decimals: 6,
                    window_secs: Some(1_800),
                    min_cardinality: 10,
                },
                &admin,
                6,
            ),
            &[],
            "universal-gateway",
            None,
        )
        .unwrap();

    let price: PriceResponse = app
        .wrap()
        .query_wasm_smart(&gateway, &QueryMsg::Price {})
        .unwrap();
    assert_eq!(price.usd_per_native, Uint128::new(ONE_USD));

    // $1..$10 spans 1..10 whole units of the 6-decimal denom
    let bounds: MinMaxNativeResponse = app
        .wrap()
        .query_wasm_smart(&gateway, &QueryMsg::MinMaxNative {})
        .unwrap();
    assert_eq!(bounds.min_native, Uint128::new(1_000_000));
    assert_eq!(bounds.max_native, Uint128::new(10_000_000));

    // $4 deposit in base units
    app.execute_contract(
        user.clone(),
        gateway.clone(),
        &ExecuteMsg::SendGas {
            revert: revert_to(&user),
        },
        &coins(4_000_000, NATIVE),
    )
    .unwrap();
    let err = app
        .execute_contract(
            user.clone(),
            gateway.clone(),
            &ExecuteMsg::SendGas {
                revert: revert_to(&user),
            },
            &coins(999_999, NATIVE),
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::AmountBelowMin { .. }
    ));
}

#[test]
fn admin_switches_the_price_source_with_an_audit_trail() {
    let mut env = setup_twap(WRAPPER, COUNTER, 100, 100);

    let feed_code = env.app.store_code(contract_feed());
    let feed = env
        .app
        .instantiate_contract(
            feed_code,
            env.admin.clone(),
            &mock_feed::InstantiateMsg {
                answer: Int128::new(200_000_000_000),
            },
            &[],
            "feed",
            None,
        )
        .unwrap();

    let res = env
        .app
        .execute_contract(
            env.admin.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SetPriceConfig {
                config: PriceConfigMsg::Feed {
                    feed: feed.to_string(),
                    feed_decimals: 8,
                    stale_after_secs: 0,
                    sequencer: None,
                },
            },
            &[],
        )
        .unwrap();

    let wasm = res
        .events
        .iter()
        .find(|e| {
            e.ty == "wasm"
                && e.attributes
                    .iter()
                    .any(|a| a.key == "action" && a.value == "set_price_config")
        })
        .expect("set_price_config attributes missing");
    let get = |key: &str| {
        wasm.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.clone())
            .unwrap_or_else(|| panic!("attribute {key} not found"))
    };
    assert_eq!(get("old_source"), "twap");
    assert_eq!(get("new_source"), "feed");

    // New source is live: $2000/native now
    let price: PriceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.gateway, &QueryMsg::Price {})
        .unwrap();
    assert_eq!(price.usd_per_native, Uint128::new(2_000 * ONE_USD));
}

#[test]
fn short_twap_windows_are_rejected() {
    let mut env = setup_twap(WRAPPER, COUNTER, 100, 100);
    let err = env
        .app
        .execute_contract(
            env.admin.clone(),
            env.gateway.clone(),
            &ExecuteMsg::SetPriceConfig {
                config: PriceConfigMsg::Twap {
                    pool: env.pool.to_string(),
                    counter_asset: COUNTER.to_string(),
                    counter_decimals: 18,
                    window_secs: Some(60),
                    min_cardinality: 10,
                },
            },
            &[],
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::InvalidPriceConfig { .. }
    ));
}
