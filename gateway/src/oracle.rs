//! Price source abstraction: TWAP pool or push-style aggregator feed.
//!
//! Both variants normalize to a single reading: USD per whole native unit,
//! 1e18 fixed point. The feed variant additionally runs the sequencer
//! liveness guard on rollup deployments.

use cosmwasm_std::{Decimal256, Deps, Env, Fraction, Uint128, Uint256};

use crate::error::ContractError;
use crate::msg::{
    ConsultResponse, FeedQueryMsg, PoolMetadataResponse, PoolQueryMsg, RoundDataResponse,
};
use crate::state::{Config, PriceConfig, SequencerConfig, PRICE_CONFIG};

/// A validated, normalized price reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceReading {
    /// USD per whole native unit, 1e18 fixed point
    pub usd_per_native: Uint128,
    /// Decimal count of the upstream source before normalization
    pub source_decimals: u8,
}

/// Read and validate the current price from the live source.
pub fn price(deps: Deps, env: &Env, config: &Config) -> Result<PriceReading, ContractError> {
    match PRICE_CONFIG.load(deps.storage)? {
        PriceConfig::Twap {
            pool,
            counter_asset,
            counter_decimals,
            window_secs,
            min_cardinality,
        } => twap_price(
            deps,
            config,
            &pool,
            &counter_asset,
            counter_decimals,
            window_secs,
            min_cardinality,
        ),
        PriceConfig::Feed {
            feed,
            feed_decimals,
            stale_after_secs,
            sequencer,
        } => {
            if let Some(sequencer) = &sequencer {
                check_sequencer(deps, env, sequencer)?;
            }
            feed_price(deps, env, &feed, feed_decimals, stale_after_secs)
        }
    }
}

// ============================================================================
// TWAP Variant
// ============================================================================

fn twap_price(
    deps: Deps,
    config: &Config,
    pool: &cosmwasm_std::Addr,
    counter_asset: &cosmwasm_std::Addr,
    counter_decimals: u8,
    window_secs: u64,
    min_cardinality: u16,
) -> Result<PriceReading, ContractError> {
    let meta: PoolMetadataResponse = deps
        .querier
        .query_wasm_smart(pool, &PoolQueryMsg::Metadata {})?;

    // Either buffer size meeting the minimum is enough to proceed
    if meta.observation_cardinality < min_cardinality
        && meta.observation_cardinality_next < min_cardinality
    {
        return Err(ContractError::InsufficientHistory {
            current: meta.observation_cardinality,
            next: meta.observation_cardinality_next,
            required: min_cardinality,
        });
    }

    // The native wrapper may sit on either side of the pool
    let wrapper = config.native_wrapper.as_str();
    let native_is_token0 = if meta.token0 == wrapper && meta.token1 == counter_asset.as_str() {
        true
    } else if meta.token1 == wrapper && meta.token0 == counter_asset.as_str() {
        false
    } else {
        return Err(ContractError::InvalidPoolConfig);
    };

    let consult: ConsultResponse = deps
        .querier
        .query_wasm_smart(pool, &PoolQueryMsg::Consult { secs: window_secs })?;

    let raw_price = tick_to_price(consult.arithmetic_mean_tick, native_is_token0)?;
    let usd_per_native = normalize_raw_price(raw_price, config.native_decimals, counter_decimals)?;
    if usd_per_native.is_zero() {
        return Err(ContractError::NoValidPrice);
    }

    Ok(PriceReading {
        usd_per_native,
        source_decimals: counter_decimals,
    })
}

/// Convert a mean tick into the raw-unit price of one native unit in counter
/// units: `1.0001^tick`, inverted when the native asset is token1.
fn tick_to_price(tick: i32, native_is_token0: bool) -> Result<Decimal256, ContractError> {
    let base = Decimal256::from_ratio(10_001u64, 10_000u64);
    let magnitude = base
        .checked_pow(tick.unsigned_abs())
        .map_err(|_| ContractError::NoValidPrice)?;
    // tick quotes token1 per token0; flip twice when both the tick sign and
    // the token ordering call for an inversion
    let invert = (tick < 0) == native_is_token0 && tick != 0;
    if invert {
        magnitude.inv().ok_or(ContractError::NoValidPrice)
    } else {
        Ok(magnitude)
    }
}

/// Scale a raw-unit price to 1e18-fixed USD per whole native unit.
fn normalize_raw_price(
    raw_price: Decimal256,
    native_decimals: u8,
    counter_decimals: u8,
) -> Result<Uint128, ContractError> {
    if counter_decimals > 18 {
        return Err(ContractError::InvalidPriceConfig {
            reason: format!("counter decimals {counter_decimals} exceed 18"),
        });
    }
    // atomics() is raw_price * 1e18; shifting by the decimal difference
    // yields the 1e18-fixed whole-unit price
    let atomics = raw_price.atomics();
    let value = if native_decimals >= counter_decimals {
        let shift = Uint256::from(10u128)
            .checked_pow((native_decimals - counter_decimals) as u32)
            .map_err(|_| ContractError::InvalidPriceConfig {
                reason: "decimal shift overflows".to_string(),
            })?;
        atomics.checked_mul(shift)?
    } else {
        let shift = Uint256::from(10u128)
            .checked_pow((counter_decimals - native_decimals) as u32)
            .map_err(|_| ContractError::InvalidPriceConfig {
                reason: "decimal shift overflows".to_string(),
            })?;
        atomics.checked_div(shift).map_err(|e| {
            ContractError::Std(cosmwasm_std::StdError::generic_err(e.to_string()))
        })?
    };
    Uint128::try_from(value).map_err(|_| ContractError::InvalidPriceConfig {
        reason: "normalized price overflows".to_string(),
    })
}

// ============================================================================
// Push-Feed Variant
// ============================================================================

fn feed_price(
    deps: Deps,
    env: &Env,
    feed: &cosmwasm_std::Addr,
    feed_decimals: u8,
    stale_after_secs: u64,
) -> Result<PriceReading, ContractError> {
    let round: RoundDataResponse = deps
        .querier
        .query_wasm_smart(feed, &FeedQueryMsg::LatestRoundData {})?;

    if round.answer.i128() <= 0 || round.answered_in_round < round.round_id {
        return Err(ContractError::InvalidAnswer);
    }

    let now = env.block.time.seconds();
    let age_seconds = now.saturating_sub(round.updated_at);
    if stale_after_secs != 0 && age_seconds > stale_after_secs {
        return Err(ContractError::StalePrice {
            age_seconds,
            stale_after_seconds: stale_after_secs,
        });
    }

    let usd_per_native = rescale_answer(round.answer.i128() as u128, feed_decimals)?;
    Ok(PriceReading {
        usd_per_native,
        source_decimals: feed_decimals,
    })
}

/// Rescale a positive feed answer to 18 decimals. Decimal counts above 18
/// would need a negative shift and are rejected.
fn rescale_answer(answer: u128, feed_decimals: u8) -> Result<Uint128, ContractError> {
    if feed_decimals > 18 {
        return Err(ContractError::InvalidPriceConfig {
            reason: format!("feed decimals {feed_decimals} exceed 18"),
        });
    }
    let shift = 10u128.pow((18 - feed_decimals) as u32);
    Ok(Uint128::new(answer).checked_mul(Uint128::new(shift))?)
}

// ============================================================================
// Sequencer Liveness Guard
// ============================================================================

/// Rollup deployments only: refuse to trust a price while the sequencer is
/// down or still settling after a restart.
fn check_sequencer(
    deps: Deps,
    env: &Env,
    sequencer: &SequencerConfig,
) -> Result<(), ContractError> {
    let round: RoundDataResponse = deps
        .querier
        .query_wasm_smart(&sequencer.feed, &FeedQueryMsg::LatestRoundData {})?;

    // answer == 0 means up, anything else means down
    if round.answer.i128() != 0 {
        return Err(ContractError::SequencerDown);
    }

    let up_for_seconds = env.block.time.seconds().saturating_sub(round.updated_at);
    if up_for_seconds <= sequencer.grace_secs {
        return Err(ContractError::SequencerGracePeriod {
            up_for_seconds,
            grace_seconds: sequencer.grace_secs,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal256 {
        s.parse().unwrap()
    }

    #[test]
    fn tick_zero_is_unit_price() {
        assert_eq!(tick_to_price(0, true).unwrap(), Decimal256::one());
        assert_eq!(tick_to_price(0, false).unwrap(), Decimal256::one());
    }

    #[test]
    fn tick_6932_is_close_to_two() {
        // 1.0001^6932 ~= 2.0000
        let price = tick_to_price(6932, true).unwrap();
        assert!(price > dec("1.9999") && price < dec("2.0001"), "{price}");
    }

    #[test]
    fn inverted_ordering_flips_the_quote() {
        let straight = tick_to_price(6932, true).unwrap();
        let flipped = tick_to_price(6932, false).unwrap();
        let product = straight * flipped;
        assert!(product > dec("0.9999") && product < dec("1.0001"), "{product}");
    }

    #[test]
    fn negative_tick_matches_flipped_positive() {
        let a = tick_to_price(-6932, true).unwrap();
        let b = tick_to_price(6932, false).unwrap();
        let diff = if a > b { a - b } else { b - a };
        assert!(diff < dec("0.0001"), "{a} vs {b}");
    }

    #[test]
    fn normalize_equal_decimals_is_identity_scale() {
        // price 2000 counter-raw per native-raw, both 6 decimals
        let fixed = normalize_raw_price(dec("2000"), 6, 6).unwrap();
        assert_eq!(fixed, Uint128::new(2_000u128 * 10u128.pow(18)));
    }

    #[test]
    fn normalize_shifts_for_decimal_mismatch() {
        // native 6 decimals, counter 18: raw price is 1e12 larger numerically
        let fixed = normalize_raw_price(dec("2000000000000000"), 6, 18).unwrap();
        assert_eq!(fixed, Uint128::new(2_000u128 * 10u128.pow(18)));
    }

    #[test]
    fn normalize_rejects_counter_decimals_above_18() {
        let err = normalize_raw_price(dec("1"), 6, 19).unwrap_err();
        assert!(matches!(err, ContractError::InvalidPriceConfig { .. }));
    }

    #[test]
    fn feed_answer_rescales_to_18_decimals() {
        // decimals=8, answer=200000000000 ($2000.00000000)
        let fixed = rescale_answer(200_000_000_000, 8).unwrap();
        assert_eq!(fixed, Uint128::new(2_000u128 * 10u128.pow(18)));
    }

    #[test]
    fn feed_decimals_above_18_rejected() {
        let err = rescale_answer(1, 19).unwrap_err();
        assert!(matches!(err, ContractError::InvalidPriceConfig { .. }));
    }
}
