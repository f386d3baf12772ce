//! USD cap enforcement for fast-lane deposits.
//!
//! Conversions keep full precision by multiplying before dividing (widened
//! internally to 256 bits), never through a normalized intermediate.

use cosmwasm_std::Uint128;

use crate::error::ContractError;
use crate::oracle::PriceReading;
use crate::state::Config;

/// 1e18 fixed-point USD unit: $1.
pub const FIXED_ONE: u128 = 1_000_000_000_000_000_000;

/// Base units in one whole native unit.
fn native_unit(native_decimals: u8) -> Result<Uint128, ContractError> {
    Uint128::new(10)
        .checked_pow(native_decimals as u32)
        .map_err(|_| ContractError::InvalidPriceConfig {
            reason: format!("native decimals {native_decimals} overflow"),
        })
}

/// USD value (1e18 fixed) of a native amount at the given price. The price
/// quotes whole native units, so the amount is scaled by the denom's decimal
/// count, not by a fixed exponent.
pub fn usd_value(
    native_amount: Uint128,
    native_decimals: u8,
    price: &PriceReading,
) -> Result<Uint128, ContractError> {
    Ok(native_amount.checked_multiply_ratio(price.usd_per_native, native_unit(native_decimals)?)?)
}

/// Admit a native amount iff its USD value lands inside the inclusive
/// `[min_cap, max_cap]` window.
pub fn check_caps(
    config: &Config,
    native_amount: Uint128,
    price: &PriceReading,
) -> Result<Uint128, ContractError> {
    let usd = usd_value(native_amount, config.native_decimals, price)?;
    if usd < config.min_cap_usd {
        return Err(ContractError::AmountBelowMin {
            usd_value: usd,
            min_cap: config.min_cap_usd,
        });
    }
    if usd > config.max_cap_usd {
        return Err(ContractError::AmountAboveMax {
            usd_value: usd,
            max_cap: config.max_cap_usd,
        });
    }
    Ok(usd)
}

/// Native amounts corresponding to the cap bounds at the given price.
///
/// Integer division rounds inward, so the true admissible boundary can be
/// slightly tighter than these values; callers must not assume the returned
/// boundaries themselves always pass `check_caps`.
pub fn min_max_native(
    config: &Config,
    price: &PriceReading,
) -> Result<(Uint128, Uint128), ContractError> {
    if price.usd_per_native.is_zero() {
        return Err(ContractError::NoValidPrice);
    }
    let unit = native_unit(config.native_decimals)?;
    let min_native = config
        .min_cap_usd
        .checked_multiply_ratio(unit, price.usd_per_native)?;
    let max_native = config
        .max_cap_usd
        .checked_multiply_ratio(unit, price.usd_per_native)?;
    Ok((min_native, max_native))
}
