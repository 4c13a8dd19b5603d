use std::cmp::Ordering;
use std::fmt;

use decimal_wad::decimal::Decimal;
use tracing::warn;

use super::consts::MAX_PRICE_EXP;
use crate::{Price, ScopeError, ScopeResult};

pub const MAX_REF_RATIO_TOLERANCE_PCT: u64 = 5;

impl Price {
    /// Build a price from an upstream mantissa and exponent, rejecting exponents
    /// that cannot be stored.
    pub fn from_raw(value: u64, exp: u64) -> ScopeResult<Price> {
        if exp > MAX_PRICE_EXP {
            return Err(ScopeError::ExponentOverflow);
        }
        Ok(Price { value, exp })
    }

    /// Express the same price with `target_exp` decimals.
    ///
    /// Increasing the exponent multiplies the mantissa and fails with
    /// [`ScopeError::ExponentOverflow`] when it does not fit anymore. Decreasing it
    /// truncates the digits that cannot be represented.
    pub fn rescale(self, target_exp: u64) -> ScopeResult<Price> {
        if target_exp > MAX_PRICE_EXP {
            return Err(ScopeError::ExponentOverflow);
        }
        let value = match target_exp.cmp(&self.exp) {
            Ordering::Equal => self.value,
            Ordering::Greater => {
                let diff = u32::try_from(target_exp - self.exp)?;
                10_u64
                    .checked_pow(diff)
                    .and_then(|factor| self.value.checked_mul(factor))
                    .ok_or(ScopeError::ExponentOverflow)?
            }
            Ordering::Less => {
                let diff = u32::try_from(self.exp - target_exp).unwrap_or(u32::MAX);
                match 10_u64.checked_pow(diff) {
                    Some(factor) => self.value / factor,
                    None => 0,
                }
            }
        };
        Ok(Price {
            value,
            exp: target_exp,
        })
    }

    pub fn to_scaled_value(&self, decimals: u8) -> ScopeResult<u128> {
        let value: u128 = self.value.into();
        let decimals = u64::from(decimals);
        if self.exp > decimals {
            let diff = u32::try_from(self.exp - decimals)?;
            Ok(10_u128.checked_pow(diff).map_or(0, |factor| value / factor))
        } else {
            let diff = u32::try_from(decimals - self.exp)?;
            10_u128
                .checked_pow(diff)
                .and_then(|factor| value.checked_mul(factor))
                .ok_or(ScopeError::IntegerOverflow)
        }
    }

    /// Exact decimal rendering, for logs and diagnostics.
    pub fn to_decimal_string(&self) -> String {
        let rendered = u32::try_from(self.exp).ok().and_then(|scale| {
            rust_decimal::Decimal::try_from_i128_with_scale(i128::from(self.value), scale).ok()
        });
        match rendered {
            Some(decimal) => decimal.to_string(),
            None => format!("{}e-{}", self.value, self.exp),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Check that `curr_price` is within [`MAX_REF_RATIO_TOLERANCE_PCT`] of `ref_price`.
pub fn check_ref_price_difference(curr_price: Price, ref_price: Price) -> ScopeResult<()> {
    let ref_price_decimal = Decimal::from(ref_price);
    let curr_price_decimal = Decimal::from(curr_price);
    let absolute_diff = if ref_price_decimal > curr_price_decimal {
        ref_price_decimal - curr_price_decimal
    } else {
        curr_price_decimal - ref_price_decimal
    };

    if absolute_diff * 100 > ref_price_decimal * MAX_REF_RATIO_TOLERANCE_PCT {
        warn!(
            "Price diff is too high: absolute_diff {}, tolerance = {}",
            absolute_diff,
            ref_price_decimal * Decimal::from_percent(MAX_REF_RATIO_TOLERANCE_PCT)
        );
        return Err(ScopeError::RefPriceMismatch);
    }

    Ok(())
}

impl From<Price> for Decimal {
    fn from(val: Price) -> Self {
        let exp = u32::try_from(val.exp).unwrap_or(u32::MAX);
        match 10_u128.checked_pow(exp) {
            Some(divisor) => Decimal::from(val.value) / divisor,
            None => Decimal::zero(),
        }
    }
}

/// Compare two prices by aligning their exponents on 128 bits.
///
/// When aligning would overflow, the price that had to be scaled up is the larger one
/// unless its mantissa is 0.
fn cmp_prices(lhs: &Price, rhs: &Price) -> Ordering {
    match lhs.exp.cmp(&rhs.exp) {
        Ordering::Equal => lhs.value.cmp(&rhs.value),
        Ordering::Greater => match scale_up(rhs.value, lhs.exp - rhs.exp) {
            Some(rhs_value) => u128::from(lhs.value).cmp(&rhs_value),
            None if rhs.value == 0 => lhs.value.cmp(&0),
            None => Ordering::Less,
        },
        Ordering::Less => match scale_up(lhs.value, rhs.exp - lhs.exp) {
            Some(lhs_value) => lhs_value.cmp(&u128::from(rhs.value)),
            None if lhs.value == 0 => 0.cmp(&rhs.value),
            None => Ordering::Greater,
        },
    }
}

fn scale_up(value: u64, diff: u64) -> Option<u128> {
    let diff = u32::try_from(diff).ok()?;
    10_u128
        .checked_pow(diff)
        .and_then(|factor| u128::from(value).checked_mul(factor))
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        cmp_prices(self, other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_prices(self, other)
    }
}
