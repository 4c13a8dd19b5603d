use decimal_wad::decimal::U192;

use crate::{DecodeError, Price, ScopeError, ScopeResult};

pub fn ten_pow(exponent: u32) -> ScopeResult<u128> {
    10_u128
        .checked_pow(exponent)
        .ok_or(ScopeError::IntegerOverflow)
}

/// Convert a Price A lamport to B lamport to a price of A token to B tokens
pub fn price_of_lamports_to_price_of_tokens(
    lamport_price: Price,
    token_a_decimals: u64,
    token_b_decimals: u64,
) -> ScopeResult<Price> {
    // lamport_price = number_of_token_b_lamport / number_of_token_a_lamport
    // price = (number_of_token_b_lamport / 10^token_b_decimals) / (number_of_token_a_lamport / 10^token_a_decimals)
    // price = lamport_price * 10^(token_a_decimals - token_b_decimals)
    // price_value = lamport_value * 10^(-(lamport_exp + token_b_decimals - token_a_decimals))
    let Price {
        value: lamport_value,
        exp: lamport_exp,
    } = lamport_price;

    let lamport_exp_b = lamport_exp
        .checked_add(token_b_decimals)
        .ok_or(ScopeError::MathOverflow)?;
    if lamport_exp_b >= token_a_decimals {
        Ok(Price {
            value: lamport_value,
            exp: lamport_exp_b - token_a_decimals,
        })
    } else {
        let adjust_exp = u32::try_from(token_a_decimals - lamport_exp_b)?;
        let value = 10_u64
            .checked_pow(adjust_exp)
            .and_then(|factor| lamport_value.checked_mul(factor))
            .ok_or(ScopeError::IntegerOverflow)?;
        Ok(Price { value, exp: 0 })
    }
}

/// Divide two integers keeping as much precision as a `u64` mantissa allows.
///
/// The exponent is chosen from the magnitude of the denominator so that the result
/// stays below the numerator while keeping the significant digits of the ratio.
pub fn u64_div_to_price(numerator: u64, denominator: u64) -> ScopeResult<Price> {
    if denominator == 0 {
        return Err(DecodeError::DivideByZero.into());
    }
    // smallest exp such that 10^(exp + 1) >= denominator
    let mut exp = 0_u32;
    let mut bound = 10_u64;
    while exp < 18 && bound < denominator {
        exp += 1;
        bound = bound.saturating_mul(10);
    }
    let ten_pow_exp = 10_u64.pow(exp);
    let value = u128::from(numerator) * u128::from(ten_pow_exp) / u128::from(denominator);
    Ok(Price {
        value: u64::try_from(value).map_err(|_| ScopeError::IntegerOverflow)?,
        exp: exp.into(),
    })
}

/// `numerator / denominator` expressed with `decimals` decimals.
///
/// Intermediate values are computed on 192 bits so that wad-scaled (10^18) amounts can be
/// used as operands without overflowing.
pub fn ratio_to_price(numerator: u128, denominator: u128, decimals: u32) -> ScopeResult<Price> {
    if denominator == 0 {
        return Err(DecodeError::DivideByZero.into());
    }
    let factor = U192::from(ten_pow(decimals)?);
    let value = U192::from(numerator)
        .checked_mul(factor)
        .ok_or(ScopeError::MathOverflow)?
        / U192::from(denominator);
    if value > U192::from(u64::MAX) {
        return Err(ScopeError::IntegerOverflow);
    }
    Ok(Price {
        value: value.as_u64(),
        exp: decimals.into(),
    })
}
