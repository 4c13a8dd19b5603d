use std::num::TryFromIntError;

use decimal_wad::error::DecimalError;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use thiserror::Error;

/// Reasons for which an upstream account could not be turned into a price.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Price is stale or not valid")]
    StaleOrInvalid,

    #[error("Upstream round did not gather enough responses")]
    RoundIncomplete,

    #[error("Upstream account has a zero denominator")]
    DivideByZero,

    #[error("Upstream account does not match the expected layout")]
    MalformedLayout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Integer overflow")]
    IntegerOverflow,

    #[error("Conversion failure")]
    ConversionFailure,

    #[error("Mathematical operation with overflow")]
    MathOverflow,

    #[error("Out of range integral conversion attempted")]
    OutOfRangeIntegralConversion,

    #[error("Unexpected account in instruction")]
    UnexpectedAccount,

    #[error("The number of tokens is different from the number of received accounts")]
    AccountsAndTokenMismatch,

    #[error("The token index received is out of range")]
    SlotOutOfRange,

    #[error("The token has no oracle mapping")]
    SlotInactive,

    #[error("The token type received is invalid")]
    BadTokenType,

    #[error("Oracle decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Price exponent is above the supported maximum")]
    ExponentOverflow,

    #[error("Price is too far from its reference price")]
    RefPriceMismatch,

    #[error("Error while computing price with ScopeChain")]
    BadScopeChainOrPrices,

    #[error("Invalid token metadata update mode")]
    InvalidTokenUpdateMode,

    #[error("Token metadata name is too long")]
    InvalidTokenMetadataName,

    #[error("Invalid timestamp")]
    BadTimestamp,

    #[error("TWAP is not enabled for this token")]
    TwapNotEnabled,

    #[error("Not enough price samples in period to compute TWAP")]
    TwapNotEnoughSamplesInPeriod,

    #[error("The provided token list to refresh is empty")]
    EmptyTokenList,

    #[error("Signer is not the feed admin")]
    Unauthorized,

    #[error("Some prices could not be refreshed: {0:?}")]
    PartialRefresh(Vec<u16>),

    #[error("The oracle type requires an extra account in its mapping")]
    MissingExtraAccount,

    #[error("The TWAP source must be another token of the feed")]
    InvalidTwapSource,
}

impl<T> From<TryFromPrimitiveError<T>> for ScopeError
where
    T: TryFromPrimitive,
{
    fn from(_: TryFromPrimitiveError<T>) -> Self {
        ScopeError::ConversionFailure
    }
}

impl From<TryFromIntError> for ScopeError {
    fn from(_: TryFromIntError) -> Self {
        ScopeError::OutOfRangeIntegralConversion
    }
}

pub type ScopeResult<T = ()> = std::result::Result<T, ScopeError>;

impl From<DecimalError> for ScopeError {
    fn from(err: DecimalError) -> ScopeError {
        match err {
            DecimalError::MathOverflow => ScopeError::IntegerOverflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_convert() {
        let err: ScopeError = DecodeError::RoundIncomplete.into();
        assert_eq!(err, ScopeError::Decode(DecodeError::RoundIncomplete));
        let err: ScopeError = u8::try_from(300_u16).unwrap_err().into();
        assert_eq!(err, ScopeError::OutOfRangeIntegralConversion);
    }

    #[test]
    fn display_includes_cause() {
        let err = ScopeError::Decode(DecodeError::StaleOrInvalid);
        assert_eq!(
            err.to_string(),
            "Oracle decoding failed: Price is stale or not valid"
        );
    }
}
