//! Conversion request/result types and the errors a conversion can end in.

use crate::core::amount::Amount;
use crate::core::currency::{CurrencyCode, CurrencySet};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Places shown for the exchange rate.
pub const RATE_PLACES: u32 = 4;
/// Places kept for the converted amount.
pub const AMOUNT_PLACES: u32 = 2;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Exchange rate {from}->{to} unavailable: {reason}")]
    RateUnavailable {
        from: CurrencyCode,
        to: CurrencyCode,
        reason: String,
    },
    #[error("A conversion is already in progress")]
    Busy,
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
    #[error("Converted amount is out of range")]
    AmountOverflow,
    #[error("Amount is out of range: {0}")]
    AmountOutOfRange(String),
}

impl ConversionError {
    /// Message shown to the user when a conversion fails.
    pub fn notice(&self) -> String {
        match self {
            ConversionError::RateUnavailable { .. } => {
                "Failed to get exchange rate. Try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Amount,
    pub source: CurrencyCode,
    pub target: CurrencyCode,
}

impl ConversionRequest {
    pub fn new(amount: Amount, source: CurrencyCode, target: CurrencyCode) -> Self {
        ConversionRequest {
            amount,
            source,
            target,
        }
    }

    /// Builds a request from raw user input. Currency codes must be in
    /// `currencies`; the amount is normalized by [`Amount::parse`].
    pub fn from_input(
        amount: &str,
        source: &str,
        target: &str,
        currencies: &CurrencySet,
    ) -> Result<Self, ConversionError> {
        Ok(Self::new(
            Amount::parse(amount)?,
            currencies.resolve(source)?,
            currencies.resolve(target)?,
        ))
    }

    /// The same request with source and target exchanged.
    pub fn swapped(&self) -> Self {
        ConversionRequest {
            amount: self.amount,
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionResult {
    /// Target units per one source unit, as returned by the provider.
    pub rate: Decimal,
    /// `amount * rate`, rounded to [`AMOUNT_PLACES`].
    pub converted_amount: Decimal,
}

impl ConversionResult {
    pub fn compute(amount: &Amount, rate: Decimal) -> Result<Self, ConversionError> {
        let product = amount
            .value()
            .checked_mul(rate)
            .ok_or(ConversionError::AmountOverflow)?;
        Ok(ConversionResult {
            rate,
            converted_amount: to_places(product, AMOUNT_PLACES),
        })
    }
}

/// Text for the rate and result output fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionDisplay {
    pub rate_text: String,
    pub result_text: String,
}

impl ConversionDisplay {
    pub fn new(request: &ConversionRequest, result: &ConversionResult) -> Self {
        ConversionDisplay {
            rate_text: format!("{} {}", to_places(result.rate, RATE_PLACES), request.target),
            result_text: format!(
                "{} {} = {} {}",
                request.amount,
                request.source,
                to_places(result.converted_amount, AMOUNT_PLACES),
                request.target
            ),
        }
    }
}

/// Rounds half away from zero and pads to exactly `places` decimals.
///
/// Rounding happens on the decimal value, so a midpoint such as 1.23455 at
/// 4 places gives 1.2346. A binary float formatter like JavaScript's
/// `toFixed` sees 1.234549999... there and prints 1.2345.
fn to_places(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}
