//! Amount entry: lenient parsing into a positive decimal, and the keystroke
//! filter applied to the free-text amount field.

use crate::core::conversion::ConversionError;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

/// A strictly positive amount of the source currency.
///
/// Anything that does not parse to a positive number becomes `1`, and the
/// substitution is remembered so a front end can echo it back. Numbers too
/// large for a `Decimal` are an error rather than a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    value: Decimal,
    defaulted: bool,
}

impl Amount {
    /// Parses the leading numeric part of `text` (`"12abc"` reads as 12,
    /// `".5"` as 0.5). Empty, non-numeric and non-positive input yields 1.
    ///
    /// Fractions beyond 28 places are rounded half away from zero first, so
    /// only a value that rounds to zero is replaced. An integer part that does
    /// not fit a `Decimal` fails with [`ConversionError::AmountOutOfRange`].
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let Some(prefix) = numeric_prefix(text) else {
            return Ok(Self::fallback());
        };
        let out_of_range = || ConversionError::AmountOutOfRange(prefix.clone());

        let (whole, fraction) = prefix.split_once('.').unwrap_or((prefix.as_str(), ""));
        let whole = match whole.trim_start_matches('0') {
            "" => Decimal::ZERO,
            digits => Decimal::from_str(digits).map_err(|_| out_of_range())?,
        };
        let fraction = fraction_value(fraction).ok_or_else(out_of_range)?;
        let value = whole.checked_add(fraction).ok_or_else(out_of_range)?;
        Ok(Self::new(value))
    }

    /// Wraps a decimal, substituting 1 for values that are not positive.
    pub fn new(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Amount {
                value,
                defaulted: false,
            }
        } else {
            Self::fallback()
        }
    }

    fn fallback() -> Self {
        Amount {
            value: Decimal::ONE,
            defaulted: true,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// True when the input was rejected and replaced with 1.
    pub fn was_defaulted(&self) -> bool {
        self.defaulted
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount {
            value: Decimal::ONE,
            defaulted: false,
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

fn numeric_prefix(text: &str) -> Option<String> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);

    let mut prefix = String::new();
    let mut seen_dot = false;
    for c in text.chars() {
        match c {
            '0'..='9' => prefix.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                prefix.push(c);
            }
            _ => break,
        }
    }

    let prefix = prefix.trim_end_matches('.');
    if !prefix.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if prefix.starts_with('.') {
        Some(format!("0{prefix}"))
    } else {
        Some(prefix.to_string())
    }
}

const FRACTION_PLACES: u32 = 28;

/// Reads a run of fractional digits, rounded half away from zero at the
/// 28 places a `Decimal` can hold.
fn fraction_value(digits: &str) -> Option<Decimal> {
    let max = FRACTION_PLACES as usize;
    let kept = &digits[..digits.len().min(max)];
    if kept.is_empty() {
        return Some(Decimal::ZERO);
    }

    let value = Decimal::from_str(&format!("0.{kept}")).ok()?;
    match digits.as_bytes().get(max) {
        Some(b'5'..=b'9') => value.checked_add(Decimal::new(1, FRACTION_PLACES)),
        _ => Some(value),
    }
}

/// Filters the amount field after an edit: only `[0-9.]` survives, and when
/// a second decimal point shows up the last character is discarded.
pub fn sanitize_amount_input(value: &str) -> String {
    let mut filtered: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if filtered.matches('.').count() > 1 {
        filtered.pop();
    }
    filtered
}

/// The free-text amount field, filtered one typed character at a time.
#[derive(Debug, Clone, Default)]
pub struct AmountField {
    value: String,
}

impl AmountField {
    pub fn new(initial: &str) -> Self {
        let mut field = Self::default();
        field.input(initial);
        field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Appends `text` as if it were typed, running the filter after every
    /// character.
    pub fn input(&mut self, text: &str) {
        for c in text.chars() {
            self.value.push(c);
            self.value = sanitize_amount_input(&self.value);
        }
    }

    /// Replaces the field content with `text`, typed from an empty field.
    pub fn set(&mut self, text: &str) {
        self.value.clear();
        self.input(text);
    }

    /// Reads the field as an amount. A rejected value is written back as `1`;
    /// an out-of-range one is left in place for the user to fix.
    pub fn amount(&mut self) -> Result<Amount, ConversionError> {
        let amount = Amount::parse(&self.value)?;
        if amount.was_defaulted() {
            self.value = "1".to_string();
        }
        Ok(amount)
    }
}
