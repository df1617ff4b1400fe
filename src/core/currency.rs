//! Currency codes, the known-currency table and the rate lookup abstraction

use crate::core::conversion::ConversionError;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::{fs, path::Path};
use tracing::debug;

const BUILTIN_TABLE: &str = include_str!("../../assets/currencies.yaml");

/// An ISO-4217 code that is known to belong to a [`CurrencySet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(CurrencyCode(code.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CurrencyInfo {
    /// ISO-3166 alpha-2 country used for the flag image.
    pub country: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyTable {
    currencies: BTreeMap<String, CurrencyInfo>,
}

/// Read-only table of the currencies a user may pick, ordered by code.
#[derive(Debug, Clone)]
pub struct CurrencySet {
    currencies: BTreeMap<CurrencyCode, CurrencyInfo>,
}

impl CurrencySet {
    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_TABLE).context("Failed to parse built-in currency table")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read currency table: {}", path.as_ref().display())
        })?;
        Self::from_yaml(&table).with_context(|| {
            format!("Failed to parse currency table: {}", path.as_ref().display())
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: CurrencyTable = serde_yaml::from_str(yaml)?;

        let mut currencies = BTreeMap::new();
        for (code, info) in table.currencies {
            let Some(parsed) = CurrencyCode::parse(&code) else {
                bail!("Invalid currency code in table: {code}");
            };
            if info.country.len() != 2 || !info.country.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("Invalid country code {} for currency {}", info.country, code);
            }
            let info = CurrencyInfo {
                country: info.country.to_ascii_uppercase(),
                name: info.name,
            };
            if currencies.insert(parsed, info).is_some() {
                bail!("Duplicate currency code in table: {code}");
            }
        }

        if currencies.is_empty() {
            bail!("Currency table is empty");
        }
        debug!("Loaded {} currencies", currencies.len());
        Ok(CurrencySet { currencies })
    }

    /// Maps free text (case-insensitive) onto a known code.
    pub fn resolve(&self, code: &str) -> Result<CurrencyCode, ConversionError> {
        CurrencyCode::parse(code)
            .filter(|parsed| self.currencies.contains_key(parsed))
            .ok_or_else(|| ConversionError::UnknownCurrency(code.trim().to_string()))
    }

    /// All codes, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.currencies.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &CurrencyInfo)> {
        self.currencies.iter()
    }

    pub fn info(&self, code: &CurrencyCode) -> Option<&CurrencyInfo> {
        self.currencies.get(code)
    }

    /// Human-readable name, or the code itself when the table has none.
    pub fn name_of<'a>(&'a self, code: &'a CurrencyCode) -> &'a str {
        self.info(code)
            .and_then(|info| info.name.as_deref())
            .unwrap_or(code.as_str())
    }

    pub fn flag_url(&self, code: &CurrencyCode, flags_base_url: &str) -> Option<String> {
        self.info(code)
            .map(|info| flag_url(flags_base_url, &info.country))
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

pub fn flag_url(flags_base_url: &str, country: &str) -> String {
    format!("{}/{}/flat/64.png", flags_base_url.trim_end_matches('/'), country)
}

/// Looks up how many units of `to` one unit of `from` buys.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn lookup(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let set = CurrencySet::builtin().expect("built-in table should parse");
        assert!(set.len() > 100);

        let usd = set.resolve("USD").unwrap();
        let inr = set.resolve("inr").unwrap();
        assert_eq!(inr.as_str(), "INR");
        assert_eq!(set.name_of(&usd), "US Dollar");
        assert_eq!(set.info(&inr).unwrap().country, "IN");

        let codes: Vec<&str> = set.codes().map(|c| c.as_str()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_name_falls_back_to_code() {
        let set = CurrencySet::builtin().unwrap();
        let aed = set.resolve("AED").unwrap();
        assert_eq!(set.name_of(&aed), "AED");
    }

    #[test]
    fn test_resolve_rejects_unknown_codes() {
        let set = CurrencySet::builtin().unwrap();
        for code in ["XYZ", "US", "USDX", "1AB", ""] {
            assert!(
                matches!(set.resolve(code), Err(ConversionError::UnknownCurrency(_))),
                "code {code:?}"
            );
        }
    }

    #[test]
    fn test_flag_url() {
        let set = CurrencySet::builtin().unwrap();
        let eur = set.resolve("EUR").unwrap();
        assert_eq!(
            set.flag_url(&eur, "https://flagsapi.com/").as_deref(),
            Some("https://flagsapi.com/FR/flat/64.png")
        );
    }

    #[test]
    fn test_custom_table() {
        let yaml = r#"
currencies:
  usd: { country: us, name: "Dollar" }
  GBP:
    country: GB
"#;
        let set = CurrencySet::from_yaml(yaml).unwrap();
        assert_eq!(set.len(), 2);
        let usd = set.resolve("USD").unwrap();
        assert_eq!(set.info(&usd).unwrap().country, "US");
        assert!(set.resolve("INR").is_err());
    }

    #[test]
    fn test_invalid_tables_are_rejected() {
        assert!(CurrencySet::from_yaml("currencies: {}").is_err());
        assert!(CurrencySet::from_yaml("currencies:\n  DOLLAR: { country: US }").is_err());
        assert!(CurrencySet::from_yaml("currencies:\n  USD: { country: USA }").is_err());
        assert!(
            CurrencySet::from_yaml("currencies:\n  usd: { country: US }\n  USD: { country: US }")
                .is_err()
        );
    }
}
