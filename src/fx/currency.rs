use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing currency of a traded instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    JPY,
    USD,
    KRW,
    EUR,
    GBP,
    Other(String),
}

impl Currency {
    pub fn as_str(&self) -> &str {
        match self {
            Currency::JPY => "JPY",
            Currency::USD => "USD",
            Currency::KRW => "KRW",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::Other(code) => code.as_str(),
        }
    }

    pub fn from_code(code: &str) -> Currency {
        match code.to_ascii_uppercase().as_str() {
            "JPY" => Currency::JPY,
            "USD" => Currency::USD,
            "KRW" => Currency::KRW,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            other => Currency::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref ALL_DIGITS: Regex = Regex::new(r"^\d+$").unwrap();
}

/// One ticker-format rule: tickers matching `pattern` are listed in `currency`.
#[derive(Debug, Clone)]
pub struct TickerFormatRule {
    pattern: Regex,
    currency: Currency,
}

impl TickerFormatRule {
    pub fn new(pattern: &str, currency: Currency) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            currency,
        })
    }
}

/// Resolves a ticker symbol to its listing currency through an ordered
/// registry of format rules. Rules registered later take precedence over the
/// defaults, so host-specific listings (local codes, OTC suffixes) can be
/// layered on without touching the engine.
#[derive(Debug, Clone)]
pub struct CurrencyClassifier {
    rules: Vec<TickerFormatRule>,
    fallback: Currency,
}

impl CurrencyClassifier {
    /// Registry matching the broker exports the engine was built around:
    /// bare numeric codes and `.T` suffixes are Tokyo listings, `.KS`/`.KQ`
    /// are Korean listings, everything else defaults to a US listing.
    pub fn with_defaults() -> Self {
        let rules = vec![
            TickerFormatRule {
                pattern: ALL_DIGITS.clone(),
                currency: Currency::JPY,
            },
            TickerFormatRule::new(r"\.T$", Currency::JPY).unwrap(),
            TickerFormatRule::new(r"\.(KS|KQ)$", Currency::KRW).unwrap(),
        ];
        Self {
            rules,
            fallback: Currency::USD,
        }
    }

    pub fn empty(fallback: Currency) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Registers a rule ahead of the existing ones.
    pub fn register(&mut self, pattern: &str, currency: Currency) -> Result<(), regex::Error> {
        self.rules.insert(0, TickerFormatRule::new(pattern, currency)?);
        Ok(())
    }

    pub fn classify(&self, ticker: &str) -> Currency {
        for rule in &self.rules {
            if rule.pattern.is_match(ticker) {
                return rule.currency.clone();
            }
        }
        self.fallback.clone()
    }
}

impl Default for CurrencyClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}
