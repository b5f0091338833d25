use std::{collections::HashMap, fmt, str::FromStr};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::FinanceError;

/// Demo conversion rate used when no configuration overrides it.
pub const DEFAULT_EUR_TO_DKK: Decimal = dec!(7.5);

/// Currencies supported by accounts, payments, and invoices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    DKK,
    EUR,
    USD,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::DKK, Currency::EUR, Currency::USD];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::DKK => "DKK",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::DKK
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DKK" => Ok(Currency::DKK),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            other => Err(FinanceError::validation(format!(
                "unsupported currency `{}`",
                other
            ))),
        }
    }
}

/// Adds amounts, returning `None` instead of panicking when the total overflows.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// Adds amounts, clamping at the decimal bounds. Reports use this so a read never panics.
pub fn saturating_sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}

/// Supplies conversion rates into the reporting base currency.
///
/// Implementations may be backed by a static table or a live feed; aggregation code
/// only ever sees this trait.
pub trait RateProvider: Send + Sync {
    /// Currency that converted amounts are expressed in.
    fn base(&self) -> Currency;

    /// Multiplier turning one unit of `currency` into the base currency, if known.
    fn rate_to_base(&self, currency: Currency) -> Option<Decimal>;

    /// Converts an amount, returning `None` when no rate is available or the result overflows.
    fn convert(&self, amount: Decimal, currency: Currency) -> Option<ConvertedAmount> {
        let rate = self.rate_to_base(currency)?;
        Some(ConvertedAmount {
            amount: amount.checked_mul(rate)?,
            rate_used: rate,
            from: currency,
            to: self.base(),
        })
    }
}

/// Static rate table. The base currency always converts at parity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedRateTable {
    base: Currency,
    rates: HashMap<Currency, Decimal>,
}

impl FixedRateTable {
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    /// The demo table: DKK base with a fixed EUR rate and no USD rate.
    pub fn danish_demo() -> Self {
        Self::new(Currency::DKK).with_rate(Currency::EUR, DEFAULT_EUR_TO_DKK)
    }

    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.set_rate(currency, rate);
        self
    }

    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) {
        self.rates.insert(currency, rate);
    }
}

impl Default for FixedRateTable {
    fn default() -> Self {
        Self::danish_demo()
    }
}

impl RateProvider for FixedRateTable {
    fn base(&self) -> Currency {
        self.base
    }

    fn rate_to_base(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }
}

/// Result of a currency conversion, kept for disclosure in reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAmount {
    pub amount: Decimal,
    pub rate_used: Decimal,
    pub from: Currency,
    pub to: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_table_converts_eur_and_skips_usd() {
        let table = FixedRateTable::danish_demo();
        assert_eq!(table.rate_to_base(Currency::DKK), Some(Decimal::ONE));
        let converted = table.convert(dec!(100), Currency::EUR).expect("eur rate");
        assert_eq!(converted.amount, dec!(750));
        assert_eq!(converted.to, Currency::DKK);
        assert!(table.convert(dec!(100), Currency::USD).is_none());
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::EUR);
        assert!("GBP".parse::<Currency>().is_err());
    }
}
