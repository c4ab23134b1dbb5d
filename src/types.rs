use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Grams, Rate};
use crate::errors::{LoanError, Result};

/// unique identifier for a loan record
pub type LoanId = Uuid;

/// which side of the loan the tracked party is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// the party borrowed (liability)
    Taken,
    /// the party lent (asset)
    Given,
}

impl Direction {
    pub fn is_asset(&self) -> bool {
        matches!(self, Direction::Given)
    }
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// loan running
    #[default]
    Active,
    /// fully repaid
    #[serde(alias = "completed")]
    Paid,
    /// past its end date without repayment
    #[serde(alias = "defaulted")]
    Overdue,
}

/// agreed interest rate, as a percentage per month or per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestRate {
    Monthly(Decimal),
    Annual(Decimal),
}

impl InterestRate {
    /// monthly percentage (annual / 12 when only annual was agreed)
    pub fn monthly_pct(&self) -> Decimal {
        match *self {
            InterestRate::Monthly(pct) => pct,
            InterestRate::Annual(pct) => pct / Decimal::from(12),
        }
    }

    /// annual percentage (monthly * 12 when only monthly was agreed)
    pub fn annual_pct(&self) -> Decimal {
        match *self {
            InterestRate::Monthly(pct) => pct * Decimal::from(12),
            InterestRate::Annual(pct) => pct,
        }
    }

    /// monthly rate as a fraction, the unit both accrual models work in
    pub fn monthly_rate(&self) -> Rate {
        match *self {
            InterestRate::Monthly(pct) => Rate::from_percentage_decimal(pct),
            InterestRate::Annual(pct) => Rate::from_percentage_decimal(pct).monthly_rate(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match *self {
            InterestRate::Monthly(pct) | InterestRate::Annual(pct) => pct < Decimal::ZERO,
        }
    }
}

/// gold purity in karats (24 is pure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GoldPurity(u8);

impl GoldPurity {
    pub const PURE: GoldPurity = GoldPurity(24);

    pub fn new(karats: u8) -> Result<Self> {
        if karats == 0 || karats > 24 {
            return Err(LoanError::invalid_terms(format!(
                "gold purity must be between 1 and 24 karats, got {}",
                karats
            )));
        }
        Ok(GoldPurity(karats))
    }

    /// from a share of pure gold in percent, rounded to the nearest karat
    ///
    /// 91.6 reads as 22k and 75 as 18k.
    pub fn from_percentage(pct: Decimal) -> Result<Self> {
        if pct <= Decimal::ZERO || pct > Decimal::from(100) {
            return Err(LoanError::invalid_terms(format!(
                "gold purity must be a percentage above 0 and at most 100, got {}",
                pct
            )));
        }
        let karats = (pct * Decimal::from(24) / Decimal::from(100)).round();
        GoldPurity::new(karats.to_u8().unwrap_or(0))
    }

    /// purity as stored by either record layout
    ///
    /// Values up to 24 are whole karats, larger values are percentages.
    pub fn from_stored(value: Decimal) -> Result<Self> {
        if value > Decimal::from(24) {
            return GoldPurity::from_percentage(value);
        }
        match value.to_u8() {
            Some(karats) if value.fract().is_zero() => GoldPurity::new(karats),
            _ => Err(LoanError::invalid_terms(format!(
                "gold purity {} is neither whole karats nor a percentage",
                value
            ))),
        }
    }

    pub fn karats(&self) -> u8 {
        self.0
    }

    /// share of pure gold, e.g. 22/24 for 22k
    pub fn fineness(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(24)
    }
}

impl TryFrom<u8> for GoldPurity {
    type Error = LoanError;

    fn try_from(karats: u8) -> Result<Self> {
        GoldPurity::new(karats)
    }
}

impl From<GoldPurity> for u8 {
    fn from(purity: GoldPurity) -> u8 {
        purity.0
    }
}

/// gold pledged as collateral (taken) or held against a loan (given)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoldHolding {
    pub grams: Grams,
    pub purity: Option<GoldPurity>,
}

impl GoldHolding {
    pub fn new(grams: Grams) -> Self {
        Self { grams, purity: None }
    }

    pub fn with_purity(grams: Grams, purity: GoldPurity) -> Self {
        Self {
            grams,
            purity: Some(purity),
        }
    }

    /// pure gold content, when purity is known
    pub fn fine_grams(&self) -> Option<Grams> {
        self.purity.map(|p| self.grams * p.fineness())
    }
}

/// accrual model a portfolio run is computed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccrualModel {
    /// flat monthly interest, clamped to the loan term
    #[default]
    Simple,
    /// level-payment schedule over the full term
    Amortized,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_normalization() {
        let annual = InterestRate::Annual(dec!(18));
        assert_eq!(annual.monthly_pct(), dec!(1.5));
        assert_eq!(annual.monthly_rate(), Rate::from_decimal(dec!(0.015)));

        let monthly = InterestRate::Monthly(dec!(2));
        assert_eq!(monthly.annual_pct(), dec!(24));
        assert_eq!(monthly.monthly_rate(), Rate::from_percentage(2));
        assert!(!monthly.is_negative());
        assert!(InterestRate::Monthly(dec!(-0.5)).is_negative());
    }

    #[test]
    fn test_gold_purity_bounds() {
        assert!(GoldPurity::new(0).is_err());
        assert!(GoldPurity::new(25).is_err());
        assert_eq!(GoldPurity::new(22).unwrap().karats(), 22);
    }

    #[test]
    fn test_purity_from_either_layout() {
        assert_eq!(GoldPurity::from_stored(dec!(22)).unwrap().karats(), 22);
        assert_eq!(GoldPurity::from_stored(dec!(91.6)).unwrap().karats(), 22);
        assert_eq!(GoldPurity::from_stored(dec!(75)).unwrap().karats(), 18);
        assert_eq!(GoldPurity::from_stored(dec!(99.9)).unwrap(), GoldPurity::PURE);
        assert_eq!(GoldPurity::from_percentage(dec!(58.5)).unwrap().karats(), 14);

        assert!(GoldPurity::from_stored(dec!(21.5)).is_err());
        assert!(GoldPurity::from_stored(dec!(0)).is_err());
        assert!(GoldPurity::from_stored(dec!(-18)).is_err());
        assert!(GoldPurity::from_stored(dec!(150)).is_err());
        // rounds to zero karats
        assert!(GoldPurity::from_percentage(dec!(1)).is_err());
    }

    #[test]
    fn test_fine_gold() {
        let holding = GoldHolding::with_purity(Grams::from_whole(48), GoldPurity::new(18).unwrap());
        assert_eq!(holding.fine_grams(), Some(Grams::from_whole(36)));
        assert_eq!(GoldHolding::new(Grams::from_whole(10)).fine_grams(), None);
    }

    #[test]
    fn test_status_aliases() {
        let paid: LoanStatus = serde_json::from_str("\"completed\"").unwrap();
        let overdue: LoanStatus = serde_json::from_str("\"defaulted\"").unwrap();
        assert_eq!(paid, LoanStatus::Paid);
        assert_eq!(overdue, LoanStatus::Overdue);
        assert_eq!(serde_json::to_string(&LoanStatus::Active).unwrap(), "\"active\"");
    }

    #[test]
    fn test_purity_rejected_on_deserialize() {
        assert!(serde_json::from_str::<GoldPurity>("30").is_err());
        assert_eq!(serde_json::from_str::<GoldPurity>("24").unwrap(), GoldPurity::PURE);
    }
}
