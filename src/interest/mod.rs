pub mod accrual;
pub mod calendar;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::LoanRecord;
use crate::types::AccrualModel;

pub use accrual::{accrued_simple_interest, AmortizedAccrual, SimpleAccrual};
pub use calendar::{add_months, elapsed_whole_months, parse_date};

/// interest calculation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestCalculation {
    pub interest_amount: Money,
    /// months the amount covers
    pub months: u32,
    pub principal_base: Money,
    pub monthly_rate: Rate,
    pub calculation_method: AccrualModel,
}

/// trait for interest calculations
///
/// Implementations are pure: the same loan and instant always give the
/// same result, and the instant is never read from a clock internally.
pub trait AccrualCalculator {
    fn calculate_interest(&self, loan: &LoanRecord, at: DateTime<Utc>) -> Result<InterestCalculation>;

    fn accrued_interest(&self, loan: &LoanRecord, at: DateTime<Utc>) -> Result<Money> {
        Ok(self.calculate_interest(loan, at)?.interest_amount)
    }

    /// same as `calculate_interest`, with the instant taken from an injected clock
    fn calculate_interest_with_clock(
        &self,
        loan: &LoanRecord,
        time_provider: &SafeTimeProvider,
    ) -> Result<InterestCalculation> {
        self.calculate_interest(loan, time_provider.now())
    }
}

impl AccrualCalculator for AccrualModel {
    fn calculate_interest(&self, loan: &LoanRecord, at: DateTime<Utc>) -> Result<InterestCalculation> {
        match self {
            AccrualModel::Simple => SimpleAccrual.calculate_interest(loan, at),
            AccrualModel::Amortized => AmortizedAccrual.calculate_interest(loan, at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Grams;
    use chrono::{Duration, NaiveDate, TimeZone};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn loan() -> LoanRecord {
        LoanRecord::builder()
            .taken()
            .principal(Money::from_major(10_000))
            .monthly_rate_pct(dec!(1))
            .term_months(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .gold_grams(Grams::from_whole(15))
            .build()
            .unwrap()
    }

    #[test]
    fn test_model_dispatch() {
        let loan = loan();
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let simple = AccrualModel::Simple.calculate_interest(&loan, at).unwrap();
        let amortized = AccrualModel::Amortized.calculate_interest(&loan, at).unwrap();

        assert_eq!(simple, SimpleAccrual.calculate_interest(&loan, at).unwrap());
        assert_eq!(amortized, AmortizedAccrual.calculate_interest(&loan, at).unwrap());
        assert_eq!(simple.interest_amount, Money::from_major(300));
        assert!(amortized.interest_amount > simple.interest_amount);
    }

    #[test]
    fn test_injected_clock() {
        let loan = loan();
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let control = time.test_control().unwrap();

        let at_start = AccrualModel::Simple.calculate_interest_with_clock(&loan, &time).unwrap();
        assert_eq!(at_start.interest_amount, Money::ZERO);

        control.advance(Duration::days(60)); // march 1st
        let later = AccrualModel::Simple.calculate_interest_with_clock(&loan, &time).unwrap();
        assert_eq!(later.months, 2);
        assert_eq!(later.interest_amount, Money::from_major(200));
    }
}
