use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::interest::{AccrualCalculator, InterestCalculation};
use crate::loan::LoanRecord;
use crate::types::AccrualModel;

/// flat monthly interest, clamped to the loan term
///
/// Each whole month since the start date adds `principal * monthly rate`;
/// nothing accrues on accrued interest, before the start date, or past the
/// term.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAccrual;

impl SimpleAccrual {
    pub fn new() -> Self {
        SimpleAccrual
    }
}

impl AccrualCalculator for SimpleAccrual {
    fn calculate_interest(&self, loan: &LoanRecord, at: DateTime<Utc>) -> Result<InterestCalculation> {
        loan.validate()?;

        let months = loan.months_accrued(at.date_naive());
        let monthly_rate = loan.rate.monthly_rate();
        let interest = loan
            .principal
            .as_decimal()
            .checked_mul(monthly_rate.as_decimal())
            .and_then(|monthly| monthly.checked_mul(Decimal::from(months)))
            .map(Money::from_decimal)
            .ok_or_else(|| LoanError::CalculationError {
                message: format!(
                    "simple interest overflow on {} at {} over {} months",
                    loan.principal, monthly_rate, months
                ),
            })?;

        Ok(InterestCalculation {
            interest_amount: interest,
            months,
            principal_base: loan.principal,
            monthly_rate,
            calculation_method: AccrualModel::Simple,
        })
    }
}

/// full-term interest of the level-payment schedule
///
/// Time does not enter: the figure is the projection's total interest, the
/// same value the storage side keeps alongside an amortized loan.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizedAccrual;

impl AmortizedAccrual {
    pub fn new() -> Self {
        AmortizedAccrual
    }
}

impl AccrualCalculator for AmortizedAccrual {
    fn calculate_interest(&self, loan: &LoanRecord, _at: DateTime<Utc>) -> Result<InterestCalculation> {
        let schedule = loan.amortized_schedule()?;

        Ok(InterestCalculation {
            interest_amount: schedule.total_interest,
            months: schedule.term_months,
            principal_base: schedule.principal,
            monthly_rate: schedule.monthly_rate,
            calculation_method: AccrualModel::Amortized,
        })
    }
}

/// interest accrued on `loan` by `at` under the simple model
pub fn accrued_simple_interest(loan: &LoanRecord, at: DateTime<Utc>) -> Result<Money> {
    SimpleAccrual.accrued_interest(loan, at)
}
