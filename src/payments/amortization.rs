use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::loan::MAX_TERM_MONTHS;
use crate::types::InterestRate;

/// level-payment projection for a fixed-rate, fixed-term loan
///
/// Always derived from principal, rate and term. There is no way to build
/// one from stored figures, so a stale projection cannot outlive a change
/// to its drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizedSchedule {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_amount: Money,
}

impl AmortizedSchedule {
    /// calculate the level payment and totals
    ///
    /// `payment = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate;
    /// a zero rate splits principal evenly across the term.
    pub fn calculate(principal: Money, rate: InterestRate, term_months: u32) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LoanError::invalid_terms(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if rate.is_negative() {
            return Err(LoanError::invalid_terms("interest rate must not be negative"));
        }
        if term_months == 0 {
            return Err(LoanError::invalid_terms("term must be at least one month"));
        }
        if term_months > MAX_TERM_MONTHS {
            return Err(LoanError::invalid_terms(format!(
                "term of {} months exceeds the {} month limit",
                term_months, MAX_TERM_MONTHS
            )));
        }

        let monthly_rate = rate.monthly_rate();
        let n = Decimal::from(term_months);

        let (monthly_payment, total_interest) = if monthly_rate.is_zero() {
            (Money::from_decimal(principal.as_decimal() / n), Money::ZERO)
        } else {
            let payment = level_payment(principal, monthly_rate, term_months)?;
            let repaid = payment.checked_mul(n).ok_or_else(|| overflow("total repayment"))?;
            (payment, repaid - principal)
        };
        let total_amount = principal
            .checked_add(total_interest)
            .ok_or_else(|| overflow("total amount"))?;

        Ok(Self {
            principal,
            monthly_rate,
            term_months,
            monthly_payment,
            total_interest,
            total_amount,
        })
    }

    /// principal/interest split of every payment over the term
    pub fn installments(&self) -> Vec<Installment> {
        let mut rows = Vec::with_capacity(self.term_months as usize);
        let mut balance = self.principal;

        for number in 1..=self.term_months {
            let interest = balance.apply(self.monthly_rate);

            // the last payment settles whatever rounding left on the balance
            let (payment, principal_portion) = if number == self.term_months {
                (balance + interest, balance)
            } else {
                (self.monthly_payment, self.monthly_payment - interest)
            };

            let closing = balance - principal_portion;
            rows.push(Installment {
                number,
                opening_balance: balance,
                payment,
                interest,
                principal: principal_portion,
                closing_balance: closing,
            });
            balance = closing;
        }

        rows
    }
}

/// one period of an amortized schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub number: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

fn level_payment(principal: Money, monthly_rate: Rate, months: u32) -> Result<Money> {
    let r = monthly_rate.as_decimal();
    let base = Decimal::ONE + r;

    let compound = base.checked_powu(u64::from(months)).ok_or_else(|| LoanError::CalculationError {
        message: format!("compound factor overflow at {} over {} months", monthly_rate, months),
    })?;

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| overflow("level payment numerator"))?;
    let denominator = compound - Decimal::ONE;

    numerator
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or_else(|| overflow("level payment"))
}

fn overflow(what: &str) -> LoanError {
    LoanError::CalculationError {
        message: format!("{} overflow", what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_annuity_values() {
        let schedule = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Annual(dec!(12)),
            12,
        )
        .unwrap();

        assert_eq!(schedule.monthly_rate, Rate::from_percentage(1));
        assert_eq!(schedule.monthly_payment.round_dp(2), Money::from_decimal(dec!(8884.88)));
        assert_eq!(schedule.total_interest.round_dp(2), Money::from_decimal(dec!(6618.55)));
        assert_eq!(
            schedule.total_amount,
            Money::from_major(100_000) + schedule.total_interest
        );
    }

    #[test]
    fn test_monthly_rate_input_matches_annual() {
        let from_monthly = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Monthly(dec!(1)),
            12,
        )
        .unwrap();
        let from_annual = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Annual(dec!(12)),
            12,
        )
        .unwrap();

        assert_eq!(from_monthly, from_annual);
    }

    #[test]
    fn test_zero_rate_splits_principal() {
        let schedule = AmortizedSchedule::calculate(
            Money::from_major(120_000),
            InterestRate::Annual(Decimal::ZERO),
            12,
        )
        .unwrap();

        assert_eq!(schedule.monthly_payment, Money::from_major(10_000));
        assert_eq!(schedule.total_interest, Money::ZERO);
        assert_eq!(schedule.total_amount, Money::from_major(120_000));

        let uneven = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Monthly(Decimal::ZERO),
            12,
        )
        .unwrap();
        assert_eq!(uneven.monthly_payment, Money::from_decimal(dec!(100000) / dec!(12)));
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let zero_principal =
            AmortizedSchedule::calculate(Money::ZERO, InterestRate::Annual(dec!(10)), 12);
        assert!(matches!(zero_principal, Err(LoanError::InvalidLoanTerms { .. })));

        let negative_rate =
            AmortizedSchedule::calculate(Money::from_major(1_000), InterestRate::Annual(dec!(-1)), 12);
        assert!(matches!(negative_rate, Err(LoanError::InvalidLoanTerms { .. })));

        let zero_term =
            AmortizedSchedule::calculate(Money::from_major(1_000), InterestRate::Annual(dec!(10)), 0);
        assert!(matches!(zero_term, Err(LoanError::InvalidLoanTerms { .. })));
    }

    #[test]
    fn test_single_month_term() {
        let schedule = AmortizedSchedule::calculate(
            Money::from_major(10_000),
            InterestRate::Monthly(dec!(2)),
            1,
        )
        .unwrap();

        assert_eq!(schedule.monthly_payment, Money::from_major(10_200));
        assert_eq!(schedule.total_interest, Money::from_major(200));
    }

    #[test]
    fn test_installments_retire_principal() {
        let schedule = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Annual(dec!(12)),
            12,
        )
        .unwrap();
        let rows = schedule.installments();

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].interest, Money::from_major(1_000));
        assert_eq!(rows[0].opening_balance, Money::from_major(100_000));
        assert_eq!(rows[11].closing_balance, Money::ZERO);

        let principal_paid: Money = rows.iter().map(|r| r.principal).sum();
        assert_eq!(principal_paid, Money::from_major(100_000));

        let interest_paid: Money = rows.iter().map(|r| r.interest).sum();
        let drift = (interest_paid - schedule.total_interest).abs();
        assert!(drift < Money::from_decimal(dec!(0.0001)));

        // interest share falls as the balance is paid down
        assert!(rows[5].interest < rows[4].interest);
    }

    #[test]
    fn test_term_limit() {
        let longest = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Annual(dec!(0.0001)),
            MAX_TERM_MONTHS,
        )
        .unwrap();
        assert_eq!(longest.installments().len(), MAX_TERM_MONTHS as usize);
        assert!(longest.total_interest.is_positive());

        let too_long = AmortizedSchedule::calculate(
            Money::from_major(100_000),
            InterestRate::Annual(dec!(0.0001)),
            200_000_000,
        );
        assert!(matches!(too_long, Err(LoanError::InvalidLoanTerms { .. })));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let result = AmortizedSchedule::calculate(
            Money::from_decimal(dec!(50000000000000000000000000000)),
            InterestRate::Monthly(dec!(100)),
            12,
        );
        assert!(matches!(result, Err(LoanError::CalculationError { .. })));
    }
}
