//! presentation views of loans
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Grams, Money};
use crate::errors::Result;
use crate::interest::AccrualCalculator;
use crate::loan::LoanRecord;
use crate::payments::AmortizedSchedule;
use crate::types::{AccrualModel, Direction, LoanId, LoanStatus};

/// serializable per-loan figures as of one instant
///
/// Every financial value comes from the accrual calculator; consumers
/// display these and never recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: LoanId,
    pub direction: Direction,
    pub status: LoanStatus,
    pub counterparty: Option<String>,
    pub principal: Money,
    pub monthly_rate_pct: Decimal,
    pub annual_rate_pct: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_months: u32,
    pub months_elapsed: u32,
    pub months_remaining: u32,
    pub accrual_model: AccrualModel,
    pub accrued_interest: Money,
    pub overdue: bool,
    pub gold: GoldView,
    pub projection: ProjectionView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldView {
    pub grams: Grams,
    pub karats: Option<u8>,
    pub fine_grams: Option<Grams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionView {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_amount: Money,
}

impl ProjectionView {
    fn from_schedule(schedule: &AmortizedSchedule, dp: u32) -> Self {
        Self {
            monthly_payment: schedule.monthly_payment.round_dp(dp),
            total_interest: schedule.total_interest.round_dp(dp),
            total_amount: schedule.total_amount.round_dp(dp),
        }
    }
}

impl LoanView {
    pub fn build(loan: &LoanRecord, model: AccrualModel, at: DateTime<Utc>, dp: u32) -> Result<Self> {
        let calculation = model.calculate_interest(loan, at)?;
        let schedule = loan.amortized_schedule()?;

        Ok(LoanView {
            id: loan.id,
            direction: loan.direction,
            status: loan.status,
            counterparty: loan.counterparty.clone(),
            principal: loan.principal,
            monthly_rate_pct: loan.rate.monthly_pct().round_dp(dp),
            annual_rate_pct: loan.rate.annual_pct().round_dp(dp),
            start_date: loan.start_date,
            end_date: loan.end_date()?,
            term_months: loan.term_months,
            months_elapsed: loan.months_elapsed(at.date_naive()),
            months_remaining: loan.months_remaining_at(at),
            accrual_model: model,
            accrued_interest: calculation.interest_amount.round_dp(dp),
            overdue: loan.is_overdue_at(at)?,
            gold: GoldView {
                grams: loan.gold.grams,
                karats: loan.gold.purity.map(|p| p.karats()),
                fine_grams: loan.fine_gold_grams(),
            },
            projection: ProjectionView::from_schedule(&schedule, dp),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
