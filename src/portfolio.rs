use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, RateBasis, StatusFilter};
use crate::decimal::{Grams, Money};
use crate::errors::{LoanError, Result};
use crate::interest::AccrualCalculator;
use crate::loan::{LoanDocument, LoanRecord};
use crate::serialization::LoanView;
use crate::types::{AccrualModel, Direction};

/// running totals for one side of the book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionTotals {
    pub loans: u32,
    pub active_loans: u32,
    pub interest: Money,
    pub principal: Money,
    pub gold: Grams,
    /// sum of rate percentages in the configured basis
    pub rate_sum: Decimal,
    /// level payments of active loans, amortized model only
    pub monthly_payments: Money,
}

impl DirectionTotals {
    pub fn merge(self, other: Self) -> Result<Self> {
        Ok(Self {
            loans: totalled(self.loans.checked_add(other.loans), "loan count")?,
            active_loans: totalled(self.active_loans.checked_add(other.active_loans), "active loan count")?,
            interest: totalled(self.interest.checked_add(other.interest), "interest")?,
            principal: totalled(self.principal.checked_add(other.principal), "principal")?,
            gold: totalled(self.gold.checked_add(other.gold), "gold")?,
            rate_sum: totalled(self.rate_sum.checked_add(other.rate_sum), "rate sum")?,
            monthly_payments: totalled(
                self.monthly_payments.checked_add(other.monthly_payments),
                "monthly payments",
            )?,
        })
    }

    /// mean rate, zero when there are no loans on this side
    pub fn average_rate(&self) -> Decimal {
        if self.loans == 0 {
            return Decimal::ZERO;
        }
        (self.rate_sum / Decimal::from(self.loans)).round_dp(8)
    }
}

fn totalled<T>(sum: Option<T>, what: &str) -> Result<T> {
    sum.ok_or_else(|| LoanError::CalculationError {
        message: format!("{} overflow while merging portfolio totals", what),
    })
}

/// partial fold over a set of loans
///
/// `merge` is associative and commutative, so chunks of a portfolio can be
/// folded independently (on any number of threads) and combined in any
/// order with the same result. Every contribution is kept at a fixed
/// scale, so the sums are exact and never depend on grouping. Totals too
/// large for a decimal fail the merge with `CalculationError`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortfolioAccumulator {
    pub given: DirectionTotals,
    pub taken: DirectionTotals,
    pub skipped_records: u32,
}

impl PortfolioAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// a record that was left out of the fold
    pub fn skipped() -> Self {
        Self {
            skipped_records: 1,
            ..Self::default()
        }
    }

    fn single(direction: Direction, totals: DirectionTotals) -> Self {
        match direction {
            Direction::Given => Self {
                given: totals,
                ..Self::default()
            },
            Direction::Taken => Self {
                taken: totals,
                ..Self::default()
            },
        }
    }

    pub fn merge(self, other: Self) -> Result<Self> {
        Ok(Self {
            given: self.given.merge(other.given)?,
            taken: self.taken.merge(other.taken)?,
            skipped_records: totalled(
                self.skipped_records.checked_add(other.skipped_records),
                "skipped record count",
            )?,
        })
    }

    pub fn finish(self, model: AccrualModel) -> PortfolioSummary {
        let avg_rate_given = self.given.average_rate();
        let avg_rate_taken = self.taken.average_rate();

        let cash_flow = match model {
            AccrualModel::Simple => None,
            AccrualModel::Amortized => Some(CashFlowSummary {
                monthly_income: self.given.monthly_payments,
                monthly_expense: self.taken.monthly_payments,
                net_monthly_cash_flow: self.given.monthly_payments - self.taken.monthly_payments,
            }),
        };

        PortfolioSummary {
            accrual_model: model,
            total_income: self.given.interest,
            total_expense: self.taken.interest,
            net_pnl: self.given.interest - self.taken.interest,
            total_gold_given: self.given.gold,
            total_gold_taken: self.taken.gold,
            net_gold_position: self.given.gold - self.taken.gold,
            avg_rate_given,
            avg_rate_taken,
            interest_rate_spread: avg_rate_given - avg_rate_taken,
            loans_given: self.given.loans,
            loans_taken: self.taken.loans,
            active_loans_given: self.given.active_loans,
            active_loans_taken: self.taken.active_loans,
            total_principal_given: self.given.principal,
            total_principal_taken: self.taken.principal,
            cash_flow,
            skipped_records: self.skipped_records,
        }
    }
}

/// monthly level-payment flows of active amortized loans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowSummary {
    pub monthly_income: Money,
    pub monthly_expense: Money,
    pub net_monthly_cash_flow: Money,
}

/// portfolio figures as of one instant, rebuilt on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub accrual_model: AccrualModel,
    pub total_income: Money,
    pub total_expense: Money,
    pub net_pnl: Money,
    pub total_gold_given: Grams,
    pub total_gold_taken: Grams,
    pub net_gold_position: Grams,
    pub avg_rate_given: Decimal,
    pub avg_rate_taken: Decimal,
    pub interest_rate_spread: Decimal,
    pub loans_given: u32,
    pub loans_taken: u32,
    pub active_loans_given: u32,
    pub active_loans_taken: u32,
    pub total_principal_given: Money,
    pub total_principal_taken: Money,
    pub cash_flow: Option<CashFlowSummary>,
    pub skipped_records: u32,
}

impl PortfolioSummary {
    /// all-zero summary for a portfolio with no loans
    pub fn empty(model: AccrualModel) -> Self {
        PortfolioAccumulator::new().finish(model)
    }

    pub fn total_loans(&self) -> u32 {
        self.loans_given + self.loans_taken
    }

    /// copy with money and rates rounded for display
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            total_income: self.total_income.round_dp(dp),
            total_expense: self.total_expense.round_dp(dp),
            net_pnl: self.net_pnl.round_dp(dp),
            avg_rate_given: self.avg_rate_given.round_dp(dp),
            avg_rate_taken: self.avg_rate_taken.round_dp(dp),
            interest_rate_spread: self.interest_rate_spread.round_dp(dp),
            total_principal_given: self.total_principal_given.round_dp(dp),
            total_principal_taken: self.total_principal_taken.round_dp(dp),
            cash_flow: self.cash_flow.map(|cf| CashFlowSummary {
                monthly_income: cf.monthly_income.round_dp(dp),
                monthly_expense: cf.monthly_expense.round_dp(dp),
                net_monthly_cash_flow: cf.net_monthly_cash_flow.round_dp(dp),
            }),
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// portfolio aggregator, bound to one accrual model
#[derive(Debug, Clone)]
pub struct Portfolio {
    config: EngineConfig,
}

impl Portfolio {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn simple() -> Self {
        Self {
            config: EngineConfig::simple(),
        }
    }

    pub fn amortized() -> Self {
        Self {
            config: EngineConfig::amortized(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> AccrualModel {
        self.config.accrual_model
    }

    /// one loan's share of the fold
    ///
    /// Invalid or incomplete loans count as skipped; any other failure is
    /// returned to the caller.
    pub fn contribution(&self, loan: &LoanRecord, at: DateTime<Utc>) -> Result<PortfolioAccumulator> {
        let model = self.config.accrual_model;

        let calculation = match model.calculate_interest(loan, at) {
            Ok(calculation) => calculation,
            Err(err) if err.is_record_level() => {
                tracing::warn!(loan_id = %loan.id, error = %err, "skipping loan in portfolio summary");
                return Ok(PortfolioAccumulator::skipped());
            }
            Err(err) => return Err(err),
        };

        let accrues = match self.config.status_filter {
            StatusFilter::All => true,
            StatusFilter::ActiveOnly => loan.is_active(),
        };

        // fixed scale keeps the rate sums exact in any grouping
        let rate = match self.config.rate_basis {
            RateBasis::Monthly => loan.rate.monthly_pct(),
            RateBasis::Annual => loan.rate.annual_pct(),
        }
        .round_dp(8);

        let monthly_payments = match model {
            AccrualModel::Amortized if loan.is_active() => loan.amortized_schedule()?.monthly_payment,
            _ => Money::ZERO,
        };

        let totals = DirectionTotals {
            loans: 1,
            active_loans: u32::from(loan.is_active()),
            interest: if accrues { calculation.interest_amount } else { Money::ZERO },
            principal: loan.principal,
            gold: loan.gold.grams,
            rate_sum: rate,
            monthly_payments,
        };

        Ok(PortfolioAccumulator::single(loan.direction, totals))
    }

    /// fold any collection of loans into an accumulator
    pub fn fold<'a, I>(&self, loans: I, at: DateTime<Utc>) -> Result<PortfolioAccumulator>
    where
        I: IntoIterator<Item = &'a LoanRecord>,
    {
        loans
            .into_iter()
            .try_fold(PortfolioAccumulator::new(), |acc, loan| -> Result<PortfolioAccumulator> {
                acc.merge(self.contribution(loan, at)?)
            })
    }

    /// summary of `loans` as of `at`
    pub fn summarize(&self, loans: &[LoanRecord], at: DateTime<Utc>) -> Result<PortfolioSummary> {
        let summary = self.fold(loans, at)?.finish(self.config.accrual_model);

        tracing::debug!(
            model = ?summary.accrual_model,
            loans = summary.total_loans(),
            skipped = summary.skipped_records,
            net_pnl = %summary.net_pnl,
            "portfolio summarized"
        );

        Ok(summary)
    }

    /// summary with the instant taken from an injected clock
    pub fn summarize_with_clock(
        &self,
        loans: &[LoanRecord],
        time_provider: &SafeTimeProvider,
    ) -> Result<PortfolioSummary> {
        self.summarize(loans, time_provider.now())
    }

    /// summary straight from storage documents
    ///
    /// Documents missing a required field or carrying invalid terms are
    /// skipped and counted; an unparseable date fails the whole call.
    pub fn summarize_documents(
        &self,
        documents: &[LoanDocument],
        at: DateTime<Utc>,
    ) -> Result<PortfolioSummary> {
        let mut acc = PortfolioAccumulator::new();

        for doc in documents {
            match LoanRecord::try_from(doc.clone()) {
                Ok(loan) => acc = acc.merge(self.contribution(&loan, at)?)?,
                Err(err) if err.is_record_level() => {
                    tracing::warn!(loan_id = ?doc.id, error = %err, "skipping loan document in portfolio summary");
                    acc = acc.merge(PortfolioAccumulator::skipped())?;
                }
                Err(err) => return Err(err),
            }
        }

        let summary = acc.finish(self.config.accrual_model);
        tracing::debug!(
            documents = documents.len(),
            skipped = summary.skipped_records,
            "portfolio summarized from documents"
        );

        Ok(summary)
    }

    /// per-loan presentation figures, skipping loans that cannot be priced
    pub fn loan_views(&self, loans: &[LoanRecord], at: DateTime<Utc>) -> Result<Vec<LoanView>> {
        let mut views = Vec::with_capacity(loans.len());

        for loan in loans {
            match LoanView::build(loan, self.config.accrual_model, at, self.config.rounding_dp) {
                Ok(view) => views.push(view),
                Err(err) if err.is_record_level() => {
                    tracing::warn!(loan_id = %loan.id, error = %err, "skipping loan view");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(views)
    }
}
