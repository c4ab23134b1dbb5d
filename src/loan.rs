use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Grams, Money};
use crate::errors::{LoanError, Result};
use crate::interest::calendar::{add_months, elapsed_whole_months, parse_date};
use crate::payments::AmortizedSchedule;
use crate::types::{Direction, GoldHolding, GoldPurity, InterestRate, LoanId, LoanStatus};

/// longest term a loan may carry, one hundred years
pub const MAX_TERM_MONTHS: u32 = 1200;

/// a gold-backed loan taken or given by the tracked party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: LoanId,
    pub direction: Direction,
    pub principal: Money,
    pub rate: InterestRate,
    pub term_months: u32,
    /// informational, accrual never reads it
    pub months_remaining: u32,
    pub start_date: NaiveDate,
    pub gold: GoldHolding,
    /// lender for taken loans, borrower for given loans
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub status: LoanStatus,
}

impl LoanRecord {
    pub fn builder() -> LoanRecordBuilder {
        LoanRecordBuilder::new()
    }

    /// check the record's terms before any figure is derived from it
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::invalid_terms(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.rate.is_negative() {
            return Err(LoanError::invalid_terms("interest rate must not be negative"));
        }
        if self.term_months == 0 {
            return Err(LoanError::invalid_terms("term must be at least one month"));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(LoanError::invalid_terms(format!(
                "term of {} months exceeds the {} month limit",
                self.term_months, MAX_TERM_MONTHS
            )));
        }
        if self.months_remaining > self.term_months {
            return Err(LoanError::invalid_terms(format!(
                "months remaining {} exceeds term {}",
                self.months_remaining, self.term_months
            )));
        }
        if self.gold.grams.is_negative() {
            return Err(LoanError::invalid_terms("gold quantity must not be negative"));
        }
        Ok(())
    }

    /// agreed end of the loan term
    pub fn end_date(&self) -> Result<NaiveDate> {
        add_months(self.start_date, self.term_months)
    }

    /// whole months since the start date, unclamped by term
    pub fn months_elapsed(&self, on: NaiveDate) -> u32 {
        elapsed_whole_months(self.start_date, on)
    }

    /// months that count towards interest: elapsed, capped at the term
    pub fn months_accrued(&self, on: NaiveDate) -> u32 {
        self.months_elapsed(on).min(self.term_months)
    }

    /// months left on the term as of `at`
    pub fn months_remaining_at(&self, at: DateTime<Utc>) -> u32 {
        self.term_months - self.months_accrued(at.date_naive())
    }

    /// an active loan whose term has run out
    pub fn is_overdue_at(&self, at: DateTime<Utc>) -> Result<bool> {
        if self.status != LoanStatus::Active {
            return Ok(false);
        }
        Ok(at.date_naive() > self.end_date()?)
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// level-payment projection for the current terms
    pub fn amortized_schedule(&self) -> Result<AmortizedSchedule> {
        self.validate()?;
        AmortizedSchedule::calculate(self.principal, self.rate, self.term_months)
    }

    /// change principal, rate or term and return the recomputed projection
    ///
    /// Nothing is applied when the new terms are invalid.
    pub fn update_terms(&mut self, update: TermsUpdate) -> Result<AmortizedSchedule> {
        let principal = update.principal.unwrap_or(self.principal);
        let rate = update.rate.unwrap_or(self.rate);
        let term_months = update.term_months.unwrap_or(self.term_months);

        let schedule = AmortizedSchedule::calculate(principal, rate, term_months)?;

        self.principal = principal;
        self.rate = rate;
        self.term_months = term_months;
        self.months_remaining = self.months_remaining.min(term_months);

        tracing::debug!(
            loan_id = %self.id,
            principal = %principal,
            term_months,
            monthly_payment = %schedule.monthly_payment,
            "loan terms updated"
        );

        Ok(schedule)
    }

    pub fn fine_gold_grams(&self) -> Option<Grams> {
        self.gold.fine_grams()
    }
}

/// changes to the figures an amortized projection is derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermsUpdate {
    pub principal: Option<Money>,
    pub rate: Option<InterestRate>,
    pub term_months: Option<u32>,
}

/// builder for loan records
#[derive(Debug, Default)]
pub struct LoanRecordBuilder {
    id: Option<LoanId>,
    direction: Option<Direction>,
    principal: Option<Money>,
    rate: Option<InterestRate>,
    term_months: Option<u32>,
    months_remaining: Option<u32>,
    start_date: Option<NaiveDate>,
    gold_grams: Option<Grams>,
    gold_purity: Option<GoldPurity>,
    counterparty: Option<String>,
    description: Option<String>,
    status: Option<LoanStatus>,
}

impl LoanRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn given(self) -> Self {
        self.direction(Direction::Given)
    }

    pub fn taken(self) -> Self {
        self.direction(Direction::Taken)
    }

    pub fn principal(mut self, amount: Money) -> Self {
        self.principal = Some(amount);
        self
    }

    pub fn rate(mut self, rate: InterestRate) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn monthly_rate_pct(self, pct: Decimal) -> Self {
        self.rate(InterestRate::Monthly(pct))
    }

    pub fn annual_rate_pct(self, pct: Decimal) -> Self {
        self.rate(InterestRate::Annual(pct))
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn months_remaining(mut self, months: u32) -> Self {
        self.months_remaining = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn gold_grams(mut self, grams: Grams) -> Self {
        self.gold_grams = Some(grams);
        self
    }

    pub fn gold_purity(mut self, purity: GoldPurity) -> Self {
        self.gold_purity = Some(purity);
        self
    }

    pub fn counterparty(mut self, name: impl Into<String>) -> Self {
        self.counterparty = Some(name.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn build(self) -> Result<LoanRecord> {
        let term_months = self
            .term_months
            .ok_or(LoanError::MalformedRecord { field: "termMonths" })?;

        let record = LoanRecord {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            direction: self
                .direction
                .ok_or(LoanError::MalformedRecord { field: "direction" })?,
            principal: self
                .principal
                .ok_or(LoanError::MalformedRecord { field: "principalAmount" })?,
            rate: self
                .rate
                .ok_or(LoanError::MalformedRecord { field: "interestRate" })?,
            term_months,
            months_remaining: self.months_remaining.unwrap_or(term_months),
            start_date: self
                .start_date
                .ok_or(LoanError::MalformedRecord { field: "startDate" })?,
            gold: GoldHolding {
                grams: self.gold_grams.unwrap_or(Grams::ZERO),
                purity: self.gold_purity,
            },
            counterparty: self.counterparty,
            description: self.description,
            status: self.status.unwrap_or_default(),
        };

        record.validate()?;
        Ok(record)
    }
}

/// loan as the storage side hands it over
///
/// Every field is optional and the field names of older record layouts are
/// accepted. Stored `monthlyPayment`, `totalInterest` and `totalAmount` are
/// ignored on read; they are recomputed from the terms when a document is
/// written.
///
/// The term is read from `termMonths` (or `monthsTotal`). Without one it is
/// the whole months from the start date to `endDate`, and without that it is
/// `monthsRemaining`, which is how the layout keyed by `date` and `principal`
/// records the length of a loan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<LoanId>,
    #[serde(alias = "type")]
    pub direction: Option<Direction>,
    #[serde(alias = "principal")]
    pub principal_amount: Option<Decimal>,
    #[serde(alias = "interestRateMonthlyPct")]
    pub monthly_rate_pct: Option<Decimal>,
    #[serde(alias = "interestRate")]
    pub annual_rate_pct: Option<Decimal>,
    #[serde(alias = "monthsTotal")]
    pub term_months: Option<u32>,
    pub months_remaining: Option<u32>,
    #[serde(alias = "date")]
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(alias = "goldQuantity")]
    pub gold_quantity_grams: Option<Decimal>,
    /// karats (22) or percent of pure gold (91.6)
    pub gold_purity: Option<Decimal>,
    pub lender_name: Option<String>,
    pub borrower_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<LoanStatus>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub total_interest: Option<Money>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,
}

impl LoanDocument {
    /// storage form of a record, with the amortized projection filled in
    pub fn from_record(record: &LoanRecord) -> Result<Self> {
        let schedule = record.amortized_schedule()?;
        let (monthly_rate_pct, annual_rate_pct) = match record.rate {
            InterestRate::Monthly(pct) => (Some(pct), None),
            InterestRate::Annual(pct) => (None, Some(pct)),
        };
        let (lender_name, borrower_name) = match record.direction {
            Direction::Taken => (record.counterparty.clone(), None),
            Direction::Given => (None, record.counterparty.clone()),
        };

        Ok(Self {
            id: Some(record.id),
            direction: Some(record.direction),
            principal_amount: Some(record.principal.as_decimal()),
            monthly_rate_pct,
            annual_rate_pct,
            term_months: Some(record.term_months),
            months_remaining: Some(record.months_remaining),
            start_date: Some(record.start_date.to_string()),
            end_date: Some(record.end_date()?.to_string()),
            gold_quantity_grams: Some(record.gold.grams.as_decimal()),
            gold_purity: record.gold.purity.map(|p| Decimal::from(p.karats())),
            lender_name,
            borrower_name,
            description: record.description.clone(),
            status: Some(record.status),
            monthly_payment: Some(schedule.monthly_payment),
            total_interest: Some(schedule.total_interest),
            total_amount: Some(schedule.total_amount),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TryFrom<LoanDocument> for LoanRecord {
    type Error = LoanError;

    fn try_from(doc: LoanDocument) -> Result<Self> {
        let direction = doc
            .direction
            .ok_or(LoanError::MalformedRecord { field: "direction" })?;

        let rate = match (doc.monthly_rate_pct, doc.annual_rate_pct) {
            (Some(monthly), _) => InterestRate::Monthly(monthly),
            (None, Some(annual)) => InterestRate::Annual(annual),
            (None, None) => return Err(LoanError::MalformedRecord { field: "interestRate" }),
        };

        let start_date = doc
            .start_date
            .as_deref()
            .ok_or(LoanError::MalformedRecord { field: "startDate" })
            .and_then(parse_date)?;

        let term_months = match (doc.term_months, doc.end_date.as_deref(), doc.months_remaining) {
            (Some(term), _, _) => term,
            (None, Some(end), _) => elapsed_whole_months(start_date, parse_date(end)?),
            (None, None, Some(remaining)) => remaining,
            (None, None, None) => return Err(LoanError::MalformedRecord { field: "termMonths" }),
        };

        let counterparty = match direction {
            Direction::Taken => doc.lender_name.or(doc.borrower_name),
            Direction::Given => doc.borrower_name.or(doc.lender_name),
        };

        let mut builder = LoanRecord::builder()
            .direction(direction)
            .principal(Money::from_decimal(
                doc.principal_amount
                    .ok_or(LoanError::MalformedRecord { field: "principalAmount" })?,
            ))
            .rate(rate)
            .term_months(term_months)
            .start_date(start_date)
            .gold_grams(Grams::from_decimal(
                doc.gold_quantity_grams
                    .ok_or(LoanError::MalformedRecord { field: "goldQuantityGrams" })?,
            ))
            .status(doc.status.unwrap_or_default());

        if let Some(id) = doc.id {
            builder = builder.id(id);
        }
        if let Some(months) = doc.months_remaining {
            builder = builder.months_remaining(months);
        }
        // purity only refines the fine-gold figure, so an unreadable one is dropped
        if let Some(stored) = doc.gold_purity {
            match GoldPurity::from_stored(stored) {
                Ok(purity) => builder = builder.gold_purity(purity),
                Err(err) => {
                    tracing::warn!(purity = %stored, error = %err, "ignoring unreadable gold purity")
                }
            }
        }
        if let Some(name) = counterparty {
            builder = builder.counterparty(name);
        }
        if let Some(text) = doc.description {
            builder = builder.description(text);
        }

        builder.build()
    }
}
