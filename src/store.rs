use std::collections::HashMap;

use crate::errors::{LoanError, Result};
use crate::loan::{LoanRecord, TermsUpdate};
use crate::payments::AmortizedSchedule;
use crate::types::{Direction, LoanId};

/// boundary to wherever loan records are kept
///
/// The engine only ever reads `list` results; creating, changing and
/// removing records belongs to the caller.
pub trait LoanStore {
    fn create(&mut self, loan: LoanRecord) -> Result<LoanId>;

    fn get(&self, id: LoanId) -> Result<LoanRecord>;

    fn update(&mut self, loan: LoanRecord) -> Result<()>;

    fn delete(&mut self, id: LoanId) -> Result<LoanRecord>;

    /// every record, in a stable order
    fn list(&self) -> Vec<LoanRecord>;

    fn list_by_direction(&self, direction: Direction) -> Vec<LoanRecord> {
        self.list()
            .into_iter()
            .filter(|loan| loan.direction == direction)
            .collect()
    }

    /// change a loan's terms and store it with its recomputed projection
    fn update_terms(&mut self, id: LoanId, update: TermsUpdate) -> Result<AmortizedSchedule> {
        let mut loan = self.get(id)?;
        let schedule = loan.update_terms(update)?;
        self.update(loan)?;
        Ok(schedule)
    }
}

/// in-memory loan store
#[derive(Debug, Default)]
pub struct MemoryLoanStore {
    loans: HashMap<LoanId, LoanRecord>,
}

impl MemoryLoanStore {
    pub fn new() -> Self {
        Self {
            loans: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn clear(&mut self) {
        self.loans.clear();
    }
}

impl LoanStore for MemoryLoanStore {
    fn create(&mut self, loan: LoanRecord) -> Result<LoanId> {
        loan.validate()?;
        if self.loans.contains_key(&loan.id) {
            return Err(LoanError::DuplicateLoan { id: loan.id });
        }

        let id = loan.id;
        self.loans.insert(id, loan);
        tracing::debug!(loan_id = %id, "loan created");
        Ok(id)
    }

    fn get(&self, id: LoanId) -> Result<LoanRecord> {
        self.loans
            .get(&id)
            .cloned()
            .ok_or(LoanError::LoanNotFound { id })
    }

    fn update(&mut self, loan: LoanRecord) -> Result<()> {
        loan.validate()?;
        match self.loans.get_mut(&loan.id) {
            Some(existing) => {
                *existing = loan;
                Ok(())
            }
            None => Err(LoanError::LoanNotFound { id: loan.id }),
        }
    }

    fn delete(&mut self, id: LoanId) -> Result<LoanRecord> {
        let removed = self.loans.remove(&id).ok_or(LoanError::LoanNotFound { id })?;
        tracing::debug!(loan_id = %id, "loan deleted");
        Ok(removed)
    }

    fn list(&self) -> Vec<LoanRecord> {
        let mut loans: Vec<LoanRecord> = self.loans.values().cloned().collect();
        loans.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        loans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Grams, Money};
    use crate::portfolio::Portfolio;
    use crate::types::LoanStatus;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn loan(direction: Direction, start_month: u32) -> LoanRecord {
        LoanRecord::builder()
            .direction(direction)
            .principal(Money::from_major(25_000))
            .monthly_rate_pct(dec!(1.25))
            .term_months(12)
            .start_date(NaiveDate::from_ymd_opt(2024, start_month, 1).unwrap())
            .gold_grams(Grams::from_whole(20))
            .build()
            .unwrap()
    }

    #[test]
    fn test_crud_cycle() {
        let mut store = MemoryLoanStore::new();
        let id = store.create(loan(Direction::Given, 1)).unwrap();

        let mut fetched = store.get(id).unwrap();
        fetched.status = LoanStatus::Paid;
        store.update(fetched).unwrap();
        assert_eq!(store.get(id).unwrap().status, LoanStatus::Paid);

        let removed = store.delete(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.is_empty());
        assert!(matches!(store.get(id), Err(LoanError::LoanNotFound { .. })));
        assert!(matches!(store.delete(id), Err(LoanError::LoanNotFound { .. })));
    }

    #[test]
    fn test_duplicate_and_invalid_rejected() {
        let mut store = MemoryLoanStore::new();
        let record = loan(Direction::Taken, 2);
        store.create(record.clone()).unwrap();

        assert!(matches!(store.create(record.clone()), Err(LoanError::DuplicateLoan { .. })));

        let mut invalid = record;
        invalid.term_months = 0;
        assert!(matches!(store.update(invalid), Err(LoanError::InvalidLoanTerms { .. })));
    }

    #[test]
    fn test_list_is_ordered_and_filterable() {
        let mut store = MemoryLoanStore::new();
        store.create(loan(Direction::Given, 5)).unwrap();
        store.create(loan(Direction::Taken, 1)).unwrap();
        store.create(loan(Direction::Given, 3)).unwrap();

        let months: Vec<u32> = store
            .list()
            .iter()
            .map(|l| chrono::Datelike::month(&l.start_date))
            .collect();
        assert_eq!(months, vec![1, 3, 5]);
        assert_eq!(store.list_by_direction(Direction::Given).len(), 2);
    }

    #[test]
    fn test_update_terms_through_store() {
        let mut store = MemoryLoanStore::new();
        let id = store.create(loan(Direction::Given, 1)).unwrap();

        let schedule = store
            .update_terms(
                id,
                TermsUpdate {
                    principal: Some(Money::from_major(30_000)),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!(stored.principal, Money::from_major(30_000));
        assert_eq!(schedule, stored.amortized_schedule().unwrap());
    }

    #[test]
    fn test_store_feeds_portfolio() {
        let mut store = MemoryLoanStore::new();
        store.create(loan(Direction::Given, 1)).unwrap();
        store.create(loan(Direction::Taken, 1)).unwrap();

        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let summary = Portfolio::simple().summarize(&store.list(), at).unwrap();

        assert_eq!(summary.total_income, Money::from_major(1_875));
        assert_eq!(summary.net_pnl, Money::ZERO);
        assert_eq!(summary.net_gold_position, Grams::ZERO);
    }
}
