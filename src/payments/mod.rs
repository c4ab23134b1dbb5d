pub mod amortization;

use crate::errors::Result;
use crate::loan::LoanRecord;

pub use amortization::{AmortizedSchedule, Installment};

/// level-payment projection of a loan's current terms
pub fn amortized_schedule(loan: &LoanRecord) -> Result<AmortizedSchedule> {
    loan.amortized_schedule()
}
