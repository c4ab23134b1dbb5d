pub mod config;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod portfolio;
pub mod serialization;
pub mod store;
pub mod types;

// re-export key types
pub use config::{EngineConfig, RateBasis, StatusFilter};
pub use decimal::{Grams, Money, Rate};
pub use errors::{LoanError, Result};
pub use interest::{
    accrued_simple_interest, elapsed_whole_months, AccrualCalculator, AmortizedAccrual,
    InterestCalculation, SimpleAccrual,
};
pub use loan::{LoanDocument, LoanRecord, LoanRecordBuilder, TermsUpdate};
pub use payments::{amortized_schedule, AmortizedSchedule, Installment};
pub use portfolio::{CashFlowSummary, Portfolio, PortfolioAccumulator, PortfolioSummary};
pub use serialization::LoanView;
pub use store::{LoanStore, MemoryLoanStore};
pub use types::{
    AccrualModel, Direction, GoldHolding, GoldPurity, InterestRate, LoanId, LoanStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
