/// shared time - one injected clock driving a store-backed portfolio
use gold_loan_engine::chrono::{Duration, NaiveDate, TimeZone, Utc};
use gold_loan_engine::{
    Grams, LoanRecord, LoanStore, MemoryLoanStore, Money, Portfolio, SafeTimeProvider,
    TermsUpdate, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut store = MemoryLoanStore::new();
    store.create(
        LoanRecord::builder()
            .given()
            .principal(Money::from_major(40_000))
            .monthly_rate_pct(dec!(1.75))
            .term_months(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .gold_grams(Grams::from_whole(35))
            .build()?,
    )?;
    let taken = store.create(
        LoanRecord::builder()
            .taken()
            .principal(Money::from_major(30_000))
            .monthly_rate_pct(dec!(1))
            .term_months(6)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .gold_grams(Grams::from_whole(30))
            .build()?,
    )?;

    let portfolio = Portfolio::simple();

    for _ in 0..4 {
        let summary = portfolio.summarize_with_clock(&store.list(), &time)?;
        println!(
            "{}: income {} expense {} net {}",
            time.now().format("%Y-%m-%d"),
            summary.total_income.round_dp(2),
            summary.total_expense.round_dp(2),
            summary.net_pnl.round_dp(2)
        );
        controller.advance(Duration::days(92));
    }

    // renegotiate the borrowed loan; its projection is recomputed on the way in
    let schedule = store.update_terms(
        taken,
        TermsUpdate {
            term_months: Some(9),
            ..Default::default()
        },
    )?;
    println!("\nnew level payment on borrowed loan: {}", schedule.monthly_payment.round_dp(2));

    let summary = portfolio.summarize_with_clock(&store.list(), &time)?;
    println!("net after renegotiation: {}", summary.net_pnl.round_dp(2));

    Ok(())
}
