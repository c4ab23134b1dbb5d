/// quick start - accrue interest on one gold loan
use gold_loan_engine::chrono::{NaiveDate, TimeZone, Utc};
use gold_loan_engine::{accrued_simple_interest, Grams, LoanRecord, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 50,000 lent against 40g of gold at 2% a month for 10 months
    let loan = LoanRecord::builder()
        .given()
        .principal(Money::from_major(50_000))
        .monthly_rate_pct(dec!(2))
        .term_months(10)
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .gold_grams(Grams::from_whole(40))
        .counterparty("Ravi")
        .build()?;

    let at = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();

    println!("accrued by {}: {}", at.date_naive(), accrued_simple_interest(&loan, at)?);
    println!("term ends: {}", loan.end_date()?);

    let schedule = loan.amortized_schedule()?;
    println!("level payment if amortized: {}", schedule.monthly_payment.round_dp(2));

    Ok(())
}
