/// portfolio report - summary and per-loan views from stored documents
use gold_loan_engine::chrono::{TimeZone, Utc};
use gold_loan_engine::{EngineConfig, LoanDocument, LoanRecord, Portfolio, StatusFilter};

const DOCUMENTS: &str = r#"[
    { "direction": "given", "principalAmount": 50000, "interestRateMonthlyPct": 2,
      "termMonths": 10, "startDate": "2024-01-15", "goldQuantityGrams": 40, "goldPurity": 22,
      "borrowerName": "Ravi" },
    { "direction": "taken", "principalAmount": 20000, "interestRateMonthlyPct": "1.5",
      "termMonths": 6, "startDate": "2023-10-15", "goldQuantityGrams": 25,
      "lenderName": "Muthoot" },
    { "type": "taken", "principal": 35000, "interestRate": 14,
      "date": "2024-03-01T00:00:00.000Z", "endDate": "2025-03-01T00:00:00.000Z",
      "goldQuantity": 30, "goldPurity": 91.6, "status": "completed" },
    { "direction": "given", "principalAmount": 8000, "termMonths": 6,
      "startDate": "2024-02-01", "goldQuantityGrams": 5 }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let documents: Vec<LoanDocument> = serde_json::from_str(DOCUMENTS)?;
    let at = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();

    println!("=== simple accrual, every loan ===");
    let simple = Portfolio::simple();
    let summary = simple.summarize_documents(&documents, at)?;
    println!("{}", summary.rounded(2).to_json()?);

    println!("\n=== simple accrual, active loans only ===");
    let active_only =
        Portfolio::new(EngineConfig::simple().with_status_filter(StatusFilter::ActiveOnly))?;
    let summary = active_only.summarize_documents(&documents, at)?;
    println!("net p&l: {}", summary.rounded(2).net_pnl);

    println!("\n=== amortized projections ===");
    let amortized = Portfolio::amortized();
    let summary = amortized.summarize_documents(&documents, at)?;
    println!("{}", summary.rounded(2).to_json()?);

    // the last document has no rate, so it is skipped before any view is built
    let loans: Vec<LoanRecord> = documents
        .into_iter()
        .filter_map(|doc| LoanRecord::try_from(doc).ok())
        .collect();

    println!("\n=== loan views ===");
    for view in simple.loan_views(&loans, at)? {
        println!(
            "{:?} {} accrued {} overdue {}",
            view.direction, view.principal, view.accrued_interest, view.overdue
        );
    }

    Ok(())
}
