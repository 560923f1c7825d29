/// payoff simulation - what an extra monthly payment saves
use chrono::{NaiveDate, TimeZone, Utc};
use loan_amortization_rs::{
    simulate_payoff, EngineConfig, Loan, LoanError, LoanTerms, Money, PayoffSimulator, Rate,
    SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payoff simulation example ===\n");

    // pin "today" so the projected dates are reproducible
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().ok_or("bad time")?,
    ));

    let terms = LoanTerms::monthly(
        Money::from_major(200_000),
        Rate::from_percent(dec!(6.5)),
        360,
        NaiveDate::from_ymd_opt(2024, 5, 1).ok_or("bad date")?,
        "USD",
    );
    let loan = Loan::new("mortgage-7", terms)?;
    println!("monthly payment: {}", loan.monthly_payment);

    for extra in [50, 100, 250, 500] {
        let projection = simulate_payoff(&loan, Money::from_major(extra), &time)?;
        println!(
            "+{:>4}/month: paid off {} instead of {}, {} months and {} interest saved",
            extra,
            projection.new_payoff_date,
            projection.original_payoff_date,
            projection.months_saved,
            projection.interest_saved
        );
    }

    // a payment that barely covers interest runs past the cap
    let mut slow = loan.clone();
    slow.monthly_payment = slow.current_balance.apply_rate(slow.interest_rate.monthly_rate()) + Money::ONE;
    let simulator = PayoffSimulator::new(&EngineConfig::default())?;
    match simulator.simulate(&slow, Money::ZERO, &time) {
        Err(LoanError::NonConvergentSimulation { scenario, max_months, remaining_balance }) => {
            println!(
                "\n{} run did not finish within {} months, {} still owed",
                scenario, max_months, remaining_balance
            );
        }
        other => println!("\nunexpected: {:?}", other),
    }

    Ok(())
}
