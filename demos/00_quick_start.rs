/// quick start - generate a schedule and record the first payment
use chrono::NaiveDate;
use loan_amortization_rs::{
    EventStore, Loan, LoanTerms, Money, NewPayment, PaymentHistory, PaymentMethod,
    PaymentReconciler, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a 10,000 EUR loan at 6% over 12 months
    let terms = LoanTerms::monthly(
        Money::from_major(10_000),
        Rate::from_percentage(6),
        12,
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?,
        "EUR",
    );
    let loan = Loan::new("acct-001", terms)?;
    let schedule = loan.schedule()?;
    let history = PaymentHistory::new(loan.id);

    println!("monthly payment: {}", loan.monthly_payment);
    for entry in schedule.entries() {
        println!(
            "{:>3}  {}  {:>10}  {:>8}  {:>8}  {:>10}",
            entry.payment_number,
            entry.payment_date,
            entry.total_payment,
            entry.principal_payment,
            entry.interest_payment,
            entry.ending_balance
        );
    }

    // pay the first installment
    let first = schedule.entry(1).ok_or("empty schedule")?;
    let mut events = EventStore::new();
    let applied = PaymentReconciler::default().apply_payment(
        &loan,
        &history,
        NewPayment::from_entry(first, PaymentMethod::DirectDebit),
        &mut events,
    )?;

    println!("\n{}", applied.loan.to_json_pretty());

    Ok(())
}
