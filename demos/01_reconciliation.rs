/// reconciliation - apply, clamp and remove payments
use chrono::NaiveDate;
use loan_amortization_rs::{
    EngineConfig, Event, EventStore, Loan, LoanTerms, LoanView, Money, NewPayment,
    PaymentHistory, PaymentMethod, PaymentReconciler, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== reconciliation example ===\n");

    let config = EngineConfig::from_json(r#"{ "reconciliation_tolerance": "0.01" }"#)?;
    let reconciler = PaymentReconciler::new(config)?;

    let terms = LoanTerms::monthly(
        Money::from_major(5_000),
        Rate::from_percentage(9),
        6,
        NaiveDate::from_ymd_opt(2024, 3, 31).ok_or("bad date")?,
        "USD",
    );
    let loan = Loan::new("acct-042", terms)?;
    let schedule = loan.schedule()?;
    let history = PaymentHistory::new(loan.id);
    let mut events = EventStore::new();

    // pay the first three installments
    let (mut loan, mut history) = (loan, history);
    for number in 1..=3 {
        let entry = schedule.entry(number).ok_or("missing entry")?;
        let draft = NewPayment::from_entry(entry, PaymentMethod::BankTransfer)
            .with_proof(format!("stmt-{}", number));
        let applied = reconciler.apply_payment(&loan, &history, draft, &mut events)?;
        println!(
            "payment {} on {}: balance now {}",
            number, entry.payment_date, applied.loan.current_balance
        );
        loan = applied.loan;
        history = applied.history;
    }

    // an oversized payment is clamped to the outstanding balance
    let lump = NewPayment {
        payment_number: 4,
        payment_date: NaiveDate::from_ymd_opt(2024, 7, 31),
        principal_amount: Money::from_major(4_000),
        interest_amount: Money::from_str_exact("18.90")?,
        total_payment: Money::from_str_exact("4018.90")?,
        payment_method: PaymentMethod::Cheque,
        proof_reference: None,
        notes: Some("early settlement".to_string()),
    };
    let settled = reconciler.apply_payment(&loan, &history, lump, &mut events)?;
    println!(
        "\nlump sum applied {} of principal, loan is {:?}",
        settled.payment.principal_amount, settled.loan.status
    );

    // deleting it reopens the loan
    let removed = reconciler.remove_payment(
        &settled.loan,
        &settled.history,
        settled.payment.id,
        &mut events,
    )?;
    println!("after removal: {:?}, balance {}", removed.loan.status, removed.loan.current_balance);

    println!("\nevents:");
    for event in events.take_events() {
        match event {
            Event::InterestExpenseDue { amount, payment_date, .. } => {
                println!("  interest expense {} due {}", amount, payment_date)
            }
            other => println!("  {:?}", other),
        }
    }

    let view = LoanView::from_loan(&removed.loan, Some((&schedule, &removed.history)));
    println!("\n{}", view.to_json_pretty());

    Ok(())
}
