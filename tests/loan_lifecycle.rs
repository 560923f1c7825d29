use chrono::{NaiveDate, TimeZone, Utc};
use loan_amortization_rs::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reference_terms() -> LoanTerms {
    LoanTerms::monthly(
        Money::from_major(10_000),
        Rate::from_percentage(6),
        12,
        date(2024, 1, 1),
        "EUR",
    )
}

/// records the first `count` scheduled payments one after another
fn pay_scheduled(
    reconciler: &PaymentReconciler,
    loan: Loan,
    history: PaymentHistory,
    schedule: &LoanSchedule,
    count: u32,
) -> (Loan, PaymentHistory, Vec<PaymentId>) {
    let mut events = EventStore::new();
    let mut ids = Vec::new();
    let (mut loan, mut history) = (loan, history);

    for number in 1..=count {
        let draft = NewPayment::from_entry(schedule.entry(number).unwrap(), PaymentMethod::DirectDebit);
        let applied = reconciler
            .apply_payment(&loan, &history, draft, &mut events)
            .unwrap();
        ids.push(applied.payment.id);
        loan = applied.loan;
        history = applied.history;
    }

    (loan, history, ids)
}

fn remove_all(
    reconciler: &PaymentReconciler,
    loan: Loan,
    history: PaymentHistory,
    ids: &[PaymentId],
) -> Loan {
    let mut events = EventStore::new();
    let (mut loan, mut history) = (loan, history);
    for id in ids {
        let removed = reconciler
            .remove_payment(&loan, &history, *id, &mut events)
            .unwrap();
        loan = removed.loan;
        history = removed.history;
    }
    loan
}

#[test]
fn test_schedule_shape_across_inputs() {
    let cases = [
        (1_000, 0, 1, PaymentFrequency::Monthly),
        (10_000, 6, 12, PaymentFrequency::Monthly),
        (10_000, 6, 12, PaymentFrequency::Quarterly),
        (25_000, 9, 14, PaymentFrequency::Quarterly),
        (250_000, 4, 300, PaymentFrequency::Yearly),
        (5_000, 100, 7, PaymentFrequency::Yearly),
        (7_777, 3, 37, PaymentFrequency::Monthly),
    ];

    for (principal, rate, term, frequency) in cases {
        let principal = Money::from_major(principal);
        let entries = generate_schedule(
            principal,
            Rate::from_percentage(rate),
            term,
            date(2024, 3, 31),
            frequency,
        )
        .unwrap();

        let expected_len = term.div_ceil(frequency.months_per_period()) as usize;
        assert_eq!(entries.len(), expected_len);
        assert_eq!(entries.last().unwrap().ending_balance, Money::ZERO);

        let principal_sum: Money = entries.iter().map(|e| e.principal_payment).sum();
        assert_eq!(principal_sum, principal, "principal drift for {:?}", (rate, term, frequency));
        assert!(entries.iter().all(|e| !e.principal_payment.is_negative()));
    }
}

#[test]
fn test_reference_scenario() {
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let schedule = loan.schedule().unwrap();

    assert_eq!(loan.monthly_payment, Money::from_str_exact("860.66").unwrap());
    assert_eq!(schedule.entry(1).unwrap().interest_payment, Money::from_major(50));
    assert_eq!(schedule.entry(12).unwrap().ending_balance, Money::ZERO);

    let quarterly = LoanSchedule::generate(
        &reference_terms().with_frequency(PaymentFrequency::Quarterly),
    )
    .unwrap();
    assert_eq!(quarterly.len(), 4);
    assert_eq!(quarterly.monthly_payment, loan.monthly_payment);
    assert!((quarterly.total_interest() - schedule.total_interest()).abs() <= Money::from_cents(6));
}

#[test]
fn test_zero_rate_schedule() {
    let principal = Money::from_major(1_000);
    let entries = generate_schedule(principal, Rate::ZERO, 7, date(2024, 1, 1), PaymentFrequency::Monthly).unwrap();
    let even_share = (principal / Decimal::from(7)).to_cents();

    for entry in &entries {
        assert_eq!(entry.interest_payment, Money::ZERO);
    }
    for entry in &entries[..6] {
        assert_eq!(entry.principal_payment, even_share);
    }
    assert_eq!(entries[6].ending_balance, Money::ZERO);
}

#[test]
fn test_full_repayment_pays_off_loan() {
    let reconciler = PaymentReconciler::default();
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let schedule = loan.schedule().unwrap();
    let history = PaymentHistory::new(loan.id);

    let (paid_off, history, ids) = pay_scheduled(&reconciler, loan, history, &schedule, 12);

    assert_eq!(ids.len(), 12);
    assert_eq!(paid_off.status, LoanStatus::PaidOff);
    assert_eq!(paid_off.current_balance, Money::ZERO);
    assert_eq!(paid_off.total_interest_paid, schedule.total_interest());
    assert_eq!(paid_off.total_paid, schedule.total_payment());
    assert_eq!(
        paid_off.total_paid,
        paid_off.total_principal_paid + paid_off.total_interest_paid
    );
    assert!(schedule.next_due(&history).is_none());

    let err = reconciler
        .apply_payment(
            &paid_off,
            &history,
            NewPayment::from_entry(schedule.entry(12).unwrap(), PaymentMethod::Cash),
            &mut EventStore::new(),
        )
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_apply_then_remove_restores_exactly() {
    let reconciler = PaymentReconciler::default();
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let schedule = loan.schedule().unwrap();
    let history = PaymentHistory::new(loan.id);

    let (loan, history, _) = pay_scheduled(&reconciler, loan, history, &schedule, 5);
    let before = loan.aggregates();

    let mut events = EventStore::new();
    let extra = NewPayment {
        payment_number: 6,
        payment_date: Some(date(2024, 7, 1)),
        principal_amount: Money::from_str_exact("1234.56").unwrap(),
        interest_amount: Money::from_str_exact("29.87").unwrap(),
        total_payment: Money::from_str_exact("1264.43").unwrap(),
        payment_method: PaymentMethod::Other("wire".to_string()),
        proof_reference: Some("receipt-6".to_string()),
        notes: None,
    };
    let applied = reconciler
        .apply_payment(&loan, &history, extra, &mut events)
        .unwrap();
    assert_ne!(applied.loan.aggregates(), before);

    let removed = reconciler
        .remove_payment(&applied.loan, &applied.history, applied.payment.id, &mut events)
        .unwrap();
    assert_eq!(removed.loan.aggregates(), before);
    assert_eq!(removed.history.payments(), history.payments());
}

#[test]
fn test_removal_order_does_not_matter() {
    let reconciler = PaymentReconciler::default();
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let schedule = loan.schedule().unwrap();
    let history = PaymentHistory::new(loan.id);
    let initial = loan.aggregates();

    let (loan, history, ids) = pay_scheduled(&reconciler, loan, history, &schedule, 6);

    let reversed: Vec<PaymentId> = ids.iter().rev().copied().collect();
    let forward = remove_all(&reconciler, loan.clone(), history.clone(), &ids);
    let backward = remove_all(&reconciler, loan.clone(), history.clone(), &reversed);
    assert_eq!(forward.aggregates(), backward.aggregates());
    assert_eq!(forward.aggregates(), initial);

    // a partial removal in either order lands on the same totals too
    let subset_a = [ids[1], ids[4], ids[2]];
    let subset_b = [ids[2], ids[1], ids[4]];
    let a = remove_all(&reconciler, loan.clone(), history.clone(), &subset_a);
    let b = remove_all(&reconciler, loan, history, &subset_b);
    assert_eq!(a.aggregates(), b.aggregates());
    assert_eq!(a.status, LoanStatus::Active);
}

#[test]
fn test_interest_handed_to_expense_ledger() {
    let reconciler = PaymentReconciler::default();
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let schedule = loan.schedule().unwrap();
    let history = PaymentHistory::new(loan.id);
    let mut events = EventStore::new();

    let applied = reconciler
        .apply_payment(
            &loan,
            &history,
            NewPayment::from_entry(schedule.entry(1).unwrap(), PaymentMethod::BankTransfer),
            &mut events,
        )
        .unwrap();

    let booked: Vec<Event> = events
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, Event::InterestExpenseDue { .. }))
        .collect();
    assert_eq!(
        booked,
        vec![Event::InterestExpenseDue {
            loan_id: loan.id,
            payment_id: applied.payment.id,
            amount: Money::from_major(50),
            currency: "EUR".to_string(),
            payment_date: date(2024, 2, 1),
        }]
    );
    assert!(events.is_empty());
}

#[test]
fn test_payoff_simulation_after_payments() {
    let reconciler = PaymentReconciler::default();
    let terms = LoanTerms::monthly(
        Money::from_major(30_000),
        Rate::from_percent(dec!(7.5)),
        60,
        date(2023, 1, 15),
        "USD",
    );
    let loan = Loan::new("acct", terms).unwrap();
    let schedule = loan.schedule().unwrap();
    let history = PaymentHistory::new(loan.id);
    let (loan, _, _) = pay_scheduled(&reconciler, loan, history, &schedule, 12);

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap(),
    ));

    let unchanged = simulate_payoff(&loan, Money::ZERO, &time).unwrap();
    assert_eq!(unchanged.months_saved, 0);
    assert_eq!(unchanged.interest_saved, Money::ZERO);
    assert_eq!(unchanged.original_payoff_date, unchanged.new_payoff_date);

    let faster = simulate_payoff(&loan, Money::from_major(250), &time).unwrap();
    assert!(faster.months_saved > 0);
    assert!(faster.interest_saved.is_positive());
    assert_eq!(faster.original_payoff_date, unchanged.original_payoff_date);
    assert!(faster.new_payoff_date < faster.original_payoff_date);
}

#[test]
fn test_validation_errors_leave_inputs_untouched() {
    let reconciler = PaymentReconciler::default();
    let loan = Loan::new("acct", reference_terms()).unwrap();
    let history = PaymentHistory::new(loan.id);
    let snapshot = (loan.clone(), history.clone());

    let mut events = EventStore::new();
    let bad = NewPayment {
        payment_number: 1,
        payment_date: None,
        principal_amount: Money::from_major(100),
        interest_amount: Money::ZERO,
        total_payment: Money::from_major(100),
        payment_method: PaymentMethod::Cash,
        proof_reference: None,
        notes: None,
    };
    let err = reconciler
        .apply_payment(&loan, &history, bad, &mut events)
        .unwrap_err();

    assert!(err.is_validation());
    assert!(!err.is_fatal());
    assert_eq!((loan, history), snapshot);
    assert!(events.is_empty());
}
