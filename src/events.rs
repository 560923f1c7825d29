use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, PaymentId};

/// events emitted while reconciling a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PaymentApplied {
        loan_id: LoanId,
        payment_id: PaymentId,
        payment_number: u32,
        principal_amount: Money,
        interest_amount: Money,
        total_payment: Money,
        remaining_balance: Money,
        payment_date: NaiveDate,
    },
    PaymentClamped {
        loan_id: LoanId,
        payment_id: PaymentId,
        requested_principal: Money,
        applied_principal: Money,
    },
    /// interest portion handed to the expense ledger, never booked here
    InterestExpenseDue {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        currency: String,
        payment_date: NaiveDate,
    },
    PaymentRemoved {
        loan_id: LoanId,
        payment_id: PaymentId,
        principal_amount: Money,
        new_balance: Money,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
    },
    TermsAmended {
        loan_id: LoanId,
        old_monthly_payment: Money,
        new_monthly_payment: Money,
        schedule_entries: usize,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// interest amounts waiting to be booked by the expense ledger
    pub fn interest_expenses(&self) -> impl Iterator<Item = (PaymentId, Money)> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::InterestExpenseDue {
                payment_id, amount, ..
            } => Some((*payment_id, *amount)),
            _ => None,
        })
    }
}
