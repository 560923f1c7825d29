pub mod amortization;
pub mod dates;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::PaymentHistory;
use crate::types::{PaymentFrequency, PaymentStatus};

pub use amortization::{calculate_monthly_payment, generate_schedule, AmortizationEntry};
pub use dates::{add_months, period_date};

/// amortization schedule for one revision of a loan's terms
///
/// Never patched: when terms change a new schedule is generated and the old
/// one is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub frequency: PaymentFrequency,
    pub monthly_payment: Money,
    entries: Vec<AmortizationEntry>,
}

impl LoanSchedule {
    /// generate the schedule for a set of loan terms
    pub fn generate(terms: &LoanTerms) -> Result<Self> {
        terms.validate()?;

        let entries = generate_schedule(
            terms.principal_amount,
            terms.interest_rate,
            terms.term_months,
            terms.first_payment_date,
            terms.payment_frequency,
        )?;
        let monthly_payment = calculate_monthly_payment(
            terms.principal_amount,
            terms.interest_rate,
            terms.term_months,
        )?
        .to_cents();

        Ok(Self {
            principal: terms.principal_amount,
            interest_rate: terms.interest_rate,
            term_months: terms.term_months,
            frequency: terms.payment_frequency,
            monthly_payment,
            entries,
        })
    }

    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn periods_per_entry(&self) -> u32 {
        self.frequency.months_per_period()
    }

    /// entry for a 1-based payment number
    pub fn entry(&self, payment_number: u32) -> Option<&AmortizationEntry> {
        let index = payment_number.checked_sub(1)? as usize;
        self.entries.get(index)
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest_payment).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.entries.iter().map(|e| e.principal_payment).sum()
    }

    pub fn total_payment(&self) -> Money {
        self.entries.iter().map(|e| e.total_payment).sum()
    }

    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.payment_date)
    }

    /// first scheduled entry without a paid payment against it
    pub fn next_due(&self, history: &PaymentHistory) -> Option<&AmortizationEntry> {
        let paid: HashSet<u32> = history
            .payments()
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid)
            .map(|p| p.payment_number)
            .collect();

        self.entries
            .iter()
            .find(|entry| !paid.contains(&entry.payment_number))
    }
}
