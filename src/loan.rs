use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::LoanAggregates;
use crate::schedule::{calculate_monthly_payment, LoanSchedule};
use crate::types::{LoanId, LoanStatus, PaymentFrequency};

/// a loan and its cached payment totals
///
/// `current_balance`, the `total_*` fields and `status` are a projection of
/// the payment history. They are only ever replaced by a full re-derivation,
/// never incremented in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    /// owning account, opaque to the engine
    pub account_id: String,

    // terms
    pub principal_amount: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub payment_frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub currency: String,
    /// monthly-equivalent payment, computed from term_months for every frequency
    pub monthly_payment: Money,

    // projection
    pub current_balance: Money,
    pub total_paid: Money,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    pub status: LoanStatus,

    /// bumped on every recorded or removed payment
    pub revision: u64,
}

impl Loan {
    /// create an active loan with nothing paid yet
    pub fn new(account_id: impl Into<String>, terms: LoanTerms) -> Result<Self> {
        terms.validate()?;
        let monthly_payment =
            calculate_monthly_payment(terms.principal_amount, terms.interest_rate, terms.term_months)?
                .to_cents();

        Ok(Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            principal_amount: terms.principal_amount,
            interest_rate: terms.interest_rate,
            term_months: terms.term_months,
            payment_frequency: terms.payment_frequency,
            start_date: terms.start_date,
            first_payment_date: terms.first_payment_date,
            currency: terms.currency,
            monthly_payment,
            current_balance: terms.principal_amount,
            total_paid: Money::ZERO,
            total_principal_paid: Money::ZERO,
            total_interest_paid: Money::ZERO,
            status: LoanStatus::Active,
            revision: 0,
        })
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal_amount: self.principal_amount,
            interest_rate: self.interest_rate,
            term_months: self.term_months,
            payment_frequency: self.payment_frequency,
            start_date: self.start_date,
            first_payment_date: self.first_payment_date,
            currency: self.currency.clone(),
        }
    }

    /// generate the schedule for the current terms
    pub fn schedule(&self) -> Result<LoanSchedule> {
        LoanSchedule::generate(&self.terms())
    }

    /// copy of this loan under new terms; totals are stale until reconciled
    pub(crate) fn with_terms(&self, terms: LoanTerms) -> Result<Self> {
        terms.validate()?;
        let monthly_payment =
            calculate_monthly_payment(terms.principal_amount, terms.interest_rate, terms.term_months)?
                .to_cents();

        Ok(Self {
            principal_amount: terms.principal_amount,
            interest_rate: terms.interest_rate,
            term_months: terms.term_months,
            payment_frequency: terms.payment_frequency,
            start_date: terms.start_date,
            first_payment_date: terms.first_payment_date,
            currency: terms.currency,
            monthly_payment,
            ..self.clone()
        })
    }

    pub fn aggregates(&self) -> LoanAggregates {
        LoanAggregates {
            current_balance: self.current_balance,
            total_paid: self.total_paid,
            total_principal_paid: self.total_principal_paid,
            total_interest_paid: self.total_interest_paid,
            status: self.status,
        }
    }

    /// replace the cached projection; externally set terminal statuses stick
    pub(crate) fn with_aggregates(&self, aggregates: LoanAggregates) -> Self {
        let status = if self.status.is_terminal() {
            self.status
        } else {
            aggregates.status
        };

        Self {
            current_balance: aggregates.current_balance,
            total_paid: aggregates.total_paid,
            total_principal_paid: aggregates.total_principal_paid,
            total_interest_paid: aggregates.total_interest_paid,
            status,
            ..self.clone()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn can_accept_payment(&self) -> bool {
        self.is_active() && self.current_balance.is_positive()
    }

    /// percent of principal repaid so far
    pub fn progress(&self) -> rust_decimal::Decimal {
        self.total_principal_paid.percent_of(self.principal_amount)
    }
}
