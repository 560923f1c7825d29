pub mod payoff;
pub mod reconciler;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::schedule::AmortizationEntry;
use crate::types::{LoanId, PaymentId, PaymentMethod, PaymentStatus};

pub use payoff::{simulate_payoff, PayoffProjection, PayoffSimulator};
pub use reconciler::{
    derive_aggregates, LoanAggregates, PaymentApplied, PaymentReconciler, PaymentRemoved,
    TermsChanged,
};

/// payment as submitted by the caller, before it is recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub payment_number: u32,
    pub payment_date: Option<NaiveDate>,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub total_payment: Money,
    pub payment_method: PaymentMethod,
    /// proof-of-payment reference, passed through untouched
    pub proof_reference: Option<String>,
    pub notes: Option<String>,
}

impl NewPayment {
    /// draft paying exactly what a schedule entry asks for
    pub fn from_entry(entry: &AmortizationEntry, payment_method: PaymentMethod) -> Self {
        Self {
            payment_number: entry.payment_number,
            payment_date: Some(entry.payment_date),
            principal_amount: entry.principal_payment,
            interest_amount: entry.interest_payment,
            total_payment: entry.total_payment,
            payment_method,
            proof_reference: None,
            notes: None,
        }
    }

    pub fn with_proof(mut self, reference: impl Into<String>) -> Self {
        self.proof_reference = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// check the draft, returning its payment date
    pub fn validate(&self) -> Result<NaiveDate> {
        if !self.total_payment.is_positive() {
            return Err(LoanError::payment(
                "total_payment",
                format!("must be positive, got {}", self.total_payment),
            ));
        }
        if self.principal_amount.is_negative() {
            return Err(LoanError::payment(
                "principal_amount",
                format!("must not be negative, got {}", self.principal_amount),
            ));
        }
        if self.interest_amount.is_negative() {
            return Err(LoanError::payment(
                "interest_amount",
                format!("must not be negative, got {}", self.interest_amount),
            ));
        }
        if self.payment_number == 0 {
            return Err(LoanError::payment("payment_number", "must be at least 1"));
        }

        self.payment_date
            .ok_or_else(|| LoanError::payment("payment_date", "missing"))
    }
}

/// a recorded payment event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    pub id: PaymentId,
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub total_payment: Money,
    /// balance right after this payment was recorded
    pub remaining_balance: Money,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub proof_reference: Option<String>,
    pub notes: Option<String>,
    /// requested principal when it had to be clamped to the balance
    pub clamped_from: Option<Money>,
}

impl LoanPayment {
    /// record a validated draft as paid
    pub fn record(draft: NewPayment, remaining_balance: Money) -> Result<Self> {
        let payment_date = draft.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            payment_number: draft.payment_number,
            payment_date,
            principal_amount: draft.principal_amount,
            interest_amount: draft.interest_amount,
            total_payment: draft.total_payment,
            remaining_balance,
            payment_method: draft.payment_method,
            status: PaymentStatus::Paid,
            proof_reference: draft.proof_reference,
            notes: draft.notes,
            clamped_from: None,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    pub fn was_clamped(&self) -> bool {
        self.clamped_from.is_some()
    }
}

/// append/remove-only payment history of one loan
///
/// This is the source of truth for a loan's totals. `revision` moves in
/// lockstep with `Loan::revision` so stale reads can be detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub loan_id: LoanId,
    pub revision: u64,
    payments: Vec<LoanPayment>,
}

impl PaymentHistory {
    pub fn new(loan_id: LoanId) -> Self {
        Self {
            loan_id,
            revision: 0,
            payments: Vec::new(),
        }
    }

    /// rebuild a history loaded from storage
    pub fn from_records(loan_id: LoanId, revision: u64, payments: Vec<LoanPayment>) -> Self {
        Self {
            loan_id,
            revision,
            payments,
        }
    }

    pub fn payments(&self) -> &[LoanPayment] {
        &self.payments
    }

    pub fn paid(&self) -> impl Iterator<Item = &LoanPayment> {
        self.payments.iter().filter(|p| p.is_paid())
    }

    pub fn find(&self, id: PaymentId) -> Option<&LoanPayment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub(crate) fn push(&mut self, payment: LoanPayment) {
        self.payments.push(payment);
    }

    pub(crate) fn remove(&mut self, id: PaymentId) -> Option<LoanPayment> {
        let index = self.payments.iter().position(|p| p.id == id)?;
        Some(self.payments.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewPayment {
        NewPayment {
            payment_number: 1,
            payment_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            principal_amount: Money::from_cents(81066),
            interest_amount: Money::from_major(50),
            total_payment: Money::from_cents(86066),
            payment_method: PaymentMethod::DirectDebit,
            proof_reference: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_payment() {
        assert!(draft().validate().is_ok());

        let mut zero_total = draft();
        zero_total.total_payment = Money::ZERO;
        assert!(zero_total.validate().unwrap_err().is_validation());

        let mut no_date = draft();
        no_date.payment_date = None;
        assert!(matches!(
            no_date.validate(),
            Err(LoanError::InvalidPayment { field: "payment_date", .. })
        ));

        let mut negative = draft();
        negative.interest_amount = Money::from_major(-1);
        assert!(negative.validate().is_err());

        let mut unnumbered = draft();
        unnumbered.payment_number = 0;
        assert!(unnumbered.validate().is_err());
    }

    #[test]
    fn test_record_passes_proof_through() {
        let payment = LoanPayment::record(
            draft().with_proof("s3://receipts/feb.pdf").with_notes("early"),
            Money::from_cents(918934),
        )
        .unwrap();

        assert!(payment.is_paid());
        assert!(!payment.was_clamped());
        assert_eq!(payment.proof_reference.as_deref(), Some("s3://receipts/feb.pdf"));
        assert_eq!(payment.notes.as_deref(), Some("early"));
        assert_eq!(payment.remaining_balance, Money::from_cents(918934));
    }

    #[test]
    fn test_history_append_and_remove() {
        let mut history = PaymentHistory::new(Uuid::new_v4());
        let first = LoanPayment::record(draft(), Money::from_major(9_000)).unwrap();
        let first_id = first.id;
        history.push(first);

        let mut scheduled = LoanPayment::record(draft(), Money::from_major(9_000)).unwrap();
        scheduled.status = PaymentStatus::Scheduled;
        history.push(scheduled);

        assert_eq!(history.len(), 2);
        assert_eq!(history.paid().count(), 1);
        assert!(history.find(first_id).is_some());

        let removed = history.remove(first_id).unwrap();
        assert_eq!(removed.id, first_id);
        assert!(history.find(first_id).is_none());
        assert!(history.remove(first_id).is_none());
    }
}
