use std::collections::HashSet;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, LoanTerms};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::schedule::LoanSchedule;
use crate::types::{LoanStatus, PaymentId};

use super::{LoanPayment, NewPayment, PaymentHistory};

/// loan totals derived from a payment history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAggregates {
    pub current_balance: Money,
    pub total_paid: Money,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    pub status: LoanStatus,
}

/// fold the paid payments of a history into loan totals
///
/// Only `paid` records count. The balance may come out negative here; it is
/// up to the reconciler to decide whether that is corruption.
pub fn derive_aggregates(principal_amount: Money, history: &PaymentHistory) -> LoanAggregates {
    let (total_principal_paid, total_interest_paid, total_paid) = history.paid().fold(
        (Money::ZERO, Money::ZERO, Money::ZERO),
        |(principal, interest, total), payment| {
            (
                principal + payment.principal_amount,
                interest + payment.interest_amount,
                total + payment.total_payment,
            )
        },
    );

    let current_balance = principal_amount - total_principal_paid;
    let status = if current_balance.is_positive() {
        LoanStatus::Active
    } else {
        LoanStatus::PaidOff
    };

    LoanAggregates {
        current_balance,
        total_paid,
        total_principal_paid,
        total_interest_paid,
        status,
    }
}

/// result of recording a payment
#[derive(Debug, Clone)]
pub struct PaymentApplied {
    pub loan: Loan,
    pub payment: LoanPayment,
    pub history: PaymentHistory,
}

impl PaymentApplied {
    /// interest portion for the expense ledger to book
    pub fn interest_expense(&self) -> Money {
        self.payment.interest_amount
    }
}

/// result of deleting a payment
#[derive(Debug, Clone)]
pub struct PaymentRemoved {
    pub loan: Loan,
    pub removed: LoanPayment,
    pub history: PaymentHistory,
}

/// result of changing a loan's terms
#[derive(Debug, Clone)]
pub struct TermsChanged {
    pub loan: Loan,
    pub schedule: LoanSchedule,
    pub history: PaymentHistory,
}

/// applies payment events by re-deriving loan totals from the full history
///
/// Every operation is pure over its inputs: the caller persists the returned
/// loan and history, and must serialize read-modify-write per loan. Loan and
/// history revisions are compared on entry to catch stale reads.
#[derive(Debug, Clone, Default)]
pub struct PaymentReconciler {
    config: EngineConfig,
}

impl PaymentReconciler {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// recompute the loan's cached totals from its history
    pub fn reconcile(&self, loan: &Loan, history: &PaymentHistory) -> Result<Loan> {
        ensure_same_loan(loan, history)?;
        let aggregates = self.derive_checked(loan, history)?;
        Ok(loan.with_aggregates(aggregates))
    }

    /// record a payment and return the re-derived loan
    pub fn apply_payment(
        &self,
        loan: &Loan,
        history: &PaymentHistory,
        mut draft: NewPayment,
        events: &mut EventStore,
    ) -> Result<PaymentApplied> {
        ensure_same_loan(loan, history)?;
        ensure_fresh(loan, history)?;

        if !loan.can_accept_payment() {
            return Err(LoanError::LoanNotActive {
                status: loan.status,
            });
        }

        draft.validate()?;

        let requested_principal = draft.principal_amount;
        let clamped = requested_principal > loan.current_balance;
        if clamped {
            let excess = requested_principal - loan.current_balance;
            draft.principal_amount = loan.current_balance;
            draft.total_payment = draft.total_payment - excess;
        }

        let remaining_balance = loan.current_balance - draft.principal_amount;
        let mut payment = LoanPayment::record(draft, remaining_balance)?;
        if clamped {
            payment.clamped_from = Some(requested_principal);
        }

        let mut updated_history = history.clone();
        updated_history.push(payment.clone());
        updated_history.revision += 1;

        let aggregates = self.derive_checked(loan, &updated_history)?;
        let mut updated = loan.with_aggregates(aggregates);
        updated.revision = updated_history.revision;

        if clamped {
            warn!(
                "loan {}: payment {} principal {} clamped to balance {}",
                loan.id, payment.id, requested_principal, payment.principal_amount
            );
            events.emit(Event::PaymentClamped {
                loan_id: loan.id,
                payment_id: payment.id,
                requested_principal,
                applied_principal: payment.principal_amount,
            });
        }

        info!(
            "loan {}: applied payment #{} of {}, balance {} -> {}",
            loan.id,
            payment.payment_number,
            payment.total_payment,
            loan.current_balance,
            updated.current_balance
        );
        events.emit(Event::PaymentApplied {
            loan_id: loan.id,
            payment_id: payment.id,
            payment_number: payment.payment_number,
            principal_amount: payment.principal_amount,
            interest_amount: payment.interest_amount,
            total_payment: payment.total_payment,
            remaining_balance: payment.remaining_balance,
            payment_date: payment.payment_date,
        });

        if payment.interest_amount.is_positive() {
            events.emit(Event::InterestExpenseDue {
                loan_id: loan.id,
                payment_id: payment.id,
                amount: payment.interest_amount,
                currency: loan.currency.clone(),
                payment_date: payment.payment_date,
            });
        }

        emit_status_change(loan, &updated, events);

        Ok(PaymentApplied {
            loan: updated,
            payment,
            history: updated_history,
        })
    }

    /// delete a payment and return the re-derived loan
    pub fn remove_payment(
        &self,
        loan: &Loan,
        history: &PaymentHistory,
        payment_id: PaymentId,
        events: &mut EventStore,
    ) -> Result<PaymentRemoved> {
        ensure_same_loan(loan, history)?;
        ensure_fresh(loan, history)?;

        let mut updated_history = history.clone();
        let removed = updated_history
            .remove(payment_id)
            .ok_or(LoanError::PaymentNotFound { id: payment_id })?;
        updated_history.revision += 1;

        let aggregates = self.derive_checked(loan, &updated_history)?;
        let mut updated = loan.with_aggregates(aggregates);
        updated.revision = updated_history.revision;

        info!(
            "loan {}: removed payment #{} ({}), balance {} -> {}",
            loan.id,
            removed.payment_number,
            removed.id,
            loan.current_balance,
            updated.current_balance
        );
        events.emit(Event::PaymentRemoved {
            loan_id: loan.id,
            payment_id: removed.id,
            principal_amount: removed.principal_amount,
            new_balance: updated.current_balance,
        });
        emit_status_change(loan, &updated, events);

        Ok(PaymentRemoved {
            loan: updated,
            removed,
            history: updated_history,
        })
    }

    /// change a loan's terms, regenerating its schedule and totals
    pub fn amend_terms(
        &self,
        loan: &Loan,
        history: &PaymentHistory,
        terms: LoanTerms,
        events: &mut EventStore,
    ) -> Result<TermsChanged> {
        ensure_same_loan(loan, history)?;
        ensure_fresh(loan, history)?;

        let schedule = LoanSchedule::generate(&terms)?;
        let amended = loan.with_terms(terms)?;
        let aggregates = self.derive_checked(&amended, history)?;

        let mut updated_history = history.clone();
        updated_history.revision += 1;
        let mut updated = amended.with_aggregates(aggregates);
        updated.revision = updated_history.revision;

        info!(
            "loan {}: terms amended, monthly payment {} -> {}",
            loan.id, loan.monthly_payment, updated.monthly_payment
        );
        events.emit(Event::TermsAmended {
            loan_id: loan.id,
            old_monthly_payment: loan.monthly_payment,
            new_monthly_payment: updated.monthly_payment,
            schedule_entries: schedule.len(),
        });
        emit_status_change(loan, &updated, events);

        Ok(TermsChanged {
            loan: updated,
            schedule,
            history: updated_history,
        })
    }

    /// derive totals and reject histories that cannot belong to this loan
    fn derive_checked(&self, loan: &Loan, history: &PaymentHistory) -> Result<LoanAggregates> {
        let mut seen = HashSet::new();
        for payment in history.payments() {
            if !seen.insert(payment.id) {
                return Err(integrity(loan, format!("duplicate payment id {}", payment.id)));
            }
            if payment.principal_amount.is_negative()
                || payment.interest_amount.is_negative()
                || payment.total_payment.is_negative()
            {
                return Err(integrity(
                    loan,
                    format!("payment {} carries a negative amount", payment.id),
                ));
            }
        }

        let mut aggregates = derive_aggregates(loan.principal_amount, history);

        if aggregates.current_balance < -self.config.reconciliation_tolerance {
            return Err(integrity(
                loan,
                format!(
                    "principal paid {} exceeds principal {}",
                    aggregates.total_principal_paid, loan.principal_amount
                ),
            ));
        }
        if aggregates.current_balance.is_negative() {
            aggregates.current_balance = Money::ZERO;
        }

        Ok(aggregates)
    }
}

fn ensure_same_loan(loan: &Loan, history: &PaymentHistory) -> Result<()> {
    if loan.id != history.loan_id {
        return Err(LoanError::LoanMismatch {
            expected: loan.id,
            found: history.loan_id,
        });
    }
    Ok(())
}

fn ensure_fresh(loan: &Loan, history: &PaymentHistory) -> Result<()> {
    if loan.revision != history.revision {
        return Err(LoanError::ConcurrencyConflict {
            loan_id: loan.id,
            expected: loan.revision,
            found: history.revision,
        });
    }
    Ok(())
}

fn integrity(loan: &Loan, message: String) -> LoanError {
    error!("loan {}: reconciliation integrity violation: {}", loan.id, message);
    LoanError::ReconciliationIntegrity {
        loan_id: loan.id,
        message,
    }
}

fn emit_status_change(before: &Loan, after: &Loan, events: &mut EventStore) {
    if before.status != after.status {
        info!(
            "loan {}: status {:?} -> {:?}",
            after.id, before.status, after.status
        );
        events.emit(Event::StatusChanged {
            loan_id: after.id,
            old_status: before.status,
            new_status: after.status,
        });
    }
}
