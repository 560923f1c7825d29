/// serialization support for loans
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::payments::PaymentHistory;
use crate::schedule::LoanSchedule;
use crate::types::{LoanId, LoanStatus, PaymentFrequency};

/// serializable view of a loan's state
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub account_id: String,
    pub status: LoanStatus,
    pub currency: String,
    pub terms: TermsView,
    pub financial: FinancialView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub principal_amount: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub payment_frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub monthly_payment: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub current_balance: Money,
    pub total_paid: Money,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
    /// percent of principal repaid
    pub progress: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub entries: usize,
    pub total_interest: Money,
    pub total_payment: Money,
    pub payoff_date: Option<NaiveDate>,
    pub next_payment_number: Option<u32>,
    pub next_payment_date: Option<NaiveDate>,
    pub next_payment_amount: Option<Money>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan, schedule: Option<(&LoanSchedule, &PaymentHistory)>) -> Self {
        let schedule = schedule.map(|(schedule, history)| {
            let next = schedule.next_due(history);
            ScheduleView {
                entries: schedule.len(),
                total_interest: schedule.total_interest(),
                total_payment: schedule.total_payment(),
                payoff_date: schedule.payoff_date(),
                next_payment_number: next.map(|e| e.payment_number),
                next_payment_date: next.map(|e| e.payment_date),
                next_payment_amount: next.map(|e| e.total_payment),
            }
        });

        LoanView {
            id: loan.id,
            account_id: loan.account_id.clone(),
            status: loan.status,
            currency: loan.currency.clone(),
            terms: TermsView {
                principal_amount: loan.principal_amount,
                interest_rate: loan.interest_rate,
                term_months: loan.term_months,
                payment_frequency: loan.payment_frequency,
                start_date: loan.start_date,
                first_payment_date: loan.first_payment_date,
                monthly_payment: loan.monthly_payment,
            },
            financial: FinancialView {
                current_balance: loan.current_balance,
                total_paid: loan.total_paid,
                total_principal_paid: loan.total_principal_paid,
                total_interest_paid: loan.total_interest_paid,
                progress: loan.progress(),
            },
            schedule,
        }
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

impl Loan {
    /// json representation of the loan's current state
    pub fn to_json_pretty(&self) -> String {
        LoanView::from_loan(self, None).to_json_pretty()
    }
}
