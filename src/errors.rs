use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus, PaymentId};

/// which side of a payoff simulation failed to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationScenario {
    Baseline,
    Accelerated,
}

impl std::fmt::Display for SimulationScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationScenario::Baseline => write!(f, "baseline"),
            SimulationScenario::Accelerated => write!(f, "accelerated"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid loan terms: {field}: {reason}")]
    InvalidTerms {
        field: &'static str,
        reason: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid payment: {field}: {reason}")]
    InvalidPayment {
        field: &'static str,
        reason: String,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: PaymentId,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("payment history belongs to loan {found}, expected {expected}")]
    LoanMismatch {
        expected: LoanId,
        found: LoanId,
    },

    #[error("{scenario} payoff did not converge within {max_months} months, {remaining_balance} still outstanding")]
    NonConvergentSimulation {
        scenario: SimulationScenario,
        max_months: u32,
        remaining_balance: Money,
    },

    #[error("reconciliation integrity violation on loan {loan_id}: {message}")]
    ReconciliationIntegrity {
        loan_id: LoanId,
        message: String,
    },

    #[error("concurrency conflict on loan {loan_id}: expected revision {expected}, found {found}")]
    ConcurrencyConflict {
        loan_id: LoanId,
        expected: u64,
        found: u64,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

impl LoanError {
    /// malformed input; nothing was changed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoanError::InvalidTerms { .. }
                | LoanError::InvalidInterestRate { .. }
                | LoanError::InvalidPayment { .. }
                | LoanError::PaymentNotFound { .. }
                | LoanError::LoanNotActive { .. }
                | LoanError::LoanMismatch { .. }
        )
    }

    /// corrupted payment history, must not be swallowed
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoanError::ReconciliationIntegrity { .. })
    }

    /// stale read, caller should reload history and retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoanError::ConcurrencyConflict { .. })
    }

    pub(crate) fn terms(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidTerms {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn payment(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidPayment {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_classes() {
        let validation = LoanError::terms("term_months", "must be at least 1");
        assert!(validation.is_validation());
        assert!(!validation.is_fatal());
        assert_eq!(
            validation.to_string(),
            "invalid loan terms: term_months: must be at least 1"
        );

        let integrity = LoanError::ReconciliationIntegrity {
            loan_id: Uuid::nil(),
            message: "negative balance".to_string(),
        };
        assert!(integrity.is_fatal());
        assert!(!integrity.is_validation());

        let conflict = LoanError::ConcurrencyConflict {
            loan_id: Uuid::nil(),
            expected: 2,
            found: 3,
        };
        assert!(conflict.is_retryable());
    }

    #[test]
    fn test_non_convergence_message() {
        let err = LoanError::NonConvergentSimulation {
            scenario: SimulationScenario::Baseline,
            max_months: 600,
            remaining_balance: Money::from_major(100),
        };
        assert!(err.to_string().starts_with("baseline payoff did not converge within 600 months"));
    }
}
