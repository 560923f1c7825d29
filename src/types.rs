use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a recorded payment
pub type PaymentId = Uuid;

/// reporting frequency of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl PaymentFrequency {
    /// simulated months folded into one reported entry
    pub fn months_per_period(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::Yearly => 12,
        }
    }

    /// number of reported entries for a term
    pub fn entry_count(&self, term_months: u32) -> u32 {
        term_months.div_ceil(self.months_per_period())
    }
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// outstanding balance, accepting payments
    Active,
    /// derived balance reached zero
    PaidOff,
    /// set externally, terminal
    Defaulted,
    /// set externally, terminal
    Closed,
}

impl LoanStatus {
    /// statuses this engine never produces or overrides
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Defaulted | LoanStatus::Closed)
    }
}

/// recorded payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Scheduled,
}

/// how a payment was made
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    DirectDebit,
    Card,
    Cash,
    Cheque,
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_count_rounds_up() {
        assert_eq!(PaymentFrequency::Monthly.entry_count(12), 12);
        assert_eq!(PaymentFrequency::Quarterly.entry_count(12), 4);
        assert_eq!(PaymentFrequency::Quarterly.entry_count(14), 5);
        assert_eq!(PaymentFrequency::Yearly.entry_count(13), 2);
        assert_eq!(PaymentFrequency::Yearly.entry_count(1), 1);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LoanStatus::PaidOff).unwrap();
        assert_eq!(json, "\"paid_off\"");
        let freq: PaymentFrequency = serde_json::from_str("\"quarterly\"").unwrap();
        assert_eq!(freq, PaymentFrequency::Quarterly);
    }
}
