use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate, CENTS_SCALE};
use crate::errors::{LoanError, Result};
use crate::types::PaymentFrequency;

/// highest accepted annual rate, as a fraction
const MAX_ANNUAL_RATE: Rate = Rate::ONE;

/// loan terms supplied at creation or amendment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal_amount: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub payment_frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    /// opaque currency tag, never interpreted
    pub currency: String,
}

impl LoanTerms {
    /// monthly loan whose first payment falls one month after start
    pub fn monthly(
        principal_amount: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
        currency: &str,
    ) -> Self {
        let first_payment_date = start_date
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(start_date);

        Self {
            principal_amount,
            interest_rate,
            term_months,
            payment_frequency: PaymentFrequency::Monthly,
            start_date,
            first_payment_date,
            currency: currency.to_string(),
        }
    }

    /// same terms reported at a different frequency
    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = frequency;
        self
    }

    pub fn with_first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = date;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_schedule_inputs(self.principal_amount, self.interest_rate, self.term_months)?;

        if self.first_payment_date < self.start_date {
            return Err(LoanError::terms(
                "first_payment_date",
                format!(
                    "{} is before start date {}",
                    self.first_payment_date, self.start_date
                ),
            ));
        }

        if self.currency.trim().is_empty() {
            return Err(LoanError::terms("currency", "currency tag is empty"));
        }

        Ok(())
    }
}

/// preconditions shared by schedule generation and loan creation
pub(crate) fn validate_schedule_inputs(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> Result<()> {
    if !principal.is_positive() {
        return Err(LoanError::terms(
            "principal_amount",
            format!("must be positive, got {}", principal),
        ));
    }

    if annual_rate < Rate::ZERO || annual_rate > MAX_ANNUAL_RATE {
        return Err(LoanError::InvalidInterestRate { rate: annual_rate });
    }

    if term_months == 0 {
        return Err(LoanError::terms("term_months", "must be at least 1"));
    }

    Ok(())
}

/// engine tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// payoff simulation cap (600 months = 50 years)
    pub max_simulation_months: u32,
    /// how far below zero a derived balance may fall before it is corrupt
    pub reconciliation_tolerance: Money,
    /// decimal places for reported amounts
    pub reporting_precision: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_simulation_months: 600,
            reconciliation_tolerance: Money::ZERO,
            reporting_precision: CENTS_SCALE,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| {
            LoanError::CalculationError {
                message: format!("invalid engine config: {}", e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_simulation_months == 0 {
            return Err(LoanError::terms(
                "max_simulation_months",
                "must be at least 1",
            ));
        }
        if self.reconciliation_tolerance.is_negative() {
            return Err(LoanError::terms(
                "reconciliation_tolerance",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// round a reported amount to the configured precision
    pub fn report(&self, amount: Money) -> Money {
        amount.round_dp(self.reporting_precision)
    }
}
