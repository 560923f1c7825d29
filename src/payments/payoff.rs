use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result, SimulationScenario};
use crate::loan::Loan;
use crate::schedule::add_months;

/// what-if projection for an extra monthly payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffProjection {
    pub months_saved: u32,
    pub interest_saved: Money,
    pub original_payoff_date: NaiveDate,
    pub new_payoff_date: NaiveDate,
    pub baseline_months: u32,
    pub accelerated_months: u32,
    pub baseline_interest: Money,
    pub accelerated_interest: Money,
}

/// outcome of one monthly payoff run
#[derive(Debug, Clone, Copy)]
struct PayoffRun {
    months: u32,
    total_interest: Money,
}

/// read-only payoff simulator
///
/// Steps month by month from the loan's current balance on the nominal
/// monthly rate, whatever the loan's reporting frequency.
#[derive(Debug, Clone)]
pub struct PayoffSimulator {
    max_months: u32,
}

impl Default for PayoffSimulator {
    fn default() -> Self {
        Self {
            max_months: EngineConfig::default().max_simulation_months,
        }
    }
}

impl PayoffSimulator {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_months: config.max_simulation_months,
        })
    }

    pub fn max_months(&self) -> u32 {
        self.max_months
    }

    /// compare paying `monthly_payment` against `monthly_payment + extra`
    pub fn simulate(
        &self,
        loan: &Loan,
        extra_monthly_payment: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PayoffProjection> {
        if extra_monthly_payment.is_negative() {
            return Err(LoanError::payment(
                "extra_monthly_payment",
                format!("must not be negative, got {}", extra_monthly_payment),
            ));
        }

        let monthly_rate = loan.interest_rate.monthly_rate();
        let baseline = self.run(
            loan.current_balance,
            monthly_rate,
            loan.monthly_payment,
            SimulationScenario::Baseline,
        )?;
        let accelerated = self.run(
            loan.current_balance,
            monthly_rate,
            loan.monthly_payment + extra_monthly_payment,
            SimulationScenario::Accelerated,
        )?;

        let today = time_provider.now().date_naive();
        let baseline_interest = baseline.total_interest.to_cents();
        let accelerated_interest = accelerated.total_interest.to_cents();
        let projection = PayoffProjection {
            months_saved: baseline.months.saturating_sub(accelerated.months),
            interest_saved: baseline_interest - accelerated_interest,
            original_payoff_date: add_months(today, baseline.months)?,
            new_payoff_date: add_months(today, accelerated.months)?,
            baseline_months: baseline.months,
            accelerated_months: accelerated.months,
            baseline_interest,
            accelerated_interest,
        };

        debug!(
            "loan {}: extra {} per month saves {} months and {} interest",
            loan.id, extra_monthly_payment, projection.months_saved, projection.interest_saved
        );

        Ok(projection)
    }

    fn run(
        &self,
        starting_balance: Money,
        monthly_rate: Rate,
        payment: Money,
        scenario: SimulationScenario,
    ) -> Result<PayoffRun> {
        let mut balance = starting_balance;
        let mut total_interest = Money::ZERO;
        let mut months = 0;

        while balance.is_positive() {
            if months >= self.max_months {
                return Err(LoanError::NonConvergentSimulation {
                    scenario,
                    max_months: self.max_months,
                    remaining_balance: balance.to_cents(),
                });
            }

            let interest = balance.apply_rate(monthly_rate);
            let principal = payment - interest;
            total_interest += interest;
            balance -= principal;
            months += 1;
        }

        Ok(PayoffRun {
            months,
            total_interest,
        })
    }
}

/// simulate with the default 600 month cap
pub fn simulate_payoff(
    loan: &Loan,
    extra_monthly_payment: Money,
    time_provider: &SafeTimeProvider,
) -> Result<PayoffProjection> {
    PayoffSimulator::default().simulate(loan, extra_monthly_payment, time_provider)
}
