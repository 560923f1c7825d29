use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::validate_schedule_inputs;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::PaymentFrequency;

use super::dates::period_date;

/// one reported row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub beginning_balance: Money,
    pub total_payment: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// monthly-equivalent payment for a fully amortizing loan
///
/// Uses the annuity formula on the nominal monthly rate in its discounted
/// form `P * c / (1 - (1+c)^-n)`, or a straight `P / n` split when the rate
/// is zero. The result keeps internal precision; callers round.
pub fn calculate_monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> Result<Money> {
    validate_schedule_inputs(principal, annual_rate, term_months)?;

    let monthly_rate = annual_rate.monthly_rate().as_decimal();
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    let interest_only = principal
        .as_decimal()
        .checked_mul(monthly_rate)
        .ok_or_else(|| overflow("payment numerator"))?;
    let denominator = Decimal::ONE - discount_factor(monthly_rate, term_months)?;

    interest_only
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or_else(|| overflow("payment denominator"))
}

/// (1 + rate)^-periods; shrinks toward zero, so long terms cannot overflow
fn discount_factor(rate: Decimal, periods: u32) -> Result<Decimal> {
    let step = Decimal::ONE
        .checked_div(Decimal::ONE + rate)
        .ok_or_else(|| overflow("discount step"))?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(step)
            .ok_or_else(|| overflow("discount factor"))?;
        if factor.is_zero() {
            // underflowed: the payment is interest only, the last row settles the rest
            break;
        }
    }
    Ok(factor)
}

fn overflow(what: &str) -> LoanError {
    LoanError::CalculationError {
        message: format!("{} overflowed", what),
    }
}

/// generate the reported amortization schedule
///
/// Interest is always simulated month by month on the nominal monthly rate.
/// Quarterly and yearly schedules fold 3 or 12 simulated months into each
/// reported entry; a trailing partial bucket becomes a shorter final entry.
/// Amounts are rounded to cents per entry, after accumulation, and the final
/// entry absorbs whatever balance remains so the schedule closes at zero.
pub fn generate_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    first_payment_date: NaiveDate,
    frequency: PaymentFrequency,
) -> Result<Vec<AmortizationEntry>> {
    let monthly_payment = calculate_monthly_payment(principal, annual_rate, term_months)?;
    let monthly_rate = annual_rate.monthly_rate();
    let months_per_entry = frequency.months_per_period();
    let entry_count = frequency.entry_count(term_months);

    let mut entries = Vec::with_capacity(entry_count as usize);
    // simulated balance at full precision, reported balance in cents
    let mut balance = principal;
    let mut reported_balance = principal.to_cents();
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;
    let mut month = 0;

    for payment_number in 1..=entry_count {
        let beginning_balance = reported_balance;
        let months_in_entry = months_per_entry.min(term_months - month);
        let mut interest_sum = Money::ZERO;
        let mut principal_sum = Money::ZERO;

        for _ in 0..months_in_entry {
            month += 1;
            let interest = balance.apply_rate(monthly_rate);
            let principal_portion = (monthly_payment - interest).min(balance);

            interest_sum += interest;
            principal_sum += principal_portion;
            balance -= principal_portion;
        }

        let is_last = payment_number == entry_count;
        let interest_payment = interest_sum.to_cents();
        let principal_payment = if is_last {
            // close out exactly what is left, whatever the formula said
            beginning_balance
        } else {
            principal_sum.to_cents().min(beginning_balance)
        };
        let total_payment = principal_payment + interest_payment;

        reported_balance = beginning_balance - principal_payment;
        cumulative_interest += interest_payment;
        cumulative_principal += principal_payment;

        entries.push(AmortizationEntry {
            payment_number,
            payment_date: period_date(first_payment_date, payment_number, frequency)?,
            beginning_balance,
            total_payment,
            principal_payment,
            interest_payment,
            ending_balance: reported_balance,
            cumulative_interest,
            cumulative_principal,
        });
    }

    debug!(
        "generated {} {:?} entries for {} at {} over {} months, monthly payment {}",
        entries.len(),
        frequency,
        principal,
        annual_rate,
        term_months,
        monthly_payment.to_cents()
    );

    Ok(entries)
}
