use chrono::{Months, NaiveDate};

use crate::errors::{LoanError, Result};
use crate::types::PaymentFrequency;

/// add calendar months, clamping to the end of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("date overflow adding {} months to {}", months, date),
        })
}

/// due date of the 1-based `payment_number`, always measured from the first date
pub fn period_date(
    first_payment_date: NaiveDate,
    payment_number: u32,
    frequency: PaymentFrequency,
) -> Result<NaiveDate> {
    let offset = payment_number
        .saturating_sub(1)
        .checked_mul(frequency.months_per_period())
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("period offset overflow for payment {}", payment_number),
        })?;
    add_months(first_payment_date, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_of_month_does_not_drift() {
        let first = date(2024, 1, 31);
        assert_eq!(period_date(first, 1, PaymentFrequency::Monthly).unwrap(), first);
        assert_eq!(period_date(first, 2, PaymentFrequency::Monthly).unwrap(), date(2024, 2, 29));
        assert_eq!(period_date(first, 3, PaymentFrequency::Monthly).unwrap(), date(2024, 3, 31));
    }

    #[test]
    fn test_quarterly_and_yearly() {
        let first = date(2024, 3, 15);
        assert_eq!(period_date(first, 2, PaymentFrequency::Quarterly).unwrap(), date(2024, 6, 15));
        assert_eq!(period_date(first, 4, PaymentFrequency::Quarterly).unwrap(), date(2024, 12, 15));
        assert_eq!(period_date(first, 3, PaymentFrequency::Yearly).unwrap(), date(2026, 3, 15));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(add_months(NaiveDate::MAX, 1).is_err());
    }
}
