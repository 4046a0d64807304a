use super::domain::GrowthError;
use chrono::{Datelike, NaiveDate};

/// Whole-month age arithmetic anchored on the date of birth.
pub struct AgeCalculator;

impl AgeCalculator {
    /// Completed months between `date_of_birth` and `as_of`, never rounded up.
    ///
    /// A month counts once the day of month of `as_of` reaches the birth day of month, so a
    /// child born on 31 January is still zero months old on 29 February.
    pub fn age_in_months(date_of_birth: NaiveDate, as_of: NaiveDate) -> Result<u32, GrowthError> {
        if as_of < date_of_birth {
            return Err(GrowthError::DateBeforeBirth {
                date: as_of,
                date_of_birth,
            });
        }

        let years = as_of.year() - date_of_birth.year();
        let months = as_of.month() as i32 - date_of_birth.month() as i32;
        let mut total = years * 12 + months;
        if as_of.day() < date_of_birth.day() {
            total -= 1;
        }

        Ok(total.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn same_day_is_zero_months() {
        let dob = date(2024, 1, 1);
        assert_eq!(AgeCalculator::age_in_months(dob, dob).expect("age"), 0);
    }

    #[test]
    fn counts_only_completed_months() {
        let dob = date(2024, 1, 15);
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2024, 2, 14)).expect("age"),
            0
        );
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2024, 2, 15)).expect("age"),
            1
        );
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2024, 7, 1)).expect("age"),
            5
        );
    }

    #[test]
    fn end_of_month_birthdays_floor() {
        let dob = date(2024, 1, 31);
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2024, 2, 29)).expect("age"),
            0
        );
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2024, 3, 31)).expect("age"),
            2
        );
    }

    #[test]
    fn spans_year_boundaries() {
        let dob = date(2023, 11, 20);
        assert_eq!(
            AgeCalculator::age_in_months(dob, date(2025, 1, 20)).expect("age"),
            14
        );
    }

    #[test]
    fn rejects_dates_before_birth() {
        let dob = date(2024, 3, 1);
        let error = AgeCalculator::age_in_months(dob, date(2024, 2, 28)).expect_err("invalid");
        assert!(matches!(error, GrowthError::DateBeforeBirth { .. }));
    }
}
