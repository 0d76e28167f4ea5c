use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::ValueEnum;
use now::DateTimeNow;

/// This is the standard way of converting a date to a string in daytally.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    /// First and last day (both inclusive) of the period containing `date`. Weeks start on
    /// Monday.
    pub fn bounds(self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let moment = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        match self {
            Period::Day => (date, date),
            Period::Week => (
                moment.beginning_of_week().date_naive(),
                moment.end_of_week().date_naive(),
            ),
            Period::Month => (
                moment.beginning_of_month().date_naive(),
                moment.end_of_month().date_naive(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_record_name, Period};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    #[test]
    fn test_record_name() {
        assert_eq!(date_to_record_name(TEST_DATE), "2024-04-05");
    }

    #[test]
    fn test_period_bounds() {
        assert_eq!(Period::Day.bounds(TEST_DATE), (TEST_DATE, TEST_DATE));
        assert_eq!(
            Period::Week.bounds(TEST_DATE),
            (
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 7).unwrap()
            )
        );
        assert_eq!(
            Period::Month.bounds(TEST_DATE),
            (
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
            )
        );
    }
}
