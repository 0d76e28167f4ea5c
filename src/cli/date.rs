use std::fmt::Display;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DateStyle {
    #[default]
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub const DATE_HELP: &str = "Day of the records. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\". Defaults to today";

/// Resolves a day given on the command line relative to `now`. Without input it's the day of
/// `now`.
pub fn parse_day(input: Option<&str>, style: DateStyle, now: NaiveDateTime) -> Result<NaiveDate> {
    let Some(input) = input else {
        return Ok(now.date());
    };

    // The naive time is treated as utc so that relative dates don't shift across timezones.
    let now = Utc.from_utc_datetime(&now);
    match parse_date_string(input, now, style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {input:?}: {e}"),
            )
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use super::{parse_day, DateStyle};

    const TEST_NOW: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
        NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
    );

    #[test]
    fn test_defaults_to_today() {
        assert_eq!(
            parse_day(None, DateStyle::Uk, TEST_NOW).unwrap(),
            TEST_NOW.date()
        );
    }

    #[test]
    fn test_relative_day() {
        assert_eq!(
            parse_day(Some("yesterday"), DateStyle::Uk, TEST_NOW).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 4).unwrap()
        );
    }

    #[test]
    fn test_date_styles() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(
            parse_day(Some("15/03/2025"), DateStyle::Uk, TEST_NOW).unwrap(),
            expected
        );
        assert_eq!(
            parse_day(Some("03/15/2025"), DateStyle::Us, TEST_NOW).unwrap(),
            expected
        );
    }

    #[test]
    fn test_invalid_date() {
        assert!(parse_day(Some("not a date at all"), DateStyle::Uk, TEST_NOW).is_err());
    }
}
