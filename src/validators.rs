//! Checks applied to raw input before it reaches the engine.
//!
//! Chess ids are validated by [`PlayerId`](crate::player::PlayerId)'s `FromStr`.

use anyhow::{bail, Context};
use time::{macros::format_description, Date};

/// Age from which a player may register.
pub const ADULT_AGE: i32 = 18;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> anyhow::Result<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> anyhow::Result<String> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

/// True when someone born on `birth` is at least [`ADULT_AGE`] years old on `today`.
pub fn is_adult(birth: Date, today: Date) -> bool {
    let mut age = today.year() - birth.year();
    if (u8::from(today.month()), today.day()) < (u8::from(birth.month()), birth.day()) {
        age -= 1;
    }
    age >= ADULT_AGE
}

/// A tournament may not start in the past nor end before it starts.
pub fn check_tournament_dates(start: Date, end: Date, today: Date) -> anyhow::Result<()> {
    if start < today {
        bail!("start date {start} is in the past");
    }
    if end < start {
        bail!("end date {end} is before start date {start}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn dates() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert_eq!(parse_date(" 2025-12-01\n").unwrap(), date!(2025 - 12 - 01));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("01/12/2025").is_err());
        assert_eq!(format_date(date!(2025 - 01 - 05)).unwrap(), "2025-01-05");
    }

    #[test]
    fn adulthood_starts_on_the_birthday() {
        let birth = date!(2000 - 06 - 15);
        assert!(!is_adult(birth, date!(2018 - 06 - 14)));
        assert!(is_adult(birth, date!(2018 - 06 - 15)));
        assert!(is_adult(birth, date!(2030 - 01 - 01)));
        assert!(!is_adult(birth, date!(2010 - 12 - 31)));
    }

    #[test]
    fn tournament_dates() {
        let today = date!(2025 - 03 - 10);
        assert!(check_tournament_dates(today, today, today).is_ok());
        assert!(check_tournament_dates(date!(2025 - 03 - 11), date!(2025 - 03 - 13), today).is_ok());
        assert!(check_tournament_dates(date!(2025 - 03 - 09), date!(2025 - 03 - 13), today).is_err());
        let err =
            check_tournament_dates(date!(2025 - 03 - 12), date!(2025 - 03 - 11), today).unwrap_err();
        assert!(err.to_string().contains("before start date"));
    }
}
