use anyhow::{Context, Result};
use chrono::NaiveDate;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::leave::calendar::CalendarKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    pub holiday_calendar: CalendarKind,
    /// Organisation-wide closures on top of the calendar's public holidays
    pub extra_holidays: Vec<NaiveDate>,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Parses a comma separated `YYYY-MM-DD` list. Blank entries are skipped.
pub fn parse_holiday_list(raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("EXTRA_HOLIDAYS: {s:?} is not a YYYY-MM-DD date"))
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let extra_holidays = match env::var("EXTRA_HOLIDAYS") {
            Ok(raw) => parse_holiday_list(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            holiday_calendar: parsed_or("HOLIDAY_CALENDAR", CalendarKind::Greece)?,
            extra_holidays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holiday_list_parses_and_skips_blanks() {
        let dates = parse_holiday_list(" 2025-09-12, ,2025-11-17 ").unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
                NaiveDate::from_ymd_opt(2025, 11, 17).unwrap(),
            ]
        );
        assert!(parse_holiday_list("").unwrap().is_empty());
    }

    #[test]
    fn holiday_list_names_the_bad_entry() {
        let err = parse_holiday_list("2025-09-12,12/11/2025").unwrap_err();
        assert!(err.to_string().contains("12/11/2025"));
    }
}
