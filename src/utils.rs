use crate::error::{AppError, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Get done-trade tape directory from environment variable or use default
pub fn get_tape_data_dir() -> PathBuf {
    std::env::var("DONE_TRADE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("done_trade_data"))
}

/// Parse a YYYY-MM-DD date string
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("Invalid date '{}'. Expected YYYY-MM-DD", s)))
}

/// Format a date as the YYYY-MM-DD key used in pivot results
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format an intraday HHMMSS timestamp as a zero-padded 6-digit row key
/// so that lexical and numeric ordering agree
pub fn time_key(time: u32) -> String {
    format!("{:06}", time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_valid() {
        let date = parse_date("2024-03-15").unwrap();
        assert_eq!(format_date(date), "2024-03-15");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("15-03-2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_time_key_padding() {
        assert_eq!(time_key(91500), "091500");
        assert_eq!(time_key(143059), "143059");
        assert_eq!(time_key(0), "000000");
    }
}
