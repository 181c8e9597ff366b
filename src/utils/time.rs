use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse a strict 24h `HH:MM` string.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Wall clock of the marketplace.
///
/// Appointments and working hours are expressed in local time, so "now"
/// has to be read in the same zone before comparing.
#[derive(Debug, Clone, Copy)]
pub struct MarketClock {
    utc_offset_minutes: i32,
}

impl MarketClock {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::minutes(self.utc_offset_minutes as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_hhmm("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_hhmm("9:00").is_none());
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("12:60").is_none());
        assert!(parse_hhmm("12-30").is_none());
        assert!(parse_hhmm("").is_none());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("01.03.2025").is_none());
    }

    #[test]
    fn test_market_clock_offset() {
        let utc = MarketClock::new(0).now();
        let istanbul = MarketClock::new(180).now();
        let diff = (istanbul - utc).num_minutes();
        assert!((179..=181).contains(&diff));
    }
}
