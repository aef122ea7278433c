//! Shared primitive types and text encodings used across the desk.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Timestamps are stored as text in this format so that lexical
/// comparison in SQL matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Short human-facing identifier: `prefix` + 8 upper-case hex chars.
pub fn short_id(prefix: char) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_carry_prefix_and_eight_hex_chars() {
        let id = short_id('S');
        assert_eq!(id.len(), 9);
        assert!(id.starts_with('S'));
        assert!(id[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn timestamps_sort_lexically() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let earlier = format_timestamp(d.and_hms_opt(9, 0, 0).unwrap());
        let later = format_timestamp(d.and_hms_opt(10, 0, 0).unwrap());
        assert!(earlier < later);
        assert_eq!(parse_date("2026-03-09"), Some(d));
        assert_eq!(parse_date("09/03/2026"), None);
    }
}
