//! Date normalization for printed forms

use crate::{FormTextError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// `DD/MM/YYYY`, the only date format printed on a form
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format an optional date, missing dates render as an empty string
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use form_text::format_date;
/// assert_eq!(format_date(NaiveDate::from_ymd_opt(2001, 5, 20)), "20/05/2001");
/// assert_eq!(format_date(None), "");
/// ```
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse the date representations found in application records
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the calendar date as written
/// is kept, no time zone shift), `YYYY-MM-DD HH:MM:SS` and `DD/MM/YYYY`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(timestamp.date());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }
    NaiveDate::parse_from_str(text, DISPLAY_DATE_FORMAT)
        .map_err(|_| FormTextError::InvalidDate(text.to_string()))
}

/// Normalize free date text for display
///
/// Parseable dates become `DD/MM/YYYY`. Anything else is printed as
/// written (trimmed), never replaced by a placeholder.
pub fn format_date_text(text: &str) -> String {
    match parse_date(text) {
        Ok(date) => format_date(Some(date)),
        Err(_) => text.trim().to_string(),
    }
}

/// Whether a logical field or column name holds a date
///
/// True when the name contains "date" in any case, or is `DOB`.
pub fn is_date_field(name: &str) -> bool {
    name.eq_ignore_ascii_case("dob") || name.to_ascii_lowercase().contains("date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2001, 5, 20)), "20/05/2001");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(1999, 12, 1)), "01/12/1999");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2001-05-20").unwrap(), NaiveDate::from_ymd_opt(2001, 5, 20).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_keeps_written_date() {
        let date = parse_date("2024-03-31T23:30:00.000+05:30").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        let date = parse_date("2024-01-15T08:00:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_naive_timestamps() {
        assert_eq!(
            parse_date("2023-07-04 10:15:00").unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 4).unwrap()
        );
        assert_eq!(
            parse_date("2023-07-04T10:15:00.250").unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 4).unwrap()
        );
    }

    #[test]
    fn test_parse_display_format() {
        assert_eq!(parse_date("20/05/2001").unwrap(), NaiveDate::from_ymd_opt(2001, 5, 20).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_date("next spring"), Err(FormTextError::InvalidDate(_))));
        assert!(parse_date("2001-02-30").is_err());
    }

    #[test]
    fn test_format_date_text() {
        assert_eq!(format_date_text("2001-05-20"), "20/05/2001");
        assert_eq!(format_date_text(" 2024-01-15T08:00:00Z "), "15/01/2024");
        assert_eq!(format_date_text("  to date  "), "to date");
        assert_eq!(format_date_text(""), "");
    }

    #[test]
    fn test_is_date_field() {
        assert!(is_date_field("FromDate"));
        assert!(is_date_field("submissionDate"));
        assert!(is_date_field("DATE_OF_APPOINTMENT"));
        assert!(is_date_field("DOB"));
        assert!(is_date_field("dob"));
        assert!(!is_date_field("DOBVerified"));
        assert!(!is_date_field("FromYear"));
        assert!(!is_date_field("Designation"));
    }
}
