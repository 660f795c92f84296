//! Form Text - text shaping helpers for filling printed forms
//!
//! This crate provides:
//! - Greedy, width-driven word wrapping against any measuring function
//! - Date normalization to the `DD/MM/YYYY` form used on printed forms
//! - Field naming rules (which fields hold dates, human-readable labels)
//!
//! # Example
//!
//! ```
//! use form_text::{format_date_text, wrap_text};
//!
//! // Every character 5pt wide
//! let lines = wrap_text(Some("one two three"), 40.0, |s| s.chars().count() as f64 * 5.0);
//! assert_eq!(lines, vec!["one two", "three"]);
//!
//! assert_eq!(format_date_text("2001-05-20"), "20/05/2001");
//! ```

mod date;
mod label;
mod wrap;

pub use date::{format_date, format_date_text, is_date_field, parse_date, DISPLAY_DATE_FORMAT};
pub use label::humanize_field_name;
pub use wrap::wrap_text;

use thiserror::Error;

/// Errors that can occur during form text processing
#[derive(Debug, Error)]
pub enum FormTextError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type for form text operations
pub type Result<T> = std::result::Result<T, FormTextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_field_rule() {
        assert!(is_date_field("ClosingDate"));
        assert!(is_date_field("DOB"));
        assert!(!is_date_field("FullName"));
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap_text(None, 100.0, |s| s.len() as f64), vec![String::new()]);
    }
}
