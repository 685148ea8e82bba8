//! Shared predicates used by compiled validators.
//!
//! The same three checks are emitted once per generated compilation unit by
//! the code generator; the functions here are their in-process counterparts
//! and share the date-layout translation with it.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A shared helper predicate a compiled rule may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Helper {
    Uuid,
    Email,
    Date,
}

impl Helper {
    /// Every helper, in emission order.
    pub const ALL: [Helper; 3] = [Helper::Uuid, Helper::Email, Helper::Date];

    /// Symbol the helper is emitted under.
    pub fn symbol(self) -> &'static str {
        match self {
            Helper::Uuid => "is_valid_uuid",
            Helper::Email => "is_valid_email",
            Helper::Date => "is_valid_date",
        }
    }
}

/// Addr-spec shaped address: dot-atom local part, hostname labels.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("static regex must compile"));

/// Returns `true` if `value` parses as a UUID.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::helpers::is_valid_uuid;
///
/// assert!(is_valid_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
/// assert!(!is_valid_uuid("67e55044-10b1-426f-9247"));
/// ```
pub fn is_valid_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

/// Returns `true` if `value` is a syntactically valid email address.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::helpers::is_valid_email;
///
/// assert!(is_valid_email("ada@example.com"));
/// assert!(!is_valid_email("ada.example.com"));
/// assert!(!is_valid_email("ada@"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Translates a `YYYY-MM-DD`-style layout into a chrono format string.
///
/// Tokens: `YYYY` year, `MM` month, `DD` day, `hh`/`HH` hour, `mm` minute,
/// `ss` second. Everything else is literal.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::helpers::chrono_format;
///
/// assert_eq!(chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
/// assert_eq!(chrono_format("YYYY-MM-DDThh:mm:ss"), "%Y-%m-%dT%H:%M:%S");
/// ```
pub fn chrono_format(layout: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("hh", "%H"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'scan: while let Some(c) = rest.chars().next() {
        for (token, spec) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'scan;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Returns `true` if `value` parses under the chrono `format` and formats
/// back to exactly the same text.
///
/// The round trip makes the check exact: `2024-2-5` is rejected for
/// `%Y-%m-%d` even though chrono would accept the short fields.
pub fn parses_exactly(value: &str, format: &str) -> bool {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
        return datetime.format(format).to_string() == value;
    }
    match NaiveDate::parse_from_str(value, format) {
        Ok(date) => date.format(format).to_string() == value,
        Err(_) => false,
    }
}

/// Returns `true` if `value` is a date in the given `YYYY-MM-DD`-style layout.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::helpers::is_valid_date;
///
/// assert!(is_valid_date("2024-02-29", "YYYY-MM-DD"));
/// assert!(!is_valid_date("2023-02-29", "YYYY-MM-DD"));
/// assert!(is_valid_date("2024-02-29T13:45:00", "YYYY-MM-DDThh:mm:ss"));
/// ```
pub fn is_valid_date(value: &str, layout: &str) -> bool {
    parses_exactly(value, &chrono_format(layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_accepts_uppercase_and_simple_forms() {
        assert!(is_valid_uuid("67E55044-10B1-426F-9247-BB680E5FE0C8"));
        assert!(is_valid_uuid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_uuid(""));
        assert!(!is_valid_uuid("not-a-uuid"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(".leading@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@-example.com"));
    }

    #[test]
    fn test_date_must_match_layout_exactly() {
        assert!(is_valid_date("2024-01-05", "YYYY-MM-DD"));
        assert!(!is_valid_date("2024-1-5", "YYYY-MM-DD"));
        assert!(!is_valid_date("20240105", "YYYY-MM-DD"));
        assert!(!is_valid_date("2024-13-01", "YYYY-MM-DD"));
        assert!(!is_valid_date("", "YYYY-MM-DD"));
    }

    #[test]
    fn test_alternate_layout() {
        assert!(is_valid_date("05/01/2024", "DD/MM/YYYY"));
        assert!(!is_valid_date("2024-01-05", "DD/MM/YYYY"));
    }

    #[test]
    fn test_percent_is_escaped() {
        assert_eq!(chrono_format("YYYY%"), "%Y%%");
    }

    #[test]
    fn test_helper_symbols_are_distinct() {
        let symbols: Vec<_> = Helper::ALL.iter().map(|h| h.symbol()).collect();
        assert_eq!(symbols, ["is_valid_uuid", "is_valid_email", "is_valid_date"]);
    }
}
