//! Input validation shared by model constructors and engine commands.
//!
//! # Invariants
//! - Titles and checklist text are stored trimmed and never blank.
//! - Due dates are accepted only as real `yyyy-mm-dd` calendar dates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("ISO date pattern must compile")
});

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Rejected user input. The caller keeps its form open and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankBoardTitle,
    BlankColumnTitle,
    BlankTaskTitle,
    BlankChecklistText,
    /// Input did not parse as a `yyyy-mm-dd` calendar date.
    InvalidDueDate(String),
    /// Priority text is not one of `low|medium|high`.
    UnknownPriority(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankBoardTitle => write!(f, "board title must not be blank"),
            Self::BlankColumnTitle => write!(f, "column title must not be blank"),
            Self::BlankTaskTitle => write!(f, "task title must not be blank"),
            Self::BlankChecklistText => write!(f, "checklist item text must not be blank"),
            Self::InvalidDueDate(value) => {
                write!(f, "invalid due date `{value}`; expected yyyy-mm-dd")
            }
            Self::UnknownPriority(value) => {
                write!(f, "unknown priority `{value}`; expected low|medium|high")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it with `err` when nothing is left.
pub(crate) fn normalize_text(
    value: impl Into<String>,
    err: ValidationError,
) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_string())
}

/// Formats a `yyyy-mm-dd` date picker value into the stored display string.
///
/// The display form is `<day> <Month>` without zero padding, e.g.
/// `2026-10-05` becomes `5 October`.
///
/// # Errors
/// - `ValidationError::InvalidDueDate` for malformed text or a date that does
///   not exist on the calendar (`2026-02-30`).
pub fn format_due_date(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidDueDate(trimmed.to_string());

    let captures = ISO_DATE_RE.captures(trimmed).ok_or_else(invalid)?;
    let year: u32 = captures[1].parse().map_err(|_| invalid())?;
    let month: u32 = captures[2].parse().map_err(|_| invalid())?;
    let day: u32 = captures[3].parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(invalid());
    }

    Ok(format!("{day} {}", MONTH_NAMES[(month - 1) as usize]))
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::{format_due_date, normalize_text, ValidationError};

    #[test]
    fn normalize_text_trims_and_rejects_blank() {
        assert_eq!(
            normalize_text("  Backlog ", ValidationError::BlankColumnTitle).unwrap(),
            "Backlog"
        );
        assert_eq!(
            normalize_text(" \t", ValidationError::BlankColumnTitle).unwrap_err(),
            ValidationError::BlankColumnTitle
        );
    }

    #[test]
    fn format_due_date_uses_day_and_long_month() {
        assert_eq!(format_due_date("2026-10-05").unwrap(), "5 October");
        assert_eq!(format_due_date("2024-02-29").unwrap(), "29 February");
    }

    #[test]
    fn format_due_date_rejects_impossible_dates() {
        assert!(format_due_date("2026-02-29").is_err());
        assert!(format_due_date("2026-13-01").is_err());
        assert!(format_due_date("05/10/2026").is_err());
        assert!(format_due_date("").is_err());
    }
}
