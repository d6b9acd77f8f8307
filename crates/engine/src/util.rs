//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultLedger<Uuid> {
    Uuid::parse_str(value).map_err(|_| LedgerError::Validation(format!("invalid {label} id")))
}

/// Trim a required name and reject empty or overlong values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!("{label} cannot be empty")));
    }
    if trimmed.len() > 255 {
        return Err(LedgerError::Validation(format!(
            "{label} exceeds 255 characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(
            normalize_required_name("  Groceries  ", "account name").unwrap(),
            "Groceries"
        );
        assert!(normalize_required_name("   ", "account name").is_err());
    }

    #[test]
    fn optional_text_drops_blanks() {
        assert_eq!(normalize_optional_text(Some("  note ")), Some("note".to_string()));
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(None), None);
    }
}
