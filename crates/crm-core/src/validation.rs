//! # Validation Module
//!
//! Input validation that runs before the data access layer touches the
//! database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (Rust, before any write)                         │
//! │  └── Full-name format ("First Last")                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints (RESTRICT / CASCADE)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Splits a full name into `(first_name, last_name)`.
///
/// ## Rules
/// - Exactly two whitespace-separated tokens
/// - Surrounding and repeated whitespace is ignored
/// - Hyphenated names count as one token
///
/// ## Example
/// ```rust
/// use crm_core::validation::split_full_name;
///
/// let (first, last) = split_full_name("Kareem Abdul-Jabbar").unwrap();
/// assert_eq!((first.as_str(), last.as_str()), ("Kareem", "Abdul-Jabbar"));
///
/// assert!(split_full_name("Madonna").is_err());
/// assert!(split_full_name("A B C").is_err());
/// ```
pub fn split_full_name(full_name: &str) -> ValidationResult<(String, String)> {
    let names: Vec<&str> = full_name.split_whitespace().collect();

    match names.as_slice() {
        [first, last] => Ok((first.to_string(), last.to_string())),
        _ => Err(ValidationError::invalid_format(
            "full_name",
            format!("expected 2 names, found {}", names.len()),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_tokens() {
        let (first, last) = split_full_name("Lew Alcindor").unwrap();
        assert_eq!(first, "Lew");
        assert_eq!(last, "Alcindor");
    }

    #[test]
    fn test_split_hyphenated_last_name() {
        let (first, last) = split_full_name("Kareem Abdul-Jabbar").unwrap();
        assert_eq!(first, "Kareem");
        assert_eq!(last, "Abdul-Jabbar");
    }

    #[test]
    fn test_split_ignores_extra_whitespace() {
        let (first, last) = split_full_name("  Jerry   West ").unwrap();
        assert_eq!(first, "Jerry");
        assert_eq!(last, "West");
    }

    #[test]
    fn test_split_rejects_single_token() {
        let err = split_full_name("Madonna").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "full_name"));
        assert!(err.to_string().contains("found 1"));
    }

    #[test]
    fn test_split_rejects_three_tokens() {
        let err = split_full_name("A B C").unwrap_err();
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_split_rejects_empty() {
        assert!(split_full_name("").is_err());
        assert!(split_full_name("   ").is_err());
    }
}
