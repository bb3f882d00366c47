//! Input validation helpers shared by the domain crates.
//!
//! Each helper takes the field name so error messages point at the offending
//! input (`"email: must contain a single '@'"`).

use crate::error::{DomainError, DomainResult};

/// Trimmed, non-empty value.
pub fn required(field: &str, value: &str) -> DomainResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

/// Trim an optional value; blank becomes `None`.
pub fn optional_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Required text with an upper bound on length (in characters).
pub fn bounded(field: &str, value: &str, max_chars: usize) -> DomainResult<String> {
    let v = required(field, value)?;
    if v.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(v)
}

/// Email address, lowercased.
///
/// Deliberately shallow: a single `@`, a non-empty local part, a dotted domain
/// and no whitespace.
pub fn email(field: &str, value: &str) -> DomainResult<String> {
    let v = required(field, value)?.to_lowercase();
    let invalid = || DomainError::validation(format!("{field} is not a valid email address"));

    if v.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = v.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(v)
}

/// Optional email: blank becomes `None`, anything else must be valid.
pub fn optional_email(field: &str, value: Option<&str>) -> DomainResult<Option<String>> {
    match optional_trimmed(value) {
        Some(v) => email(field, &v).map(Some),
        None => Ok(None),
    }
}

/// Phone number normalized to digits with an optional leading `+`.
///
/// Spaces, dashes, dots and parentheses are dropped; 7 to 15 digits remain.
pub fn phone(field: &str, value: &str) -> DomainResult<String> {
    let v = required(field, value)?;
    let mut out = String::with_capacity(v.len());
    for (i, c) in v.chars().enumerate() {
        match c {
            '+' if i == 0 => out.push(c),
            '0'..='9' => out.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(DomainError::validation(format!(
                    "{field} contains an invalid character '{c}'"
                )));
            }
        }
    }
    let digits = out.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(DomainError::validation(format!(
            "{field} must contain between 7 and 15 digits"
        )));
    }
    Ok(out)
}

/// Optional phone: blank becomes `None`, anything else must be valid.
pub fn optional_phone(field: &str, value: Option<&str>) -> DomainResult<Option<String>> {
    match optional_trimmed(value) {
        Some(v) => phone(field, &v).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Acme  ").unwrap(), "Acme");
        assert_eq!(
            required("name", "   ").unwrap_err(),
            DomainError::validation("name is required")
        );
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(email("email", " Ops@Example.COM ").unwrap(), "ops@example.com");
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in ["plain", "@example.com", "a@b", "a@b..com", "a b@example.com", "a@b@c.com"] {
            assert!(email("email", bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn optional_email_treats_blank_as_none() {
        assert_eq!(optional_email("email", Some("  ")).unwrap(), None);
        assert_eq!(optional_email("email", None).unwrap(), None);
        assert!(optional_email("email", Some("nope")).is_err());
    }

    #[test]
    fn phone_is_normalized() {
        assert_eq!(phone("phone", "+1 (305) 555-0100").unwrap(), "+13055550100");
        assert_eq!(phone("phone", "809.555.0199").unwrap(), "8095550199");
    }

    #[test]
    fn phone_rejects_letters_and_short_numbers() {
        assert!(phone("phone", "555-CALL").is_err());
        assert!(phone("phone", "12345").is_err());
        assert!(phone("phone", "1+2345678").is_err());
    }

    #[test]
    fn bounded_counts_characters() {
        assert!(bounded("status", "ñandú", 5).is_ok());
        assert!(bounded("status", "abcdef", 5).is_err());
    }

    proptest! {
        #[test]
        fn normalized_phone_is_stable(digits in "[0-9]{7,15}", plus in any::<bool>()) {
            let input = format!("{}{}", if plus { "+" } else { "" }, digits);
            let once = phone("phone", &input).unwrap();
            prop_assert_eq!(phone("phone", &once).unwrap(), once.clone());
            prop_assert_eq!(once, input);
        }
    }
}
