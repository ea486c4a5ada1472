//! Input validation — email syntax and compound country:number phone tokens.
//!
//! Both validators are total and deterministic: any input yields either a
//! normalized value or a `ValidationError`, never a panic.

use std::sync::OnceLock;

use regex::Regex;

use crate::currency::CurrencyTable;
use crate::error::ValidationError;

/// Minimum digit count for a plausible phone number.
const MIN_PHONE_DIGITS: usize = 7;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Syntax check only — no deliverability probing.
        Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email regex is valid")
    })
}

/// Validate an email address and return its canonical form.
///
/// Canonicalization trims surrounding whitespace and lowercases the domain
/// part; the local part is preserved as typed.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.contains("..") || !email_regex().is_match(trimmed) {
        return Err(ValidationError::Email(trimmed.to_string()));
    }
    let (local, domain) = trimmed
        .rsplit_once('@')
        .ok_or_else(|| ValidationError::Email(trimmed.to_string()))?;
    if local.starts_with('.') || local.ends_with('.') {
        return Err(ValidationError::Email(trimmed.to_string()));
    }
    Ok(format!("{local}@{}", domain.to_lowercase()))
}

/// A validated phone submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPhone {
    /// E.164-formatted number, e.g. `+14155550123`.
    pub e164: String,
    /// Canonical country display name from the currency table.
    pub country: String,
}

/// Validate a compound `country:number` token.
///
/// Fails if the separator is absent, the country is not in the table, or the
/// digits (after stripping spaces, dashes, dots and parentheses) are
/// non-numeric or fewer than [`MIN_PHONE_DIGITS`]. The E.164 form prefixes
/// the country dialing code; a number already carrying its country digits is
/// not double-prefixed, and national leading zeros are trimmed.
pub fn validate_phone(
    raw: &str,
    countries: &CurrencyTable,
) -> Result<ValidatedPhone, ValidationError> {
    let (country_part, number_part) = raw
        .split_once(':')
        .ok_or(ValidationError::MissingCountry)?;

    let profile = countries
        .resolve(country_part)
        .ok_or_else(|| ValidationError::UnknownCountry(country_part.trim().to_string()))?;

    let cleaned: String = number_part
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NonNumeric);
    }
    if cleaned.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::TooShort {
            min: MIN_PHONE_DIGITS,
        });
    }

    let code_digits = profile.phone_code.trim_start_matches('+');
    let e164 = if cleaned.starts_with(code_digits) && cleaned.len() > code_digits.len() + 4 {
        format!("+{cleaned}")
    } else {
        let national = cleaned.trim_start_matches('0');
        if national.len() < MIN_PHONE_DIGITS.min(cleaned.len()) {
            return Err(ValidationError::TooShort {
                min: MIN_PHONE_DIGITS,
            });
        }
        format!("{}{national}", profile.phone_code)
    };

    Ok(ValidatedPhone {
        e164,
        country: profile.country.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert_eq!(
            validate_email("jane.doe@example.com").unwrap(),
            "jane.doe@example.com"
        );
        assert_eq!(validate_email("a+b@sub.example.co").unwrap(), "a+b@sub.example.co");
    }

    #[test]
    fn lowercases_domain_only() {
        assert_eq!(
            validate_email("  Jane.Doe@Example.COM ").unwrap(),
            "Jane.Doe@example.com"
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@nodot",
            "user @example.com",
            "user@exa mple.com",
            "user..dots@example.com",
            ".leading@example.com",
            "user@-example.com",
        ] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn phone_scenario_usa() {
        let table = CurrencyTable::builtin();
        let v = validate_phone("usa:14155550123", &table).unwrap();
        assert_eq!(v.e164, "+14155550123");
        assert_eq!(v.country, "United States");
    }

    #[test]
    fn phone_strips_separators_and_leading_zero() {
        let table = CurrencyTable::builtin();
        let v = validate_phone("United Kingdom:07912 345-678", &table).unwrap();
        assert_eq!(v.e164, "+447912345678");
        assert_eq!(v.country, "United Kingdom");
    }

    #[test]
    fn phone_missing_separator() {
        let table = CurrencyTable::builtin();
        assert_eq!(
            validate_phone("14155550123", &table),
            Err(ValidationError::MissingCountry)
        );
    }

    #[test]
    fn phone_unknown_country() {
        let table = CurrencyTable::builtin();
        assert!(matches!(
            validate_phone("Atlantis:14155550123", &table),
            Err(ValidationError::UnknownCountry(_))
        ));
    }

    #[test]
    fn phone_too_short_or_non_numeric() {
        let table = CurrencyTable::builtin();
        assert_eq!(
            validate_phone("India:12345", &table),
            Err(ValidationError::TooShort { min: 7 })
        );
        assert_eq!(
            validate_phone("India:98x4777171", &table),
            Err(ValidationError::NonNumeric)
        );
        assert_eq!(
            validate_phone("India:", &table),
            Err(ValidationError::NonNumeric)
        );
    }

    #[test]
    fn phone_is_deterministic() {
        let table = CurrencyTable::builtin();
        let a = validate_phone("uae:501234567", &table).unwrap();
        let b = validate_phone("uae:501234567", &table).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.e164, "+971501234567");
    }
}
