//! Pure validation rules for text, date and contact answers.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use crate::error::ValidationError;

/// Minimum age allowed to receive a consultation.
pub const MINIMUM_AGE: i32 = 18;

/// Minimum trimmed length of a free-text answer, in characters.
pub const MIN_TEXT_CHARS: usize = 2;

/// Minimum length of a normalized phone number.
pub const MIN_PHONE_LEN: usize = 8;

/// Wire format of birth dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_.+\-]+@[a-z0-9_.\-]+\.[a-z]{2,}$").expect("email pattern compiles")
});

/// Accept a free-text answer with at least two non-blank characters.
/// Returns the trimmed value.
pub fn validate_free_text(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(ValidationError::TooShort);
    }
    Ok(trimmed.to_string())
}

/// Whole years between `birth` and `today`, decremented when today's
/// month/day precedes the birthday.
pub fn calculate_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BirthDateRequired);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate)
}

/// Validate a birth date against a fixed `today` and return the age.
///
/// The 18-year floor is enforced here regardless of any clamp applied by
/// the date input.
pub fn evaluate_age(value: &str, today: NaiveDate) -> Result<u32, ValidationError> {
    let birth = parse_birth_date(value)?;
    let age = calculate_age(birth, today);
    if age < MINIMUM_AGE {
        return Err(ValidationError::Underage { age });
    }
    Ok(age as u32)
}

/// [`evaluate_age`] as of the local current date.
pub fn validate_birth_date(value: &str) -> Result<u32, ValidationError> {
    evaluate_age(value, Local::now().date_naive())
}

/// Latest date a date input may offer.
pub fn max_birth_date(today: NaiveDate) -> String {
    today.format(DATE_FORMAT).to_string()
}

/// Trim and lower-case an email address.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Check an email address after normalization.
pub fn validate_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(&normalize_email(value))
}

/// Keep only digits and `+` signs.
pub fn normalize_phone(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check a phone number after normalization.
pub fn validate_phone(value: &str) -> bool {
    normalize_phone(value).len() >= MIN_PHONE_LEN
}

/// Validate both contact fields and return their normalized forms.
/// Email problems are reported before phone problems.
pub fn validate_contact(email: &str, phone: &str) -> Result<(String, String), ValidationError> {
    let email = normalize_email(email);
    if !validate_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    let phone = normalize_phone(phone);
    if phone.len() < MIN_PHONE_LEN {
        return Err(ValidationError::InvalidPhone);
    }
    Ok((email, phone))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn free_text_needs_two_characters() {
        assert_eq!(validate_free_text("  Lu ").unwrap(), "Lu");
        assert_eq!(validate_free_text(" L "), Err(ValidationError::TooShort));
        assert_eq!(validate_free_text("   "), Err(ValidationError::TooShort));
        assert_eq!(validate_free_text("Zé").unwrap(), "Zé");
    }

    #[test]
    fn age_of_adult() {
        assert_eq!(evaluate_age("2000-01-01", date(2023, 6, 1)), Ok(23));
    }

    #[test]
    fn underage_is_rejected() {
        let err = evaluate_age("2010-06-02", date(2023, 6, 1)).unwrap_err();
        assert_eq!(err, ValidationError::Underage { age: 12 });
        assert_eq!(err.to_string(), "Consulta destinada apenas a maiores de 18 anos.");
    }

    #[test]
    fn empty_date_is_required() {
        let err = evaluate_age("", date(2023, 6, 1)).unwrap_err();
        assert_eq!(err, ValidationError::BirthDateRequired);
        assert_eq!(err.to_string(), "Informe sua data de nascimento.");
    }

    #[test]
    fn unparsable_date_is_invalid() {
        assert_eq!(
            evaluate_age("01/02/2000", date(2023, 6, 1)),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            evaluate_age("2001-02-30", date(2023, 6, 1)),
            Err(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn birthday_boundary() {
        let today = date(2023, 6, 1);
        assert_eq!(evaluate_age("2005-06-01", today), Ok(18));
        assert_eq!(
            evaluate_age("2005-06-02", today),
            Err(ValidationError::Underage { age: 17 })
        );
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(calculate_age(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }

    #[test]
    fn future_dates_are_underage() {
        assert!(matches!(
            evaluate_age("2030-01-01", date(2023, 6, 1)),
            Err(ValidationError::Underage { .. })
        ));
    }

    #[test]
    fn max_date_is_today() {
        assert_eq!(max_birth_date(date(2023, 6, 1)), "2023-06-01");
    }

    #[test]
    fn email_pattern() {
        assert!(validate_email("ana.silva+tarot@example.co"));
        assert!(validate_email("  Ana.Silva@Example.COM "));
        assert!(!validate_email("ana@@x"));
        assert!(!validate_email("ana@x"));
        assert!(!validate_email("ana@example.c"));
        assert!(!validate_email(""));
        assert!(!validate_email("ana@example.\u{17f}\u{17f}"));
        assert!(!validate_email("\u{17f}ana@example.com"));
    }

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone("(11) 98765-4321"), "11987654321");
        assert_eq!(normalize_phone("+55 11 9999-0000"), "+551199990000");
        assert!(!validate_phone("1234567"));
        assert!(validate_phone("12345678"));
        assert!(!validate_phone("(12) 3-45"));
    }

    #[test]
    fn contact_reports_email_first() {
        assert_eq!(
            validate_contact("nope", "1"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_contact("luna@example.com", "1234"),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(
            validate_contact(" Luna@Example.com ", "(11) 99999-0000").unwrap(),
            ("luna@example.com".to_string(), "11999990000".to_string())
        );
    }
}
