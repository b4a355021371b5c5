//! Stateless validation policy for emails and passwords.

use regex::Regex;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
///
/// Syntactic only: local part, `@`, and a domain containing at least one dot,
/// with no whitespace anywhere. No DNS or deliverability verification.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Password acceptability: at least [`MIN_PASSWORD_CHARS`] characters.
///
/// Counted in characters rather than bytes so multi-byte input is not
/// penalized. No complexity classes are required.
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn is_valid_email_accepts_basic_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("name.surname@example.co"));
        assert!(is_valid_email("user+tag@mail.example.com"));
    }

    #[test]
    fn is_valid_email_rejects_missing_parts() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing-at.example.com"));
        assert!(!is_valid_email("missing-domain@"));
        assert!(!is_valid_email("no-dot@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("spaced name@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn is_valid_password_checks_length() {
        assert!(!is_valid_password(""));
        assert!(!is_valid_password("short12"));
        assert!(is_valid_password("12345678"));
        assert!(is_valid_password("a much longer passphrase"));
    }

    #[test]
    fn is_valid_password_counts_characters_not_bytes() {
        // Eight two-byte characters: sixteen bytes, but still eight characters.
        let password = "éééééééé";
        assert_eq!(password.len(), 16);
        assert!(is_valid_password(password));
        assert!(!is_valid_password("ééééééé"));
    }
}
