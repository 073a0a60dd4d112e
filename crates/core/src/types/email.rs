//! Email address type.

use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot after it.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input is not shaped like `local@domain.tld`.
    #[error("email must look like name@domain.tld")]
    Malformed,
}

/// An email address shaped like `local@domain.tld`.
///
/// The input is matched as given: surrounding whitespace makes it malformed,
/// and there is no length limit.
///
/// ## Examples
///
/// ```
/// use campus_supply_core::Email;
///
/// assert!(Email::parse("student@uni.edu.jm").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse(" student@uni.edu ").is_err());
/// assert!(Email::parse("student@uni").is_err());    // no tld
/// assert!(Email::parse("stu dent@uni.edu").is_err()); // whitespace
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not shaped like
    /// `local@domain.tld`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if !EMAIL_PATTERN.is_match(s) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
        assert_eq!(
            Email::parse("user@example.com").unwrap().as_str(),
            "user@example.com"
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_malformed() {
        for input in [
            "   ",
            "no-at-symbol",
            "@domain.com",
            "user@",
            "user@domain",
            "user@@domain.com",
            "us er@domain.com",
            "user@domain.",
        ] {
            assert_eq!(Email::parse(input), Err(EmailError::Malformed), "{input}");
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_malformed() {
        assert_eq!(Email::parse(" ada@uni.edu "), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ada@uni.edu\n"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_no_length_limit() {
        let long = format!("{}@example.com", "a".repeat(260));
        assert_eq!(Email::parse(&long).unwrap().as_str(), long);
    }
}
