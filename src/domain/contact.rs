//! Contact details shared by teams, members and invitations

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DomainError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid email regex")
});

/// E.164: optional plus, no leading zero, at most 15 digits
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("Invalid phone regex"));

const MAX_EMAIL_LENGTH: usize = 254;

/// Errors that can occur while parsing contact details
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactValidationError {
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("Invalid phone number: '{0}'. Expected E.164 format")]
    InvalidPhone(String),
}

impl From<ContactValidationError> for DomainError {
    fn from(err: ContactValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// A syntactically valid, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.len() > MAX_EMAIL_LENGTH || !EMAIL_PATTERN.is_match(trimmed) {
            return Err(ContactValidationError::InvalidEmail(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone number normalized to `+<digits>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();

        if !PHONE_PATTERN.is_match(trimmed) {
            return Err(ContactValidationError::InvalidPhone(trimmed.to_string()));
        }

        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        Ok(Self(format!("+{}", digits)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
