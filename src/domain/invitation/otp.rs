//! One-time passcode challenge owned by an invitation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::is_expired;

/// Number of digits in an OTP code
pub const OTP_LENGTH: usize = 6;

/// The OTP most recently sent for an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    code: String,
    is_verified: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn new(code: impl Into<String>, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            is_verified: false,
            expires_at,
            created_at,
        }
    }

    /// Rebuild a challenge from persisted fields
    pub fn restore(
        code: String,
        is_verified: bool,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            is_verified,
            expires_at,
            created_at,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }

    /// Compare a submitted code without short-circuiting on the first mismatch
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.code.as_bytes();
        let candidate = candidate.as_bytes();

        if expected.len() != candidate.len() {
            return false;
        }

        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    pub(super) fn mark_verified(&mut self) {
        self.is_verified = true;
    }
}
