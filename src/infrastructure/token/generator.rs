//! Invitation token and OTP generation

use rand::distributions::{Alphanumeric, Uniform};
use rand::Rng;

use crate::domain::invitation::{InvitationToken, OTP_LENGTH};

/// Length of generated invitation tokens
pub const TOKEN_LENGTH: usize = 32;

/// Source of invitation tokens and one-time codes
///
/// Both come from the thread-local CSPRNG. Token uniqueness is enforced by
/// storage; collisions are not retried.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    token_length: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            token_length: TOKEN_LENGTH,
        }
    }

    /// Random alphanumeric invitation token
    pub fn generate_token(&self) -> InvitationToken {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.token_length)
            .map(char::from)
            .collect();

        InvitationToken::new(token)
    }

    /// Random numeric OTP, zero-padded to a fixed width
    pub fn generate_otp(&self) -> String {
        let digits = Uniform::from(0..10u8);

        rand::thread_rng()
            .sample_iter(digits)
            .take(OTP_LENGTH)
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}
