//! Invitation entity and its lifecycle
//!
//! ```text
//! pending --verify otp--> phone_verified --join--> consumed
//!    |                         |
//!    +------- expires_at ------+----------------> expired
//! ```
//!
//! `consumed` and `expired` are terminal. Invitations without a phone skip
//! the verification step entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::otp::OtpChallenge;
use super::policy::is_expired;
use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::{InvitationId, TeamId};
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Opaque token embedded in an invitation link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationToken(String);

impl InvitationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvitationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for InvitationToken {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where an invitation sits in its lifecycle at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Unused and unexpired, phone not (yet) verified or not required
    Pending,
    /// Phone ownership confirmed, waiting for the join
    PhoneVerified,
    /// A member joined with it
    Consumed,
    /// Past its deadline without being used
    Expired,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::PhoneVerified => write!(f, "phone_verified"),
            Self::Consumed => write!(f, "consumed"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Rejected lifecycle transitions
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStateError {
    #[error("This invitation has already been used")]
    AlreadyUsed,

    #[error("This invitation has expired")]
    Expired,

    #[error("This invitation does not have a phone number")]
    NoPhone,

    #[error("Invalid OTP code")]
    InvalidOtp,

    #[error("OTP has expired. Please request a new one.")]
    OtpExpired,

    #[error("OTP verification required. Please verify your phone number first.")]
    OtpVerificationRequired,
}

impl From<InvitationStateError> for DomainError {
    fn from(err: InvitationStateError) -> Self {
        DomainError::invalid_state(err.to_string())
    }
}

/// An invitation for one email address to join one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    id: InvitationId,
    team_id: TeamId,
    email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<PhoneNumber>,
    token: InvitationToken,
    is_used: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    otp: Option<OtpChallenge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone_verified_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Create a pending invitation
    pub fn new(
        team_id: TeamId,
        email: Email,
        phone: Option<PhoneNumber>,
        token: InvitationToken,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::generate(),
            team_id,
            email,
            phone,
            token,
            is_used: false,
            expires_at,
            created_at,
            otp: None,
            phone_verified_at: None,
        }
    }

    /// Rebuild an invitation from persisted fields
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: InvitationId,
        team_id: TeamId,
        email: Email,
        phone: Option<PhoneNumber>,
        token: InvitationToken,
        is_used: bool,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        otp: Option<OtpChallenge>,
        phone_verified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            team_id,
            email,
            phone,
            token,
            is_used,
            expires_at,
            created_at,
            otp,
            phone_verified_at,
        }
    }

    // Getters

    pub fn id(&self) -> &InvitationId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn token(&self) -> &InvitationToken {
        &self.token
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn otp(&self) -> Option<&OtpChallenge> {
        self.otp.as_ref()
    }

    pub fn phone_verified_at(&self) -> Option<DateTime<Utc>> {
        self.phone_verified_at
    }

    /// Joining requires phone verification only when a phone was given
    pub fn requires_otp(&self) -> bool {
        self.phone.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }

    /// Neither used nor expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired_at(now)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.is_used {
            InvitationStatus::Consumed
        } else if self.is_expired_at(now) {
            InvitationStatus::Expired
        } else if self.requires_otp() && self.phone_verified_at.is_some() {
            InvitationStatus::PhoneVerified
        } else {
            InvitationStatus::Pending
        }
    }

    // Transitions

    /// Used is reported before expired
    pub fn ensure_usable_at(&self, now: DateTime<Utc>) -> Result<(), InvitationStateError> {
        if self.is_used {
            return Err(InvitationStateError::AlreadyUsed);
        }

        if self.is_expired_at(now) {
            return Err(InvitationStateError::Expired);
        }

        Ok(())
    }

    /// Replace the current OTP challenge with a fresh one.
    ///
    /// An earlier successful verification is kept: once the phone has been
    /// confirmed, sending another code does not revoke that.
    pub fn reissue_otp(
        &mut self,
        challenge: OtpChallenge,
        now: DateTime<Utc>,
    ) -> Result<&OtpChallenge, InvitationStateError> {
        if !self.requires_otp() {
            return Err(InvitationStateError::NoPhone);
        }

        self.ensure_usable_at(now)?;

        let current: &OtpChallenge = self.otp.insert(challenge);
        Ok(current)
    }

    /// Check a submitted code against the current unverified challenge
    pub fn verify_otp(&mut self, code: &str, now: DateTime<Utc>) -> Result<(), InvitationStateError> {
        let challenge = self
            .otp
            .as_mut()
            .filter(|otp| !otp.is_verified() && otp.matches(code))
            .ok_or(InvitationStateError::InvalidOtp)?;

        if challenge.is_expired_at(now) {
            return Err(InvitationStateError::OtpExpired);
        }

        challenge.mark_verified();
        self.phone_verified_at = Some(now);
        Ok(())
    }

    /// OTP expiry is deliberately not re-checked here; a verified phone stays verified
    pub fn ensure_phone_verified(&self) -> Result<(), InvitationStateError> {
        if self.requires_otp() && self.phone_verified_at.is_none() {
            return Err(InvitationStateError::OtpVerificationRequired);
        }

        Ok(())
    }

    /// Mark the invitation consumed; terminal
    pub fn mark_used(&mut self) {
        self.is_used = true;
    }
}

impl StorageEntity for Invitation {
    type Key = InvitationToken;

    fn key(&self) -> &Self::Key {
        &self.token
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(phone: Option<&str>, now: DateTime<Utc>) -> Invitation {
        Invitation::new(
            TeamId::generate(),
            Email::parse("bob@example.com").unwrap(),
            phone.map(|p| PhoneNumber::parse(p).unwrap()),
            InvitationToken::new("a".repeat(32)),
            now,
            now + Duration::hours(48),
        )
    }

    fn challenge(code: &str, now: DateTime<Utc>) -> OtpChallenge {
        OtpChallenge::new(code, now, now + Duration::minutes(10))
    }

    #[test]
    fn test_new_invitation_is_pending() {
        let now = Utc::now();
        let inv = invitation(None, now);

        assert!(!inv.is_used());
        assert!(inv.is_active_at(now));
        assert_eq!(inv.status_at(now), InvitationStatus::Pending);
        assert!(!inv.requires_otp());
    }

    #[test]
    fn test_expired_invitation() {
        let now = Utc::now();
        let inv = invitation(None, now);
        let later = now + Duration::hours(49);

        assert!(!inv.is_active_at(later));
        assert_eq!(inv.status_at(later), InvitationStatus::Expired);
        assert_eq!(
            inv.ensure_usable_at(later),
            Err(InvitationStateError::Expired)
        );
    }

    #[test]
    fn test_used_is_reported_before_expired() {
        let now = Utc::now();
        let mut inv = invitation(None, now);
        inv.mark_used();

        let later = now + Duration::hours(49);
        assert_eq!(inv.status_at(later), InvitationStatus::Consumed);
        assert_eq!(
            inv.ensure_usable_at(later),
            Err(InvitationStateError::AlreadyUsed)
        );
    }

    #[test]
    fn test_verify_otp_flow() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("123456", now), now).unwrap();

        assert_eq!(
            inv.ensure_phone_verified(),
            Err(InvitationStateError::OtpVerificationRequired)
        );

        inv.verify_otp("123456", now + Duration::minutes(1)).unwrap();

        assert!(inv.otp().unwrap().is_verified());
        assert!(inv.ensure_phone_verified().is_ok());
        assert_eq!(inv.status_at(now), InvitationStatus::PhoneVerified);
    }

    #[test]
    fn test_verify_wrong_code() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("123456", now), now).unwrap();

        assert_eq!(
            inv.verify_otp("654321", now),
            Err(InvitationStateError::InvalidOtp)
        );
        assert!(inv.phone_verified_at().is_none());
    }

    #[test]
    fn test_verify_without_challenge() {
        let now = Utc::now();
        let mut inv = invitation(None, now);

        assert_eq!(
            inv.verify_otp("123456", now),
            Err(InvitationStateError::InvalidOtp)
        );
    }

    #[test]
    fn test_verify_twice_is_invalid() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("123456", now), now).unwrap();
        inv.verify_otp("123456", now).unwrap();

        assert_eq!(
            inv.verify_otp("123456", now),
            Err(InvitationStateError::InvalidOtp)
        );
    }

    #[test]
    fn test_verify_expired_code() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("123456", now), now).unwrap();

        assert_eq!(
            inv.verify_otp("123456", now + Duration::minutes(11)),
            Err(InvitationStateError::OtpExpired)
        );
        assert!(!inv.otp().unwrap().is_verified());
    }

    #[test]
    fn test_reissue_replaces_unverified_code() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("111111", now), now).unwrap();
        inv.reissue_otp(challenge("222222", now), now).unwrap();

        assert_eq!(
            inv.verify_otp("111111", now),
            Err(InvitationStateError::InvalidOtp)
        );
        assert!(inv.verify_otp("222222", now).is_ok());
    }

    #[test]
    fn test_reissue_keeps_prior_verification() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("111111", now), now).unwrap();
        inv.verify_otp("111111", now).unwrap();

        inv.reissue_otp(challenge("222222", now), now).unwrap();

        assert!(!inv.otp().unwrap().is_verified());
        assert!(inv.ensure_phone_verified().is_ok());
    }

    #[test]
    fn test_reissue_guards() {
        let now = Utc::now();

        let mut no_phone = invitation(None, now);
        assert_eq!(
            no_phone.reissue_otp(challenge("1", now), now).unwrap_err(),
            InvitationStateError::NoPhone
        );

        let mut used = invitation(Some("+15551234567"), now);
        used.mark_used();
        assert_eq!(
            used.reissue_otp(challenge("1", now), now).unwrap_err(),
            InvitationStateError::AlreadyUsed
        );

        let mut expired = invitation(Some("+15551234567"), now);
        assert_eq!(
            expired
                .reissue_otp(challenge("1", now), now + Duration::hours(49))
                .unwrap_err(),
            InvitationStateError::Expired
        );
    }

    #[test]
    fn test_stale_verification_still_counts() {
        let now = Utc::now();
        let mut inv = invitation(Some("+15551234567"), now);
        inv.reissue_otp(challenge("123456", now), now).unwrap();
        inv.verify_otp("123456", now).unwrap();

        // The challenge itself has long expired, the verification has not
        assert!(inv.otp().unwrap().is_expired_at(now + Duration::hours(1)));
        assert!(inv.ensure_phone_verified().is_ok());
    }

    #[test]
    fn test_state_error_maps_to_invalid_state() {
        let err: DomainError = InvitationStateError::OtpVerificationRequired.into();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert_eq!(
            err.message(),
            "OTP verification required. Please verify your phone number first."
        );
    }
}
