//! Expiry policy for invitations and OTP challenges

use chrono::{DateTime, Duration, Utc};

use crate::domain::DomainError;

pub const DEFAULT_INVITATION_TTL_HOURS: i64 = 48;
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 10;
pub const MAX_INVITATION_TTL_HOURS: i64 = 8760;
pub const MAX_OTP_TTL_MINUTES: i64 = 1440;

/// Fixed time-to-live for invitations and the OTPs sent for them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    invitation_ttl: Duration,
    otp_ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            invitation_ttl: Duration::hours(DEFAULT_INVITATION_TTL_HOURS),
            otp_ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
        }
    }
}

impl ExpiryPolicy {
    pub fn new(invitation_ttl: Duration, otp_ttl: Duration) -> Self {
        Self {
            invitation_ttl,
            otp_ttl,
        }
    }

    /// Build from configured whole hours and minutes, rejecting non-positive or oversized values
    pub fn from_settings(
        invitation_ttl_hours: i64,
        otp_ttl_minutes: i64,
    ) -> Result<Self, DomainError> {
        if !(1..=MAX_INVITATION_TTL_HOURS).contains(&invitation_ttl_hours) {
            return Err(DomainError::configuration(format!(
                "invitation_ttl_hours must be between 1 and {}, got {}",
                MAX_INVITATION_TTL_HOURS, invitation_ttl_hours
            )));
        }

        if !(1..=MAX_OTP_TTL_MINUTES).contains(&otp_ttl_minutes) {
            return Err(DomainError::configuration(format!(
                "otp_ttl_minutes must be between 1 and {}, got {}",
                MAX_OTP_TTL_MINUTES, otp_ttl_minutes
            )));
        }

        Ok(Self::new(
            Duration::hours(invitation_ttl_hours),
            Duration::minutes(otp_ttl_minutes),
        ))
    }

    pub fn invitation_ttl(&self) -> Duration {
        self.invitation_ttl
    }

    pub fn otp_ttl(&self) -> Duration {
        self.otp_ttl
    }

    /// When an invitation issued at `now` stops being usable
    pub fn invitation_expiry(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
        deadline(now, self.invitation_ttl)
    }

    /// When an OTP issued at `now` stops being verifiable
    pub fn otp_expiry(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
        deadline(now, self.otp_ttl)
    }
}

fn deadline(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, DomainError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| DomainError::configuration("Expiry is outside the representable time range"))
}

/// A deadline has passed once the clock is strictly beyond it
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let policy = ExpiryPolicy::default();
        assert_eq!(policy.invitation_ttl(), Duration::hours(48));
        assert_eq!(policy.otp_ttl(), Duration::minutes(10));
    }

    #[test]
    fn test_expiry_timestamps() {
        let policy = ExpiryPolicy::default();
        let now = Utc::now();

        assert_eq!(policy.invitation_expiry(now).unwrap() - now, Duration::hours(48));
        assert_eq!(policy.otp_expiry(now).unwrap() - now, Duration::minutes(10));
    }

    #[test]
    fn test_from_settings_bounds() {
        let policy = ExpiryPolicy::from_settings(72, 5).unwrap();
        assert_eq!(policy.invitation_ttl(), Duration::hours(72));
        assert_eq!(policy.otp_ttl(), Duration::minutes(5));

        assert!(ExpiryPolicy::from_settings(MAX_INVITATION_TTL_HOURS, MAX_OTP_TTL_MINUTES).is_ok());

        for (hours, minutes) in [(0, 10), (-1, 10), (10_000_000_000, 10), (48, 0), (48, -5), (48, 1441)] {
            let result = ExpiryPolicy::from_settings(hours, minutes);
            assert!(
                matches!(result, Err(DomainError::Configuration { .. })),
                "accepted {}h / {}min",
                hours,
                minutes
            );
        }
    }

    #[test]
    fn test_overflowing_expiry_is_an_error() {
        let policy = ExpiryPolicy::new(Duration::days(200_000_000), Duration::minutes(10));

        let result = policy.invitation_expiry(Utc::now());

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_is_expired_is_strict() {
        let deadline = Utc::now();

        assert!(!is_expired(deadline, deadline));
        assert!(!is_expired(deadline, deadline - Duration::seconds(1)));
        assert!(is_expired(deadline, deadline + Duration::milliseconds(1)));
    }
}
