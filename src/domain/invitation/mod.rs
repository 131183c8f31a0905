//! Invitation domain module
//!
//! Invitations carry a shareable token and, when a phone number is given,
//! an OTP challenge that must be verified before the invitee can join.

mod entity;
mod otp;
mod policy;
mod repository;

pub use entity::{Invitation, InvitationStateError, InvitationStatus, InvitationToken};
pub use otp::{OtpChallenge, OTP_LENGTH};
pub use policy::{
    is_expired, ExpiryPolicy, DEFAULT_INVITATION_TTL_HOURS, DEFAULT_OTP_TTL_MINUTES,
    MAX_INVITATION_TTL_HOURS, MAX_OTP_TTL_MINUTES,
};
pub use repository::InvitationRepository;
