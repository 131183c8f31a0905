//! Domain layer - Core business logic and entities

pub mod contact;
pub mod error;
pub mod ids;
pub mod invitation;
pub mod member;
pub mod sms;
pub mod storage;
pub mod team;

pub use contact::{ContactValidationError, Email, PhoneNumber};
pub use error::DomainError;
pub use ids::{InvitationId, MemberId, TeamId};
pub use invitation::{
    ExpiryPolicy, Invitation, InvitationRepository, InvitationStateError, InvitationStatus,
    InvitationToken, OtpChallenge,
};
pub use member::{Member, MemberRepository};
pub use sms::SmsSender;
pub use storage::{Storage, StorageEntity, StorageKey};
pub use team::{Team, TeamQuery, TeamRepository};
