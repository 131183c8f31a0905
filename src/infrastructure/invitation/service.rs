//! Invitation service: issuing invitations, OTP delivery and joining

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::TeamId;
use crate::domain::invitation::{
    ExpiryPolicy, Invitation, InvitationRepository, InvitationStateError, InvitationToken,
    OtpChallenge, OTP_LENGTH,
};
use crate::domain::member::{validate_member_name, validate_role, Member, MemberRepository};
use crate::domain::sms::{otp_message, SmsSender};
use crate::domain::team::{Team, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::team::{team_full, team_not_found};
use crate::infrastructure::token::TokenGenerator;

/// Request for inviting someone to a team
#[derive(Debug, Clone)]
pub struct NewInvitationRequest {
    pub email: Email,
    pub phone: Option<PhoneNumber>,
}

/// Name and role supplied by the invitee when joining
#[derive(Debug, Clone)]
pub struct JoinTeamRequest {
    pub name: String,
    pub role: Option<String>,
}

/// A usable invitation together with the team it leads to
#[derive(Debug, Clone)]
pub struct InvitationDetails {
    pub invitation: Invitation,
    pub team: Team,
}

/// Where a fresh OTP was sent and until when it is valid
#[derive(Debug, Clone)]
pub struct OtpDispatch {
    pub phone: PhoneNumber,
    pub expires_at: DateTime<Utc>,
}

fn invitation_not_found() -> DomainError {
    DomainError::not_found("Invitation not found")
}

/// Orchestrates the invitation lifecycle
///
/// ```text
/// create ──▶ pending ──verify-otp──▶ phone verified ──join──▶ consumed
///               │                          │
///               └───────── join (no phone) ┘
/// ```
///
/// Join checks run in a fixed order: used, expired, phone verification,
/// team capacity.
pub struct InvitationService {
    teams: Arc<dyn TeamRepository>,
    members: Arc<dyn MemberRepository>,
    invitations: Arc<dyn InvitationRepository>,
    sms: Arc<dyn SmsSender>,
    generator: TokenGenerator,
    policy: ExpiryPolicy,
    base_url: String,
}

impl std::fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationService")
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl InvitationService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        members: Arc<dyn MemberRepository>,
        invitations: Arc<dyn InvitationRepository>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            teams,
            members,
            invitations,
            sms,
            generator: TokenGenerator::new(),
            policy: ExpiryPolicy::default(),
            base_url: "http://localhost:3000".to_string(),
        }
    }

    pub fn with_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Shareable link for an invitation
    pub fn invite_link(&self, invitation: &Invitation) -> String {
        format!("{}/join/{}", self.base_url, invitation.token())
    }

    /// Invite an email address, and a phone for OTP if given, to a team
    pub async fn create(
        &self,
        team_id: &TeamId,
        request: NewInvitationRequest,
    ) -> Result<Invitation, DomainError> {
        info!(team_id = %team_id, email = %request.email, otp = request.phone.is_some(), "Creating invitation");

        let team = self.require_team(team_id).await?;
        self.ensure_room(&team).await?;

        let now = Utc::now();

        if self
            .invitations
            .find_active(team_id, &request.email, now)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "An active invitation already exists for this email",
            ));
        }

        if self
            .members
            .find_by_team_and_email(team_id, &request.email)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "This email is already a member of the team",
            ));
        }

        let invitation = Invitation::new(
            team_id.clone(),
            request.email,
            request.phone,
            self.generator.generate_token(),
            now,
            self.policy.invitation_expiry(now)?,
        );
        let invitation = self.invitations.create(invitation).await?;

        if invitation.requires_otp() {
            let (invitation, _) = self.issue_otp(invitation, now).await?;
            return Ok(invitation);
        }

        Ok(invitation)
    }

    /// Invitations issued for a team
    pub async fn list(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError> {
        self.require_team(team_id).await?;
        self.invitations.list_by_team(team_id).await
    }

    /// Public view of an invitation; fails once it is used or expired
    pub async fn details(&self, token: &InvitationToken) -> Result<InvitationDetails, DomainError> {
        let invitation = self.require_invitation(token).await?;
        invitation.ensure_usable_at(Utc::now())?;

        let team = self.require_team(invitation.team_id()).await?;

        Ok(InvitationDetails { invitation, team })
    }

    /// Replace the current OTP with a fresh one and send it
    pub async fn resend_otp(&self, token: &InvitationToken) -> Result<OtpDispatch, DomainError> {
        info!(token = %token, "Resending OTP");

        let invitation = self.require_invitation(token).await?;
        let (_, dispatch) = self.issue_otp(invitation, Utc::now()).await?;

        Ok(dispatch)
    }

    /// Confirm the invitee controls the invited phone number
    pub async fn verify_otp(&self, token: &InvitationToken, code: &str) -> Result<(), DomainError> {
        if code.chars().count() != OTP_LENGTH {
            return Err(DomainError::validation(format!(
                "OTP code must be exactly {} characters",
                OTP_LENGTH
            )));
        }

        let mut invitation = self
            .invitations
            .get_by_token(token)
            .await?
            .ok_or(InvitationStateError::InvalidOtp)?;

        invitation.verify_otp(code, Utc::now())?;
        self.invitations.update(invitation).await?;

        info!(token = %token, "OTP verified");
        Ok(())
    }

    /// Consume an invitation and add the invitee to the team
    pub async fn join(
        &self,
        token: &InvitationToken,
        request: JoinTeamRequest,
    ) -> Result<Member, DomainError> {
        validate_member_name(request.name.trim())?;
        validate_role(request.role.as_deref().map(str::trim))?;

        let invitation = self.require_invitation(token).await?;

        invitation.ensure_usable_at(Utc::now())?;
        invitation.ensure_phone_verified()?;

        let team = self.require_team(invitation.team_id()).await?;
        self.ensure_room(&team).await?;

        let member = Member::new(
            team.id().clone(),
            request.name,
            invitation.email().clone(),
            invitation.phone().cloned(),
            request.role,
        )?;

        let member = self
            .invitations
            .redeem(token, member, team.max_members())
            .await?;

        info!(team_id = %team.id(), member_id = %member.id(), "Invitation redeemed");
        Ok(member)
    }

    async fn issue_otp(
        &self,
        mut invitation: Invitation,
        now: DateTime<Utc>,
    ) -> Result<(Invitation, OtpDispatch), DomainError> {
        let challenge = OtpChallenge::new(
            self.generator.generate_otp(),
            now,
            self.policy.otp_expiry(now)?,
        );
        let code = challenge.code().to_string();

        let expires_at = invitation.reissue_otp(challenge, now)?.expires_at();
        let phone = invitation
            .phone()
            .cloned()
            .ok_or(InvitationStateError::NoPhone)?;

        let invitation = self.invitations.update(invitation).await?;
        self.send_otp(&phone, &code).await;

        Ok((invitation, OtpDispatch { phone, expires_at }))
    }

    /// Best-effort: a failed send is logged, never surfaced
    async fn send_otp(&self, phone: &PhoneNumber, code: &str) {
        let message = otp_message(code, self.policy.otp_ttl().num_minutes());

        match self.sms.send(phone, &message).await {
            Ok(()) => debug!(to = %phone, "OTP sent"),
            Err(e) => warn!(to = %phone, error = %e, "Failed to send OTP"),
        }
    }

    async fn ensure_room(&self, team: &Team) -> Result<(), DomainError> {
        let current = self.members.count_by_team(team.id()).await?;

        if team.has_room_for_one_more(current) {
            Ok(())
        } else {
            Err(team_full(team.max_members()))
        }
    }

    async fn require_team(&self, id: &TeamId) -> Result<Team, DomainError> {
        self.teams.get(id).await?.ok_or_else(team_not_found)
    }

    async fn require_invitation(&self, token: &InvitationToken) -> Result<Invitation, DomainError> {
        self.invitations
            .get_by_token(token)
            .await?
            .ok_or_else(invitation_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sms::MockSmsSender;
    use crate::infrastructure::invitation::StorageInvitationRepository;
    use crate::infrastructure::member::StorageMemberRepository;
    use crate::infrastructure::sms::LogSmsSender;
    use crate::infrastructure::storage::InMemoryStorage;
    use crate::infrastructure::team::StorageTeamRepository;
    use chrono::Duration;

    struct Fixture {
        service: InvitationService,
        teams: Arc<StorageTeamRepository>,
        members: Arc<StorageMemberRepository>,
        invitations: Arc<StorageInvitationRepository>,
        outbox: Arc<LogSmsSender>,
    }

    fn fixture_with(policy: ExpiryPolicy) -> Fixture {
        let member_storage = Arc::new(InMemoryStorage::<Member>::new());
        let teams = Arc::new(StorageTeamRepository::new(Arc::new(InMemoryStorage::<Team>::new())));
        let members = Arc::new(StorageMemberRepository::new(member_storage.clone()));
        let invitations = Arc::new(StorageInvitationRepository::new(
            Arc::new(InMemoryStorage::<Invitation>::new()),
            member_storage,
        ));
        let outbox = Arc::new(LogSmsSender::recording());

        let service = InvitationService::new(
            teams.clone(),
            members.clone(),
            invitations.clone(),
            outbox.clone(),
        )
        .with_policy(policy)
        .with_base_url("https://hack.example.com/");

        Fixture {
            service,
            teams,
            members,
            invitations,
            outbox,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ExpiryPolicy::default())
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn phone(s: &str) -> PhoneNumber {
        PhoneNumber::parse(s).unwrap()
    }

    async fn team(f: &Fixture, max_members: u32) -> Team {
        let team = Team::new("Rustaceans", "Ada", email("ada@example.com"), max_members).unwrap();
        f.teams.create(team).await.unwrap()
    }

    fn invite(address: &str, phone_number: Option<&str>) -> NewInvitationRequest {
        NewInvitationRequest {
            email: email(address),
            phone: phone_number.map(phone),
        }
    }

    fn joiner(name: &str) -> JoinTeamRequest {
        JoinTeamRequest {
            name: name.to_string(),
            role: Some("Developer".to_string()),
        }
    }

    async fn current_code(f: &Fixture, token: &InvitationToken) -> String {
        let invitation = f.invitations.get_by_token(token).await.unwrap().unwrap();
        invitation.otp().unwrap().code().to_string()
    }

    #[tokio::test]
    async fn test_create_without_phone_sends_nothing() {
        let f = fixture();
        let team = team(&f, 5).await;

        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();

        assert_eq!(invitation.token().as_str().len(), 32);
        assert!(!invitation.requires_otp());
        assert!(invitation.otp().is_none());
        assert!(f.outbox.sent().is_empty());
        assert_eq!(
            f.service.invite_link(&invitation),
            format!("https://hack.example.com/join/{}", invitation.token())
        );
    }

    #[tokio::test]
    async fn test_create_with_phone_sends_otp() {
        let f = fixture();
        let team = team(&f, 5).await;

        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("15551234567")))
            .await
            .unwrap();

        assert_eq!(invitation.phone().unwrap().as_str(), "+15551234567");
        let code = invitation.otp().unwrap().code().to_string();
        assert_eq!(code.len(), 6);

        let sent = f.outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+15551234567");
        assert_eq!(
            sent[0].body,
            format!(
                "Your OTP for hackathon team invitation is: {}. Valid for 10 minutes.",
                code
            )
        );
    }

    #[tokio::test]
    async fn test_create_survives_sms_failure() {
        let f = fixture();
        let team = team(&f, 5).await;

        let mut sms = MockSmsSender::new();
        sms.expect_send()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("twilio", "HTTP 500")));
        let service = InvitationService::new(
            f.teams.clone(),
            f.members.clone(),
            f.invitations.clone(),
            Arc::new(sms),
        );

        let invitation = service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();

        assert!(invitation.otp().is_some());
    }

    #[tokio::test]
    async fn test_create_guard_order() {
        let f = fixture();
        let team = team(&f, 1).await;

        let err = f
            .service
            .create(&TeamId::generate(), invite("guest@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Team not found");

        f.service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        let err = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "An active invitation already exists for this email"
        );

        f.members
            .create(Member::new(team.id().clone(), "Member", email("member@example.com"), None, None).unwrap())
            .await
            .unwrap();
        let err = f
            .service
            .create(team.id(), invite("other@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Team is full (max 1 members)");
    }

    #[tokio::test]
    async fn test_create_rejects_existing_member() {
        let f = fixture();
        let team = team(&f, 5).await;
        f.members
            .create(Member::new(team.id().clone(), "Member", email("member@example.com"), None, None).unwrap())
            .await
            .unwrap();

        let err = f
            .service
            .create(team.id(), invite("MEMBER@example.com", None))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "This email is already a member of the team");
    }

    #[tokio::test]
    async fn test_new_invitation_allowed_after_previous_expired() {
        let f = fixture_with(ExpiryPolicy::new(Duration::seconds(-1), Duration::minutes(10)));
        let team = team(&f, 5).await;

        f.service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        f.service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();

        assert_eq!(f.service.list(team.id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_new_invitation_allowed_after_previous_used() {
        let f = fixture();
        let team = team(&f, 5).await;
        let first = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        f.service.join(first.token(), joiner("Guest")).await.unwrap();

        let err = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "This email is already a member of the team");

        f.service
            .create(team.id(), invite("friend@example.com", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_details() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();

        let details = f.service.details(invitation.token()).await.unwrap();
        assert_eq!(details.team.name(), "Rustaceans");
        assert!(details.invitation.requires_otp());

        let err = f
            .service
            .details(&InvitationToken::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invitation not found");
    }

    #[tokio::test]
    async fn test_details_of_expired_invitation() {
        let f = fixture_with(ExpiryPolicy::new(Duration::seconds(-1), Duration::minutes(10)));
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();

        let err = f.service.details(invitation.token()).await.unwrap_err();

        assert_eq!(err.message(), "This invitation has expired");
    }

    #[tokio::test]
    async fn test_join_without_phone_skips_otp() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("Guest@Example.com", None))
            .await
            .unwrap();

        let member = f
            .service
            .join(invitation.token(), joiner("  Guest  "))
            .await
            .unwrap();

        assert_eq!(member.name(), "Guest");
        assert_eq!(member.email().as_str(), "guest@example.com");
        assert_eq!(member.role(), Some("Developer"));
        assert!(member.phone().is_none());

        let err = f
            .service
            .join(invitation.token(), joiner("Guest"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "This invitation has already been used");
    }

    #[tokio::test]
    async fn test_join_with_phone_requires_verification() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();
        let token = invitation.token().clone();

        let err = f.service.join(&token, joiner("Guest")).await.unwrap_err();
        assert_eq!(
            err.message(),
            "OTP verification required. Please verify your phone number first."
        );

        let code = current_code(&f, &token).await;
        f.service.verify_otp(&token, &code).await.unwrap();

        let member = f.service.join(&token, joiner("Guest")).await.unwrap();
        assert_eq!(member.phone().unwrap().as_str(), "+15551234567");
        assert_eq!(f.members.count_by_team(team.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_join_full_team() {
        let f = fixture();
        let team = team(&f, 1).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        f.members
            .create(Member::new(team.id().clone(), "First", email("first@example.com"), None, None).unwrap())
            .await
            .unwrap();

        let err = f
            .service
            .join(invitation.token(), joiner("Guest"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Team is full (max 1 members)");
        assert_eq!(f.members.count_by_team(team.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_join_expired_invitation() {
        let f = fixture_with(ExpiryPolicy::new(Duration::seconds(-1), Duration::minutes(10)));
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();

        let err = f
            .service
            .join(invitation.token(), joiner("Guest"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "This invitation has expired");
    }

    #[tokio::test]
    async fn test_join_validates_name_first() {
        let f = fixture();

        let err = f
            .service
            .join(&InvitationToken::new("missing"), joiner("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_verify_otp_rules() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();
        let token = invitation.token().clone();
        let code = current_code(&f, &token).await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = f.service.verify_otp(&token, "12345").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = f.service.verify_otp(&token, wrong).await.unwrap_err();
        assert_eq!(err.message(), "Invalid OTP code");

        let err = f
            .service
            .verify_otp(&InvitationToken::new("missing"), &code)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid OTP code");

        f.service.verify_otp(&token, &code).await.unwrap();

        let err = f.service.verify_otp(&token, &code).await.unwrap_err();
        assert_eq!(err.message(), "Invalid OTP code");
    }

    #[tokio::test]
    async fn test_verify_expired_otp() {
        let f = fixture_with(ExpiryPolicy::new(Duration::hours(48), Duration::seconds(-1)));
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();
        let code = current_code(&f, invitation.token()).await;

        let err = f
            .service
            .verify_otp(invitation.token(), &code)
            .await
            .unwrap_err();

        assert_eq!(err.message(), "OTP has expired. Please request a new one.");
    }

    #[tokio::test]
    async fn test_resend_replaces_code() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();
        let token = invitation.token().clone();
        let before = f.invitations.get_by_token(&token).await.unwrap().unwrap();

        let dispatch = f.service.resend_otp(&token).await.unwrap();

        assert_eq!(dispatch.phone.as_str(), "+15551234567");
        assert_eq!(f.outbox.sent().len(), 2);

        let after = f.invitations.get_by_token(&token).await.unwrap().unwrap();
        assert_eq!(after.otp().unwrap().expires_at(), dispatch.expires_at);
        assert!(after.otp().unwrap().created_at() >= before.otp().unwrap().created_at());

        let code = after.otp().unwrap().code().to_string();
        f.service.verify_otp(&token, &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_resend_guard_order() {
        let f = fixture();
        let team = team(&f, 5).await;

        let err = f
            .service
            .resend_otp(&InvitationToken::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invitation not found");

        let no_phone = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        let err = f.service.resend_otp(no_phone.token()).await.unwrap_err();
        assert_eq!(err.message(), "This invitation does not have a phone number");

        let now = Utc::now();
        let expired = Invitation::new(
            team.id().clone(),
            email("late@example.com"),
            Some(phone("+15551234567")),
            InvitationToken::new("expired-token"),
            now - Duration::hours(49),
            now - Duration::hours(1),
        );
        f.invitations.create(expired).await.unwrap();
        let err = f
            .service
            .resend_otp(&InvitationToken::new("expired-token"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "This invitation has expired");
    }

    #[tokio::test]
    async fn test_resend_after_join_reports_used() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", Some("+15551234567")))
            .await
            .unwrap();
        let token = invitation.token().clone();
        let code = current_code(&f, &token).await;
        f.service.verify_otp(&token, &code).await.unwrap();
        f.service.join(&token, joiner("Guest")).await.unwrap();

        let err = f.service.resend_otp(&token).await.unwrap_err();

        assert_eq!(err.message(), "This invitation has already been used");
    }

    #[tokio::test]
    async fn test_concurrent_joins_admit_one() {
        let f = fixture();
        let team = team(&f, 5).await;
        let invitation = f
            .service
            .create(team.id(), invite("guest@example.com", None))
            .await
            .unwrap();
        let service = Arc::new(f.service);

        let mut handles = Vec::new();
        for i in 0..4 {
            let service = service.clone();
            let token = invitation.token().clone();
            handles.push(tokio::spawn(async move {
                service.join(&token, joiner(&format!("Guest {}", i))).await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                joined += 1;
            }
        }

        assert_eq!(joined, 1);
        assert_eq!(f.members.count_by_team(team.id()).await.unwrap(), 1);
    }
}
