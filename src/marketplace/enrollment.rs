//! KOL roster management: signup review, profile self-service, and the tier
//! upgrade request flow.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::access::Identity;
use super::domain::{BankInfo, Profile, ProfileId, ProfileStatus, SnsLink};
use super::notifications::{emit_best_effort, NotificationKind, NotificationSink};
use super::repository::{Page, PageRequest, ProfileRepository, RepositoryError};
use super::tiers::{parse_follower_count, upgrade_candidate, ProgramTier};

pub struct EnrollmentService<P, N> {
    profiles: Arc<P>,
    notifications: Arc<N>,
}

/// Self-service profile payload.
///
/// `follower_count` arrives as the raw text the KOL typed; it is parsed here
/// and stored as a number (or cleared when unreadable). A legacy single SNS
/// link is folded into the link list at this boundary so nothing downstream
/// deals with the old shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    pub full_name: Option<String>,
    #[serde(default)]
    pub sns_links: Vec<SnsLink>,
    pub sns_link: Option<String>,
    pub follower_count: Option<String>,
    pub line_id: Option<String>,
    pub kakao_id: Option<String>,
    #[serde(default)]
    pub bank_info: BankInfo,
}

/// What a follower-count edit would unlock, for the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradePreview {
    pub follower_count: Option<u64>,
    pub eligible_tier: Option<ProgramTier>,
    pub can_request: bool,
}

fn normalized_links(draft: &ProfileDraft) -> Vec<SnsLink> {
    let mut links: Vec<SnsLink> = draft
        .sns_links
        .iter()
        .filter(|link| !link.url.trim().is_empty())
        .cloned()
        .collect();
    if links.is_empty() {
        if let Some(url) = draft.sns_link.as_deref() {
            if !url.trim().is_empty() {
                links.push(SnsLink {
                    label: "SNS".to_string(),
                    url: url.trim().to_string(),
                });
            }
        }
    }
    links
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<P, N> EnrollmentService<P, N>
where
    P: ProfileRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(profiles: Arc<P>, notifications: Arc<N>) -> Self {
        Self {
            profiles,
            notifications,
        }
    }

    pub fn profile(&self, id: &ProfileId) -> Result<Option<Profile>, EnrollmentError> {
        Ok(self.profiles.fetch(id)?)
    }

    /// Create or update the caller's profile.
    ///
    /// First save doubles as registration: the row starts in `pending` and
    /// waits for the admin. Review state and tier fields are never touched
    /// from here.
    pub fn upsert_profile(
        &self,
        identity: &Identity,
        draft: ProfileDraft,
    ) -> Result<Profile, EnrollmentError> {
        let follower_count = draft
            .follower_count
            .as_deref()
            .and_then(parse_follower_count);
        let sns_links = normalized_links(&draft);

        match self.profiles.fetch(&identity.user_id)? {
            Some(mut existing) => {
                existing.full_name = blank_to_none(draft.full_name);
                existing.sns_links = sns_links;
                existing.follower_count = follower_count;
                existing.line_id = blank_to_none(draft.line_id);
                existing.kakao_id = blank_to_none(draft.kakao_id);
                existing.bank_info = draft.bank_info;
                self.profiles.update(existing.clone())?;
                Ok(existing)
            }
            None => {
                let profile = Profile {
                    id: identity.user_id.clone(),
                    email: identity.email.clone(),
                    full_name: blank_to_none(draft.full_name),
                    sns_links,
                    follower_count,
                    tier: None,
                    tier_requested: None,
                    tier_requested_at: None,
                    line_id: blank_to_none(draft.line_id),
                    kakao_id: blank_to_none(draft.kakao_id),
                    bank_info: draft.bank_info,
                    status: ProfileStatus::Pending,
                    created_at: Utc::now(),
                };
                Ok(self.profiles.insert(profile)?)
            }
        }
    }

    /// Pending signups, newest first.
    pub fn pending_profiles(&self, page: PageRequest) -> Result<Page<Profile>, EnrollmentError> {
        Ok(self.profiles.by_status(ProfileStatus::Pending, page)?)
    }

    pub fn approve_kol(&self, id: &ProfileId) -> Result<Profile, EnrollmentError> {
        let profile = self.decide_signup(id, ProfileStatus::Approved)?;
        emit_best_effort(
            self.notifications.as_ref(),
            &profile.id,
            NotificationKind::KolApproved,
            "Registration approved",
            Some("You can now apply to missions.".to_string()),
        );
        Ok(profile)
    }

    pub fn reject_kol(&self, id: &ProfileId) -> Result<Profile, EnrollmentError> {
        let profile = self.decide_signup(id, ProfileStatus::Rejected)?;
        emit_best_effort(
            self.notifications.as_ref(),
            &profile.id,
            NotificationKind::KolRejected,
            "Registration rejected",
            Some("Contact us if you have any questions.".to_string()),
        );
        Ok(profile)
    }

    fn decide_signup(
        &self,
        id: &ProfileId,
        decision: ProfileStatus,
    ) -> Result<Profile, EnrollmentError> {
        let mut profile = self.profiles.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if profile.status != ProfileStatus::Pending {
            return Err(EnrollmentError::AlreadyDecided {
                status: profile.status,
            });
        }
        profile.status = decision;
        self.profiles.update(profile.clone())?;
        Ok(profile)
    }

    /// Evaluate a follower-count edit against the caller's current tier.
    pub fn upgrade_preview(
        &self,
        kol: &ProfileId,
        follower_input: &str,
    ) -> Result<UpgradePreview, EnrollmentError> {
        let profile = self.profiles.fetch(kol)?.ok_or(RepositoryError::NotFound)?;
        let candidate = upgrade_candidate(
            profile.tier,
            follower_input,
            profile.has_pending_tier_request(),
        );
        Ok(UpgradePreview {
            follower_count: parse_follower_count(follower_input),
            eligible_tier: candidate.map(|c| c.tier),
            can_request: candidate.is_some(),
        })
    }

    /// File a tier upgrade request.
    ///
    /// The typed follower count is persisted alongside the request so the
    /// admin reviews the same number the KOL claimed.
    pub fn request_tier_upgrade(
        &self,
        kol: &ProfileId,
        follower_input: &str,
    ) -> Result<Profile, EnrollmentError> {
        let mut profile = self.profiles.fetch(kol)?.ok_or(RepositoryError::NotFound)?;
        if profile.status != ProfileStatus::Approved {
            return Err(EnrollmentError::NotApproved);
        }
        if profile.has_pending_tier_request() {
            return Err(EnrollmentError::UpgradePending);
        }

        let candidate = upgrade_candidate(profile.tier, follower_input, false).ok_or_else(|| {
            match parse_follower_count(follower_input) {
                None => EnrollmentError::UnreadableFollowerCount,
                Some(_) => EnrollmentError::NotAnUpgrade,
            }
        })?;

        profile.follower_count = Some(candidate.follower_count);
        profile.tier_requested = Some(candidate.tier);
        profile.tier_requested_at = Some(Utc::now());
        self.profiles.update(profile.clone())?;
        Ok(profile)
    }

    /// Outstanding upgrade requests, oldest first.
    pub fn tier_requests(&self, page: PageRequest) -> Result<Page<Profile>, EnrollmentError> {
        Ok(self.profiles.with_pending_tier_request(page)?)
    }

    /// Grant the requested tier and clear the request in one write.
    pub fn approve_tier_upgrade(&self, id: &ProfileId) -> Result<Profile, EnrollmentError> {
        let mut profile = self.profiles.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let requested = profile
            .tier_requested
            .ok_or(EnrollmentError::NoPendingRequest)?;

        profile.tier = Some(requested);
        profile.tier_requested = None;
        profile.tier_requested_at = None;
        self.profiles.update(profile.clone())?;

        emit_best_effort(
            self.notifications.as_ref(),
            &profile.id,
            NotificationKind::TierApproved,
            "Tier upgraded",
            Some(format!("Upgraded to {}.", requested)),
        );
        Ok(profile)
    }

    /// Clear the request without touching the granted tier. No notification.
    pub fn reject_tier_upgrade(&self, id: &ProfileId) -> Result<Profile, EnrollmentError> {
        let mut profile = self.profiles.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if profile.tier_requested.is_none() {
            return Err(EnrollmentError::NoPendingRequest);
        }
        profile.tier_requested = None;
        profile.tier_requested_at = None;
        self.profiles.update(profile.clone())?;
        Ok(profile)
    }
}

/// Error raised by the enrollment service.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("signup was already decided ({status})")]
    AlreadyDecided { status: ProfileStatus },
    #[error("only approved KOLs can request a tier upgrade")]
    NotApproved,
    #[error("a tier upgrade request is already awaiting review")]
    UpgradePending,
    #[error("follower count input carries no digits")]
    UnreadableFollowerCount,
    #[error("follower count does not classify above the current tier")]
    NotAnUpgrade,
    #[error("no tier upgrade request is pending")]
    NoPendingRequest,
}
