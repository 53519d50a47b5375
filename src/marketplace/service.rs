use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, BankInfo, Campaign, CampaignId, CampaignStatus,
    Profile, ProfileId, SnsLink,
};
use super::lifecycle::{self, LifecycleAction};
use super::notifications::{emit_best_effort, NotificationKind, NotificationSink};
use super::repository::{
    ApplicationRepository, CampaignRepository, Page, PageRequest, ProfileRepository, QueueOrder,
    RepositoryError,
};
use super::tiers::eligibility::can_apply;
use super::tiers::ProgramTier;

/// Service orchestrating the application lifecycle from apply to payout.
pub struct MissionService<P, C, A, N> {
    profiles: Arc<P>,
    campaigns: Arc<C>,
    applications: Arc<A>,
    notifications: Arc<N>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Profile fields surfaced on admin review rows.
#[derive(Debug, Clone, Serialize)]
pub struct KolSummary {
    pub id: ProfileId,
    pub full_name: Option<String>,
    pub email: String,
    pub follower_count: Option<u64>,
    pub tier: Option<ProgramTier>,
    pub sns_links: Vec<SnsLink>,
}

impl From<&Profile> for KolSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            follower_count: profile.follower_count,
            tier: profile.tier,
            sns_links: profile.sns_links.clone(),
        }
    }
}

/// Campaign fields a KOL or reviewer needs next to an application.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub title: String,
    pub brand_name: String,
    pub payout_amount: u64,
    pub guide_content: Option<String>,
    pub guide_url: Option<String>,
    pub contact_line: Option<String>,
    pub contact_kakao: Option<String>,
}

impl From<&Campaign> for CampaignSummary {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id.clone(),
            title: campaign.title.clone(),
            brand_name: campaign.brand_name.clone(),
            payout_amount: campaign.payout_amount,
            guide_content: campaign.guide_content.clone(),
            guide_url: campaign.guide_url.clone(),
            contact_line: campaign.contact_line.clone(),
            contact_kakao: campaign.contact_kakao.clone(),
        }
    }
}

/// Derived per-campaign seat counts; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatCounts {
    pub applicants: u64,
    pub selected: u64,
}

/// One entry on a KOL's "my missions" list.
#[derive(Debug, Clone, Serialize)]
pub struct MissionEntry {
    pub application: Application,
    pub campaign: CampaignSummary,
}

/// Row on the admin applicant-review queue.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
    pub application: Application,
    pub kol: KolSummary,
    pub campaign: CampaignSummary,
}

/// Row on the payout queue: a confirmed application joined with the transfer
/// coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutRow {
    pub application: Application,
    pub kol_name: Option<String>,
    pub bank_info: BankInfo,
    pub brand_name: String,
    pub title: String,
    pub payout_amount: u64,
}

impl<P, C, A, N> MissionService<P, C, A, N>
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        profiles: Arc<P>,
        campaigns: Arc<C>,
        applications: Arc<A>,
        notifications: Arc<N>,
    ) -> Self {
        Self {
            profiles,
            campaigns,
            applications,
            notifications,
        }
    }

    /// KOL applies to an active campaign.
    ///
    /// Eligibility is checked against the campaign's follower buckets; the
    /// uniqueness of (kol, campaign) is left to the storage layer so two
    /// racing applies cannot both land.
    pub fn apply(
        &self,
        kol: &ProfileId,
        campaign_id: &CampaignId,
    ) -> Result<Application, MissionError> {
        let campaign = self
            .campaigns
            .fetch(campaign_id)?
            .ok_or(RepositoryError::NotFound)?;
        if campaign.status != CampaignStatus::Active {
            return Err(MissionError::CampaignClosed);
        }

        let profile = self.profiles.fetch(kol)?.ok_or(RepositoryError::NotFound)?;
        if !can_apply(profile.follower_count, &campaign.follower_tiers) {
            return Err(MissionError::BelowFollowerFloor);
        }

        let application = Application {
            id: next_application_id(),
            kol_id: kol.clone(),
            campaign_id: campaign_id.clone(),
            status: ApplicationStatus::Applied,
            result_url: None,
            applied_at: Utc::now(),
        };

        match self.applications.insert(application) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => Err(MissionError::AlreadyApplied),
            Err(other) => Err(other.into()),
        }
    }

    /// Admin selects an applicant.
    ///
    /// The conditional update means a retried or stale select surfaces as a
    /// conflict instead of re-writing the row, so the selection notification
    /// fires at most once.
    pub fn select(&self, id: &ApplicationId) -> Result<Application, MissionError> {
        let step = lifecycle::transition_for(LifecycleAction::Select);
        let updated = self.applications.update_status(id, step.from, step.to)?;

        let message = self
            .campaigns
            .fetch(&updated.campaign_id)?
            .map(|campaign| {
                format!(
                    "You were selected for \"{}\" by {}. Check My Missions for the guide.",
                    campaign.title, campaign.brand_name
                )
            });
        emit_best_effort(
            self.notifications.as_ref(),
            &updated.kol_id,
            NotificationKind::MissionSelected,
            "Selected for a mission",
            message,
        );

        Ok(updated)
    }

    /// KOL submits the proof-of-completion URL, exactly once.
    pub fn submit_result(
        &self,
        id: &ApplicationId,
        kol: &ProfileId,
        result_url: &str,
    ) -> Result<Application, MissionError> {
        let url = result_url.trim();
        if url.is_empty() {
            return Err(MissionError::EmptyResultUrl);
        }

        let application = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        if application.kol_id != *kol {
            return Err(MissionError::NotYourApplication);
        }

        let step = lifecycle::transition_for(LifecycleAction::SubmitResult);
        match self.applications.submit_result(id, step.from, step.to, url) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => Err(MissionError::ResultAlreadySubmitted),
            Err(other) => Err(other.into()),
        }
    }

    /// Admin approves a completed post for payout. No notification here; the
    /// KOL hears about it when the payment actually goes out.
    pub fn approve_payout(&self, id: &ApplicationId) -> Result<Application, MissionError> {
        let step = lifecycle::transition_for(LifecycleAction::ApprovePayout);
        Ok(self.applications.update_status(id, step.from, step.to)?)
    }

    /// Admin marks a confirmed application as paid out.
    pub fn mark_paid(&self, id: &ApplicationId) -> Result<Application, MissionError> {
        let step = lifecycle::transition_for(LifecycleAction::MarkPaid);
        let updated = self.applications.update_status(id, step.from, step.to)?;

        let message = match self.campaigns.fetch(&updated.campaign_id)? {
            Some(campaign) => format!(
                "{} paid out {} TWD.",
                campaign.brand_name, campaign.payout_amount
            ),
            None => "Your payout was completed.".to_string(),
        };
        emit_best_effort(
            self.notifications.as_ref(),
            &updated.kol_id,
            NotificationKind::PayoutCompleted,
            "Payout completed",
            Some(message),
        );

        Ok(updated)
    }

    /// Derived seat counts for a campaign.
    pub fn seat_counts(&self, campaign: &CampaignId) -> Result<SeatCounts, MissionError> {
        let applications = self.applications.for_campaign(campaign)?;
        Ok(SeatCounts {
            applicants: applications.len() as u64,
            selected: applications
                .iter()
                .filter(|app| app.status.is_selected_or_later())
                .count() as u64,
        })
    }

    /// A KOL's applications joined with their campaign summaries, newest
    /// first.
    pub fn my_missions(&self, kol: &ProfileId) -> Result<Vec<MissionEntry>, MissionError> {
        let applications = self.applications.for_kol(kol)?;
        let mut entries = Vec::with_capacity(applications.len());
        for application in applications {
            match self.campaigns.fetch(&application.campaign_id)? {
                Some(campaign) => entries.push(MissionEntry {
                    campaign: CampaignSummary::from(&campaign),
                    application,
                }),
                None => tracing::warn!(
                    application = %application.id.0,
                    campaign = %application.campaign_id.0,
                    "application references a missing campaign"
                ),
            }
        }
        Ok(entries)
    }

    /// Admin queue of fresh applicants, oldest first.
    pub fn review_queue(&self, page: PageRequest) -> Result<Page<ReviewRow>, MissionError> {
        let applications = self.applications.by_status(
            ApplicationStatus::Applied,
            QueueOrder::OldestFirst,
            page,
        )?;
        self.join_review_rows(applications)
    }

    /// Admin queue of completed posts awaiting payout approval, newest first.
    pub fn completed_queue(&self, page: PageRequest) -> Result<Page<ReviewRow>, MissionError> {
        let applications = self.applications.by_status(
            ApplicationStatus::Completed,
            QueueOrder::NewestFirst,
            page,
        )?;
        self.join_review_rows(applications)
    }

    /// Confirmed applications joined with bank coordinates, oldest first.
    pub fn payout_queue(&self, page: PageRequest) -> Result<Page<PayoutRow>, MissionError> {
        let applications = self.applications.by_status(
            ApplicationStatus::Confirmed,
            QueueOrder::OldestFirst,
            page,
        )?;
        let total = applications.total;
        let mut rows = Vec::with_capacity(applications.items.len());
        for application in applications.items {
            if let Some(row) = self.payout_row(application)? {
                rows.push(row);
            }
        }
        Ok(Page {
            items: rows,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    fn payout_row(&self, application: Application) -> Result<Option<PayoutRow>, MissionError> {
        let Some(campaign) = self.campaigns.fetch(&application.campaign_id)? else {
            tracing::warn!(
                application = %application.id.0,
                "confirmed application references a missing campaign"
            );
            return Ok(None);
        };
        let profile = self.profiles.fetch(&application.kol_id)?;
        let (kol_name, bank_info) = match profile {
            Some(profile) => (profile.full_name, profile.bank_info),
            None => (None, BankInfo::default()),
        };
        Ok(Some(PayoutRow {
            application,
            kol_name,
            bank_info,
            brand_name: campaign.brand_name,
            title: campaign.title,
            payout_amount: campaign.payout_amount,
        }))
    }

    fn join_review_rows(
        &self,
        applications: Page<Application>,
    ) -> Result<Page<ReviewRow>, MissionError> {
        let total = applications.total;
        let page = applications.page;
        let per_page = applications.per_page;
        let mut rows = Vec::with_capacity(applications.items.len());
        for application in applications.items {
            let profile = self.profiles.fetch(&application.kol_id)?;
            let campaign = self.campaigns.fetch(&application.campaign_id)?;
            match (profile, campaign) {
                (Some(profile), Some(campaign)) => rows.push(ReviewRow {
                    kol: KolSummary::from(&profile),
                    campaign: CampaignSummary::from(&campaign),
                    application,
                }),
                _ => tracing::warn!(
                    application = %application.id.0,
                    "application references a missing profile or campaign"
                ),
            }
        }
        Ok(Page {
            items: rows,
            total,
            page,
            per_page,
        })
    }
}

/// Error raised by the mission service.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("campaign is closed to new applications")]
    CampaignClosed,
    #[error("follower count does not meet the campaign's tier restriction")]
    BelowFollowerFloor,
    #[error("already applied to this campaign")]
    AlreadyApplied,
    #[error("application belongs to another KOL")]
    NotYourApplication,
    #[error("a result URL was already submitted")]
    ResultAlreadySubmitted,
    #[error("result URL must not be empty")]
    EmptyResultUrl,
}
