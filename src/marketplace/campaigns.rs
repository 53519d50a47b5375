//! Campaign management and the KOL-facing mission board.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Campaign, CampaignId, CampaignStatus, ProfileId};
use super::repository::{
    ApplicationRepository, CampaignRepository, Page, PageRequest, ProfileRepository,
    RepositoryError,
};
use super::service::SeatCounts;
use super::tiers::eligibility::can_apply;
use super::tiers::FollowerTier;

pub struct CampaignService<P, C, A> {
    profiles: Arc<P>,
    campaigns: Arc<C>,
    applications: Arc<A>,
}

static CAMPAIGN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_campaign_id() -> CampaignId {
    let id = CAMPAIGN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CampaignId(format!("cmp-{id:06}"))
}

/// Admin payload for creating or editing a campaign.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignDraft {
    pub title: String,
    pub brand_name: String,
    pub guide_content: Option<String>,
    pub guide_url: Option<String>,
    pub contact_line: Option<String>,
    pub contact_kakao: Option<String>,
    #[serde(default)]
    pub payout_amount: u64,
    pub recruitment_quota: Option<u32>,
    pub brand_image_url: Option<String>,
    #[serde(default)]
    pub follower_tiers: Vec<FollowerTier>,
    pub deadline: Option<NaiveDate>,
}

/// A campaign on the KOL mission board, with derived counts and the viewer's
/// own eligibility.
#[derive(Debug, Clone, Serialize)]
pub struct MissionCard {
    pub campaign: Campaign,
    pub seats: SeatCounts,
    pub eligible: bool,
}

/// Campaign detail for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct MissionDetail {
    pub campaign: Campaign,
    pub seats: SeatCounts,
    pub eligible: bool,
    pub already_applied: bool,
    /// Whether the viewer holds a seat (selected or any later status).
    pub selected: bool,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<P, C, A> CampaignService<P, C, A>
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(profiles: Arc<P>, campaigns: Arc<C>, applications: Arc<A>) -> Self {
        Self {
            profiles,
            campaigns,
            applications,
        }
    }

    pub fn create(&self, draft: CampaignDraft) -> Result<Campaign, CampaignError> {
        validate(&draft)?;
        let campaign = Campaign {
            id: next_campaign_id(),
            title: draft.title.trim().to_string(),
            brand_name: draft.brand_name.trim().to_string(),
            guide_content: blank_to_none(draft.guide_content),
            guide_url: blank_to_none(draft.guide_url),
            contact_line: blank_to_none(draft.contact_line),
            contact_kakao: blank_to_none(draft.contact_kakao),
            payout_amount: draft.payout_amount,
            recruitment_quota: draft.recruitment_quota.filter(|quota| *quota > 0),
            brand_image_url: blank_to_none(draft.brand_image_url),
            follower_tiers: draft.follower_tiers,
            deadline: draft.deadline,
            status: CampaignStatus::Active,
            created_at: Utc::now(),
        };
        Ok(self.campaigns.insert(campaign)?)
    }

    pub fn update(&self, id: &CampaignId, draft: CampaignDraft) -> Result<Campaign, CampaignError> {
        validate(&draft)?;
        let mut campaign = self.campaigns.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        campaign.title = draft.title.trim().to_string();
        campaign.brand_name = draft.brand_name.trim().to_string();
        campaign.guide_content = blank_to_none(draft.guide_content);
        campaign.guide_url = blank_to_none(draft.guide_url);
        campaign.contact_line = blank_to_none(draft.contact_line);
        campaign.contact_kakao = blank_to_none(draft.contact_kakao);
        campaign.payout_amount = draft.payout_amount;
        campaign.recruitment_quota = draft.recruitment_quota.filter(|quota| *quota > 0);
        campaign.brand_image_url = blank_to_none(draft.brand_image_url);
        campaign.follower_tiers = draft.follower_tiers;
        campaign.deadline = draft.deadline;
        self.campaigns.update(campaign.clone())?;
        Ok(campaign)
    }

    pub fn close(&self, id: &CampaignId) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        campaign.status = CampaignStatus::Closed;
        self.campaigns.update(campaign.clone())?;
        Ok(campaign)
    }

    pub fn extend_deadline(
        &self,
        id: &CampaignId,
        deadline: NaiveDate,
    ) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        campaign.deadline = Some(deadline);
        self.campaigns.update(campaign.clone())?;
        Ok(campaign)
    }

    /// Admin listing with optional title/brand search, newest first.
    pub fn admin_listing(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Campaign>, CampaignError> {
        Ok(self.campaigns.search(query.unwrap_or(""), page)?)
    }

    /// Active campaigns for the mission board, annotated per viewer.
    pub fn board(
        &self,
        viewer: &ProfileId,
        page: PageRequest,
    ) -> Result<Page<MissionCard>, CampaignError> {
        let follower_count = self
            .profiles
            .fetch(viewer)?
            .and_then(|profile| profile.follower_count);

        let campaigns = self.campaigns.by_status(CampaignStatus::Active, page)?;
        let total = campaigns.total;
        let mut cards = Vec::with_capacity(campaigns.items.len());
        for campaign in campaigns.items {
            let seats = self.seat_counts(&campaign.id)?;
            let eligible = can_apply(follower_count, &campaign.follower_tiers);
            cards.push(MissionCard {
                campaign,
                seats,
                eligible,
            });
        }
        Ok(Page {
            items: cards,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Detail view of one active campaign for one viewer. Closed campaigns
    /// are not exposed here.
    pub fn detail(
        &self,
        id: &CampaignId,
        viewer: &ProfileId,
    ) -> Result<MissionDetail, CampaignError> {
        let campaign = self.campaigns.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if campaign.status != CampaignStatus::Active {
            return Err(RepositoryError::NotFound.into());
        }

        let follower_count = self
            .profiles
            .fetch(viewer)?
            .and_then(|profile| profile.follower_count);
        let seats = self.seat_counts(&campaign.id)?;
        let mine = self.applications.find_for(viewer, &campaign.id)?;

        Ok(MissionDetail {
            eligible: can_apply(follower_count, &campaign.follower_tiers),
            already_applied: mine.is_some(),
            selected: mine
                .map(|app| app.status.is_selected_or_later())
                .unwrap_or(false),
            campaign,
            seats,
        })
    }

    fn seat_counts(&self, campaign: &CampaignId) -> Result<SeatCounts, CampaignError> {
        let applications = self.applications.for_campaign(campaign)?;
        Ok(SeatCounts {
            applicants: applications.len() as u64,
            selected: applications
                .iter()
                .filter(|app| app.status.is_selected_or_later())
                .count() as u64,
        })
    }
}

fn validate(draft: &CampaignDraft) -> Result<(), CampaignError> {
    if draft.title.trim().is_empty() {
        return Err(CampaignError::MissingTitle);
    }
    if draft.brand_name.trim().is_empty() {
        return Err(CampaignError::MissingBrand);
    }
    Ok(())
}

/// Error raised by the campaign service.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("campaign title is required")]
    MissingTitle,
    #[error("brand name is required")]
    MissingBrand,
}
