use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus, Profile,
    ProfileId, ProfileStatus,
};

/// 1-based page request used by the admin tables and the mission board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: usize = 10;
    pub const MAX_PER_PAGE: usize = 100;

    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total row count for pagination controls.
///
/// Pages are independent offset/limit reads: there is no cursor consistency
/// across pages if rows mutate between loads.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        let per_page = self.per_page.max(1) as u64;
        (self.total.div_ceil(per_page)).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Ordering for queue reads keyed on submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrder {
    OldestFirst,
    NewestFirst,
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status changed underneath the update (expected '{expected}', found '{found}')")]
    Stale {
        expected: ApplicationStatus,
        found: ApplicationStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage port for KOL profiles.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, profile: Profile) -> Result<Profile, RepositoryError>;
    fn update(&self, profile: Profile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError>;
    /// Profiles in `status`, newest signup first.
    fn by_status(
        &self,
        status: ProfileStatus,
        page: PageRequest,
    ) -> Result<Page<Profile>, RepositoryError>;
    /// Approved profiles with an outstanding tier request, oldest request
    /// first.
    fn with_pending_tier_request(&self, page: PageRequest)
        -> Result<Page<Profile>, RepositoryError>;
}

/// Storage port for campaigns.
pub trait CampaignRepository: Send + Sync {
    fn insert(&self, campaign: Campaign) -> Result<Campaign, RepositoryError>;
    fn update(&self, campaign: Campaign) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError>;
    /// Campaigns in `status`, newest first.
    fn by_status(
        &self,
        status: CampaignStatus,
        page: PageRequest,
    ) -> Result<Page<Campaign>, RepositoryError>;
    /// Title/brand substring search across all campaigns, newest first. An
    /// empty query matches everything.
    fn search(&self, query: &str, page: PageRequest) -> Result<Page<Campaign>, RepositoryError>;
}

/// Storage port for applications.
///
/// `insert` must reject a second row for the same (kol, campaign) pair, and
/// the status writers are conditional updates: the write only lands when the
/// stored status still equals `expected`, otherwise [`RepositoryError::Stale`]
/// is returned and nothing changes. That keeps admin retries and stale tabs
/// from regressing state.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_for(
        &self,
        kol: &ProfileId,
        campaign: &CampaignId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
    /// Conditional status update that also records the proof URL. Fails with
    /// [`RepositoryError::Conflict`] when a result URL is already present.
    fn submit_result(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        result_url: &str,
    ) -> Result<Application, RepositoryError>;
    /// All applications for one campaign, for derived seat counts.
    fn for_campaign(&self, campaign: &CampaignId) -> Result<Vec<Application>, RepositoryError>;
    /// One KOL's applications, newest first.
    fn for_kol(&self, kol: &ProfileId) -> Result<Vec<Application>, RepositoryError>;
    /// Applications in `status`, ordered by submission time, paged.
    fn by_status(
        &self,
        status: ApplicationStatus,
        order: QueueOrder,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError>;
    /// All applications in `status`, for aggregation.
    fn with_status(&self, status: ApplicationStatus) -> Result<Vec<Application>, RepositoryError>;
}
