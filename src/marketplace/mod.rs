//! The KOL mission marketplace.
//!
//! Pure decision logic lives in [`tiers`] (program tiers, follower buckets,
//! eligibility) and [`lifecycle`] (the application state machine); the
//! services orchestrate those decisions over the storage and notification
//! ports, and [`router`] exposes them over HTTP.

pub mod access;
pub mod campaigns;
pub mod domain;
pub mod enrollment;
pub mod lifecycle;
pub mod memory;
pub mod notifications;
pub mod payouts;
pub mod repository;
pub mod router;
pub mod service;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use access::{AccessPolicy, AccessState, Identity};
pub use campaigns::{CampaignDraft, CampaignError, CampaignService, MissionCard, MissionDetail};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, BankInfo, Campaign, CampaignId, CampaignStatus,
    NotificationId, Profile, ProfileId, ProfileStatus, SnsLink,
};
pub use enrollment::{EnrollmentError, EnrollmentService, ProfileDraft, UpgradePreview};
pub use lifecycle::{Actor, LifecycleAction, Transition, WrongState, TRANSITIONS};
pub use memory::InMemoryStore;
pub use notifications::{
    Notification, NotificationError, NotificationFeed, NotificationKind, NotificationSink,
};
pub use payouts::{PayoutDesk, PayoutError, PayoutStatRow, PayoutStats};
pub use repository::{
    ApplicationRepository, CampaignRepository, Page, PageRequest, ProfileRepository, QueueOrder,
    RepositoryError,
};
pub use router::{api_router, ApiState};
pub use service::{
    CampaignSummary, KolSummary, MissionEntry, MissionError, MissionService, PayoutRow, ReviewRow,
    SeatCounts,
};
pub use tiers::{parse_follower_count, FollowerTier, ProgramTier};
