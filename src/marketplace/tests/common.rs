use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::marketplace::access::AccessPolicy;
use crate::marketplace::campaigns::{CampaignDraft, CampaignService};
use crate::marketplace::domain::{
    Application, ApplicationId, ApplicationStatus, BankInfo, Campaign, CampaignId, Profile,
    ProfileId, ProfileStatus, SnsLink,
};
use crate::marketplace::enrollment::EnrollmentService;
use crate::marketplace::memory::InMemoryStore;
use crate::marketplace::notifications::{
    Notification, NotificationError, NotificationFeed, NotificationKind, NotificationSink,
};
use crate::marketplace::payouts::PayoutDesk;
use crate::marketplace::repository::{
    ApplicationRepository, CampaignRepository, ProfileRepository,
};
use crate::marketplace::router::{api_router, ApiState};
use crate::marketplace::service::MissionService;
use crate::marketplace::tiers::FollowerTier;

pub(super) const ADMIN_EMAIL: &str = "desk@brand.tw";

pub(super) struct Harness {
    pub store: Arc<InMemoryStore>,
    pub missions: MissionService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>,
    pub enrollment: EnrollmentService<InMemoryStore, InMemoryStore>,
    pub campaigns: CampaignService<InMemoryStore, InMemoryStore, InMemoryStore>,
    pub payouts: PayoutDesk<InMemoryStore, InMemoryStore, InMemoryStore>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::default());
    Harness {
        missions: MissionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ),
        enrollment: EnrollmentService::new(store.clone(), store.clone()),
        campaigns: CampaignService::new(store.clone(), store.clone(), store.clone()),
        payouts: PayoutDesk::new(store.clone(), store.clone(), store.clone()),
        store,
    }
}

pub(super) fn bank_info() -> BankInfo {
    BankInfo {
        beneficiary_name: "CHEN MEI LING".to_string(),
        address_english: "12F, 88 Songren Rd, Taipei".to_string(),
        phone_number: "+886-912-345-678".to_string(),
        bank_name: "CTBC BANK".to_string(),
        swift_code: "CTCBTWTP".to_string(),
        bank_address: "No. 168, Jingmao 2nd Rd, Taipei, Taiwan".to_string(),
        account_number: "123-456-789012".to_string(),
        iban: None,
    }
}

pub(super) fn profile(id: &str, follower_count: Option<u64>, status: ProfileStatus) -> Profile {
    Profile {
        id: ProfileId(id.to_string()),
        email: format!("{id}@kol.tw"),
        full_name: Some(format!("KOL {id}")),
        sns_links: vec![SnsLink {
            label: "IG".to_string(),
            url: format!("https://instagram.com/{id}"),
        }],
        follower_count,
        tier: None,
        tier_requested: None,
        tier_requested_at: None,
        line_id: None,
        kakao_id: None,
        bank_info: bank_info(),
        status,
        created_at: Utc::now(),
    }
}

pub(super) fn seed_profile(store: &InMemoryStore, profile: Profile) -> ProfileId {
    let stored = ProfileRepository::insert(store, profile).expect("profile stored");
    stored.id
}

pub(super) fn seed_kol(store: &InMemoryStore, id: &str, follower_count: Option<u64>) -> ProfileId {
    seed_profile(store, profile(id, follower_count, ProfileStatus::Approved))
}

pub(super) fn campaign_draft(title: &str, follower_tiers: Vec<FollowerTier>) -> CampaignDraft {
    CampaignDraft {
        title: title.to_string(),
        brand_name: "Nova Beauty".to_string(),
        payout_amount: 8_000,
        follower_tiers,
        ..CampaignDraft::default()
    }
}

pub(super) fn fetch_campaign(store: &InMemoryStore, id: &CampaignId) -> Campaign {
    CampaignRepository::fetch(store, id)
        .expect("campaign fetch")
        .expect("campaign present")
}

pub(super) fn fetch_application(store: &InMemoryStore, id: &ApplicationId) -> Application {
    ApplicationRepository::fetch(store, id)
        .expect("application fetch")
        .expect("application present")
}

pub(super) fn fetch_profile(store: &InMemoryStore, id: &ProfileId) -> Profile {
    ProfileRepository::fetch(store, id)
        .expect("profile fetch")
        .expect("profile present")
}

pub(super) fn seed_application(
    store: &InMemoryStore,
    id: &str,
    kol: &ProfileId,
    campaign: &CampaignId,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> ApplicationId {
    let stored = ApplicationRepository::insert(
        store,
        Application {
            id: ApplicationId(id.to_string()),
            kol_id: kol.clone(),
            campaign_id: campaign.clone(),
            status,
            result_url: match status {
                ApplicationStatus::Applied | ApplicationStatus::Selected => None,
                _ => Some(format!("https://instagram.com/p/{id}")),
            },
            applied_at,
        },
    )
    .expect("application stored");
    stored.id
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn notifications_for(store: &InMemoryStore, user: &ProfileId) -> Vec<Notification> {
    store.recent(user, 100).expect("notification feed")
}

pub(super) fn notification_kinds(
    store: &InMemoryStore,
    user: &ProfileId,
) -> Vec<NotificationKind> {
    notifications_for(store, user)
        .into_iter()
        .map(|notification| notification.kind)
        .collect()
}

/// Sink whose transport is permanently down, for fire-and-forget checks.
pub(super) struct FailingSink;

impl NotificationSink for FailingSink {
    fn emit(
        &self,
        _user: &ProfileId,
        _kind: NotificationKind,
        _title: &str,
        _message: Option<String>,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("transport offline".to_string()))
    }
}

pub(super) fn router_with_admin() -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    let state = ApiState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        AccessPolicy::new([ADMIN_EMAIL]),
    );
    (api_router(state), store)
}
