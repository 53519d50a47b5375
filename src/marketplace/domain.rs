use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::tiers::{FollowerTier, ProgramTier};

/// Identifier wrapper for KOL profiles (matches the auth user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

/// Identifier wrapper for campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// Review state of a KOL account. `pending` accounts wait for the admin;
/// both decisions are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProfileStatus::Pending => "pending",
            ProfileStatus::Approved => "approved",
            ProfileStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Closed,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of an application; transitions only move forward.
///
/// There is no rejected state: applicants who are never selected simply stay
/// in `applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Selected,
    Completed,
    Confirmed,
    Paid,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Confirmed => "confirmed",
            ApplicationStatus::Paid => "paid",
        }
    }

    /// Canonical "seat filled" predicate: the application was selected at
    /// some point, whatever has happened downstream since. Every selected
    /// count in the marketplace goes through this one test.
    pub const fn is_selected_or_later(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected
                | ApplicationStatus::Completed
                | ApplicationStatus::Confirmed
                | ApplicationStatus::Paid
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Paid)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A labelled social link on a KOL profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsLink {
    pub label: String,
    pub url: String,
}

/// Wire-transfer coordinates for the payout queue. Carried opaquely; core
/// logic never interprets these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    pub beneficiary_name: String,
    pub address_english: String,
    pub phone_number: String,
    pub bank_name: String,
    pub swift_code: String,
    pub bank_address: String,
    pub account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
}

/// A KOL account as stored by the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub full_name: Option<String>,
    pub sns_links: Vec<SnsLink>,
    pub follower_count: Option<u64>,
    pub tier: Option<ProgramTier>,
    pub tier_requested: Option<ProgramTier>,
    pub tier_requested_at: Option<DateTime<Utc>>,
    pub line_id: Option<String>,
    pub kakao_id: Option<String>,
    pub bank_info: BankInfo,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// A request is outstanding exactly while `tier_requested` is set; the
    /// admin decision clears it atomically.
    pub fn has_pending_tier_request(&self) -> bool {
        self.tier_requested.is_some()
    }
}

/// A paid promotional mission posted by the brand admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub brand_name: String,
    pub guide_content: Option<String>,
    pub guide_url: Option<String>,
    pub contact_line: Option<String>,
    pub contact_kakao: Option<String>,
    pub payout_amount: u64,
    /// `None` means unlimited seats. Advisory for selection; never enforced
    /// at apply time.
    pub recruitment_quota: Option<u32>,
    pub brand_image_url: Option<String>,
    /// Empty means unrestricted.
    pub follower_tiers: Vec<FollowerTier>,
    pub deadline: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

/// One KOL's participation in one campaign. At most one row exists per
/// (kol, campaign) pair; the storage layer enforces the uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub kol_id: ProfileId,
    pub campaign_id: CampaignId,
    pub status: ApplicationStatus,
    /// Set exactly once, when the KOL submits proof of completion.
    pub result_url: Option<String>,
    pub applied_at: DateTime<Utc>,
}
