use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{NotificationId, ProfileId};

/// The five notification kinds emitted by marketplace transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    KolApproved,
    KolRejected,
    MissionSelected,
    PayoutCompleted,
    TierApproved,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::KolApproved => "kol_approved",
            NotificationKind::KolRejected => "kol_rejected",
            NotificationKind::MissionSelected => "mission_selected",
            NotificationKind::PayoutCompleted => "payout_completed",
            NotificationKind::TierApproved => "tier_approved",
        }
    }
}

/// A delivered in-app notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: ProfileId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Outbound delivery port.
///
/// Delivery is best effort: callers log failures and keep the primary
/// transition, never the other way around.
pub trait NotificationSink: Send + Sync {
    fn emit(
        &self,
        user: &ProfileId,
        kind: NotificationKind,
        title: &str,
        message: Option<String>,
    ) -> Result<(), NotificationError>;
}

/// Read side backing the in-app notification bell.
pub trait NotificationFeed: Send + Sync {
    fn recent(&self, user: &ProfileId, limit: usize)
        -> Result<Vec<Notification>, NotificationError>;
    fn unread_count(&self, user: &ProfileId) -> Result<u64, NotificationError>;
    fn mark_all_read(&self, user: &ProfileId) -> Result<(), NotificationError>;
}

/// Notification transport error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Emit without letting a delivery failure reach the caller.
pub(crate) fn emit_best_effort<N: NotificationSink + ?Sized>(
    sink: &N,
    user: &ProfileId,
    kind: NotificationKind,
    title: &str,
    message: Option<String>,
) {
    if let Err(err) = sink.emit(user, kind, title, message) {
        tracing::warn!(
            kind = kind.label(),
            user = %user.0,
            error = %err,
            "notification dropped"
        );
    }
}
