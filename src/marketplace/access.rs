//! Request authorization policy.
//!
//! "Is this the admin" and "is this KOL approved" are decided in one place:
//! [`AccessPolicy::resolve`] runs once per request at the router boundary and
//! hands the resolved [`AccessState`] to handlers, so the answer is never
//! re-derived ad hoc deeper in the stack.

use std::collections::HashSet;

use serde::Serialize;

use super::domain::{ProfileId, ProfileStatus};
use super::repository::{ProfileRepository, RepositoryError};

/// Identity supplied by the external auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: ProfileId,
    pub email: String,
}

/// What a request is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Admin,
    Approved,
    Pending,
    Rejected,
}

impl AccessState {
    pub const fn label(self) -> &'static str {
        match self {
            AccessState::Admin => "admin",
            AccessState::Approved => "approved",
            AccessState::Pending => "pending",
            AccessState::Rejected => "rejected",
        }
    }
}

/// Admin roster plus the profile-status gate.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    admin_emails: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_ascii_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.admin_emails
            .contains(&identity.email.to_ascii_lowercase())
    }

    /// Resolve the caller's access state.
    ///
    /// KOLs without a stored profile have not finished registration yet and
    /// count as pending review.
    pub fn resolve<P>(
        &self,
        identity: &Identity,
        profiles: &P,
    ) -> Result<AccessState, RepositoryError>
    where
        P: ProfileRepository + ?Sized,
    {
        if self.is_admin(identity) {
            return Ok(AccessState::Admin);
        }

        let status = profiles
            .fetch(&identity.user_id)?
            .map(|profile| profile.status)
            .unwrap_or(ProfileStatus::Pending);

        Ok(match status {
            ProfileStatus::Approved => AccessState::Approved,
            ProfileStatus::Pending => AccessState::Pending,
            ProfileStatus::Rejected => AccessState::Rejected,
        })
    }
}
