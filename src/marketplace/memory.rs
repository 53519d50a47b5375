//! In-memory reference store.
//!
//! Backs the bundled server binary and the test suites. Mirrors the
//! guarantees a hosted backend must provide: unique (kol, campaign)
//! applications, conditional status updates, and offset pagination over
//! consistently ordered reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus,
    NotificationId, Profile, ProfileId, ProfileStatus,
};
use super::notifications::{
    Notification, NotificationError, NotificationFeed, NotificationKind, NotificationSink,
};
use super::repository::{
    ApplicationRepository, CampaignRepository, Page, PageRequest, ProfileRepository, QueueOrder,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryStore {
    profiles: Mutex<HashMap<ProfileId, Profile>>,
    campaigns: Mutex<HashMap<CampaignId, Campaign>>,
    applications: Mutex<HashMap<ApplicationId, Application>>,
    notifications: Mutex<Vec<Notification>>,
    notification_sequence: AtomicU64,
}

fn poisoned(which: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{which} store lock poisoned"))
}

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let start = page.offset().min(items.len());
    let end = (start + page.per_page).min(items.len());
    Page {
        items: items.drain(start..end).collect(),
        total,
        page: page.page,
        per_page: page.per_page,
    }
}

impl ProfileRepository for InMemoryStore {
    fn insert(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut guard = self.profiles.lock().map_err(|_| poisoned("profile"))?;
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: Profile) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().map_err(|_| poisoned("profile"))?;
        if !guard.contains_key(&profile.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let guard = self.profiles.lock().map_err(|_| poisoned("profile"))?;
        Ok(guard.get(id).cloned())
    }

    fn by_status(
        &self,
        status: ProfileStatus,
        page: PageRequest,
    ) -> Result<Page<Profile>, RepositoryError> {
        let guard = self.profiles.lock().map_err(|_| poisoned("profile"))?;
        let mut matches: Vec<Profile> = guard
            .values()
            .filter(|profile| profile.status == status)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matches, page))
    }

    fn with_pending_tier_request(
        &self,
        page: PageRequest,
    ) -> Result<Page<Profile>, RepositoryError> {
        let guard = self.profiles.lock().map_err(|_| poisoned("profile"))?;
        let mut matches: Vec<Profile> = guard
            .values()
            .filter(|profile| {
                profile.status == ProfileStatus::Approved && profile.tier_requested.is_some()
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.tier_requested_at.cmp(&b.tier_requested_at));
        Ok(paginate(matches, page))
    }
}

impl CampaignRepository for InMemoryStore {
    fn insert(&self, campaign: Campaign) -> Result<Campaign, RepositoryError> {
        let mut guard = self.campaigns.lock().map_err(|_| poisoned("campaign"))?;
        if guard.contains_key(&campaign.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(campaign.id.clone(), campaign.clone());
        Ok(campaign)
    }

    fn update(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut guard = self.campaigns.lock().map_err(|_| poisoned("campaign"))?;
        if !guard.contains_key(&campaign.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(campaign.id.clone(), campaign);
        Ok(())
    }

    fn fetch(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let guard = self.campaigns.lock().map_err(|_| poisoned("campaign"))?;
        Ok(guard.get(id).cloned())
    }

    fn by_status(
        &self,
        status: CampaignStatus,
        page: PageRequest,
    ) -> Result<Page<Campaign>, RepositoryError> {
        let guard = self.campaigns.lock().map_err(|_| poisoned("campaign"))?;
        let mut matches: Vec<Campaign> = guard
            .values()
            .filter(|campaign| campaign.status == status)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matches, page))
    }

    fn search(&self, query: &str, page: PageRequest) -> Result<Page<Campaign>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let guard = self.campaigns.lock().map_err(|_| poisoned("campaign"))?;
        let mut matches: Vec<Campaign> = guard
            .values()
            .filter(|campaign| {
                needle.is_empty()
                    || campaign.title.to_lowercase().contains(&needle)
                    || campaign.brand_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matches, page))
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        let duplicate = guard.values().any(|existing| {
            existing.kol_id == application.kol_id && existing.campaign_id == application.campaign_id
        });
        if duplicate || guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        Ok(guard.get(id).cloned())
    }

    fn find_for(
        &self,
        kol: &ProfileId,
        campaign: &CampaignId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        Ok(guard
            .values()
            .find(|app| app.kol_id == *kol && app.campaign_id == *campaign)
            .cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        let application = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if application.status != expected {
            return Err(RepositoryError::Stale {
                expected,
                found: application.status,
            });
        }
        application.status = next;
        Ok(application.clone())
    }

    fn submit_result(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        result_url: &str,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        let application = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if application.result_url.is_some() {
            return Err(RepositoryError::Conflict);
        }
        if application.status != expected {
            return Err(RepositoryError::Stale {
                expected,
                found: application.status,
            });
        }
        application.status = next;
        application.result_url = Some(result_url.to_string());
        Ok(application.clone())
    }

    fn for_campaign(&self, campaign: &CampaignId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        Ok(guard
            .values()
            .filter(|app| app.campaign_id == *campaign)
            .cloned()
            .collect())
    }

    fn for_kol(&self, kol: &ProfileId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        let mut matches: Vec<Application> = guard
            .values()
            .filter(|app| app.kol_id == *kol)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(matches)
    }

    fn by_status(
        &self,
        status: ApplicationStatus,
        order: QueueOrder,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        let mut matches: Vec<Application> = guard
            .values()
            .filter(|app| app.status == status)
            .cloned()
            .collect();
        match order {
            QueueOrder::OldestFirst => matches.sort_by(|a, b| a.applied_at.cmp(&b.applied_at)),
            QueueOrder::NewestFirst => matches.sort_by(|a, b| b.applied_at.cmp(&a.applied_at)),
        }
        Ok(paginate(matches, page))
    }

    fn with_status(&self, status: ApplicationStatus) -> Result<Vec<Application>, RepositoryError> {
        let guard = self
            .applications
            .lock()
            .map_err(|_| poisoned("application"))?;
        Ok(guard
            .values()
            .filter(|app| app.status == status)
            .cloned()
            .collect())
    }
}

impl NotificationSink for InMemoryStore {
    fn emit(
        &self,
        user: &ProfileId,
        kind: NotificationKind,
        title: &str,
        message: Option<String>,
    ) -> Result<(), NotificationError> {
        let mut guard = self
            .notifications
            .lock()
            .map_err(|_| NotificationError::Transport("notification store lock poisoned".into()))?;
        let sequence = self.notification_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        guard.push(Notification {
            id: NotificationId(format!("ntf-{sequence:06}")),
            user_id: user.clone(),
            kind,
            title: title.to_string(),
            message,
            read: false,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

impl NotificationFeed for InMemoryStore {
    fn recent(
        &self,
        user: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError> {
        let guard = self
            .notifications
            .lock()
            .map_err(|_| NotificationError::Transport("notification store lock poisoned".into()))?;
        let mut matches: Vec<Notification> = guard
            .iter()
            .filter(|notification| notification.user_id == *user)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);
        Ok(matches)
    }

    fn unread_count(&self, user: &ProfileId) -> Result<u64, NotificationError> {
        let guard = self
            .notifications
            .lock()
            .map_err(|_| NotificationError::Transport("notification store lock poisoned".into()))?;
        Ok(guard
            .iter()
            .filter(|notification| notification.user_id == *user && !notification.read)
            .count() as u64)
    }

    fn mark_all_read(&self, user: &ProfileId) -> Result<(), NotificationError> {
        let mut guard = self
            .notifications
            .lock()
            .map_err(|_| NotificationError::Transport("notification store lock poisoned".into()))?;
        for notification in guard.iter_mut() {
            if notification.user_id == *user {
                notification.read = true;
            }
        }
        Ok(())
    }
}
