//! HTTP surface for the marketplace.
//!
//! Identity arrives from the external auth layer as `x-user-id` /
//! `x-user-email` headers. The access policy runs once, in a middleware at
//! this boundary, and hands the resolved [`Caller`] to every handler through
//! request extensions; the admin and approved-KOL gates are route layers on
//! top of that single resolution.

pub(crate) mod admin;
pub(crate) mod kol;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::access::{AccessPolicy, AccessState, Identity};
use super::campaigns::{CampaignError, CampaignService};
use super::domain::ProfileId;
use super::enrollment::{EnrollmentError, EnrollmentService};
use super::notifications::{NotificationError, NotificationFeed, NotificationSink};
use super::payouts::{PayoutDesk, PayoutError};
use super::repository::{
    ApplicationRepository, CampaignRepository, PageRequest, ProfileRepository, RepositoryError,
};
use super::service::{MissionError, MissionService};

/// Shared router state: the services plus the access policy.
pub struct ApiState<P, C, A, N> {
    pub profiles: Arc<P>,
    pub notifications: Arc<N>,
    pub missions: Arc<MissionService<P, C, A, N>>,
    pub enrollment: Arc<EnrollmentService<P, N>>,
    pub campaigns: Arc<CampaignService<P, C, A>>,
    pub payouts: Arc<PayoutDesk<P, C, A>>,
    pub access: Arc<AccessPolicy>,
}

impl<P, C, A, N> ApiState<P, C, A, N>
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    pub fn new(
        profiles: Arc<P>,
        campaigns: Arc<C>,
        applications: Arc<A>,
        notifications: Arc<N>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            missions: Arc::new(MissionService::new(
                profiles.clone(),
                campaigns.clone(),
                applications.clone(),
                notifications.clone(),
            )),
            enrollment: Arc::new(EnrollmentService::new(
                profiles.clone(),
                notifications.clone(),
            )),
            campaigns: Arc::new(CampaignService::new(
                profiles.clone(),
                campaigns.clone(),
                applications.clone(),
            )),
            payouts: Arc::new(PayoutDesk::new(profiles.clone(), campaigns, applications)),
            access: Arc::new(policy),
            profiles,
            notifications,
        }
    }
}

impl<P, C, A, N> Clone for ApiState<P, C, A, N> {
    fn clone(&self) -> Self {
        Self {
            profiles: self.profiles.clone(),
            notifications: self.notifications.clone(),
            missions: self.missions.clone(),
            enrollment: self.enrollment.clone(),
            campaigns: self.campaigns.clone(),
            payouts: self.payouts.clone(),
            access: self.access.clone(),
        }
    }
}

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Identity,
    pub access: AccessState,
}

/// Router builder exposing the KOL and admin surfaces.
pub fn api_router<P, C, A, N>(state: ApiState<P, C, A, N>) -> Router
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    Router::new()
        .merge(kol::router::<P, C, A, N>())
        .nest("/api/v1/admin", admin::router::<P, C, A, N>())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_layer::<P, C, A, N>,
        ))
        .with_state(state)
}

async fn access_layer<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    mut request: Request,
    next: Next,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    let Some(identity) = identity_from_headers(request.headers()) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "missing x-user-id / x-user-email headers",
        );
    };

    match state.access.resolve(&identity, state.profiles.as_ref()) {
        Ok(access) => {
            request.extensions_mut().insert(Caller { identity, access });
            next.run(request).await
        }
        Err(err) => repository_error_response(err),
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let user_id = headers.get("x-user-id")?.to_str().ok()?.trim();
    let email = headers.get("x-user-email")?.to_str().ok()?.trim();
    if user_id.is_empty() || email.is_empty() {
        return None;
    }
    Some(Identity {
        user_id: ProfileId(user_id.to_string()),
        email: email.to_string(),
    })
}

pub(crate) async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<Caller>() {
        Some(caller) if caller.access == AccessState::Admin => next.run(request).await,
        Some(_) => error_response(StatusCode::FORBIDDEN, "admin only"),
        None => error_response(StatusCode::UNAUTHORIZED, "unauthenticated"),
    }
}

pub(crate) async fn require_approved(request: Request, next: Next) -> Response {
    match request.extensions().get::<Caller>() {
        Some(caller) if caller.access == AccessState::Approved => next.run(request).await,
        Some(caller) => error_response(
            StatusCode::FORBIDDEN,
            format!("account is {}", caller.access.label()),
        ),
        None => error_response(StatusCode::UNAUTHORIZED, "unauthenticated"),
    }
}

/// Query parameters shared by every paged listing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl PageParams {
    pub(crate) fn request(self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(PageRequest::DEFAULT_PER_PAGE),
        )
    }
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub(crate) fn repository_error_response(err: RepositoryError) -> Response {
    match err {
        RepositoryError::NotFound => error_response(StatusCode::NOT_FOUND, err.to_string()),
        RepositoryError::Conflict | RepositoryError::Stale { .. } => {
            error_response(StatusCode::CONFLICT, err.to_string())
        }
        RepositoryError::Unavailable(_) => {
            tracing::error!(error = %err, "storage unavailable");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(crate) fn mission_error_response(err: MissionError) -> Response {
    match err {
        MissionError::Repository(inner) => repository_error_response(inner),
        MissionError::CampaignClosed
        | MissionError::AlreadyApplied
        | MissionError::ResultAlreadySubmitted => error_response(StatusCode::CONFLICT, err.to_string()),
        MissionError::NotYourApplication => error_response(StatusCode::FORBIDDEN, err.to_string()),
        MissionError::BelowFollowerFloor | MissionError::EmptyResultUrl => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

pub(crate) fn enrollment_error_response(err: EnrollmentError) -> Response {
    match err {
        EnrollmentError::Repository(inner) => repository_error_response(inner),
        EnrollmentError::AlreadyDecided { .. }
        | EnrollmentError::UpgradePending
        | EnrollmentError::NoPendingRequest => error_response(StatusCode::CONFLICT, err.to_string()),
        EnrollmentError::NotApproved => error_response(StatusCode::FORBIDDEN, err.to_string()),
        EnrollmentError::UnreadableFollowerCount | EnrollmentError::NotAnUpgrade => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

pub(crate) fn campaign_error_response(err: CampaignError) -> Response {
    match err {
        CampaignError::Repository(inner) => repository_error_response(inner),
        CampaignError::MissingTitle | CampaignError::MissingBrand => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

pub(crate) fn payout_error_response(err: PayoutError) -> Response {
    match err {
        PayoutError::Repository(inner) => repository_error_response(inner),
        PayoutError::Export(_) => {
            tracing::error!(error = %err, "payout export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(crate) fn notification_error_response(err: NotificationError) -> Response {
    tracing::error!(error = %err, "notification feed unavailable");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
