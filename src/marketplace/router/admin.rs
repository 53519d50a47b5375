//! Admin routes: signup review, tier upgrades, campaign management, the
//! application queues, and the payout desk. All nested under
//! `/api/v1/admin` behind the admin gate.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use super::{
    campaign_error_response, enrollment_error_response, error_response, mission_error_response,
    payout_error_response, require_admin, ApiState, PageParams,
};
use crate::marketplace::campaigns::CampaignDraft;
use crate::marketplace::domain::{ApplicationId, CampaignId, ProfileId};
use crate::marketplace::notifications::{NotificationFeed, NotificationSink};
use crate::marketplace::repository::{
    ApplicationRepository, CampaignRepository, ProfileRepository,
};

pub(crate) fn router<P, C, A, N>() -> Router<ApiState<P, C, A, N>>
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    Router::new()
        .route("/profiles", get(pending_profiles::<P, C, A, N>))
        .route("/profiles/:profile_id/approve", post(approve_kol::<P, C, A, N>))
        .route("/profiles/:profile_id/reject", post(reject_kol::<P, C, A, N>))
        .route("/tier-requests", get(tier_requests::<P, C, A, N>))
        .route(
            "/tier-requests/:profile_id/approve",
            post(approve_tier_upgrade::<P, C, A, N>),
        )
        .route(
            "/tier-requests/:profile_id/reject",
            post(reject_tier_upgrade::<P, C, A, N>),
        )
        .route(
            "/campaigns",
            get(campaign_listing::<P, C, A, N>).post(create_campaign::<P, C, A, N>),
        )
        .route("/campaigns/:campaign_id", put(update_campaign::<P, C, A, N>))
        .route("/campaigns/:campaign_id/close", post(close_campaign::<P, C, A, N>))
        .route(
            "/campaigns/:campaign_id/deadline",
            post(extend_deadline::<P, C, A, N>),
        )
        .route("/applications", get(application_queue::<P, C, A, N>))
        .route(
            "/applications/:application_id/select",
            post(select_applicant::<P, C, A, N>),
        )
        .route(
            "/applications/:application_id/confirm",
            post(approve_payout::<P, C, A, N>),
        )
        .route(
            "/applications/:application_id/paid",
            post(mark_paid::<P, C, A, N>),
        )
        .route("/payouts", get(payout_queue::<P, C, A, N>))
        .route("/payouts/stats", get(payout_stats::<P, C, A, N>))
        .route("/payouts/export", get(export_payout_queue::<P, C, A, N>))
        .route_layer(middleware::from_fn(require_admin))
}

async fn pending_profiles<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<PageParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.pending_profiles(params.request()) {
        Ok(page) => Json(page).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

async fn approve_kol<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.approve_kol(&ProfileId(profile_id)) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

async fn reject_kol<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.reject_kol(&ProfileId(profile_id)) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

async fn tier_requests<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<PageParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.tier_requests(params.request()) {
        Ok(page) => Json(page).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

async fn approve_tier_upgrade<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.approve_tier_upgrade(&ProfileId(profile_id)) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

async fn reject_tier_upgrade<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.reject_tier_upgrade(&ProfileId(profile_id)) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct CampaignListingParams {
    query: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

async fn campaign_listing<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<CampaignListingParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    let page = PageParams {
        page: params.page,
        per_page: params.per_page,
    }
    .request();
    match state.campaigns.admin_listing(params.query.as_deref(), page) {
        Ok(listing) => Json(listing).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

async fn create_campaign<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Json(draft): Json<CampaignDraft>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.campaigns.create(draft) {
        Ok(campaign) => (StatusCode::CREATED, Json(campaign)).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

async fn update_campaign<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(campaign_id): Path<String>,
    Json(draft): Json<CampaignDraft>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.campaigns.update(&CampaignId(campaign_id), draft) {
        Ok(campaign) => Json(campaign).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

async fn close_campaign<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(campaign_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.campaigns.close(&CampaignId(campaign_id)) {
        Ok(campaign) => Json(campaign).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct DeadlineBody {
    deadline: NaiveDate,
}

async fn extend_deadline<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(campaign_id): Path<String>,
    Json(body): Json<DeadlineBody>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .campaigns
        .extend_deadline(&CampaignId(campaign_id), body.deadline)
    {
        Ok(campaign) => Json(campaign).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct QueueParams {
    stage: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

async fn application_queue<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<QueueParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    let page = PageParams {
        page: params.page,
        per_page: params.per_page,
    }
    .request();
    let result = match params.stage.as_deref().unwrap_or("applied") {
        "applied" => state.missions.review_queue(page),
        "completed" => state.missions.completed_queue(page),
        other => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown stage '{other}' (expected applied or completed)"),
            )
        }
    };
    match result {
        Ok(queue) => Json(queue).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn select_applicant<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.select(&ApplicationId(application_id)) {
        Ok(application) => Json(application).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn approve_payout<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.approve_payout(&ApplicationId(application_id)) {
        Ok(application) => Json(application).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn mark_paid<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.mark_paid(&ApplicationId(application_id)) {
        Ok(application) => Json(application).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn payout_queue<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<PageParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.payout_queue(params.request()) {
        Ok(queue) => Json(queue).into_response(),
        Err(err) => mission_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct StatsParams {
    mode: Option<String>,
    year: Option<i32>,
}

async fn payout_stats<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Query(params): Query<StatsParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    let result = match params.mode.as_deref().unwrap_or("monthly") {
        "monthly" => {
            let year = params.year.unwrap_or_else(|| Utc::now().year());
            state.payouts.monthly(year)
        }
        "yearly" => state.payouts.yearly(),
        "brand" => state.payouts.by_brand(),
        other => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown mode '{other}' (expected monthly, yearly, or brand)"),
            )
        }
    };
    match result {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => payout_error_response(err),
    }
}

async fn export_payout_queue<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.payouts.export_queue_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(err) => payout_error_response(err),
    }
}
