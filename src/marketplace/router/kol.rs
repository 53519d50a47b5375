//! KOL-facing routes: the mission board, applications, profile self-service,
//! and the notification bell.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::{
    campaign_error_response, enrollment_error_response, error_response, mission_error_response,
    notification_error_response, require_approved, ApiState, Caller, PageParams,
};
use crate::marketplace::domain::{ApplicationId, CampaignId};
use crate::marketplace::enrollment::ProfileDraft;
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
    let missions = Router::new()
        .route("/api/v1/campaigns", get(mission_board::<P, C, A, N>))
        .route(
            "/api/v1/campaigns/:campaign_id",
            get(mission_detail::<P, C, A, N>),
        )
        .route(
            "/api/v1/campaigns/:campaign_id/applications",
            post(apply::<P, C, A, N>),
        )
        .route("/api/v1/me/missions", get(my_missions::<P, C, A, N>))
        .route(
            "/api/v1/applications/:application_id/result",
            post(submit_result::<P, C, A, N>),
        )
        .route(
            "/api/v1/me/tier-request",
            post(request_tier_upgrade::<P, C, A, N>),
        )
        .route_layer(middleware::from_fn(require_approved));

    let account = Router::new()
        .route("/api/v1/me/access", get(access_state))
        .route(
            "/api/v1/me/profile",
            get(my_profile::<P, C, A, N>).put(save_profile::<P, C, A, N>),
        )
        .route("/api/v1/me/tier-preview", get(tier_preview::<P, C, A, N>))
        .route(
            "/api/v1/me/notifications",
            get(notification_feed::<P, C, A, N>),
        )
        .route(
            "/api/v1/me/notifications/read",
            post(mark_notifications_read::<P, C, A, N>),
        );

    missions.merge(account)
}

async fn mission_board<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<PageParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .campaigns
        .board(&caller.identity.user_id, params.request())
    {
        Ok(board) => Json(board).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

async fn mission_detail<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Path(campaign_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .campaigns
        .detail(&CampaignId(campaign_id), &caller.identity.user_id)
    {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => campaign_error_response(err),
    }
}

async fn apply<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Path(campaign_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .missions
        .apply(&caller.identity.user_id, &CampaignId(campaign_id))
    {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn my_missions<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.my_missions(&caller.identity.user_id) {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => mission_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResultBody {
    result_url: String,
}

async fn submit_result<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Path(application_id): Path<String>,
    Json(body): Json<SubmitResultBody>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.missions.submit_result(
        &ApplicationId(application_id),
        &caller.identity.user_id,
        &body.result_url,
    ) {
        Ok(application) => Json(application).into_response(),
        Err(err) => mission_error_response(err),
    }
}

async fn access_state(Extension(caller): Extension<Caller>) -> Response {
    Json(json!({ "access": caller.access })).into_response()
}

async fn my_profile<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.profile(&caller.identity.user_id) {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "profile not registered yet"),
        Err(err) => enrollment_error_response(err),
    }
}

async fn save_profile<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Json(draft): Json<ProfileDraft>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.enrollment.upsert_profile(&caller.identity, draft) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct TierPreviewParams {
    followers: String,
}

async fn tier_preview<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<TierPreviewParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .enrollment
        .upgrade_preview(&caller.identity.user_id, &params.followers)
    {
        Ok(preview) => Json(preview).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct TierRequestBody {
    followers: String,
}

async fn request_tier_upgrade<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<TierRequestBody>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state
        .enrollment
        .request_tier_upgrade(&caller.identity.user_id, &body.followers)
    {
        Ok(profile) => (StatusCode::ACCEPTED, Json(profile)).into_response(),
        Err(err) => enrollment_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    limit: Option<usize>,
}

async fn notification_feed<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<FeedParams>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let user = &caller.identity.user_id;
    let items = match state.notifications.recent(user, limit) {
        Ok(items) => items,
        Err(err) => return notification_error_response(err),
    };
    match state.notifications.unread_count(user) {
        Ok(unread) => Json(json!({ "unread": unread, "items": items })).into_response(),
        Err(err) => notification_error_response(err),
    }
}

async fn mark_notifications_read<P, C, A, N>(
    State(state): State<ApiState<P, C, A, N>>,
    Extension(caller): Extension<Caller>,
) -> Response
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationSink + NotificationFeed + 'static,
{
    match state.notifications.mark_all_read(&caller.identity.user_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => notification_error_response(err),
    }
}
