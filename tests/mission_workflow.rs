//! Integration specifications for the mission marketplace.
//!
//! Scenarios run end-to-end through the public service facades and the HTTP
//! router, the way a deployment composes them, without reaching into private
//! modules.

use std::sync::Arc;

use missiondesk::marketplace::{
    api_router, AccessPolicy, ApiState, ApplicationStatus, CampaignDraft, CampaignService,
    EnrollmentService, FollowerTier, Identity, InMemoryStore, MissionService, NotificationFeed,
    NotificationKind, PayoutDesk, ProfileDraft, ProfileId, ProfileStatus,
};

const ADMIN_EMAIL: &str = "desk@brand.tw";

struct Deployment {
    store: Arc<InMemoryStore>,
    missions: MissionService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>,
    enrollment: EnrollmentService<InMemoryStore, InMemoryStore>,
    campaigns: CampaignService<InMemoryStore, InMemoryStore, InMemoryStore>,
    payouts: PayoutDesk<InMemoryStore, InMemoryStore, InMemoryStore>,
}

fn deployment() -> Deployment {
    let store = Arc::new(InMemoryStore::default());
    Deployment {
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

fn identity(id: &str) -> Identity {
    Identity {
        user_id: ProfileId(id.to_string()),
        email: format!("{id}@kol.tw"),
    }
}

fn draft(title: &str, tiers: Vec<FollowerTier>, payout: u64) -> CampaignDraft {
    CampaignDraft {
        title: title.to_string(),
        brand_name: "Nova Beauty".to_string(),
        payout_amount: payout,
        follower_tiers: tiers,
        ..CampaignDraft::default()
    }
}

#[test]
fn a_kol_travels_from_signup_to_payout() {
    let d = deployment();

    // Registration: the first profile save lands in the review queue.
    let kol = identity("mei");
    let profile = d
        .enrollment
        .upsert_profile(
            &kol,
            ProfileDraft {
                full_name: Some("Chen Mei".to_string()),
                follower_count: Some("12000".to_string()),
                ..ProfileDraft::default()
            },
        )
        .expect("profile registered");
    assert_eq!(profile.status, ProfileStatus::Pending);

    d.enrollment
        .approve_kol(&kol.user_id)
        .expect("signup approved");

    // A campaign restricted to the smallest bucket: the 12k KOL exceeds
    // every allowed ceiling and is admitted by the floor rule.
    let campaign = d
        .campaigns
        .create(draft("Lip Tint Launch", vec![FollowerTier::Under10k], 8_000))
        .expect("campaign posted");

    let application = d
        .missions
        .apply(&kol.user_id, &campaign.id)
        .expect("application lands");
    assert_eq!(application.status, ApplicationStatus::Applied);

    d.missions.select(&application.id).expect("selected");
    d.missions
        .submit_result(
            &application.id,
            &kol.user_id,
            "https://instagram.com/p/launch",
        )
        .expect("proof submitted");
    d.missions
        .approve_payout(&application.id)
        .expect("payout approved");
    let paid = d.missions.mark_paid(&application.id).expect("paid out");
    assert_eq!(paid.status, ApplicationStatus::Paid);

    // The KOL heard about signup, selection, and the payout.
    let kinds: Vec<NotificationKind> = d
        .store
        .recent(&kol.user_id, 10)
        .expect("feed")
        .into_iter()
        .map(|notification| notification.kind)
        .collect();
    assert!(kinds.contains(&NotificationKind::KolApproved));
    assert!(kinds.contains(&NotificationKind::MissionSelected));
    assert!(kinds.contains(&NotificationKind::PayoutCompleted));

    // The spend shows up in the brand breakdown.
    let stats = d.payouts.by_brand().expect("stats");
    assert_eq!(stats.total_amount, 8_000);
    assert_eq!(stats.rows[0].label, "Nova Beauty");
}

#[test]
fn tier_upgrades_ride_along_with_the_marketplace() {
    let d = deployment();
    let kol = identity("mei");
    d.enrollment
        .upsert_profile(
            &kol,
            ProfileDraft {
                follower_count: Some("9000".to_string()),
                ..ProfileDraft::default()
            },
        )
        .expect("profile registered");
    d.enrollment
        .approve_kol(&kol.user_id)
        .expect("signup approved");

    // Follower growth unlocks a request; the admin grants it.
    let requested = d
        .enrollment
        .request_tier_upgrade(&kol.user_id, "3萬")
        .expect("request filed");
    assert_eq!(requested.follower_count, Some(30_000));

    let granted = d
        .enrollment
        .approve_tier_upgrade(&kol.user_id)
        .expect("upgrade granted");
    assert_eq!(granted.tier.map(|tier| tier.label()), Some("ELITE"));
    assert!(granted.tier_requested.is_none());
}

mod routing {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> (axum::Router, Arc<InMemoryStore>) {
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

    fn request(
        method: &str,
        uri: &str,
        user: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, email)) = user {
            builder = builder.header("x-user-id", id).header("x-user-email", email);
        }
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&value).expect("serialize body"),
                ))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        }
    }

    #[tokio::test]
    async fn the_router_walks_a_mission_end_to_end() {
        let (router, _store) = router();
        let kol = ("mei", "mei@kol.tw");
        let admin = ("boss", ADMIN_EMAIL);

        // KOL registers, admin approves.
        let response = router
            .clone()
            .oneshot(request(
                "PUT",
                "/api/v1/me/profile",
                Some(kol),
                Some(json!({ "full_name": "Chen Mei", "follower_count": "4萬" })),
            ))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/admin/profiles/mei/approve",
                Some(admin),
                None,
            ))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        // Admin posts an unrestricted campaign; the KOL applies off the board.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/admin/campaigns",
                Some(admin),
                Some(json!({
                    "title": "Cushion Review",
                    "brand_name": "Nova Beauty",
                    "payout_amount": 8000
                })),
            ))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let campaign: Value = serde_json::from_slice(&body).expect("json");
        let campaign_id = campaign["id"].as_str().expect("id").to_string();

        let response = router
            .clone()
            .oneshot(request("GET", "/api/v1/campaigns", Some(kol), None))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let board: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(board["total"], json!(1));
        assert_eq!(board["items"][0]["eligible"], json!(true));

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/v1/campaigns/{campaign_id}/applications"),
                Some(kol),
                None,
            ))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
