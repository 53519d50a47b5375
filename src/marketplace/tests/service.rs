use std::sync::Arc;

use super::common::*;
use crate::marketplace::campaigns::CampaignService;
use crate::marketplace::domain::ApplicationStatus;
use crate::marketplace::memory::InMemoryStore;
use crate::marketplace::notifications::NotificationKind;
use crate::marketplace::repository::{PageRequest, RepositoryError};
use crate::marketplace::service::{MissionError, MissionService};
use crate::marketplace::tiers::FollowerTier;

#[test]
fn apply_admits_a_kol_above_every_allowed_ceiling() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(12_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Lip Tint Launch", vec![FollowerTier::Under10k]))
        .expect("campaign created");

    // 12k classifies above under_10k's ceiling, so the floor rule admits it.
    let application = h
        .missions
        .apply(&kol, &campaign.id)
        .expect("ceiling override admits the larger KOL");
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert!(application.result_url.is_none());
}

#[test]
fn apply_denies_a_kol_below_the_allowed_floor() {
    let h = harness();
    let kol = seed_kol(&h.store, "yuna", Some(15_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Serum Teaser", vec![FollowerTier::From30k]))
        .expect("campaign created");

    match h.missions.apply(&kol, &campaign.id) {
        Err(MissionError::BelowFollowerFloor) => {}
        other => panic!("expected follower floor denial, got {other:?}"),
    }
}

#[test]
fn apply_is_unique_per_kol_and_campaign() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");

    h.missions.apply(&kol, &campaign.id).expect("first apply");
    match h.missions.apply(&kol, &campaign.id) {
        Err(MissionError::AlreadyApplied) => {}
        other => panic!("expected duplicate apply rejection, got {other:?}"),
    }
}

#[test]
fn apply_rejects_closed_campaigns() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Closed Run", Vec::new()))
        .expect("campaign created");
    h.campaigns.close(&campaign.id).expect("campaign closed");

    match h.missions.apply(&kol, &campaign.id) {
        Err(MissionError::CampaignClosed) => {}
        other => panic!("expected closed campaign rejection, got {other:?}"),
    }
}

#[test]
fn apply_without_follower_count_passes_only_unrestricted_campaigns() {
    let h = harness();
    let kol = seed_kol(&h.store, "fresh", None);
    let open = h
        .campaigns
        .create(campaign_draft("Open Call", Vec::new()))
        .expect("campaign created");
    let restricted = h
        .campaigns
        .create(campaign_draft("Restricted Call", vec![FollowerTier::From10k]))
        .expect("campaign created");

    h.missions
        .apply(&kol, &open.id)
        .expect("unrestricted campaign admits unknown follower counts");
    match h.missions.apply(&kol, &restricted.id) {
        Err(MissionError::BelowFollowerFloor) => {}
        other => panic!("expected denial without a follower count, got {other:?}"),
    }
}

#[test]
fn select_notifies_the_kol_exactly_once() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = h.missions.apply(&kol, &campaign.id).expect("applied");

    let selected = h.missions.select(&application.id).expect("selected");
    assert_eq!(selected.status, ApplicationStatus::Selected);
    assert_eq!(
        notification_kinds(&h.store, &kol),
        vec![NotificationKind::MissionSelected]
    );
    let note = &notifications_for(&h.store, &kol)[0];
    assert!(note
        .message
        .as_deref()
        .unwrap_or_default()
        .contains("Cushion Review"));

    // Retrying the action conflicts instead of rewriting the row, so no
    // duplicate notification goes out.
    match h.missions.select(&application.id) {
        Err(MissionError::Repository(RepositoryError::Stale { found, .. })) => {
            assert_eq!(found, ApplicationStatus::Selected);
        }
        other => panic!("expected stale conflict, got {other:?}"),
    }
    assert_eq!(
        fetch_application(&h.store, &application.id).status,
        ApplicationStatus::Selected
    );
    assert_eq!(notification_kinds(&h.store, &kol).len(), 1);
}

#[test]
fn submit_result_belongs_to_the_applicant() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let other = seed_kol(&h.store, "intruder", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = h.missions.apply(&kol, &campaign.id).expect("applied");
    h.missions.select(&application.id).expect("selected");

    match h
        .missions
        .submit_result(&application.id, &other, "https://instagram.com/p/x")
    {
        Err(MissionError::NotYourApplication) => {}
        other => panic!("expected ownership rejection, got {other:?}"),
    }
}

#[test]
fn submit_result_requires_selection_and_a_url() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = h.missions.apply(&kol, &campaign.id).expect("applied");

    match h.missions.submit_result(&application.id, &kol, "   ") {
        Err(MissionError::EmptyResultUrl) => {}
        other => panic!("expected empty url rejection, got {other:?}"),
    }

    // Not selected yet: the conditional update refuses to move applied.
    match h
        .missions
        .submit_result(&application.id, &kol, "https://instagram.com/p/x")
    {
        Err(MissionError::Repository(RepositoryError::Stale { found, .. })) => {
            assert_eq!(found, ApplicationStatus::Applied);
        }
        other => panic!("expected stale conflict, got {other:?}"),
    }
}

#[test]
fn submit_result_is_write_once() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = h.missions.apply(&kol, &campaign.id).expect("applied");
    h.missions.select(&application.id).expect("selected");

    let completed = h
        .missions
        .submit_result(&application.id, &kol, "https://instagram.com/p/abc")
        .expect("result submitted");
    assert_eq!(completed.status, ApplicationStatus::Completed);
    assert_eq!(
        completed.result_url.as_deref(),
        Some("https://instagram.com/p/abc")
    );

    match h
        .missions
        .submit_result(&application.id, &kol, "https://instagram.com/p/other")
    {
        Err(MissionError::ResultAlreadySubmitted) => {}
        other => panic!("expected write-once rejection, got {other:?}"),
    }
    assert_eq!(
        fetch_application(&h.store, &application.id)
            .result_url
            .as_deref(),
        Some("https://instagram.com/p/abc")
    );
}

#[test]
fn payout_approval_is_silent_and_payment_notifies_with_amount() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = h.missions.apply(&kol, &campaign.id).expect("applied");
    h.missions.select(&application.id).expect("selected");
    h.missions
        .submit_result(&application.id, &kol, "https://instagram.com/p/abc")
        .expect("result submitted");

    let confirmed = h
        .missions
        .approve_payout(&application.id)
        .expect("payout approved");
    assert_eq!(confirmed.status, ApplicationStatus::Confirmed);
    assert_eq!(
        notification_kinds(&h.store, &kol),
        vec![NotificationKind::MissionSelected],
        "payout approval must not notify"
    );

    let paid = h.missions.mark_paid(&application.id).expect("paid");
    assert_eq!(paid.status, ApplicationStatus::Paid);
    let kinds = notification_kinds(&h.store, &kol);
    assert!(kinds.contains(&NotificationKind::PayoutCompleted));
    let payout_note = notifications_for(&h.store, &kol)
        .into_iter()
        .find(|note| note.kind == NotificationKind::PayoutCompleted)
        .expect("payout notification present");
    let message = payout_note.message.unwrap_or_default();
    assert!(message.contains("8000"));
    assert!(message.contains("Nova Beauty"));
}

#[test]
fn seat_counts_are_recomputed_from_the_rows() {
    let h = harness();
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let first = seed_kol(&h.store, "a", Some(40_000));
    let second = seed_kol(&h.store, "b", Some(40_000));
    let third = seed_kol(&h.store, "c", Some(40_000));
    let chosen = h.missions.apply(&first, &campaign.id).expect("applied");
    h.missions.apply(&second, &campaign.id).expect("applied");
    h.missions.apply(&third, &campaign.id).expect("applied");

    h.missions.select(&chosen.id).expect("selected");
    let counts = h.missions.seat_counts(&campaign.id).expect("counts");
    assert_eq!(counts.applicants, 3);
    assert_eq!(counts.selected, 1);

    // Downstream states still occupy the seat.
    h.missions
        .submit_result(&chosen.id, &first, "https://instagram.com/p/abc")
        .expect("result submitted");
    let counts = h.missions.seat_counts(&campaign.id).expect("counts");
    assert_eq!(counts.selected, 1);
}

#[test]
fn notification_outage_never_blocks_a_transition() {
    let store = Arc::new(InMemoryStore::default());
    let campaigns = CampaignService::new(store.clone(), store.clone(), store.clone());
    let missions = MissionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FailingSink),
    );

    let kol = seed_kol(&store, "mei", Some(40_000));
    let campaign = campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let application = missions.apply(&kol, &campaign.id).expect("applied");

    let selected = missions
        .select(&application.id)
        .expect("select survives the notification outage");
    assert_eq!(selected.status, ApplicationStatus::Selected);
}

#[test]
fn my_missions_joins_campaign_summaries_newest_first() {
    let h = harness();
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    let older = h
        .campaigns
        .create(campaign_draft("First Drop", Vec::new()))
        .expect("campaign created");
    let newer = h
        .campaigns
        .create(campaign_draft("Second Drop", Vec::new()))
        .expect("campaign created");
    seed_application(
        &h.store,
        "app-old",
        &kol,
        &older.id,
        ApplicationStatus::Applied,
        at(2026, 7, 1),
    );
    seed_application(
        &h.store,
        "app-new",
        &kol,
        &newer.id,
        ApplicationStatus::Selected,
        at(2026, 7, 20),
    );

    let entries = h.missions.my_missions(&kol).expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].application.id.0, "app-new");
    assert_eq!(entries[0].campaign.title, "Second Drop");
    assert_eq!(entries[1].campaign.title, "First Drop");
}

#[test]
fn review_queue_is_oldest_first_with_joined_rows() {
    let h = harness();
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let early = seed_kol(&h.store, "early", Some(12_000));
    let late = seed_kol(&h.store, "late", Some(55_000));
    seed_application(
        &h.store,
        "app-late",
        &late,
        &campaign.id,
        ApplicationStatus::Applied,
        at(2026, 7, 20),
    );
    seed_application(
        &h.store,
        "app-early",
        &early,
        &campaign.id,
        ApplicationStatus::Applied,
        at(2026, 7, 1),
    );

    let queue = h
        .missions
        .review_queue(PageRequest::new(1, 10))
        .expect("queue");
    assert_eq!(queue.total, 2);
    assert_eq!(queue.items[0].application.id.0, "app-early");
    assert_eq!(queue.items[0].kol.email, "early@kol.tw");
    assert_eq!(queue.items[0].campaign.title, "Cushion Review");
}

#[test]
fn payout_queue_carries_the_bank_coordinates() {
    let h = harness();
    let campaign = h
        .campaigns
        .create(campaign_draft("Cushion Review", Vec::new()))
        .expect("campaign created");
    let kol = seed_kol(&h.store, "mei", Some(40_000));
    seed_application(
        &h.store,
        "app-confirmed",
        &kol,
        &campaign.id,
        ApplicationStatus::Confirmed,
        at(2026, 7, 5),
    );

    let queue = h
        .missions
        .payout_queue(PageRequest::new(1, 10))
        .expect("queue");
    assert_eq!(queue.total, 1);
    let row = &queue.items[0];
    assert_eq!(row.payout_amount, 8_000);
    assert_eq!(row.brand_name, "Nova Beauty");
    assert_eq!(row.bank_info.swift_code, "CTCBTWTP");
    assert_eq!(row.kol_name.as_deref(), Some("KOL mei"));
}
