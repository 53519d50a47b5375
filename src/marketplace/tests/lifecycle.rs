use crate::marketplace::domain::ApplicationStatus;
use crate::marketplace::lifecycle::{advance, transition_for, Actor, LifecycleAction, TRANSITIONS};

#[test]
fn the_happy_path_walks_every_transition_in_order() {
    let mut status = ApplicationStatus::Applied;
    for action in [
        LifecycleAction::Select,
        LifecycleAction::SubmitResult,
        LifecycleAction::ApprovePayout,
        LifecycleAction::MarkPaid,
    ] {
        status = advance(status, action).expect("forward move is legal");
    }
    assert_eq!(status, ApplicationStatus::Paid);
    assert!(status.is_terminal());
}

#[test]
fn skipping_states_is_structurally_impossible() {
    // No action confirms an application that was never selected.
    let err = advance(ApplicationStatus::Applied, LifecycleAction::ApprovePayout)
        .expect_err("applied cannot jump to confirmed");
    assert_eq!(err.expected, ApplicationStatus::Completed);
    assert_eq!(err.found, ApplicationStatus::Applied);

    assert!(advance(ApplicationStatus::Applied, LifecycleAction::MarkPaid).is_err());
    assert!(advance(ApplicationStatus::Applied, LifecycleAction::SubmitResult).is_err());
}

#[test]
fn no_action_moves_backwards_or_repeats() {
    assert!(advance(ApplicationStatus::Selected, LifecycleAction::Select).is_err());
    assert!(advance(ApplicationStatus::Paid, LifecycleAction::MarkPaid).is_err());
    assert!(advance(ApplicationStatus::Confirmed, LifecycleAction::SubmitResult).is_err());
}

#[test]
fn each_action_belongs_to_one_actor() {
    assert_eq!(transition_for(LifecycleAction::Select).actor, Actor::Admin);
    assert_eq!(
        transition_for(LifecycleAction::SubmitResult).actor,
        Actor::Kol
    );
    assert_eq!(
        transition_for(LifecycleAction::ApprovePayout).actor,
        Actor::Admin
    );
    assert_eq!(transition_for(LifecycleAction::MarkPaid).actor, Actor::Admin);
}

#[test]
fn the_table_chains_forward_without_gaps() {
    assert_eq!(TRANSITIONS[0].from, ApplicationStatus::Applied);
    for pair in TRANSITIONS.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    assert_eq!(TRANSITIONS[TRANSITIONS.len() - 1].to, ApplicationStatus::Paid);
}

#[test]
fn selected_or_later_counts_every_downstream_state() {
    assert!(!ApplicationStatus::Applied.is_selected_or_later());
    assert!(ApplicationStatus::Selected.is_selected_or_later());
    assert!(ApplicationStatus::Completed.is_selected_or_later());
    assert!(ApplicationStatus::Confirmed.is_selected_or_later());
    assert!(ApplicationStatus::Paid.is_selected_or_later());
}
