//! Application lifecycle state machine.
//!
//! `applied → selected → completed → confirmed → paid`, strictly forward.
//! Each advancing action belongs to exactly one actor; the transition table
//! below is the single source the services drive their conditional updates
//! from.

use super::domain::ApplicationStatus;

/// Who may trigger a lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Kol,
    Admin,
}

/// The four status-advancing actions. Applying creates the row and is
/// handled separately by the mission service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Select,
    SubmitResult,
    ApprovePayout,
    MarkPaid,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::Select => "select",
            LifecycleAction::SubmitResult => "submit result",
            LifecycleAction::ApprovePayout => "approve payout",
            LifecycleAction::MarkPaid => "mark paid",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One edge of the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: LifecycleAction,
    pub actor: Actor,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

pub const TRANSITIONS: [Transition; 4] = [
    Transition {
        action: LifecycleAction::Select,
        actor: Actor::Admin,
        from: ApplicationStatus::Applied,
        to: ApplicationStatus::Selected,
    },
    Transition {
        action: LifecycleAction::SubmitResult,
        actor: Actor::Kol,
        from: ApplicationStatus::Selected,
        to: ApplicationStatus::Completed,
    },
    Transition {
        action: LifecycleAction::ApprovePayout,
        actor: Actor::Admin,
        from: ApplicationStatus::Completed,
        to: ApplicationStatus::Confirmed,
    },
    Transition {
        action: LifecycleAction::MarkPaid,
        actor: Actor::Admin,
        from: ApplicationStatus::Confirmed,
        to: ApplicationStatus::Paid,
    },
];

/// Look up the single transition an action performs.
pub fn transition_for(action: LifecycleAction) -> Transition {
    match action {
        LifecycleAction::Select => TRANSITIONS[0],
        LifecycleAction::SubmitResult => TRANSITIONS[1],
        LifecycleAction::ApprovePayout => TRANSITIONS[2],
        LifecycleAction::MarkPaid => TRANSITIONS[3],
    }
}

/// Error raised when an action is attempted from the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} an application in status '{found}' (requires '{expected}')")]
pub struct WrongState {
    pub action: LifecycleAction,
    pub expected: ApplicationStatus,
    pub found: ApplicationStatus,
}

/// Advance `current` by `action`, or explain why the move is illegal.
pub fn advance(
    current: ApplicationStatus,
    action: LifecycleAction,
) -> Result<ApplicationStatus, WrongState> {
    let step = transition_for(action);
    if current == step.from {
        Ok(step.to)
    } else {
        Err(WrongState {
            action,
            expected: step.from,
            found: current,
        })
    }
}
