//! Stack status classification

use chrono::{DateTime, Utc};
use stack_api::models::StackEvent;

/// Messages the service uses to report that a request changes nothing
const NO_CHANGES_MESSAGES: &[&str] = &[
    "no updates are to be performed",
    "didn't contain changes",
];

/// What a stack status means for the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Still converging
    InProgress,

    /// Terminal success
    Complete,

    /// Terminal failure
    Failed,
}

impl StatusClass {
    pub fn from_status(status: &str) -> Self {
        match status {
            "CREATE_COMPLETE" | "UPDATE_COMPLETE" => StatusClass::Complete,
            "CREATE_FAILED"
            | "ROLLBACK_COMPLETE"
            | "ROLLBACK_FAILED"
            | "DELETE_COMPLETE"
            | "DELETE_FAILED"
            | "UPDATE_FAILED"
            | "UPDATE_ROLLBACK_COMPLETE"
            | "UPDATE_ROLLBACK_FAILED" => StatusClass::Failed,
            _ => StatusClass::InProgress,
        }
    }
}

/// Whether a service message reports that nothing would change
pub fn is_no_changes_message(message: &str) -> bool {
    let message = message.to_lowercase();
    NO_CHANGES_MESSAGES.iter().any(|m| message.contains(m))
}

/// Result of inspecting one page of stack events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// No stack-level event yet, or the latest one is not terminal
    InProgress(Option<String>),

    Complete,

    Failed(String),

    NoChanges,
}

/// Decide the stack's state from its events.
///
/// Only events about the stack itself count, and only those newer than
/// `since` when given. The latest of them decides.
pub fn assess(events: &[StackEvent], since: Option<DateTime<Utc>>) -> Assessment {
    let Some(latest) = latest_stack_event(events, since) else {
        return Assessment::InProgress(None);
    };

    if latest.reason().is_some_and(is_no_changes_message) {
        return Assessment::NoChanges;
    }

    match StatusClass::from_status(&latest.resource_status) {
        StatusClass::Complete => Assessment::Complete,
        StatusClass::Failed => Assessment::Failed(failure_reason(latest, events, since)),
        StatusClass::InProgress => Assessment::InProgress(Some(latest.resource_status.clone())),
    }
}

/// Most recent stack-level event, ignoring anything at or before `since`.
///
/// Pages are listed newest first, so among equal timestamps the one listed
/// first wins.
pub fn latest_stack_event(events: &[StackEvent], since: Option<DateTime<Utc>>) -> Option<&StackEvent> {
    // max_by_key keeps the last maximum; walk backwards so that is the first listed
    events
        .iter()
        .rev()
        .filter(|e| e.is_stack_event())
        .filter(|e| is_after(e, since))
        .max_by_key(|e| e.timestamp)
}

/// The trigger's own reason, else the reason of the first failed resource,
/// else the bare status.
fn failure_reason(trigger: &StackEvent, events: &[StackEvent], since: Option<DateTime<Utc>>) -> String {
    if let Some(reason) = trigger.reason() {
        return format!("{}: {}", trigger.resource_status, reason);
    }

    let stack_reason = events
        .iter()
        .rev()
        .filter(|e| e.is_stack_event() && is_after(e, since))
        .filter(|e| e.reason().is_some())
        .max_by_key(|e| e.timestamp);

    let root_cause = events
        .iter()
        .rev()
        .filter(|e| !e.is_stack_event() && is_after(e, since))
        .filter(|e| e.resource_status.ends_with("_FAILED") && e.reason().is_some())
        .min_by_key(|e| e.timestamp);

    match (root_cause.or(stack_reason)).and_then(|e| e.reason().map(|r| (e, r))) {
        Some((event, reason)) if event.is_stack_event() => {
            format!("{}: {}", trigger.resource_status, reason)
        }
        Some((event, reason)) => format!(
            "{}: {} {}: {}",
            trigger.resource_status, event.logical_resource_id, event.resource_status, reason
        ),
        None => trigger.resource_status.clone(),
    }
}

fn is_after(event: &StackEvent, since: Option<DateTime<Utc>>) -> bool {
    since.is_none_or(|since| event.timestamp > since)
}
