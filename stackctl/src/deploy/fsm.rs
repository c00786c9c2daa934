//! Finite State Machine for a single stack deployment

use serde::{Deserialize, Serialize};

use crate::deploy::outcome::DeploymentOutcome;

/// Deployment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// Request not yet accepted by the service
    Pending,

    /// Request accepted, no query made yet
    Submitted,

    /// Querying the event stream
    Polling,

    Succeeded,

    Failed,

    /// Nothing to change and no-ops count as failures
    NoOpDetected,

    /// Attempt budget exhausted
    TimedOut,

    /// Interrupted by the user
    Cancelled,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            DeploymentState::Pending | DeploymentState::Submitted | DeploymentState::Polling
        )
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Service accepted the request
    Submitted(String),

    /// One query of the event stream
    Poll,

    /// Stack reached a terminal success status
    Succeed,

    /// Rejection, terminal failure status or lost connectivity
    Fail(String),

    /// Nothing to change, reported as a failure
    NoOp,

    /// Attempt budget exhausted
    Exhaust,

    /// Shutdown requested
    Cancel,
}

/// Deployment FSM
///
/// Terminal states accept no further events, so a decision once reached is
/// never revised.
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    stack_id: Option<String>,
    error: Option<String>,
    attempts: u32,
}

impl DeploymentFsm {
    /// Create a new FSM in pending state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Pending,
            stack_id: None,
            error: None,
            attempts: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Id assigned by the service once submitted
    pub fn stack_id(&self) -> Option<&str> {
        self.stack_id.as_deref()
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of event stream queries made
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<(), String> {
        use DeploymentState::*;

        let new_state = match (&self.state, &event) {
            // From Pending
            (Pending, DeploymentEvent::Submitted(stack_id)) => {
                self.stack_id = Some(stack_id.clone());
                Submitted
            }
            // Submit-time no-op resolves without polling
            (Pending, DeploymentEvent::Succeed) => Succeeded,
            (Pending, DeploymentEvent::NoOp) => NoOpDetected,
            (Pending, DeploymentEvent::Fail(err)) => {
                self.error = Some(err.clone());
                Failed
            }
            // Shutdown before the service accepted anything
            (Pending, DeploymentEvent::Cancel) => Cancelled,

            // From Submitted / Polling
            (Submitted | Polling, DeploymentEvent::Poll) => {
                self.attempts += 1;
                Polling
            }
            (Submitted | Polling, DeploymentEvent::Succeed) => Succeeded,
            (Submitted | Polling, DeploymentEvent::NoOp) => NoOpDetected,
            (Submitted | Polling, DeploymentEvent::Fail(err)) => {
                self.error = Some(err.clone());
                Failed
            }
            (Submitted | Polling, DeploymentEvent::Exhaust) => TimedOut,
            (Submitted | Polling, DeploymentEvent::Cancel) => Cancelled,

            // Invalid transitions, including anything out of a terminal state
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }

    /// The outcome, once a terminal state is reached
    pub fn outcome(&self) -> Option<DeploymentOutcome> {
        match self.state {
            DeploymentState::Succeeded => Some(DeploymentOutcome::Succeeded),
            DeploymentState::Failed => Some(DeploymentOutcome::Failed(
                self.error.clone().unwrap_or_else(|| "unknown failure".to_string()),
            )),
            DeploymentState::NoOpDetected => Some(DeploymentOutcome::NoOpDetected),
            DeploymentState::TimedOut => Some(DeploymentOutcome::TimedOut),
            DeploymentState::Cancelled => Some(DeploymentOutcome::Cancelled),
            DeploymentState::Pending | DeploymentState::Submitted | DeploymentState::Polling => None,
        }
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
