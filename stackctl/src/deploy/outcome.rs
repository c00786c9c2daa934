//! Deployment outcome

use serde::Serialize;

use crate::errors::StackError;

/// How a supervised deployment ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Succeeded,

    /// Rejected on submit, terminal failure status, or lost connectivity
    Failed(String),

    /// Nothing to change, with no-ops configured as failures
    NoOpDetected,

    /// No terminal status within the attempt budget; the stack may still
    /// be converging
    TimedOut,

    /// Stopped on a shutdown request; a submitted request is not rolled back
    Cancelled,
}

impl DeploymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Succeeded)
    }

    /// Short label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentOutcome::Succeeded => "succeeded",
            DeploymentOutcome::Failed(_) => "failed",
            DeploymentOutcome::NoOpDetected => "no-op",
            DeploymentOutcome::TimedOut => "timed out",
            DeploymentOutcome::Cancelled => "cancelled",
        }
    }

    /// `Ok` only for success; every other outcome as its error
    pub fn into_result(self) -> Result<(), StackError> {
        match self {
            DeploymentOutcome::Succeeded => Ok(()),
            DeploymentOutcome::Failed(reason) => Err(StackError::DeploymentFailed(reason)),
            DeploymentOutcome::NoOpDetected => Err(StackError::NoChanges),
            DeploymentOutcome::TimedOut => Err(StackError::TimedOut),
            DeploymentOutcome::Cancelled => Err(StackError::Cancelled),
        }
    }
}
