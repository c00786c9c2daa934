//! Remote orchestration API seam

use async_trait::async_trait;
use stack_api::models::{StackEvent, StackRequest};

use crate::errors::StackError;

/// Operations the deployment client needs from the orchestration service.
///
/// Implementations report a synchronous rejection as
/// `StackError::ValidationError` and retryable failures as errors for which
/// `StackError::is_transient` holds.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Submit a new stack, returning its id
    async fn create_stack(&self, request: &StackRequest) -> Result<String, StackError>;

    /// Submit changes to an existing stack, returning its id
    async fn update_stack(&self, request: &StackRequest) -> Result<String, StackError>;

    /// Events recorded for a stack (by id or name), in any order
    async fn describe_stack_events(&self, stack: &str) -> Result<Vec<StackEvent>, StackError>;
}
