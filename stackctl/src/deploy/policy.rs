//! Client-side polling budget

use std::time::Duration;

use crate::errors::StackError;
use crate::utils::CooldownOptions;

/// Default number of retries for a failed query within one attempt
pub const DEFAULT_QUERY_RETRIES: u32 = 3;

/// How long and how often to wait for a stack to settle
#[derive(Debug, Clone, PartialEq)]
pub struct PollingPolicy {
    /// Wait before each query
    pub interval: Duration,

    /// Number of queries before giving up
    pub max_attempts: u32,

    /// Report "nothing to change" as a failure
    pub fail_on_noop: bool,

    /// Retries of a transient query failure, on top of the attempt budget
    pub query_retries: u32,

    /// Backoff between those retries
    pub retry_backoff: CooldownOptions,
}

impl PollingPolicy {
    /// Build a policy from user-facing interval and timeout, both in seconds
    pub fn new(interval_secs: u64, timeout_secs: u64, fail_on_noop: bool) -> Result<Self, StackError> {
        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            max_attempts: max_attempts(timeout_secs, interval_secs)?,
            fail_on_noop,
            query_retries: DEFAULT_QUERY_RETRIES,
            retry_backoff: CooldownOptions::default(),
        })
    }

    pub fn with_query_retries(mut self, query_retries: u32) -> Self {
        self.query_retries = query_retries;
        self
    }

    pub fn with_retry_backoff(mut self, retry_backoff: CooldownOptions) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }
}

/// floor(timeout / interval); a zero interval is rejected
pub fn max_attempts(timeout_secs: u64, interval_secs: u64) -> Result<u32, StackError> {
    if interval_secs == 0 {
        return Err(StackError::ConfigError(
            "interval must be at least 1 second".to_string(),
        ));
    }
    Ok(u32::try_from(timeout_secs / interval_secs).unwrap_or(u32::MAX))
}
