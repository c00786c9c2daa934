//! Deployment client: submit a stack request and supervise it to a terminal state

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use stack_api::models::{StackEvent, StackRequest};
use tracing::{debug, error, info, warn};

use crate::deploy::api::StackApi;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm};
use crate::deploy::outcome::DeploymentOutcome;
use crate::deploy::policy::PollingPolicy;
use crate::deploy::status::{assess, is_no_changes_message, latest_stack_event, Assessment};
use crate::errors::StackError;
use crate::shutdown::Shutdown;
use crate::utils::calc_exp_backoff;

/// Which submission call to make
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitMode {
    #[default]
    Create,
    Update,
}

/// Drives one deployment
pub struct DeploymentClient<'a, A: StackApi> {
    api: &'a A,
    policy: PollingPolicy,
    mode: SubmitMode,
}

impl<'a, A: StackApi> DeploymentClient<'a, A> {
    pub fn new(api: &'a A, policy: PollingPolicy, mode: SubmitMode) -> Self {
        Self { api, policy, mode }
    }

    pub fn policy(&self) -> &PollingPolicy {
        &self.policy
    }

    /// Submit `request` and poll until the stack settles.
    ///
    /// Problems after submission end up in the returned outcome. A shutdown
    /// request ends every wait and every event query with `Cancelled`. The
    /// create/update call itself always runs to completion, so its result
    /// is known before the deployment is reported as cancelled.
    pub async fn deploy<S, F>(
        &self,
        request: &StackRequest,
        sleep_fn: S,
        shutdown: Shutdown,
    ) -> DeploymentOutcome
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let stack_name = request.stack_name.as_str();
        let mut fsm = DeploymentFsm::new();

        if shutdown.is_requested() {
            warn!("Shutdown requested, stack {} not submitted", stack_name);
            return conclude(&mut fsm, DeploymentEvent::Cancel);
        }

        let baseline = match self.mode {
            SubmitMode::Create => None,
            SubmitMode::Update => match self.baseline(stack_name, &sleep_fn, &shutdown).await {
                Ok(baseline) => baseline,
                Err(e) => return conclude(&mut fsm, query_failure_event(&e)),
            },
        };

        info!("Submitting {:?} request for stack {}", self.mode, stack_name);
        let stack_id = match self.submit(request, &sleep_fn, &shutdown).await {
            Ok(stack_id) => stack_id,
            Err(e) => return conclude(&mut fsm, self.rejection_event(stack_name, e)),
        };
        info!("Stack {} accepted as {}", stack_name, stack_id);
        if let Err(e) = fsm.process(DeploymentEvent::Submitted(stack_id.clone())) {
            return internal_failure(e);
        }

        for attempt in 1..=self.policy.max_attempts {
            tokio::select! {
                biased;
                _ = shutdown.requested() => {
                    warn!("Stopped polling stack {}; the request was already submitted", stack_name);
                    return conclude(&mut fsm, DeploymentEvent::Cancel);
                }
                _ = sleep_fn(self.policy.interval) => {}
            }

            if let Err(e) = fsm.process(DeploymentEvent::Poll) {
                return internal_failure(e);
            }
            debug!(
                "Polling stack {} (attempt {}/{})",
                stack_name, attempt, self.policy.max_attempts
            );

            let events = match self.query_events(&stack_id, &sleep_fn, &shutdown).await {
                Ok(events) => events,
                Err(e) => return conclude(&mut fsm, query_failure_event(&e)),
            };

            match assess(&events, baseline) {
                Assessment::InProgress(status) => {
                    debug!(
                        "Stack {} still in progress ({})",
                        stack_name,
                        status.as_deref().unwrap_or("no stack events yet")
                    );
                }
                Assessment::Complete => {
                    info!("Stack {} reached a terminal success status", stack_name);
                    return conclude(&mut fsm, DeploymentEvent::Succeed);
                }
                Assessment::Failed(reason) => {
                    error!("Stack {} failed: {}", stack_name, reason);
                    return conclude(&mut fsm, DeploymentEvent::Fail(reason));
                }
                Assessment::NoChanges => return conclude(&mut fsm, self.noop_event(stack_name)),
            }
        }

        if shutdown.is_requested() {
            return conclude(&mut fsm, DeploymentEvent::Cancel);
        }

        warn!(
            "Stack {} did not settle within {} attempt(s)",
            stack_name, self.policy.max_attempts
        );
        conclude(&mut fsm, DeploymentEvent::Exhaust)
    }

    async fn submit<S, F>(
        &self,
        request: &StackRequest,
        sleep_fn: &S,
        shutdown: &Shutdown,
    ) -> Result<String, StackError>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let api = self.api;
        match self.mode {
            SubmitMode::Create => {
                self.with_retries("create stack", move || api.create_stack(request), sleep_fn, shutdown)
                    .await
            }
            SubmitMode::Update => {
                self.with_retries("update stack", move || api.update_stack(request), sleep_fn, shutdown)
                    .await
            }
        }
    }

    /// Event query that is abandoned as soon as shutdown is requested
    async fn query_events<S, F>(
        &self,
        stack: &str,
        sleep_fn: &S,
        shutdown: &Shutdown,
    ) -> Result<Vec<StackEvent>, StackError>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let api = self.api;
        let query = move || async move {
            tokio::select! {
                biased;
                _ = shutdown.requested() => Err(StackError::Cancelled),
                events = api.describe_stack_events(stack) => events,
            }
        };
        self.with_retries("describe stack events", query, sleep_fn, shutdown)
            .await
    }

    /// Timestamp of the newest stack-level event before an update is
    /// submitted; later polls ignore everything up to it.
    async fn baseline<S, F>(
        &self,
        stack_name: &str,
        sleep_fn: &S,
        shutdown: &Shutdown,
    ) -> Result<Option<DateTime<Utc>>, StackError>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        match self.query_events(stack_name, sleep_fn, shutdown).await {
            Ok(events) => Ok(latest_stack_event(&events, None).map(|e| e.timestamp)),
            // The update call will report a missing stack itself
            Err(StackError::ValidationError(message)) => {
                debug!("No event baseline for stack {}: {}", stack_name, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Run `op`, retrying transient failures with backoff.
    ///
    /// A shutdown request during a backoff wait ends with
    /// `StackError::Cancelled`.
    async fn with_retries<T, Op, Fut, S, F>(
        &self,
        what: &str,
        op: Op,
        sleep_fn: &S,
        shutdown: &Shutdown,
    ) -> Result<T, StackError>
    where
        Op: Fn() -> Fut,
        Fut: Future<Output = Result<T, StackError>>,
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retry < self.policy.query_retries => {
                    let delay = calc_exp_backoff(&self.policy.retry_backoff, retry);
                    retry += 1;
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        what, e, retry, self.policy.query_retries, delay
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.requested() => return Err(StackError::Cancelled),
                        _ = sleep_fn(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn rejection_event(&self, stack_name: &str, err: StackError) -> DeploymentEvent {
        match err {
            StackError::ValidationError(message)
                if self.mode == SubmitMode::Update && is_no_changes_message(&message) =>
            {
                self.noop_event(stack_name)
            }
            StackError::ValidationError(message) => {
                error!("Stack {} rejected: {}", stack_name, message);
                DeploymentEvent::Fail(message)
            }
            StackError::Cancelled => {
                warn!(
                    "Shutdown requested while retrying the submission of stack {}; it may have been accepted",
                    stack_name
                );
                DeploymentEvent::Cancel
            }
            e => DeploymentEvent::Fail(connectivity_reason(&e)),
        }
    }

    fn noop_event(&self, stack_name: &str) -> DeploymentEvent {
        if self.policy.fail_on_noop {
            warn!("No changes to stack {}; treating as failure", stack_name);
            DeploymentEvent::NoOp
        } else {
            info!("No changes to stack {}", stack_name);
            DeploymentEvent::Succeed
        }
    }
}

fn query_failure_event(err: &StackError) -> DeploymentEvent {
    match err {
        StackError::Cancelled => DeploymentEvent::Cancel,
        e => DeploymentEvent::Fail(connectivity_reason(e)),
    }
}

fn connectivity_reason(err: &StackError) -> String {
    if err.is_transient() {
        format!("lost contact with the orchestration service: {}", err)
    } else {
        err.to_string()
    }
}

fn conclude(fsm: &mut DeploymentFsm, event: DeploymentEvent) -> DeploymentOutcome {
    if let Err(e) = fsm.process(event) {
        return internal_failure(e);
    }
    fsm.outcome()
        .unwrap_or_else(|| internal_failure(format!("stopped in state {:?}", fsm.state())))
}

fn internal_failure(message: String) -> DeploymentOutcome {
    error!("Deployment state error: {}", message);
    DeploymentOutcome::Failed(StackError::Internal(message).to_string())
}
