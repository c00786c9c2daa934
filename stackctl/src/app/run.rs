//! Deployment entry point

use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use tracing::info;

use crate::app::options::DeployOptions;
use crate::deploy::api::StackApi;
use crate::deploy::client::DeploymentClient;
use crate::deploy::outcome::DeploymentOutcome;
use crate::errors::StackError;
use crate::options::content::ContentReader;
use crate::options::processor::OptionProcessor;
use crate::shutdown::Shutdown;

/// Build the request and supervise its deployment.
///
/// Option errors are returned before anything is sent. Once the request is
/// submitted every result is a `DeploymentOutcome`. A shutdown requested
/// while options are processed cancels the deployment before submission.
pub async fn run<A, R, S, F>(
    processor: &OptionProcessor<R>,
    options: &DeployOptions,
    api: &A,
    sleep_fn: S,
    shutdown: Shutdown,
) -> Result<DeploymentOutcome, StackError>
where
    A: StackApi,
    R: ContentReader,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let request = processor.process(&options.stack).await?;

    let client = DeploymentClient::new(api, options.polling.clone(), options.mode);
    info!(
        "Deploying stack {} (interval {:?}, up to {} attempt(s))",
        request.stack_name,
        client.policy().interval,
        client.policy().max_attempts
    );
    let outcome = client.deploy(&request, sleep_fn, shutdown).await;

    info!("Stack {} finished: {}", request.stack_name, outcome.label());
    Ok(outcome)
}

/// One-line, user-facing result of an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub success: bool,
    pub summary: String,
}

impl Report {
    pub fn new(stack_name: &str, result: Result<DeploymentOutcome, StackError>) -> Self {
        match result {
            Ok(outcome) => {
                let success = outcome.is_success();
                let label = outcome.label();
                let summary = match outcome.into_result() {
                    Ok(()) => format!("stack {}: {}", stack_name, label),
                    Err(e) => format!("stack {}: {} ({})", stack_name, label, e),
                };
                Self { success, summary }
            }
            Err(e) => Self {
                success: false,
                summary: format!("stack {}: not submitted ({})", stack_name, e),
            },
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
