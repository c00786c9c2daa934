//! Application configuration options

use std::collections::BTreeMap;
use std::time::Duration;

use crate::app::cli::ApplyArgs;
use crate::deploy::client::SubmitMode;
use crate::deploy::policy::PollingPolicy;
use crate::errors::StackError;
use crate::logs::LogOptions;
use crate::options::processor::RawOptions;
use crate::storage::settings::Settings;
use crate::utils::generate_uuid;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Orchestration service base URL
    pub endpoint: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Logging configuration
    pub log: LogOptions,

    /// What to deploy and how long to wait for it
    pub deploy: DeployOptions,
}

/// Options for one deployment
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Stack definition as given by the user
    pub stack: RawOptions,

    /// Polling budget
    pub polling: PollingPolicy,

    /// Create or update
    pub mode: SubmitMode,
}

impl DeployOptions {
    pub fn stack_name(&self) -> &str {
        self.stack.stack_name.as_deref().unwrap_or("<unnamed>")
    }
}

impl AppOptions {
    /// Merge command line arguments over settings.
    ///
    /// Command line values win; settings fill the rest.
    pub fn resolve(args: ApplyArgs, settings: Settings) -> Result<Self, StackError> {
        let interval = args.interval.unwrap_or(settings.polling.interval_secs);
        let timeout = args.timeout.unwrap_or(settings.polling.timeout_secs);
        let polling = PollingPolicy::new(interval, timeout, args.fail_on_noop)?
            .with_query_retries(settings.polling.query_retries);

        let parameters = (!args.parameters.is_empty())
            .then(|| args.parameters.into_iter().collect::<BTreeMap<_, _>>());

        let stack = RawOptions {
            stack_name: Some(args.stack_name),
            template_body: args.template_body,
            template_url: args.template_url,
            parameters,
            disable_rollback: args.disable_rollback.then_some(true),
            on_failure: args.on_failure,
            capabilities: args.capabilities,
            resource_types: args.resource_types,
            stack_policy_body: args.stack_policy_body,
            stack_policy_url: args.stack_policy_url,
            tags: args.tags.into_iter().collect(),
            notification_arns: args.notification_arns,
            timeout_in_minutes: args.timeout_in_minutes,
            client_request_token: Some(args.client_request_token.unwrap_or_else(generate_uuid)),
        };

        Ok(Self {
            endpoint: args.endpoint.unwrap_or(settings.endpoint.base_url),
            request_timeout: Duration::from_secs(settings.endpoint.request_timeout_secs),
            log: LogOptions {
                log_level: args.log_level.unwrap_or(settings.log_level),
                json_format: args.json_logs || settings.json_logs,
            },
            deploy: DeployOptions {
                stack,
                polling,
                mode: if args.update {
                    SubmitMode::Update
                } else {
                    SubmitMode::Create
                },
            },
        })
    }
}
