//! Raw options to stack request

use std::collections::{BTreeMap, BTreeSet};

use stack_api::models::{Capability, OnFailure, StackRequest};
use tracing::debug;

use crate::errors::StackError;
use crate::options::content::{resolve, ContentReader, FsContentReader};
use crate::options::exclusive::{validate_exclusive, EXCLUSIVE_GROUPS};
use crate::options::params::to_parameters;

/// Options as supplied by the user, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    pub stack_name: Option<String>,

    /// Literal template or `@path`
    pub template_body: Option<String>,
    pub template_url: Option<String>,

    pub parameters: Option<BTreeMap<String, String>>,

    pub disable_rollback: Option<bool>,

    /// One of DO_NOTHING, ROLLBACK, DELETE
    pub on_failure: Option<String>,

    pub capabilities: Vec<String>,
    pub resource_types: Vec<String>,

    /// Literal policy or `@path`
    pub stack_policy_body: Option<String>,
    pub stack_policy_url: Option<String>,

    pub tags: BTreeMap<String, String>,
    pub notification_arns: Vec<String>,
    pub timeout_in_minutes: Option<u32>,
    pub client_request_token: Option<String>,
}

impl RawOptions {
    /// Names of the exclusive-pair options that were supplied
    pub fn present_options(&self) -> Vec<&'static str> {
        [
            ("template_body", self.template_body.is_some()),
            ("template_url", self.template_url.is_some()),
            ("disable_rollback", self.disable_rollback.is_some()),
            ("on_failure", self.on_failure.is_some()),
            ("stack_policy_body", self.stack_policy_body.is_some()),
            ("stack_policy_url", self.stack_policy_url.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Validates and normalizes raw options
#[derive(Debug, Clone, Default)]
pub struct OptionProcessor<R = FsContentReader> {
    reader: R,
}

impl OptionProcessor<FsContentReader> {
    /// Processor that resolves `@path` values from the local file system
    pub fn new() -> Self {
        Self {
            reader: FsContentReader,
        }
    }
}

impl<R: ContentReader> OptionProcessor<R> {
    /// Processor with a custom content source
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Build a stack request from raw options.
    ///
    /// Exclusivity and value checks all run before any `@path` is read.
    pub async fn process(&self, raw: &RawOptions) -> Result<StackRequest, StackError> {
        validate_exclusive(&raw.present_options(), EXCLUSIVE_GROUPS)?;

        let stack_name = raw
            .stack_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StackError::ConfigError("stack_name is required".to_string()))?
            .to_string();

        if raw.template_body.is_none() && raw.template_url.is_none() {
            return Err(StackError::ConfigError(
                "one of template_body or template_url is required".to_string(),
            ));
        }

        let on_failure = raw
            .on_failure
            .as_deref()
            .map(str::parse::<OnFailure>)
            .transpose()
            .map_err(StackError::ConfigError)?;

        let capabilities = raw
            .capabilities
            .iter()
            .map(|c| c.parse::<Capability>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(StackError::ConfigError)?;

        let template_body = resolve(&self.reader, raw.template_body.as_deref()).await?;
        let stack_policy_body = resolve(&self.reader, raw.stack_policy_body.as_deref()).await?;

        let parameters = match &raw.parameters {
            Some(params) => to_parameters(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            None => Vec::new(),
        };

        debug!(
            "Built request for stack {} with {} parameter(s)",
            stack_name,
            parameters.len()
        );

        Ok(StackRequest {
            stack_name,
            template_body,
            template_url: raw.template_url.clone(),
            parameters,
            disable_rollback: raw.disable_rollback,
            on_failure,
            capabilities,
            resource_types: raw.resource_types.iter().cloned().collect(),
            stack_policy_body,
            stack_policy_url: raw.stack_policy_url.clone(),
            tags: raw.tags.clone(),
            notification_arns: raw.notification_arns.iter().cloned().collect(),
            timeout_in_minutes: raw.timeout_in_minutes,
            client_request_token: raw.client_request_token.clone(),
        })
    }
}
