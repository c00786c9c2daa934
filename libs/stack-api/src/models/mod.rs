//! API models

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource type the service reports for the stack itself
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// Stack parameter in the shape the service expects
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub parameter_key: String,
    pub parameter_value: String,
}

/// Action taken when stack creation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnFailure {
    DoNothing,
    Rollback,
    Delete,
}

impl OnFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnFailure::DoNothing => "DO_NOTHING",
            OnFailure::Rollback => "ROLLBACK",
            OnFailure::Delete => "DELETE",
        }
    }
}

impl FromStr for OnFailure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DO_NOTHING" => Ok(OnFailure::DoNothing),
            "ROLLBACK" => Ok(OnFailure::Rollback),
            "DELETE" => Ok(OnFailure::Delete),
            _ => Err(format!(
                "Invalid on_failure value: {} (expected DO_NOTHING, ROLLBACK or DELETE)",
                s
            )),
        }
    }
}

impl fmt::Display for OnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the caller acknowledges the template requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    CapabilityIam,
    CapabilityNamedIam,
    CapabilityAutoExpand,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CapabilityIam => "CAPABILITY_IAM",
            Capability::CapabilityNamedIam => "CAPABILITY_NAMED_IAM",
            Capability::CapabilityAutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CAPABILITY_IAM" => Ok(Capability::CapabilityIam),
            "CAPABILITY_NAMED_IAM" => Ok(Capability::CapabilityNamedIam),
            "CAPABILITY_AUTO_EXPAND" => Ok(Capability::CapabilityAutoExpand),
            _ => Err(format!("Invalid capability: {}", s)),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create/update stack request
///
/// Built once from user options and never modified afterwards. Exclusive
/// pairs (template body/url, disable_rollback/on_failure, policy body/url)
/// hold at most one value each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackRequest {
    pub stack_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_body: Option<String>,

    #[serde(default, rename = "TemplateURL", skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_rollback: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<OnFailure>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub capabilities: BTreeSet<Capability>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub resource_types: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_policy_body: Option<String>,

    #[serde(default, rename = "StackPolicyURL", skip_serializing_if = "Option::is_none")]
    pub stack_policy_url: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, rename = "NotificationARNs", skip_serializing_if = "BTreeSet::is_empty")]
    pub notification_arns: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<u32>,

    /// Idempotency token; resubmitting with the same token is a no-op remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
}

/// Response to a create/update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackIdResponse {
    pub stack_id: String,
}

/// One entry of a stack's event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEvent {
    pub event_id: String,
    pub stack_id: String,
    pub stack_name: String,
    pub logical_resource_id: String,
    pub resource_type: String,
    pub timestamp: DateTime<Utc>,
    pub resource_status: String,
    #[serde(default)]
    pub resource_status_reason: Option<String>,
}

impl StackEvent {
    /// Whether this event describes the stack itself rather than a resource in it
    pub fn is_stack_event(&self) -> bool {
        self.resource_type == STACK_RESOURCE_TYPE && self.logical_resource_id == self.stack_name
    }

    pub fn reason(&self) -> Option<&str> {
        self.resource_status_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Event stream page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEventsResponse {
    #[serde(default)]
    pub stack_events: Vec<StackEvent>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    /// Machine-readable error class, e.g. `ValidationError`
    #[serde(default)]
    pub code: String,
    pub message: String,
}
