//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logs::LogLevel;

/// stackctl - deploy infrastructure stacks and wait for them to settle
#[derive(Parser, Debug)]
#[command(name = "stackctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a stack and supervise it until it succeeds, fails or times out
    Apply(Box<ApplyArgs>),

    /// Print build information as JSON
    Version,
}

/// Options of the `apply` command
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Name of the stack to create or update
    #[arg(long)]
    pub stack_name: String,

    /// Template content, or @path to read it from a file
    #[arg(long)]
    pub template_body: Option<String>,

    /// URL of the template
    #[arg(long)]
    pub template_url: Option<String>,

    /// Stack parameter (KEY=VALUE), repeatable
    #[arg(short, long = "parameter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub parameters: Vec<(String, String)>,

    /// Keep resources of a failed creation
    #[arg(long)]
    pub disable_rollback: bool,

    /// DO_NOTHING, ROLLBACK or DELETE
    #[arg(long)]
    pub on_failure: Option<String>,

    /// Acknowledged capabilities, e.g. CAPABILITY_IAM
    #[arg(long, value_delimiter = ',')]
    pub capabilities: Vec<String>,

    /// Resource types the stack may manage
    #[arg(long, value_delimiter = ',')]
    pub resource_types: Vec<String>,

    /// Stack policy content, or @path to read it from a file
    #[arg(long)]
    pub stack_policy_body: Option<String>,

    /// URL of the stack policy
    #[arg(long)]
    pub stack_policy_url: Option<String>,

    /// Stack tag (KEY=VALUE), repeatable
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,

    /// Topics notified of stack events
    #[arg(long, value_delimiter = ',')]
    pub notification_arns: Vec<String>,

    /// Remote-side creation timeout
    #[arg(long)]
    pub timeout_in_minutes: Option<u32>,

    /// Idempotency token; generated when omitted
    #[arg(long)]
    pub client_request_token: Option<String>,

    /// Update an existing stack instead of creating one
    #[arg(long)]
    pub update: bool,

    /// Seconds between status queries
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds to wait for a terminal status
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Treat "no changes" as a failure
    #[arg(long)]
    pub fail_on_noop: bool,

    /// trace, debug, info, warn or error
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Orchestration service base URL
    #[arg(long, env = "STACKCTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Settings file (JSON)
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// Parse `KEY=VALUE`; the value may itself contain '='
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
