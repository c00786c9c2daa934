//! Test doubles for the orchestration service and the file system

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use stack_api::models::{StackEvent, StackRequest, STACK_RESOURCE_TYPE};
use stackctl::deploy::api::StackApi;
use stackctl::errors::StackError;
use stackctl::options::content::ContentReader;
use stackctl::shutdown::{Shutdown, ShutdownTrigger};

pub const STACK: &str = "web";
pub const STACK_ID: &str = "arn:aws:cloudformation:eu-west-1:123:stack/web/1";

/// A call made against the mock, with the request token where there is one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Option<String>),
    Update(Option<String>),
    DescribeEvents(String),
}

/// Scripted orchestration service that records every call
#[derive(Default)]
pub struct MockApi {
    submit_responses: Mutex<VecDeque<Result<String, StackError>>>,
    event_pages: Mutex<VecDeque<Result<Vec<StackEvent>, StackError>>>,
    calls: Mutex<Vec<Call>>,
    shutdown_at_call: Mutex<Option<(usize, ShutdownTrigger)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next create/update; unqueued submissions succeed
    pub fn on_submit(self, response: Result<String, StackError>) -> Self {
        self.submit_responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a page for the next event query; unqueued queries return no events
    pub fn on_events(self, page: Result<Vec<StackEvent>, StackError>) -> Self {
        self.event_pages.lock().unwrap().push_back(page);
        self
    }

    /// Fire `trigger` while the `call`-th call (1-based) is in flight
    pub fn shutdown_at_call(self, call: usize, trigger: ShutdownTrigger) -> Self {
        *self.shutdown_at_call.lock().unwrap() = Some((call, trigger));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::DescribeEvents(_)))
            .count()
    }

    fn record(&self, call: Call) {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len()
        };
        if let Some((at, trigger)) = &*self.shutdown_at_call.lock().unwrap() {
            if *at == count {
                trigger.fire();
            }
        }
    }

    fn next_submit(&self) -> Result<String, StackError> {
        self.submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(STACK_ID.to_string()))
    }
}

#[async_trait]
impl StackApi for MockApi {
    async fn create_stack(&self, request: &StackRequest) -> Result<String, StackError> {
        self.record(Call::Create(request.client_request_token.clone()));
        self.next_submit()
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<String, StackError> {
        self.record(Call::Update(request.client_request_token.clone()));
        self.next_submit()
    }

    async fn describe_stack_events(&self, stack: &str) -> Result<Vec<StackEvent>, StackError> {
        self.record(Call::DescribeEvents(stack.to_string()));
        self.event_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Content reader that serves canned files and records what was read
#[derive(Default)]
pub struct SpyReader {
    files: HashMap<PathBuf, String>,
    reads: Mutex<Vec<PathBuf>>,
}

impl SpyReader {
    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_string());
        self
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentReader for SpyReader {
    async fn read(&self, path: &Path) -> Result<String, StackError> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files.get(path).cloned().ok_or_else(|| {
            StackError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            ))
        })
    }
}

pub fn stack_event(secs: i64, status: &str, reason: Option<&str>) -> StackEvent {
    event(STACK, STACK_RESOURCE_TYPE, secs, status, reason)
}

pub fn resource_event(
    logical_id: &str,
    resource_type: &str,
    secs: i64,
    status: &str,
    reason: Option<&str>,
) -> StackEvent {
    event(logical_id, resource_type, secs, status, reason)
}

fn event(
    logical_id: &str,
    resource_type: &str,
    secs: i64,
    status: &str,
    reason: Option<&str>,
) -> StackEvent {
    StackEvent {
        event_id: format!("{}-{}-{}", logical_id, status, secs),
        stack_id: STACK_ID.to_string(),
        stack_name: STACK.to_string(),
        logical_resource_id: logical_id.to_string(),
        resource_type: resource_type.to_string(),
        timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        resource_status: status.to_string(),
        resource_status_reason: reason.map(str::to_string),
    }
}

/// Sleep function that returns at once and records the requested delays
pub fn recording_sleep() -> (
    Arc<Mutex<Vec<Duration>>>,
    impl Fn(Duration) -> std::future::Ready<()>,
) {
    let sleeps = Arc::new(Mutex::new(Vec::new()));
    let recorded = sleeps.clone();
    let sleep_fn = move |delay: Duration| {
        recorded.lock().unwrap().push(delay);
        std::future::ready(())
    };
    (sleeps, sleep_fn)
}

pub fn no_sleep(_: Duration) -> std::future::Ready<()> {
    std::future::ready(())
}

pub fn never_shutdown() -> Shutdown {
    Shutdown::never()
}
