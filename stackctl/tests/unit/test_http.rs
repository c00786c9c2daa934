//! HTTP transport tests against a local stand-in service

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use stack_api::models::{StackEvent, StackEventsResponse, StackRequest};
use stackctl::deploy::api::StackApi;
use stackctl::deploy::client::{DeploymentClient, SubmitMode};
use stackctl::deploy::outcome::DeploymentOutcome;
use stackctl::deploy::policy::PollingPolicy;
use stackctl::errors::StackError;
use stackctl::http::client::HttpClient;
use stackctl::shutdown::Shutdown;

use crate::support::{never_shutdown, no_sleep, stack_event, STACK, STACK_ID};

/// Scripted service state shared with the handlers
#[derive(Default)]
struct Service {
    submitted: Mutex<Vec<StackRequest>>,
    submit_responses: Mutex<VecDeque<(StatusCode, Value)>>,
    queried: Mutex<Vec<String>>,
    event_responses: Mutex<VecDeque<(StatusCode, Value)>>,
    submit_delay: Duration,
}

impl Service {
    fn on_submit(self, status: StatusCode, body: Value) -> Self {
        self.submit_responses.lock().unwrap().push_back((status, body));
        self
    }

    fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    fn on_events(self, status: StatusCode, body: Value) -> Self {
        self.event_responses.lock().unwrap().push_back((status, body));
        self
    }

    fn next_submit(&self, request: StackRequest) -> (StatusCode, Json<Value>) {
        self.submitted.lock().unwrap().push(request);
        let (status, body) = self
            .submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::OK, json!({ "StackId": STACK_ID })));
        (status, Json(body))
    }
}

async fn create_stack(
    State(service): State<Arc<Service>>,
    Json(request): Json<StackRequest>,
) -> (StatusCode, Json<Value>) {
    tokio::time::sleep(service.submit_delay).await;
    service.next_submit(request)
}

async fn update_stack(
    State(service): State<Arc<Service>>,
    Path(_name): Path<String>,
    Json(request): Json<StackRequest>,
) -> (StatusCode, Json<Value>) {
    service.next_submit(request)
}

async fn stack_events(
    State(service): State<Arc<Service>>,
    Path(stack): Path<String>,
) -> (StatusCode, Json<Value>) {
    service.queried.lock().unwrap().push(stack);
    let (status, body) = service
        .event_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, json!({ "StackEvents": [] })));
    (status, Json(body))
}

/// Serve `service` on an ephemeral port and return a client pointed at it
async fn start(service: Service) -> (Arc<Service>, HttpClient) {
    let service = Arc::new(service);
    let app = Router::new()
        .route("/v1/stacks", post(create_stack))
        .route("/v1/stacks/{name}", put(update_stack))
        .route("/v1/stacks/{stack}/events", get(stack_events))
        .with_state(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpClient::new(&format!("http://{}/v1", addr), Duration::from_secs(5)).unwrap();
    (service, client)
}

fn events_page(events: Vec<StackEvent>) -> Value {
    serde_json::to_value(StackEventsResponse {
        stack_events: events,
    })
    .unwrap()
}

fn request() -> StackRequest {
    StackRequest {
        stack_name: STACK.to_string(),
        template_body: Some("{\"Resources\":{}}".to_string()),
        client_request_token: Some("token-1".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_returns_stack_id() {
    let (service, client) = start(Service::default()).await;

    let stack_id = client.create_stack(&request()).await.unwrap();

    assert_eq!(stack_id, STACK_ID);
    assert_eq!(*service.submitted.lock().unwrap(), vec![request()]);
}

#[tokio::test]
async fn test_rejection_carries_service_message() {
    let service = Service::default().on_submit(
        StatusCode::BAD_REQUEST,
        json!({ "Code": "AlreadyExistsException", "Message": "Stack [web] already exists" }),
    );
    let (_, client) = start(service).await;

    let err = client.create_stack(&request()).await.unwrap_err();

    match err {
        StackError::ValidationError(message) => assert_eq!(message, "Stack [web] already exists"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_throttling_is_transient() {
    let service = Service::default().on_events(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "Code": "Throttling", "Message": "Rate exceeded" }),
    );
    let (_, client) = start(service).await;

    let err = client.describe_stack_events(STACK_ID).await.unwrap_err();

    assert!(matches!(err, StackError::TransientQuery(_)));
    assert!(err.is_transient());
    assert!(err.to_string().contains("Rate exceeded"));
}

#[tokio::test]
async fn test_unreachable_service_is_transient() {
    // bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(&format!("http://{}/v1", addr), Duration::from_secs(5)).unwrap();
    let err = client.describe_stack_events(STACK_ID).await.unwrap_err();

    assert!(err.is_transient(), "{:?}", err);
}

#[tokio::test]
async fn test_stack_id_sent_as_single_segment() {
    let service = Service::default().on_events(
        StatusCode::OK,
        events_page(vec![stack_event(1, "CREATE_IN_PROGRESS", None)]),
    );
    let (service, client) = start(service).await;

    let events = client.describe_stack_events(STACK_ID).await.unwrap();

    assert_eq!(events, vec![stack_event(1, "CREATE_IN_PROGRESS", None)]);
    assert_eq!(*service.queried.lock().unwrap(), vec![STACK_ID.to_string()]);
}

#[tokio::test]
async fn test_update_without_changes_over_http() {
    let service = Service::default().on_submit(
        StatusCode::BAD_REQUEST,
        json!({ "Code": "ValidationError", "Message": "No updates are to be performed." }),
    );
    let (service, client) = start(service).await;

    let policy = PollingPolicy::new(10, 100, true).unwrap();
    let outcome = DeploymentClient::new(&client, policy, SubmitMode::Update)
        .deploy(&request(), no_sleep, never_shutdown())
        .await;

    assert_eq!(outcome, DeploymentOutcome::NoOpDetected);
    assert_eq!(service.submitted.lock().unwrap().len(), 1);
    // baseline query by name only
    assert_eq!(*service.queried.lock().unwrap(), vec![STACK.to_string()]);
}

#[tokio::test]
async fn test_deployment_over_http() {
    let service = Service::default()
        .on_events(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "Code": "ServiceUnavailable", "Message": "try again" }),
        )
        .on_events(
            StatusCode::OK,
            events_page(vec![stack_event(0, "CREATE_IN_PROGRESS", None)]),
        )
        .on_events(
            StatusCode::OK,
            events_page(vec![
                stack_event(0, "CREATE_IN_PROGRESS", None),
                stack_event(30, "CREATE_COMPLETE", None),
            ]),
        );
    let (service, client) = start(service).await;

    let policy = PollingPolicy::new(10, 100, false).unwrap();
    let outcome = DeploymentClient::new(&client, policy, SubmitMode::Create)
        .deploy(&request(), no_sleep, never_shutdown())
        .await;

    assert_eq!(outcome, DeploymentOutcome::Succeeded);
    assert_eq!(service.queried.lock().unwrap().len(), 3);
    assert_eq!(
        service.submitted.lock().unwrap()[0].client_request_token.as_deref(),
        Some("token-1")
    );
}

#[tokio::test]
async fn test_shutdown_during_slow_submit_waits_for_answer() {
    let service = Service::default().with_submit_delay(Duration::from_millis(300));
    let (service, client) = start(service).await;
    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.fire();
    });

    let policy = PollingPolicy::new(10, 100, false).unwrap();
    let outcome = DeploymentClient::new(&client, policy, SubmitMode::Create)
        .deploy(&request(), tokio::time::sleep, shutdown)
        .await;

    assert_eq!(outcome, DeploymentOutcome::Cancelled);
    assert_eq!(service.submitted.lock().unwrap().len(), 1);
    assert!(service.queried.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shutdown_between_real_polls() {
    let (service, client) = start(Service::default()).await;
    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        // lands inside the second one-second wait
        tokio::time::sleep(Duration::from_millis(1200)).await;
        trigger.fire();
    });

    let policy = PollingPolicy::new(1, 10, false).unwrap();
    let outcome = DeploymentClient::new(&client, policy, SubmitMode::Create)
        .deploy(&request(), tokio::time::sleep, shutdown)
        .await;

    assert_eq!(outcome, DeploymentOutcome::Cancelled);
    assert_eq!(service.submitted.lock().unwrap().len(), 1);
    assert_eq!(service.queried.lock().unwrap().len(), 1);
}
