//! Stack API over HTTP

use async_trait::async_trait;
use stack_api::models::{StackEvent, StackEventsResponse, StackIdResponse, StackRequest};

use crate::deploy::api::StackApi;
use crate::errors::StackError;
use crate::http::client::HttpClient;

#[async_trait]
impl StackApi for HttpClient {
    async fn create_stack(&self, request: &StackRequest) -> Result<String, StackError> {
        let response: StackIdResponse = self.post(&["stacks"], request).await?;
        Ok(response.stack_id)
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<String, StackError> {
        let response: StackIdResponse = self
            .put(&["stacks", request.stack_name.as_str()], request)
            .await?;
        Ok(response.stack_id)
    }

    async fn describe_stack_events(&self, stack: &str) -> Result<Vec<StackEvent>, StackError> {
        let response: StackEventsResponse = self.get(&["stacks", stack, "events"]).await?;
        Ok(response.stack_events)
    }
}
