//! services/client/src/adapters/test_results.rs
//!
//! The HTTP adapter for the test/info service. It implements the
//! `TestService` port from the `core` crate.

use async_trait::async_trait;
use quiz_core::domain::{NewTestResult, ResultId, TestResult};
use quiz_core::ports::{PortError, PortResult, TestService};
use serde_json::Value;
use std::sync::Arc;

use crate::adapters::http::{HttpDispatcher, RequestOptions, Service};
use crate::adapters::wire::{
    decode, decode_list, SaveResultBody, SaveResultResponse, TestResultRecord,
};

/// An adapter that implements the `TestService` port over HTTP.
#[derive(Clone)]
pub struct HttpTestAdapter {
    http: Arc<HttpDispatcher>,
}

impl HttpTestAdapter {
    pub fn new(http: Arc<HttpDispatcher>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TestService for HttpTestAdapter {
    async fn save_result(&self, result: &NewTestResult) -> PortResult<ResultId> {
        let body = SaveResultBody {
            user_type: &result.user_type,
            type_description: &result.description,
            completed_at: result.completed_at,
        };
        let body =
            serde_json::to_value(&body).map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .http
            .dispatch(
                Service::Test,
                "/test/save",
                RequestOptions::post()
                    .query("id", result.user_id.as_str())
                    .json(body),
            )
            .await?;

        let data = response
            .data
            .ok_or_else(|| PortError::Decode("save response carried no testId".to_string()))?;
        let saved = decode::<SaveResultResponse>(data)?;
        Ok(ResultId::new(saved.test_id))
    }

    async fn history(&self, user_id: &str) -> PortResult<Vec<TestResult>> {
        let response = self
            .http
            .dispatch(
                Service::Test,
                "/test/history",
                RequestOptions::get().query("id", user_id),
            )
            .await?;

        let records = decode_list::<TestResultRecord>(response.data.unwrap_or(Value::Null))?;
        Ok(records.into_iter().map(TestResultRecord::to_domain).collect())
    }
}
