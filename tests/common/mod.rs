//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use venue_connect::{CcxtError, CcxtResult, RawResponse, SignedRequest, Transport};

/// Answers by URL substring and records every request it sees
#[derive(Default)]
pub struct MockTransport {
    responses: Vec<(String, RawResponse)>,
    requests: Mutex<Vec<SignedRequest>>,
    delay: Option<Duration>,
}

/// `RUST_LOG=venue_connect=debug cargo test` shows the request pipeline
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl MockTransport {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// 200 with a JSON body for URLs containing `url_part`
    pub fn respond(self, url_part: &str, body: Value) -> Self {
        self.respond_raw(url_part, RawResponse::json(200, &body))
    }

    pub fn respond_raw(mut self, url_part: &str, response: RawResponse) -> Self {
        self.responses.push((url_part.to_string(), response));
        self
    }

    /// Hold every response for `delay` so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_to(&self, url_part: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_part))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: SignedRequest) -> CcxtResult<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        // longest matching fragment wins
        self.responses
            .iter()
            .filter(|(part, _)| request.url.contains(part.as_str()))
            .max_by_key(|(part, _)| part.len())
            .map(|(_, response)| response.clone())
            .ok_or_else(|| CcxtError::NetworkError {
                url: request.url.clone(),
                message: "no scripted response".into(),
            })
    }
}
