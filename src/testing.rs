//! In-memory transport for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::Result;
use crate::pingdom::{ApiResponse, CheckTransport, Params};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: Params,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays scripted responses per `(method, path)`. Queued responses are consumed in order and
/// the last one repeats; unscripted calls answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<(String, String), VecDeque<ApiResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn writes(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method != "GET")
            .collect()
    }

    fn answer(&self, method: &'static str, path: &str, params: &Params) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            params: params.clone(),
        });

        let mut responses = self.responses.lock().unwrap();
        let response = match responses.get_mut(&(method.to_string(), path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(404, "not scripted")))
    }
}

#[async_trait]
impl CheckTransport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.answer("GET", path, &Params::new())
    }

    async fn post(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.answer("POST", path, params)
    }

    async fn put(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.answer("PUT", path, params)
    }

    async fn delete(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.answer("DELETE", path, params)
    }
}
