//! Pingdom API boundary: the transport trait the reconciler talks through, and the shapes of the
//! resources it reads back.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GitopsError, Result};
use crate::manifest::{CheckFields, scalar_text};

pub mod client;

pub use client::PingdomClient;

/// Query parameters submitted with a write call.
pub type Params = Vec<(String, String)>;

/// Status code and raw body of a completed API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns any non-2xx response into [`GitopsError::Transport`] carrying the raw body.
    pub fn into_success(self) -> Result<String> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(GitopsError::Transport {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Authenticated access to the Pingdom API. Paths are relative to the API base URL.
#[async_trait]
pub trait CheckTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse>;

    async fn post(&self, path: &str, params: &Params) -> Result<ApiResponse>;

    async fn put(&self, path: &str, params: &Params) -> Result<ApiResponse>;

    async fn delete(&self, path: &str, params: &Params) -> Result<ApiResponse>;
}

/// A check as listed by `GET /checks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCheck {
    pub id: u64,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A tag attached to a remote check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteTag {
    pub name: String,
}

/// A check as returned by `GET /checks/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCheckDetail {
    pub id: u64,
    /// Absent when the check carries no tags.
    #[serde(default)]
    pub tags: Option<Vec<RemoteTag>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckListEnvelope {
    #[serde(default)]
    pub checks: Vec<RemoteCheck>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckDetailEnvelope {
    pub check: RemoteCheckDetail,
}

pub fn checks_path() -> &'static str {
    "/checks"
}

pub fn check_path(id: u64) -> String {
    format!("/checks/{id}")
}

/// Flattens check fields into query parameters: null values are dropped, sequences become
/// repeated keys, nested mappings are sent as JSON text.
pub fn encode_params(fields: &CheckFields) -> Params {
    let mut params = Params::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = param_text(item) {
                        params.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = param_text(other) {
                    params.push((key.clone(), text));
                }
            }
        }
    }
    params
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_text(scalar),
    }
}
