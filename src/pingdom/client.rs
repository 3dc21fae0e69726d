use async_trait::async_trait;
use reqwest::{Client, Method, header};
use tracing::debug;

use super::{ApiResponse, CheckTransport, Params};
use crate::config::ApiSettings;
use crate::error::{GitopsError, Result};
use crate::version::user_agent;

/// reqwest-backed transport for the Pingdom 3.1 API. One attempt per call, no retries and no
/// client-side timeout.
pub struct PingdomClient {
    client: Client,
    settings: ApiSettings,
}

impl PingdomClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(GitopsError::Network)?;
        Ok(Self { client, settings })
    }

    /// Joins `path` to the base URL. A path that already carries the base URL is accepted too.
    pub fn endpoint_url(&self, path: &str) -> String {
        endpoint_url(&self.settings.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
        let url = self.endpoint_url(path);
        debug!(method = %method, url = %url, "Calling Pingdom API");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.settings.api_key)
            .header(header::ACCEPT, "application/json");
        if let Some(params) = params {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl CheckTransport for PingdomClient {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(params)).await
    }

    async fn put(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.send(Method::PUT, path, Some(params)).await
    }

    async fn delete(&self, path: &str, params: &Params) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, Some(params)).await
    }
}

pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let relative = match path.get(..base_url.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(base_url) => &path[base_url.len()..],
        _ => path,
    };
    format!("{}/{}", base_url, relative.trim_start_matches('/'))
}
