//! Base HTTP client with shared logic

use crate::infrastructure::model::types::ModelError;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Placeholder stored as error details when the error body itself is unreadable.
const UNREADABLE_BODY: &str = "Unknown error";

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_client(id, endpoint, Client::new())
    }

    pub fn with_client(id: impl Into<String>, endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            http,
        }
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// GET with a per-request timeout. Non-success statuses are returned, not raised.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response, ModelError> {
        self.http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ModelError::transport(&self.id, &e))
    }

    /// Prepare a JSON POST with optional bearer auth and extra headers.
    ///
    /// The timeout covers the whole exchange; on expiry the connection is dropped.
    pub fn post_request<Req>(
        &self,
        url: &str,
        bearer: Option<&str>,
        headers: &BTreeMap<String, String>,
        body: &Req,
        timeout: Duration,
    ) -> RequestBuilder
    where
        Req: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    /// Send a prepared request and decode a JSON success body.
    pub async fn send_json<Res>(&self, request: RequestBuilder) -> Result<Res, ModelError>
    where
        Res: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| ModelError::transport(&self.id, &e))?;
        let response = self.check_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::transport(&self.id, &e))?;
        serde_json::from_str(&text)
            .map_err(|e| ModelError::invalid_response(&self.id, e.to_string()))
    }

    /// Turn a non-success response into [`ModelError::Upstream`].
    pub async fn check_status(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = error_body(response).await;
        warn!(
            provider = self.id.as_str(),
            status = status.as_u16(),
            body = %body,
            "Provider returned error status"
        );
        Err(ModelError::upstream(&self.id, status, body))
    }
}

/// Parsed JSON body if possible, raw text otherwise, placeholder if unreadable.
async fn error_body(response: Response) -> Value {
    match response.text().await {
        Ok(text) if text.trim().is_empty() => Value::String(UNREADABLE_BODY.to_string()),
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(_) => Value::String(UNREADABLE_BODY.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_paths_correctly() {
        let base = HttpClientBase::new("Ollama", "http://localhost:11434/");
        assert_eq!(base.build_url("/api/chat"), "http://localhost:11434/api/chat");
        assert_eq!(base.build_url("api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn build_url_keeps_base_path() {
        let base = HttpClientBase::new("OpenRouter", "https://openrouter.ai/api/v1");
        assert_eq!(
            base.build_url("/chat/completions"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }
}
