//! HTTP implementation of [`RagService`].
//!
//! One `reqwest::Client` per service, built with the configured request
//! deadline. Calls are never retried. Non-2xx responses become
//! [`ServiceError::Server`] carrying the body's `detail` field (or a
//! status-code fallback); transport failures become
//! [`ServiceError::Network`] or [`ServiceError::Timeout`].
//!
//! | Call | Request |
//! |------|---------|
//! | `fetch_stats` | `GET /stats` |
//! | `upload_file` | `POST /upload`, multipart field `file` |
//! | `submit_query` | `POST /query`, `{"question", "top_k"}` |
//! | `clear_database` | `DELETE /clear` |
//! | `service_info` | `GET /` |

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use docqa_core::error::ServiceError;
use docqa_core::models::{
    AnswerResult, DroppedFile, QueryRequest, ServiceInfo, Stats, UploadReceipt,
};
use docqa_core::service::RagService;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServiceConfig;

pub struct HttpRagService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRagService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Network(error_chain(&err))
        }
    }

    /// Send a request, turning any non-2xx status into a server error.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::server(status.as_u16(), extract_detail(&body)))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ServiceError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Pull a human-readable `detail` out of an error body.
///
/// Accepts a plain string, or a list of validation errors whose `msg`
/// fields are joined.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

#[async_trait]
impl RagService for HttpRagService {
    async fn fetch_stats(&self) -> Result<Stats, ServiceError> {
        let response = self.send(self.client.get(self.url("/stats"))).await?;
        self.decode(response).await
    }

    async fn upload_file(&self, file: &DroppedFile) -> Result<UploadReceipt, ServiceError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ServiceError::Network(error_chain(&e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .send(self.client.post(self.url("/upload")).multipart(form))
            .await?;
        self.decode(response).await
    }

    async fn submit_query(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<AnswerResult, ServiceError> {
        let body = QueryRequest {
            question: question.to_string(),
            top_k,
        };
        let response = self
            .send(self.client.post(self.url("/query")).json(&body))
            .await?;
        self.decode(response).await
    }

    async fn clear_database(&self) -> Result<(), ServiceError> {
        self.send(self.client.delete(self.url("/clear"))).await?;
        Ok(())
    }

    async fn service_info(&self) -> Result<ServiceInfo, ServiceError> {
        let response = self.send(self.client.get(self.url("/"))).await?;
        self.decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "unsupported encoding"}"#).as_deref(),
            Some("unsupported encoding")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "question"], "msg": "field required"},
                                  {"loc": ["body", "top_k"], "msg": "value is not a valid integer"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; value is not a valid integer")
        );
    }

    #[test]
    fn detail_missing_or_not_json() {
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
        assert_eq!(extract_detail("<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn trailing_slash_trimmed() {
        let svc = HttpRagService::new(&ServiceConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(svc.url("/stats"), "http://localhost:8000/stats");
    }
}
