//! Remote service abstraction for docqa.
//!
//! The [`RagService`] trait is the only way the orchestration layer talks
//! to the retrieval-and-generation backend. It is a thin request/response
//! seam: no retries, no caching, no state.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::{AnswerResult, DroppedFile, ServiceInfo, Stats, UploadReceipt};

/// Abstract backend for docqa.
///
/// # Operations
///
/// | Method | Endpoint |
/// |--------|----------|
/// | [`fetch_stats`](RagService::fetch_stats) | `GET /stats` |
/// | [`upload_file`](RagService::upload_file) | `POST /upload` (multipart, field `file`) |
/// | [`submit_query`](RagService::submit_query) | `POST /query` |
/// | [`clear_database`](RagService::clear_database) | `DELETE /clear` |
/// | [`service_info`](RagService::service_info) | `GET /` |
///
/// None of these calls is guaranteed idempotent by the client.
#[async_trait]
pub trait RagService: Send + Sync {
    /// Fetch aggregate corpus statistics.
    async fn fetch_stats(&self) -> Result<Stats, ServiceError>;

    /// Upload one file for ingestion.
    async fn upload_file(&self, file: &DroppedFile) -> Result<UploadReceipt, ServiceError>;

    /// Ask a question, retrieving `top_k` chunks as context.
    async fn submit_query(&self, question: &str, top_k: usize)
        -> Result<AnswerResult, ServiceError>;

    /// Delete every document from the corpus.
    async fn clear_database(&self) -> Result<(), ServiceError>;

    /// Fetch the backend banner.
    async fn service_info(&self) -> Result<ServiceInfo, ServiceError>;
}

#[async_trait]
impl<T: RagService + ?Sized> RagService for Arc<T> {
    async fn fetch_stats(&self) -> Result<Stats, ServiceError> {
        (**self).fetch_stats().await
    }

    async fn upload_file(&self, file: &DroppedFile) -> Result<UploadReceipt, ServiceError> {
        (**self).upload_file(file).await
    }

    async fn submit_query(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<AnswerResult, ServiceError> {
        (**self).submit_query(question, top_k).await
    }

    async fn clear_database(&self) -> Result<(), ServiceError> {
        (**self).clear_database().await
    }

    async fn service_info(&self) -> Result<ServiceInfo, ServiceError> {
        (**self).service_info().await
    }
}
