//! HTTP client and session tests against the mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use docqa::client::HttpRagService;
use docqa::config::ServiceConfig;
use docqa_core::error::ServiceError;
use docqa_core::models::DroppedFile;
use docqa_core::notify::{AutoConfirm, RecordingNotifier};
use docqa_core::service::RagService;
use docqa_core::session::{ClearOutcome, DropOutcome, QueryOutcome, Session};

use common::{dead_url, start_mock};

fn service(url: &str, timeout_secs: u64) -> HttpRagService {
    HttpRagService::new(&ServiceConfig {
        base_url: url.to_string(),
        timeout_secs,
    })
    .unwrap()
}

fn pdf(name: &str, body: &str) -> DroppedFile {
    DroppedFile::new(name, "application/pdf", body.as_bytes().to_vec())
}

// ============ Transport ============

#[tokio::test]
async fn test_service_info() {
    let mock = start_mock().await;
    let info = service(&mock.url(), 5).service_info().await.unwrap();
    assert_eq!(info.message, "RAG Document Q&A API");
    assert_eq!(info.endpoints.get("query").map(String::as_str), Some("/query"));
}

#[tokio::test]
async fn test_stats_roundtrip() {
    let mock = start_mock().await;
    mock.state.seed("a.pdf", 4);
    let stats = service(&mock.url(), 5).fetch_stats().await.unwrap();
    assert_eq!(stats.total_chunks, 4);
    assert_eq!(stats.collection_name.as_deref(), Some("documents"));
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let mock = start_mock().await;
    let receipt = service(&mock.url(), 5)
        .upload_file(&DroppedFile::new("notes.txt", "text/plain", b"0123456789abc".to_vec()))
        .await
        .unwrap();
    assert_eq!(receipt.document_id, "doc-1");
    assert_eq!(receipt.chunks_created, 2);

    let seen = mock.state.uploads();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].field, "file");
    assert_eq!(seen[0].file_name, "notes.txt");
    assert_eq!(seen[0].content_type, "text/plain");
    assert_eq!(seen[0].len, 13);
}

#[tokio::test]
async fn test_query_sends_question_and_top_k() {
    let mock = start_mock().await;
    mock.state.seed("a.pdf", 4);
    let answer = service(&mock.url(), 5)
        .submit_query("What is X?", 5)
        .await
        .unwrap();
    assert_eq!(answer.answer, "You asked **What is X?**.");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].source, "a.pdf");

    let queries = mock.state.queries();
    assert_eq!(queries[0]["question"], "What is X?");
    assert_eq!(queries[0]["top_k"], 5);
}

#[tokio::test]
async fn test_server_detail_surfaces_verbatim() {
    let mock = start_mock().await;
    let err = service(&mock.url(), 5)
        .submit_query("anything", 5)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Server {
            status: 404,
            detail: "No documents found".to_string()
        }
    );
}

#[tokio::test]
async fn test_error_without_detail_falls_back_to_status() {
    let mock = start_mock().await;
    mock.state.fail_stats(502, None);
    let err = service(&mock.url(), 5).fetch_stats().await.unwrap_err();
    assert_eq!(err.user_message(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_clear_uses_delete() {
    let mock = start_mock().await;
    mock.state.seed("a.pdf", 4);
    service(&mock.url(), 5).clear_database().await.unwrap();
    assert_eq!(mock.state.clears(), 1);
    assert_eq!(mock.state.total_chunks(), 0);
}

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let mock = start_mock().await;
    mock.state.delay_stats(Duration::from_secs(3));
    let err = service(&mock.url(), 1).fetch_stats().await.unwrap_err();
    assert_eq!(err, ServiceError::Timeout(Duration::from_secs(1)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let url = dead_url().await;
    let err = service(&url, 5).fetch_stats().await.unwrap_err();
    assert!(matches!(err, ServiceError::Network(_)), "got {:?}", err);
}

// ============ Session over HTTP ============

#[tokio::test]
async fn test_drop_batch_partial_failure() {
    let mock = start_mock().await;
    mock.state.fail_upload("b.pdf", "unsupported encoding");
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Session::new(
        service(&mock.url(), 5),
        notifier.clone(),
        Arc::new(AutoConfirm(false)),
    );

    let outcome = session
        .handle_drop(vec![pdf("a.pdf", "alpha alpha alpha"), pdf("b.pdf", "bravo")])
        .await;

    let DropOutcome::Completed(report) = outcome else {
        panic!("expected a completed batch, got {:?}", outcome);
    };
    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.failed.len(), 1);

    let files = session.uploaded_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "a.pdf");
    assert_eq!(files[0].id, "doc-1");
    assert_eq!(
        notifier.messages(),
        vec!["Error uploading b.pdf: unsupported encoding".to_string()]
    );
    // Stats refreshed after the successful upload only.
    assert_eq!(mock.state.stats_calls(), 1);
    assert_eq!(session.stats().unwrap().total_chunks, mock.state.total_chunks());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_ask_then_clear_resets_session() {
    let mock = start_mock().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Session::new(
        service(&mock.url(), 5),
        notifier.clone(),
        Arc::new(AutoConfirm(true)),
    );
    session.handle_drop(vec![pdf("a.pdf", "alpha")]).await;

    let QueryOutcome::Answered(answer) = session.submit_question("  What is X?  ").await else {
        panic!("expected an answer");
    };
    assert_eq!(answer.confidence, 0.8675);
    assert_eq!(mock.state.queries()[0]["question"], "What is X?");

    assert_eq!(session.clear_all().await, ClearOutcome::Cleared);
    assert!(session.uploaded_files().is_empty());
    assert!(session.answer().is_none());
    assert_eq!(session.stats().unwrap().total_chunks, 0);
    assert_eq!(
        notifier.messages(),
        vec!["Database cleared successfully".to_string()]
    );
}

#[tokio::test]
async fn test_failed_clear_keeps_state() {
    let mock = start_mock().await;
    mock.state.fail_clear("database locked");
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Session::new(
        service(&mock.url(), 5),
        notifier.clone(),
        Arc::new(AutoConfirm(true)),
    );
    session.handle_drop(vec![pdf("a.pdf", "alpha")]).await;

    assert!(matches!(session.clear_all().await, ClearOutcome::Failed(_)));
    assert_eq!(session.uploaded_files().len(), 1);
    assert_eq!(notifier.messages(), vec!["Error: database locked".to_string()]);
}

#[tokio::test]
async fn test_timed_out_stats_do_not_block_session() {
    let mock = start_mock().await;
    mock.state.delay_stats(Duration::from_secs(3));
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Session::new(
        service(&mock.url(), 1),
        notifier.clone(),
        Arc::new(AutoConfirm(false)),
    );

    session.start().await;
    assert!(session.stats().is_none());
    assert_eq!(
        session.last_stats_error().as_deref(),
        Some("timeout of 1000ms exceeded")
    );
    // Silent by default.
    assert!(notifier.notices().is_empty());
}
