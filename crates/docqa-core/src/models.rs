//! Core data models used throughout docqa.
//!
//! Field names follow the backend's JSON contract (`total_chunks`,
//! `chunks_created`, `relevance_score`, ...), so the same types serve as
//! wire payloads and as session state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of chunks requested per question.
pub const DEFAULT_TOP_K: usize = 5;

/// A document successfully ingested during this session.
///
/// Records are appended in upload completion order and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFileRecord {
    pub name: String,
    pub chunks: u64,
    pub id: String,
}

/// Aggregate corpus statistics, as reported by the backend.
///
/// This is the server's view and is not derived from the session's
/// uploaded-file list; the two diverge when the corpus predates the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_chunks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub document_id: String,
    pub chunks_created: u64,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: usize,
}

/// A generated answer with its supporting citations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Markdown-formatted answer text.
    pub answer: String,
    /// Server-computed certainty in `[0, 1]`.
    pub confidence: f64,
    /// Citations in server order.
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
}

/// One cited chunk backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Name of the source document.
    pub source: String,
    /// Relevance of this chunk to the question, in `[0, 1]`.
    pub relevance_score: f64,
    pub text_preview: String,
    /// Zero-based chunk position within its document.
    pub chunk_index: u64,
}

/// Banner returned by `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// A file handed to the upload orchestrator.
///
/// Type filtering (PDF and plain text only) happens before a file becomes a
/// `DroppedFile`; everything in a drop batch is uploaded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_parses_backend_payload() {
        let json = r#"{
            "answer": "**X** is a letter.",
            "confidence": 0.42,
            "sources": [
                {"source": "a.pdf", "relevance_score": 0.9, "text_preview": "X...", "chunk_index": 0},
                {"source": "b.txt", "relevance_score": 0.3, "text_preview": "Y...", "chunk_index": 4}
            ]
        }"#;
        let answer: AnswerResult = serde_json::from_str(json).unwrap();
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].source, "a.pdf");
        assert_eq!(answer.sources[1].chunk_index, 4);
    }

    #[test]
    fn stats_ignores_unknown_fields() {
        let stats: Stats =
            serde_json::from_str(r#"{"total_chunks": 12, "collection_name": "documents", "extra": 1}"#)
                .unwrap();
        assert_eq!(stats.total_chunks, 12);
        assert_eq!(stats.collection_name.as_deref(), Some("documents"));

        let bare: Stats = serde_json::from_str(r#"{"total_chunks": 0}"#).unwrap();
        assert_eq!(bare.collection_name, None);
    }

    #[test]
    fn upload_receipt_ignores_status_fields() {
        let receipt: UploadReceipt = serde_json::from_str(
            r#"{"status": "success", "filename": "a.pdf", "chunks_created": 4, "document_id": "d1"}"#,
        )
        .unwrap();
        assert_eq!(
            receipt,
            UploadReceipt {
                document_id: "d1".to_string(),
                chunks_created: 4
            }
        );
    }
}
