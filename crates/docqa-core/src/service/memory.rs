//! In-memory [`RagService`] implementation for tests and demos.
//!
//! Mirrors the behavior of the reference backend closely enough to drive the
//! orchestration layer end to end: uploads are split into overlapping
//! character chunks, queries score chunks by term overlap, and clear wipes
//! the corpus. Failures can be injected per operation, and every call is
//! counted so tests can assert on call patterns.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::error::ServiceError;
use crate::models::{
    AnswerResult, DroppedFile, ServiceInfo, SourceCitation, Stats, UploadReceipt,
};

use super::RagService;

const CHUNK_SIZE: usize = 1000;
const CHUNK_OVERLAP: usize = 200;
const PREVIEW_CHARS: usize = 200;
const COLLECTION_NAME: &str = "documents";

struct StoredChunk {
    document_id: String,
    source: String,
    chunk_index: u64,
    text: String,
}

/// Number of calls made to each operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub stats: usize,
    pub upload: usize,
    pub query: usize,
    pub clear: usize,
    pub info: usize,
}

#[derive(Default)]
struct Faults {
    upload: HashMap<String, ServiceError>,
    query: VecDeque<ServiceError>,
    clear: VecDeque<ServiceError>,
    stats: Option<ServiceError>,
}

/// In-memory backend for testing.
pub struct InMemoryService {
    chunks: Mutex<Vec<StoredChunk>>,
    faults: Mutex<Faults>,
    calls: Mutex<CallCounts>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
            calls: Mutex::new(CallCounts::default()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Make every upload of `name` fail with a server error carrying `detail`.
    pub fn fail_upload(&self, name: &str, detail: &str) {
        self.faults
            .lock()
            .upload
            .insert(name.to_string(), ServiceError::server(500, Some(detail.to_string())));
    }

    /// Make the next query fail with `err`.
    pub fn fail_next_query(&self, err: ServiceError) {
        self.faults.lock().query.push_back(err);
    }

    /// Make the next clear fail with a server error carrying `detail`.
    pub fn fail_next_clear(&self, detail: &str) {
        self.faults
            .lock()
            .clear
            .push_back(ServiceError::server(500, Some(detail.to_string())));
    }

    /// Make stats fetches fail until cleared with `None`.
    pub fn fail_stats(&self, err: Option<ServiceError>) {
        self.faults.lock().stats = err;
    }

    /// Seed the corpus with pre-existing chunks, as if ingested before the session.
    pub fn seed(&self, source: &str, texts: &[&str]) {
        let document_id = document_id_for(source);
        let mut chunks = self.chunks.lock();
        for (i, text) in texts.iter().enumerate() {
            chunks.push(StoredChunk {
                document_id: document_id.clone(),
                source: source.to_string(),
                chunk_index: i as u64,
                text: text.to_string(),
            });
        }
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock()
    }

    /// Every `(question, top_k)` pair received, in order.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().len()
    }
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable document id derived from the file name.
fn document_id_for(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    hex::encode(&digest[..16])
}

/// Split text into windows of `CHUNK_SIZE` chars overlapping by `CHUNK_OVERLAP`.
fn split_chunks(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.iter().all(|c| c.is_whitespace()) {
        return Vec::new();
    }
    let step = CHUNK_SIZE - CHUNK_OVERLAP;
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + CHUNK_SIZE).min(chars.len());
        chunks.push(chars[start..end].iter().collect::<String>());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

fn extract_text(file: &DroppedFile) -> Result<String, ServiceError> {
    let lower = file.name.to_lowercase();
    if lower.ends_with(".txt") {
        String::from_utf8(file.bytes.clone()).map_err(|_| {
            ServiceError::server(500, Some("'utf-8' codec can't decode file".to_string()))
        })
    } else if lower.ends_with(".pdf") {
        Ok(String::from_utf8_lossy(&file.bytes).into_owned())
    } else {
        Err(ServiceError::server(
            400,
            Some("Unsupported file type. Use PDF or TXT".to_string()),
        ))
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

#[async_trait]
impl RagService for InMemoryService {
    async fn fetch_stats(&self) -> Result<Stats, ServiceError> {
        self.calls.lock().stats += 1;
        if let Some(err) = self.faults.lock().stats.clone() {
            return Err(err);
        }
        Ok(Stats {
            total_chunks: self.chunks.lock().len() as u64,
            collection_name: Some(COLLECTION_NAME.to_string()),
        })
    }

    async fn upload_file(&self, file: &DroppedFile) -> Result<UploadReceipt, ServiceError> {
        self.calls.lock().upload += 1;
        if let Some(err) = self.faults.lock().upload.get(&file.name).cloned() {
            return Err(err);
        }

        let text = extract_text(file)?;
        let pieces = split_chunks(&text);
        let document_id = document_id_for(&file.name);

        let mut chunks = self.chunks.lock();
        chunks.retain(|c| c.document_id != document_id);
        for (i, piece) in pieces.iter().enumerate() {
            chunks.push(StoredChunk {
                document_id: document_id.clone(),
                source: file.name.clone(),
                chunk_index: i as u64,
                text: piece.clone(),
            });
        }

        Ok(UploadReceipt {
            document_id,
            chunks_created: pieces.len() as u64,
        })
    }

    async fn submit_query(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<AnswerResult, ServiceError> {
        self.calls.lock().query += 1;
        self.queries.lock().push((question.to_string(), top_k));
        if let Some(err) = self.faults.lock().query.pop_front() {
            return Err(err);
        }

        let chunks = self.chunks.lock();
        if chunks.is_empty() {
            return Err(ServiceError::server(404, Some("No documents found".to_string())));
        }

        let question_terms = terms(question);
        let mut scored: Vec<(f64, &StoredChunk)> = chunks
            .iter()
            .map(|c| {
                let chunk_terms = terms(&c.text);
                let hits = question_terms
                    .iter()
                    .filter(|t| chunk_terms.contains(t))
                    .count();
                let score = if question_terms.is_empty() {
                    0.0
                } else {
                    hits as f64 / question_terms.len() as f64
                };
                (score, c)
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k.max(1));

        let sources: Vec<SourceCitation> = scored
            .iter()
            .map(|(score, c)| SourceCitation {
                source: c.source.clone(),
                relevance_score: *score,
                text_preview: preview(&c.text),
                chunk_index: c.chunk_index,
            })
            .collect();

        let confidence = sources.iter().map(|s| s.relevance_score).sum::<f64>()
            / sources.len() as f64;

        let mut answer = String::from("Based on the provided context:\n\n");
        for (_, c) in &scored {
            let first_line = c.text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            answer.push_str(&format!(
                "- {} *(Source: {}, Chunk {})*\n",
                first_line.trim(),
                c.source,
                c.chunk_index + 1
            ));
        }

        Ok(AnswerResult {
            answer,
            confidence: (confidence * 1000.0).round() / 1000.0,
            sources,
        })
    }

    async fn clear_database(&self) -> Result<(), ServiceError> {
        self.calls.lock().clear += 1;
        if let Some(err) = self.faults.lock().clear.pop_front() {
            return Err(err);
        }
        self.chunks.lock().clear();
        Ok(())
    }

    async fn service_info(&self) -> Result<ServiceInfo, ServiceError> {
        self.calls.lock().info += 1;
        let endpoints = [("upload", "/upload"), ("query", "/query"), ("stats", "/stats")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(ServiceInfo {
            message: "RAG System API".to_string(),
            endpoints,
        })
    }
}
