//! Session orchestration: stats sync, uploads, queries, and reset.
//!
//! A [`Session`] owns every piece of client-side state for one session:
//! the uploaded-file list, the last stats snapshot, and the displayed
//! answer. All operations take `&self` and never hold the state lock across
//! an await, so several of them can be polled concurrently on one task. The
//! [`OperationGate`] keeps uploads, queries and clears mutually exclusive;
//! stats refreshes are not gated.
//!
//! | Operation | Gate | Refreshes stats |
//! |-----------|------|-----------------|
//! | [`refresh_stats`](Session::refresh_stats) | no | — |
//! | [`handle_drop`](Session::handle_drop) | whole batch | after each success |
//! | [`submit_question`](Session::submit_question) | yes | never |
//! | [`clear_all`](Session::clear_all) | yes | after success |

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::gate::{OperationGate, OperationKind};
use crate::models::{AnswerResult, DroppedFile, Stats, UploadedFileRecord, DEFAULT_TOP_K};
use crate::notify::{Confirm, Notice, Notifier};
use crate::service::RagService;

/// Prompt shown before clearing the corpus.
pub const CLEAR_PROMPT: &str = "Clear all documents?";

/// What to do when a stats fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsErrorPolicy {
    /// Log and keep the previous stats. Stale or absent stats are acceptable.
    #[default]
    Silent,
    /// Log and also alert the user.
    Surface,
}

/// Result of a stats refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRefresh {
    Applied,
    /// A response to a newer request was applied first; this one was discarded.
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub name: String,
    pub detail: String,
}

/// Per-file outcomes of one drop batch, in drop order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropReport {
    pub uploaded: Vec<UploadedFileRecord>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing was dropped.
    Empty,
    /// Rejected because another operation holds the gate.
    Busy(OperationKind),
    Completed(DropReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyQuestion,
    Busy(OperationKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Answered(AnswerResult),
    Failed(ServiceError),
    /// Precondition not met; nothing was sent.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Declined,
    Busy(OperationKind),
    Cleared,
    Failed(ServiceError),
}

#[derive(Default)]
struct SessionState {
    uploaded: Vec<UploadedFileRecord>,
    stats: Option<Stats>,
    answer: Option<AnswerResult>,
    last_stats_error: Option<String>,
    stats_issued: u64,
    stats_applied: u64,
}

/// Client-side state and orchestration for one user session.
pub struct Session<S> {
    service: S,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    stats_policy: StatsErrorPolicy,
    gate: OperationGate,
    state: Mutex<SessionState>,
}

impl<S: RagService> Session<S> {
    pub fn new(service: S, notifier: Arc<dyn Notifier>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            service,
            notifier,
            confirm,
            stats_policy: StatsErrorPolicy::default(),
            gate: OperationGate::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_stats_policy(mut self, policy: StatsErrorPolicy) -> Self {
        self.stats_policy = policy;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Initial sync: fetch stats once.
    pub async fn start(&self) {
        self.refresh_stats().await;
    }

    // ============ Accessors ============

    pub fn uploaded_files(&self) -> Vec<UploadedFileRecord> {
        self.state.lock().uploaded.clone()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.state.lock().stats.clone()
    }

    pub fn answer(&self) -> Option<AnswerResult> {
        self.state.lock().answer.clone()
    }

    /// True while an upload batch, query or clear is in flight.
    pub fn is_loading(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn current_operation(&self) -> Option<OperationKind> {
        self.gate.current()
    }

    /// Message of the most recent failed stats fetch, cleared by the next success.
    pub fn last_stats_error(&self) -> Option<String> {
        self.state.lock().last_stats_error.clone()
    }

    // ============ Stats ============

    /// Fetch stats and replace the held value.
    ///
    /// Each call takes a ticket before the request goes out; a response is
    /// applied only if no response to a later ticket has been applied yet.
    pub async fn refresh_stats(&self) -> StatsRefresh {
        let ticket = {
            let mut state = self.state.lock();
            state.stats_issued += 1;
            state.stats_issued
        };
        debug!(ticket, "fetching stats");

        match self.service.fetch_stats().await {
            Ok(stats) => {
                let mut state = self.state.lock();
                if ticket <= state.stats_applied {
                    debug!(ticket, applied = state.stats_applied, "discarding stale stats");
                    return StatsRefresh::Stale;
                }
                debug!(ticket, total_chunks = stats.total_chunks, "stats updated");
                state.stats_applied = ticket;
                state.stats = Some(stats);
                state.last_stats_error = None;
                StatsRefresh::Applied
            }
            Err(err) => {
                let detail = err.user_message();
                warn!(ticket, error = %detail, "error fetching stats");
                self.state.lock().last_stats_error = Some(detail.clone());
                if self.stats_policy == StatsErrorPolicy::Surface {
                    self.notifier.alert(Notice::StatsFailed { detail });
                }
                StatsRefresh::Failed
            }
        }
    }

    // ============ Upload ============

    /// Upload a batch of files one at a time, in the given order.
    ///
    /// A failed file is reported and skipped; the batch always runs to the
    /// end. Stats are refreshed after every successful upload.
    pub async fn handle_drop(&self, files: Vec<DroppedFile>) -> DropOutcome {
        if files.is_empty() {
            return DropOutcome::Empty;
        }
        let _guard = match self.gate.try_begin(OperationKind::Upload) {
            Ok(guard) => guard,
            Err(holder) => {
                info!(files = files.len(), busy = %holder, "upload batch rejected");
                return DropOutcome::Busy(holder);
            }
        };

        let mut report = DropReport::default();
        for file in &files {
            debug!(file = %file.name, bytes = file.bytes.len(), "uploading");
            match self.service.upload_file(file).await {
                Ok(receipt) => {
                    let record = UploadedFileRecord {
                        name: file.name.clone(),
                        chunks: receipt.chunks_created,
                        id: receipt.document_id,
                    };
                    info!(file = %record.name, chunks = record.chunks, id = %record.id, "uploaded");
                    self.state.lock().uploaded.push(record.clone());
                    report.uploaded.push(record);
                    self.refresh_stats().await;
                }
                Err(err) => {
                    let detail = err.user_message();
                    warn!(file = %file.name, error = %detail, "upload failed");
                    self.notifier.alert(Notice::UploadFailed {
                        file: file.name.clone(),
                        detail: detail.clone(),
                    });
                    report.failed.push(FailedUpload {
                        name: file.name.clone(),
                        detail,
                    });
                }
            }
        }

        DropOutcome::Completed(report)
    }

    // ============ Query ============

    /// Ask one question. Single-flight: refused, not queued, while any
    /// operation is in flight.
    pub async fn submit_question(&self, question: &str) -> QueryOutcome {
        let question = question.trim();
        if question.is_empty() {
            return QueryOutcome::Skipped(SkipReason::EmptyQuestion);
        }
        let _guard = match self.gate.try_begin(OperationKind::Query) {
            Ok(guard) => guard,
            Err(holder) => return QueryOutcome::Skipped(SkipReason::Busy(holder)),
        };

        // Never show the previous answer next to an in-flight question.
        self.state.lock().answer = None;

        debug!(question, top_k = DEFAULT_TOP_K, "submitting query");
        match self.service.submit_query(question, DEFAULT_TOP_K).await {
            Ok(answer) => {
                info!(
                    sources = answer.sources.len(),
                    confidence = answer.confidence,
                    "answer received"
                );
                self.state.lock().answer = Some(answer.clone());
                QueryOutcome::Answered(answer)
            }
            Err(err) => {
                let detail = err.user_message();
                warn!(error = %detail, "query failed");
                self.notifier.alert(Notice::QueryFailed { detail });
                QueryOutcome::Failed(err)
            }
        }
    }

    // ============ Clear ============

    /// Clear the whole corpus after explicit confirmation.
    ///
    /// Local state is reset only once the server confirms the clear.
    pub async fn clear_all(&self) -> ClearOutcome {
        let _guard = match self.gate.try_begin(OperationKind::Clear) {
            Ok(guard) => guard,
            Err(holder) => return ClearOutcome::Busy(holder),
        };
        if !self.confirm.confirm(CLEAR_PROMPT) {
            debug!("clear declined");
            return ClearOutcome::Declined;
        }

        match self.service.clear_database().await {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    state.uploaded.clear();
                    state.answer = None;
                }
                info!("database cleared");
                self.refresh_stats().await;
                self.notifier.alert(Notice::Cleared);
                ClearOutcome::Cleared
            }
            Err(err) => {
                let detail = err.user_message();
                warn!(error = %detail, "clear failed");
                self.notifier.alert(Notice::ClearFailed { detail });
                ClearOutcome::Failed(err)
            }
        }
    }
}
