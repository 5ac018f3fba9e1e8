//! One-shot commands: `info`, `stats`, `upload`, `ask`, `clear`.
//!
//! Each command builds a fresh [`Session`] against the configured service
//! and prints the result of one operation. `upload`, `ask` and `clear`
//! start the session first, so the initial stats sync runs as in the shell.
//! Failures the session already alerted on are reported back as `Ok(false)`
//! so `main` can exit non-zero without printing the same error twice.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use docqa_core::service::RagService;
use docqa_core::session::{ClearOutcome, DropOutcome, QueryOutcome, Session, SkipReason};
use tracing::debug;

use crate::client::HttpRagService;
use crate::config::Config;
use crate::files::DropSurface;
use crate::notice::{self, OutputFormat};
use crate::output::Printer;

/// Everything a command needs, built once from the loaded configuration.
pub struct App {
    pub session: Arc<Session<HttpRagService>>,
    pub printer: Printer,
}

impl App {
    pub fn new(config: &Config, format: OutputFormat, assume_yes: bool) -> Result<Self> {
        let service = HttpRagService::new(&config.service)
            .context("Failed to build HTTP client")?;
        debug!(base_url = %service.base_url(), "service configured");
        let session = Session::new(service, format.notifier(), notice::confirmer(assume_yes))
            .with_stats_policy(config.session.on_stats_error);
        Ok(Self {
            session: Arc::new(session),
            printer: Printer::new(format, &config.output),
        })
    }
}

pub async fn run_info(app: &App) -> Result<bool> {
    let info = app
        .session
        .service()
        .service_info()
        .await
        .context("Failed to fetch service info")?;
    app.printer.info(&info)?;
    Ok(true)
}

pub async fn run_stats(app: &App) -> Result<bool> {
    app.session.refresh_stats().await;
    match app.session.stats() {
        Some(stats) => {
            app.printer.stats(&stats)?;
            Ok(true)
        }
        None => {
            let detail = app
                .session
                .last_stats_error()
                .unwrap_or_else(|| "no stats returned".to_string());
            anyhow::bail!("Could not fetch stats: {}", detail)
        }
    }
}

pub async fn run_upload(app: &App, paths: &[PathBuf]) -> Result<bool> {
    app.session.start().await;
    let selection = DropSurface::new()?.collect(paths);
    for rejected in &selection.rejected {
        app.printer.skipped(rejected);
    }
    if selection.accepted.is_empty() {
        anyhow::bail!("No PDF or TXT files to upload");
    }

    match app.session.handle_drop(selection.accepted).await {
        DropOutcome::Completed(report) => {
            app.printer
                .drop_report(&report, app.session.stats().as_ref())?;
            Ok(report.failed.is_empty() && selection.rejected.is_empty())
        }
        DropOutcome::Empty => Ok(true),
        DropOutcome::Busy(holder) => anyhow::bail!("Another operation is in progress: {}", holder),
    }
}

pub async fn run_ask(app: &App, question: &str) -> Result<bool> {
    app.session.start().await;
    match app.session.submit_question(question).await {
        QueryOutcome::Answered(answer) => {
            app.printer.answer(&answer)?;
            Ok(true)
        }
        QueryOutcome::Failed(_) => Ok(false),
        QueryOutcome::Skipped(SkipReason::EmptyQuestion) => {
            debug!("empty question, nothing sent");
            Ok(true)
        }
        QueryOutcome::Skipped(SkipReason::Busy(holder)) => {
            anyhow::bail!("Another operation is in progress: {}", holder)
        }
    }
}

pub async fn run_clear(app: &App) -> Result<bool> {
    app.session.start().await;
    match app.session.clear_all().await {
        ClearOutcome::Cleared => Ok(true),
        ClearOutcome::Declined => {
            eprintln!("Clear cancelled.");
            Ok(true)
        }
        ClearOutcome::Failed(_) => Ok(false),
        ClearOutcome::Busy(holder) => anyhow::bail!("Another operation is in progress: {}", holder),
    }
}
