//! Stdout rendering of command results, as text or JSON.

use std::io::Write;

use anyhow::Result;
use docqa_core::models::{AnswerResult, ServiceInfo, Stats, UploadedFileRecord};
use docqa_core::render::{self, AnswerView, FilesView};
use docqa_core::session::DropReport;
use serde::Serialize;

use crate::config::OutputConfig;
use crate::files::Rejected;
use crate::markdown;
use crate::notice::OutputFormat;

#[derive(Clone, Debug)]
pub struct Printer {
    format: OutputFormat,
    color: bool,
    width: usize,
}

impl Printer {
    pub fn new(format: OutputFormat, config: &OutputConfig) -> Self {
        let color = config
            .color
            .unwrap_or_else(|| atty::is(atty::Stream::Stdout));
        Self {
            format,
            color: color && format == OutputFormat::Text,
            width: config.width,
        }
    }

    fn emit(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    fn emit_json<T: Serialize>(&self, value: &T) -> Result<()> {
        self.emit(&serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Report a path the drop surface refused. Goes to stderr next to the
    /// alerts, as a JSON line in JSON mode.
    pub fn skipped(&self, rejected: &Rejected) {
        let line = self.skipped_line(rejected);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", line);
        let _ = err.flush();
    }

    fn skipped_line(&self, rejected: &Rejected) -> String {
        let path = rejected.path.display().to_string();
        if self.format == OutputFormat::Json {
            let value = serde_json::json!({
                "event": "skipped",
                "path": path,
                "reason": rejected.reason,
                "message": format!("Skipping {}: {}", path, rejected.reason),
            });
            return value.to_string();
        }
        format!("Skipping {}: {}", path, rejected.reason)
    }

    pub fn info(&self, info: &ServiceInfo) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.emit_json(info);
        }
        let mut text = info.message.clone();
        if !info.endpoints.is_empty() {
            text.push('\n');
            for (name, path) in &info.endpoints {
                text.push_str(&format!("\n  {:<10} {}", name, path));
            }
        }
        self.emit(&text);
        Ok(())
    }

    pub fn stats(&self, stats: &Stats) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.emit_json(stats);
        }
        self.emit(&render::stats_line(stats));
        Ok(())
    }

    pub fn files(&self, files: &[UploadedFileRecord]) -> Result<()> {
        let view = render::files_view(files);
        if self.format == OutputFormat::Json {
            return self.emit_json(&view);
        }
        self.emit(&self.files_text(&view));
        Ok(())
    }

    fn files_text(&self, view: &FilesView) -> String {
        if view.count == 0 {
            return "No files uploaded.".to_string();
        }
        let name_width = view
            .entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0);
        let mut text = format!("Uploaded Files ({})", view.count);
        for entry in &view.entries {
            text.push_str(&format!(
                "\n  {:<width$}  {}",
                entry.name,
                entry.badge,
                width = name_width
            ));
        }
        text
    }

    pub fn drop_report(&self, report: &DropReport, stats: Option<&Stats>) -> Result<()> {
        if self.format == OutputFormat::Json {
            #[derive(Serialize)]
            struct Report<'a> {
                uploaded: &'a [UploadedFileRecord],
                failed: Vec<Failed<'a>>,
                #[serde(skip_serializing_if = "Option::is_none")]
                stats: Option<&'a Stats>,
            }
            #[derive(Serialize)]
            struct Failed<'a> {
                name: &'a str,
                detail: &'a str,
            }
            return self.emit_json(&Report {
                uploaded: &report.uploaded,
                failed: report
                    .failed
                    .iter()
                    .map(|f| Failed {
                        name: &f.name,
                        detail: &f.detail,
                    })
                    .collect(),
                stats,
            });
        }

        let total = report.uploaded.len() + report.failed.len();
        let mut text = format!("Uploaded {} of {} files", report.uploaded.len(), total);
        for record in &report.uploaded {
            text.push_str(&format!("\n  {}  {} chunks", record.name, record.chunks));
        }
        if let Some(stats) = stats {
            text.push('\n');
            text.push_str(&render::stats_line(stats));
        }
        self.emit(&text);
        Ok(())
    }

    pub fn answer(&self, answer: &AnswerResult) -> Result<()> {
        let view = render::answer_view(answer);
        if self.format == OutputFormat::Json {
            return self.emit_json(&view);
        }
        self.emit(&self.answer_text(&view));
        Ok(())
    }

    fn answer_text(&self, view: &AnswerView) -> String {
        let mut text = format!("Confidence: {}\n\n", view.confidence);
        text.push_str(&markdown::to_terminal(
            &view.answer_markdown,
            self.color,
            self.width,
        ));
        text.push_str(&format!("\n\nSources ({})", view.source_count));
        for (i, source) in view.sources.iter().enumerate() {
            text.push_str(&format!(
                "\n  [{}] {}  relevance {}  chunk {}",
                i + 1,
                source.source,
                source.relevance,
                source.chunk_number
            ));
            for line in markdown::wrap(&source.preview, self.width.saturating_sub(6)) {
                text.push_str("\n      ");
                text.push_str(&line);
            }
        }
        text
    }
}
