//! Interactive session: `dqa shell`.
//!
//! One shell run is one session. The uploaded-file list, stats and the last
//! answer live for as long as the shell does. Uploads run in the background
//! so the prompt stays responsive; questions and clears typed while an
//! upload batch is in flight are refused by the session, not queued.

use std::path::PathBuf;

use anyhow::Result;
use docqa_core::session::{ClearOutcome, DropOutcome, QueryOutcome, SkipReason};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::commands::App;
use crate::files::DropSurface;
use crate::notice;

const HELP: &str = "\
Commands:
  :upload <paths...>  upload PDF/TXT files or directories (runs in the background)
  :files              list files uploaded in this session
  :stats              refresh and show database stats
  :answer             show the last answer again
  :clear              delete every document (asks first)
  :help               show this help
  :quit               leave the shell
Anything else is sent as a question.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Upload(Vec<PathBuf>),
    Files,
    Stats,
    Answer,
    Clear,
    Help,
    Quit,
    Ask(String),
    Empty,
    Unknown(String),
}

/// Parse one input line. Paths after `:upload` are split on whitespace.
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return ShellCommand::Ask(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    match name {
        "upload" | "u" => ShellCommand::Upload(parts.map(PathBuf::from).collect()),
        "files" | "f" => ShellCommand::Files,
        "stats" | "s" => ShellCommand::Stats,
        "answer" | "a" => ShellCommand::Answer,
        "clear" => ShellCommand::Clear,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Unknown(other.to_string()),
    }
}

pub struct Shell {
    app: App,
    surface: DropSurface,
    upload: Option<JoinHandle<()>>,
}

impl Shell {
    pub fn new(app: App) -> Result<Self> {
        Ok(Self {
            app,
            surface: DropSurface::new()?,
            upload: None,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        self.app.session.start().await;
        match self.app.session.stats() {
            Some(stats) => self.app.printer.stats(&stats)?,
            None => eprintln!("Stats unavailable; is the service running?"),
        }
        eprintln!("Type :help for commands.");

        loop {
            let Some(line) = notice::prompt_line("dqa> ")? else {
                break;
            };
            let command = parse_command(&line);
            debug!(?command, "shell command");
            if command == ShellCommand::Quit {
                break;
            }
            self.execute(command).await?;
        }

        if let Some(handle) = self.upload.take() {
            if !handle.is_finished() {
                eprintln!("Waiting for uploads to finish...");
            }
            let _ = handle.await;
        }
        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<()> {
        if let ShellCommand::Upload(paths) = command {
            self.start_upload(paths);
            return Ok(());
        }
        let app = &self.app;
        match command {
            ShellCommand::Files => app.printer.files(&app.session.uploaded_files())?,
            ShellCommand::Stats => {
                app.session.refresh_stats().await;
                match app.session.stats() {
                    Some(stats) => app.printer.stats(&stats)?,
                    None => eprintln!("Stats unavailable."),
                }
            }
            ShellCommand::Answer => match app.session.answer() {
                Some(answer) => app.printer.answer(&answer)?,
                None => eprintln!("No answer yet."),
            },
            ShellCommand::Clear => match app.session.clear_all().await {
                ClearOutcome::Busy(holder) => eprintln!("Busy: {} in progress.", holder),
                ClearOutcome::Declined => eprintln!("Clear cancelled."),
                ClearOutcome::Cleared | ClearOutcome::Failed(_) => {}
            },
            ShellCommand::Ask(question) => match app.session.submit_question(&question).await {
                QueryOutcome::Answered(answer) => app.printer.answer(&answer)?,
                QueryOutcome::Skipped(SkipReason::Busy(holder)) => {
                    eprintln!("Busy: {} in progress.", holder)
                }
                QueryOutcome::Skipped(SkipReason::EmptyQuestion) | QueryOutcome::Failed(_) => {}
            },
            ShellCommand::Help => eprintln!("{}", HELP),
            ShellCommand::Unknown(name) => eprintln!("Unknown command :{}. Type :help.", name),
            ShellCommand::Upload(_) | ShellCommand::Empty | ShellCommand::Quit => {}
        }
        Ok(())
    }

    fn start_upload(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            eprintln!("Usage: :upload <paths...>");
            return;
        }
        if let Some(holder) = self.app.session.current_operation() {
            eprintln!("Busy: {} in progress.", holder);
            return;
        }
        let selection = self.surface.collect(&paths);
        for rejected in &selection.rejected {
            self.app.printer.skipped(rejected);
        }
        if selection.accepted.is_empty() {
            return;
        }

        let session = self.app.session.clone();
        let printer = self.app.printer.clone();
        eprintln!("Uploading {} file(s)...", selection.accepted.len());
        self.upload = Some(tokio::spawn(async move {
            match session.handle_drop(selection.accepted).await {
                DropOutcome::Completed(report) => {
                    let _ = printer.drop_report(&report, session.stats().as_ref());
                }
                DropOutcome::Busy(holder) => eprintln!("Busy: {} in progress.", holder),
                DropOutcome::Empty => {}
            }
        }));
    }
}
