//! # docqa CLI (`dqa`)
//!
//! Upload documents to a question-answering service, ask questions, and read
//! cited answers from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! dqa --config ./config/dqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dqa info` | Show the service banner and endpoints |
//! | `dqa stats` | Show the number of indexed chunks |
//! | `dqa upload <paths...>` | Upload PDF/TXT files or directories |
//! | `dqa ask "<question>"` | Ask a question and print the cited answer |
//! | `dqa clear` | Delete every indexed document |
//! | `dqa shell` | Interactive session |
//! | `dqa completions <shell>` | Print a shell completion script |
//!
//! The service URL comes from `[service].base_url`, or from `DOCQA_API_URL`
//! when that is set.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use docqa::commands::{self, App};
use docqa::notice::OutputFormat;
use docqa::{config, logging, shell};

/// docqa: ask questions about your documents.
#[derive(Parser)]
#[command(
    name = "dqa",
    about = "Terminal client for a document question-answering service",
    version,
    long_about = "Upload PDF and text documents to a retrieval-augmented question-answering \
    service, ask natural-language questions, and read answers with their confidence score \
    and the source chunks they were drawn from."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dqa.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/dqa.toml")]
    config: PathBuf,

    /// Output format for results and alerts.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Answer yes to confirmation prompts (needed for `clear` without a terminal).
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the service banner and its endpoints.
    Info,

    /// Show how many chunks the service has indexed.
    Stats,

    /// Upload documents.
    ///
    /// Files are uploaded one at a time in the order given; directories
    /// contribute their PDF and TXT files in name order. A failed file is
    /// reported and the rest still upload.
    Upload {
        /// Files or directories to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask a question about the uploaded documents.
    Ask {
        /// The question. Leading and trailing whitespace is ignored.
        question: String,
    },

    /// Delete every document from the service.
    ///
    /// Asks for confirmation first; pass `--yes` to skip the prompt.
    Clear,

    /// Start an interactive session.
    ///
    /// Keeps the uploaded-file list and last answer across commands.
    Shell,

    /// Print a completion script for the given shell.
    Completions {
        shell: CompletionShell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "dqa", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging)?;
    let app = App::new(&cfg, cli.format, cli.yes)?;

    let ok = match cli.command {
        Commands::Info => commands::run_info(&app).await?,
        Commands::Stats => commands::run_stats(&app).await?,
        Commands::Upload { paths } => commands::run_upload(&app, &paths).await?,
        Commands::Ask { question } => commands::run_ask(&app, &question).await?,
        Commands::Clear => commands::run_clear(&app).await?,
        Commands::Shell => {
            shell::Shell::new(app)?.run().await?;
            true
        }
        Commands::Completions { .. } => unreachable!(),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
