//! # docqa
//!
//! Terminal client for a document question-answering service.
//!
//! Upload PDF and text documents to a retrieval-and-generation backend, ask
//! natural-language questions, and read answers with their confidence and
//! cited source chunks. Session orchestration lives in [`docqa_core`]; this
//! crate supplies the HTTP transport, configuration, terminal rendering and
//! the `dqa` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ CLI/shell │──▶│   Session    │──▶│ HttpRagService│──▶│ RAG backend │
//! │  (dqa)    │   │ (docqa-core) │   │  (reqwest)    │   │   (HTTP)    │
//! └───────────┘   └──────┬───────┘   └──────────────┘   └─────────────┘
//!                        │
//!                        ▼
//!                 ┌──────────────┐
//!                 │ render views │──▶ text / JSON on stdout
//!                 └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dqa upload report.pdf notes.txt   # index documents
//! dqa ask "What does the report conclude?"
//! dqa stats
//! dqa shell                         # interactive session
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | HTTP implementation of the service trait |
//! | [`files`] | Paths to upload-ready files |
//! | [`commands`] | One-shot CLI commands |
//! | [`shell`] | Interactive session |
//! | [`output`] | Text and JSON result printing |
//! | [`markdown`] | Answer markdown for the terminal |
//! | [`notice`] | Alerts and confirmation prompts |
//! | [`logging`] | Diagnostic logging setup |

pub mod client;
pub mod commands;
pub mod config;
pub mod files;
pub mod logging;
pub mod markdown;
pub mod notice;
pub mod output;
pub mod shell;
