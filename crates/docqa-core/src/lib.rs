//! # docqa Core
//!
//! Transport-agnostic orchestration for the docqa client: data models, the
//! [`RagService`](service::RagService) seam, the exclusive operation gate,
//! session state with upload/query/clear orchestration, and the answer
//! presentation contract.
//!
//! This crate performs no I/O of its own. It contains no HTTP client, no
//! async runtime, and no terminal handling; the `docqa` binary crate plugs
//! those in through the [`service`] and [`notify`] traits.

pub mod error;
pub mod gate;
pub mod models;
pub mod notify;
pub mod render;
pub mod service;
pub mod session;
