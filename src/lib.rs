//! # docqa
//!
//! Question answering over a collection of uploaded documents.
//!
//! Session state (active collection, ingested files, conversation) lives in
//! [`docqa_core`]. This crate supplies the concrete pieces around it:
//! format loaders, a local keyword-retrieval engine, upload storage,
//! configuration, logging, and the `docqa` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  CLI/chat  │──▶│ CollectionSession │──▶│ LocalEngine │
//! └────────────┘   └────────┬─────────┘   └──────┬──────┘
//!                           │                    │
//!                  ┌────────▼───────┐     ┌──────▼────────┐
//!                  │ Loaders (pdf,  │     │ InMemoryStore │
//!                  │ docx, xlsx...) │     └───────────────┘
//!                  └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docqa ingest ./reports --collection q3
//! docqa ask "What drove revenue growth?" --file report.pdf
//! docqa chat --collection research
//! docqa formats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`extract`] | Text extraction per format |
//! | [`loaders`] | Loader factories and the default registry |
//! | [`engine`] | Local keyword-retrieval engine |
//! | [`uploads`] | Upload write-through directory |
//! | [`progress`] | Batch ingestion progress on stderr |
//! | [`formats`] | Supported-formats table |
//! | [`commands`] | One-shot `ingest` and `ask` commands |
//! | [`chat`] | Interactive chat loop |

pub mod chat;
pub mod commands;
pub mod config;
pub mod engine;
pub mod extract;
pub mod formats;
pub mod loaders;
pub mod logging;
pub mod progress;
pub mod uploads;
