//! # Command Center Core
//!
//! Shared, I/O-free logic for Command Center: domain models, the markdown
//! block scanner and status-document parsers, the search index and query
//! engine, kanban/squad summaries, and the [`DataSource`](source::DataSource)
//! trait with its mock implementation.
//!
//! This crate contains no network, filesystem or runtime dependencies.
//! Repository-backed data sources, the CLI and the HTTP API live in the
//! `command-center` crate.

pub mod board;
pub mod daily;
pub mod markdown;
pub mod models;
pub mod search;
pub mod source;
pub mod working;
