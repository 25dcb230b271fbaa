//! # Command Center
//!
//! Search and dashboards over an agent squad's working repository: voice and
//! meeting notes, per-agent status documents, daily logs and long-term
//! memory.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────┐
//! │ ContentStore │──▶│ RepoDataSource │──▶│ SearchIndex  │
//! │ GitHub/Local │   │  (DataSource)  │   │  (core)      │
//! └──────────────┘   └───────┬────────┘   └──────┬───────┘
//!                            │                   │
//!                     ┌──────┴───────┬───────────┤
//!                     ▼              ▼           ▼
//!                ┌─────────┐   ┌──────────┐ ┌──────────┐
//!                │   CLI   │   │   HTTP   │ │ Session  │
//!                │ (cmdc)  │   │   API    │ │ debounce │
//!                └─────────┘   └──────────┘ └──────────┘
//! ```
//!
//! The pure logic (models, parsers, scoring) lives in
//! [`command_center_core`]. This crate adds I/O: configuration, content
//! stores, the repository-backed data source, the CLI views, the debounced
//! search session and the HTTP server.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`store`] | `ContentStore` trait and typed store errors |
//! | [`store_github`] | GitHub contents API store with TTL cache |
//! | [`store_local`] | Local checkout store |
//! | [`repo_source`] | Repository layout to `DataSource` |
//! | [`sources`] | Source selection from config |
//! | [`search`] | `search` and `interactive` commands |
//! | [`session`] | Debounced search-as-you-type |
//! | [`notes`] | Kanban board view |
//! | [`agents`] | Squad and agent detail views |
//! | [`tasks`] | Mission-control task list and status board |
//! | [`activity`] | Activity feed view |
//! | [`server`] | JSON HTTP API |

pub mod activity;
pub mod agents;
pub mod config;
pub mod notes;
pub mod repo_source;
pub mod search;
pub mod server;
pub mod session;
pub mod sources;
pub mod store;
pub mod store_github;
pub mod store_local;
pub mod tasks;
