//! Data source abstraction.
//!
//! The [`DataSource`] trait is the single seam between the dashboard and
//! wherever its records live. The hosting application constructs exactly one
//! implementation (mock fixtures, a GitHub repository, a local checkout) and
//! passes it explicitly to everything that needs data. There is no global
//! selection.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod mock;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Activity, Agent, AgentDetail, Note, SquadOverview, Task};
use crate::search::{build_index, IndexInputs, SearchIndex};

/// Abstract provider of notes, agents and activity.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`agents`](DataSource::agents) | Every agent in the squad |
/// | [`notes`](DataSource::notes) | Every voice and meeting note |
/// | [`activity`](DataSource::activity) | Activity stream, newest first |
/// | [`agent_detail`](DataSource::agent_detail) | One agent plus its status documents |
/// | [`squad_overview`](DataSource::squad_overview) | Agents with a refresh timestamp |
/// | [`memory`](DataSource::memory) | The long-term MEMORY.md document |
/// | [`tasks`](DataSource::tasks) | Mission-control tasks |
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name used in logs and `cmdc sources`.
    fn name(&self) -> &str;

    async fn agents(&self) -> Result<Vec<Agent>>;

    async fn notes(&self) -> Result<Vec<Note>>;

    async fn activity(&self) -> Result<Vec<Activity>>;

    /// `Ok(None)` when no agent has this id.
    async fn agent_detail(&self, agent_id: &str) -> Result<Option<AgentDetail>>;

    async fn squad_overview(&self) -> Result<SquadOverview>;

    async fn memory(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Sources that do not track tasks report none.
    async fn tasks(&self) -> Result<Vec<Task>> {
        Ok(Vec::new())
    }

    /// Forget cached content so the next fetch is fresh. Sources without a
    /// cache ignore this.
    fn invalidate(&self) {}
}

impl IndexInputs {
    /// Gather everything the index needs from `source`.
    ///
    /// Notes and agents are required. A detail or memory fetch that fails
    /// only drops that record and logs a warning.
    pub async fn collect(source: &dyn DataSource) -> Result<Self> {
        let notes = source.notes().await?;
        let agents = source.agents().await?;

        let mut agent_details = HashMap::new();
        for agent in &agents {
            match source.agent_detail(&agent.id).await {
                Ok(Some(detail)) => {
                    agent_details.insert(agent.id.clone(), detail);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(source = source.name(), agent = %agent.id, error = %e, "skipping agent detail");
                }
            }
        }

        let memory = match source.memory().await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(source = source.name(), error = %e, "skipping memory document");
                None
            }
        };

        Ok(Self {
            notes,
            agents,
            agent_details,
            memory,
        })
    }
}

/// Fetch everything from `source` and build a fresh index snapshot.
pub async fn index_from_source(source: &dyn DataSource) -> Result<SearchIndex> {
    let inputs = IndexInputs::collect(source).await?;
    Ok(build_index(&inputs))
}
