//! Repository-backed data source.
//!
//! [`RepoDataSource`] reads the squad's life-data repository through any
//! [`ContentStore`]. The repository layout is:
//!
//! ```text
//! agents/_registry.yaml        display metadata per agent
//! agents/<id>/WORKING.md       live status (required for the agent to appear)
//! agents/<id>/SOUL.md          persona
//! notes/voice/*.md             voice notes
//! notes/meetings/*.md          meeting notes
//! memory/daily/YYYY-MM-DD.md   squad daily logs (activity feed)
//! shared/memory/YYYY-MM-DD.md  shared daily notes (agent detail)
//! MEMORY.md                    long-term memory
//! ```
//!
//! A single unreadable file never fails the whole call: it is logged with
//! `tracing::warn!` and skipped.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use std::collections::HashMap;

use command_center_core::daily::parse_daily_activities;
use command_center_core::markdown::{frontmatter_list, frontmatter_str, split_frontmatter};
use command_center_core::models::{
    Action, Activity, Agent, AgentDetail, AgentStatus, Column, DailyNote, Note, NoteType,
    SquadOverview,
};
use command_center_core::source::DataSource;
use command_center_core::working::parse_working_md;

use crate::store::{read_optional, ContentStore, DirEntry, EntryKind, StoreError};

const AGENTS_DIR: &str = "agents";
const REGISTRY_PATH: &str = "agents/_registry.yaml";
const NOTE_DIRS: [(&str, NoteType); 2] = [
    ("notes/voice", NoteType::Voice),
    ("notes/meetings", NoteType::Meeting),
];
const ACTIVITY_DIR: &str = "memory/daily";
const SHARED_MEMORY_DIR: &str = "shared/memory";
const MEMORY_PATH: &str = "MEMORY.md";

/// How many of the newest daily logs are read.
const DAILY_WINDOW: usize = 7;

const DEFAULT_EMOJI: &str = "🤖";
const DEFAULT_ROLE: &str = "Agent";
const DEFAULT_COLOR: &str = "leo";

/// One entry of `agents/_registry.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryEntry {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub role: Option<String>,
    pub color: Option<String>,
    pub model: Option<String>,
    pub workspace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    agents: HashMap<String, RegistryEntry>,
}

/// Parse the agent registry. An empty document is an empty registry.
pub fn parse_registry(yaml: &str) -> Result<HashMap<String, RegistryEntry>> {
    if yaml.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let file: RegistryFile = serde_yaml::from_str(yaml)?;
    Ok(file.agents)
}

pub struct RepoDataSource<S> {
    store: S,
    name: String,
    daily_file: GlobMatcher,
    markdown_file: GlobMatcher,
}

impl<S: ContentStore> RepoDataSource<S> {
    pub fn new(store: S) -> Result<Self> {
        let name = store.describe();
        Ok(Self {
            store,
            name,
            daily_file: Glob::new("[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9].md")?.compile_matcher(),
            markdown_file: Glob::new("*.md")?.compile_matcher(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn registry(&self) -> HashMap<String, RegistryEntry> {
        let parsed = match read_optional(&self.store, REGISTRY_PATH).await {
            Ok(Some(yaml)) => parse_registry(&yaml),
            Ok(None) => {
                tracing::warn!(source = %self.name, "agent registry not found, using defaults");
                return HashMap::new();
            }
            Err(e) => Err(e.into()),
        };
        parsed.unwrap_or_else(|e| {
            tracing::warn!(source = %self.name, error = %e, "unreadable agent registry, using defaults");
            HashMap::new()
        })
    }

    async fn agent_ids(&self) -> Result<Vec<String>> {
        let entries = self.store.list_dir(AGENTS_DIR).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::Dir && !e.name.starts_with('_') && !e.name.starts_with('.'))
            .map(|e| e.name)
            .collect())
    }

    /// The newest `DAILY_WINDOW` files named `YYYY-MM-DD.md` under `dir`,
    /// newest first.
    async fn newest_daily_files(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        let mut files: Vec<DirEntry> = self
            .store
            .list_dir(dir)
            .await?
            .into_iter()
            .filter(|e| e.kind == EntryKind::File && self.daily_file.is_match(&e.name))
            .collect();
        files.sort_by(|a, b| b.name.cmp(&a.name));
        files.truncate(DAILY_WINDOW);
        Ok(files)
    }

    async fn load_agent(
        &self,
        id: &str,
        registry: &HashMap<String, RegistryEntry>,
    ) -> Result<Option<(Agent, String)>, StoreError> {
        let path = format!("{}/{}/WORKING.md", AGENTS_DIR, id);
        let Some(working) = read_optional(&self.store, &path).await? else {
            return Ok(None);
        };
        let agent = build_agent(id, &working, registry.get(id), Utc::now());
        Ok(Some((agent, working)))
    }

    async fn notes_in(&self, dir: &str, note_type: NoteType) -> Vec<Note> {
        let files = match self.store.list_dir(dir).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(source = %self.name, dir, error = %e, "could not list notes");
                return Vec::new();
            }
        };

        let today = Utc::now().date_naive();
        let mut notes = Vec::new();
        for file in files
            .iter()
            .filter(|f| f.kind == EntryKind::File && self.markdown_file.is_match(&f.name))
        {
            match self.store.read(&file.path).await {
                Ok(text) => notes.push(parse_note(&file.name, &text, note_type, today)),
                Err(e) => {
                    tracing::warn!(source = %self.name, path = %file.path, error = %e, "skipping note");
                }
            }
        }
        notes
    }
}

#[async_trait]
impl<S: ContentStore> DataSource for RepoDataSource<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn agents(&self) -> Result<Vec<Agent>> {
        let registry = self.registry().await;
        let mut agents = Vec::new();
        for id in self.agent_ids().await? {
            match self.load_agent(&id, &registry).await {
                Ok(Some((agent, _))) => agents.push(agent),
                Ok(None) => {
                    tracing::warn!(source = %self.name, agent = %id, "skipping agent without WORKING.md");
                }
                Err(e) => {
                    tracing::warn!(source = %self.name, agent = %id, error = %e, "skipping agent");
                }
            }
        }
        Ok(agents)
    }

    async fn notes(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        for (dir, note_type) in NOTE_DIRS {
            notes.extend(self.notes_in(dir, note_type).await);
        }
        // Stable: equal dates keep voice-before-meeting listing order.
        notes.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(notes)
    }

    async fn activity(&self) -> Result<Vec<Activity>> {
        let files = match self.newest_daily_files(ACTIVITY_DIR).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(source = %self.name, error = %e, "could not list daily logs");
                return Ok(Vec::new());
            }
        };

        let mut activities = Vec::new();
        for file in &files {
            let date = file.name.trim_end_matches(".md");
            match self.store.read(&file.path).await {
                Ok(text) => activities.extend(parse_daily_activities(&text, date)),
                Err(e) => {
                    tracing::warn!(source = %self.name, path = %file.path, error = %e, "skipping daily log");
                }
            }
        }
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }

    async fn agent_detail(&self, agent_id: &str) -> Result<Option<AgentDetail>> {
        if !self.agent_ids().await?.iter().any(|id| id == agent_id) {
            return Ok(None);
        }
        let registry = self.registry().await;
        let Some((agent, working)) = self.load_agent(agent_id, &registry).await? else {
            return Ok(None);
        };

        let soul_path = format!("{}/{}/SOUL.md", AGENTS_DIR, agent_id);
        let soul_md = match read_optional(&self.store, &soul_path).await {
            Ok(soul) => soul,
            Err(e) => {
                tracing::warn!(source = %self.name, path = %soul_path, error = %e, "skipping SOUL.md");
                None
            }
        };

        let mut daily_notes = Vec::new();
        match self.newest_daily_files(SHARED_MEMORY_DIR).await {
            Ok(files) => {
                for file in files {
                    match self.store.read(&file.path).await {
                        Ok(content) => daily_notes.push(DailyNote {
                            date: file.name.trim_end_matches(".md").to_string(),
                            content,
                        }),
                        Err(e) => {
                            tracing::warn!(source = %self.name, path = %file.path, error = %e, "skipping daily note");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(source = %self.name, error = %e, "could not list shared daily notes");
            }
        }

        Ok(Some(AgentDetail {
            agent,
            working_md: Some(working),
            soul_md,
            daily_notes,
        }))
    }

    async fn squad_overview(&self) -> Result<SquadOverview> {
        Ok(SquadOverview {
            agents: self.agents().await?,
            last_updated: Utc::now(),
        })
    }

    async fn memory(&self) -> Result<Option<String>> {
        Ok(read_optional(&self.store, MEMORY_PATH).await?)
    }

    fn invalidate(&self) {
        self.store.invalidate();
    }
}

/// Build an agent from its WORKING.md and registry entry.
pub fn build_agent(
    id: &str,
    working: &str,
    entry: Option<&RegistryEntry>,
    now: DateTime<Utc>,
) -> Agent {
    let (frontmatter, _) = split_frontmatter(working);
    let parsed = parse_working_md(working);

    let status = map_status(frontmatter_str(frontmatter.as_ref(), "status").as_deref());

    let focus = parsed
        .focus
        .or_else(|| frontmatter_str(frontmatter.as_ref(), "focus"))
        .filter(|f| !f.trim().is_empty());

    let last_active = frontmatter_str(frontmatter.as_ref(), "lastActive")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    let pick = |field: Option<&String>, default: &str| {
        field
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    Agent {
        id: id.to_string(),
        name: pick(entry.and_then(|e| e.name.as_ref()), &capitalize(id)),
        emoji: pick(entry.and_then(|e| e.emoji.as_ref()), DEFAULT_EMOJI),
        role: pick(entry.and_then(|e| e.role.as_ref()), DEFAULT_ROLE),
        status,
        focus,
        blockers: parsed.blockers,
        last_active,
        color: pick(entry.and_then(|e| e.color.as_ref()), DEFAULT_COLOR),
    }
}

/// Build a note from one markdown file. Frontmatter keys: `id`, `title`,
/// `created`, `summary`, `tags`, `actionItems`, `status`.
pub fn parse_note(file_name: &str, text: &str, note_type: NoteType, today: NaiveDate) -> Note {
    let (frontmatter, body) = split_frontmatter(text);
    let fm = frontmatter.as_ref();
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);

    let date = frontmatter_str(fm, "created")
        .map(|created| created.split('T').next().unwrap_or_default().to_string())
        .filter(|d| !d.is_empty())
        .or_else(|| date_in_name(file_name))
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    Note {
        id: frontmatter_str(fm, "id").unwrap_or_else(|| stem.to_string()),
        note_type,
        title: frontmatter_str(fm, "title").unwrap_or_else(|| stem.to_string()),
        synopsis: frontmatter_str(fm, "summary").unwrap_or_default(),
        takeaways: frontmatter_list(fm, "tags"),
        actions: frontmatter_list(fm, "actionItems")
            .into_iter()
            .map(|text| Action { text, done: false })
            .collect(),
        transcript: body.trim().to_string(),
        date,
        column: column_for_status(frontmatter_str(fm, "status").as_deref()),
    }
}

/// Squad status from the WORKING.md frontmatter `status` key. Body text and
/// other words never promote an agent out of idle.
fn map_status(status: Option<&str>) -> AgentStatus {
    match status {
        Some("active") | Some("busy") => AgentStatus::Working,
        Some("offline") => AgentStatus::Blocked,
        _ => AgentStatus::Idle,
    }
}

fn column_for_status(status: Option<&str>) -> Column {
    match status {
        Some("ready") => Column::Action,
        Some("archived") => Column::Done,
        _ => Column::Inbox,
    }
}

/// First `YYYY-MM-DD` embedded anywhere in a file name.
fn date_in_name(name: &str) -> Option<String> {
    name.char_indices().find_map(|(i, _)| {
        let candidate = name.get(i..i + 10)?;
        NaiveDate::parse_from_str(candidate, "%Y-%m-%d")
            .ok()
            .filter(|_| candidate.as_bytes()[4] == b'-' && candidate.as_bytes()[7] == b'-')
            .map(|_| candidate.to_string())
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    #[test]
    fn test_parse_registry() {
        let yaml = "agents:\n  bam:\n    name: Bam\n    emoji: \"🦊\"\n    role: Lead\n    color: orange\n    model: opus\n";
        let registry = parse_registry(yaml).unwrap();
        let bam = &registry["bam"];
        assert_eq!(bam.name.as_deref(), Some("Bam"));
        assert_eq!(bam.color.as_deref(), Some("orange"));
        assert_eq!(bam.model.as_deref(), Some("opus"));
        assert!(parse_registry("").unwrap().is_empty());
        assert!(parse_registry("agents: [1, 2").is_err());
    }

    #[test]
    fn test_build_agent_defaults() {
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap();
        let agent = build_agent("murphie", "# nothing here\n", None, now);
        assert_eq!(agent.name, "Murphie");
        assert_eq!(agent.emoji, "🤖");
        assert_eq!(agent.role, "Agent");
        assert_eq!(agent.color, "leo");
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.last_active, now);
        assert!(agent.focus.is_none());
    }

    #[test]
    fn test_build_agent_from_working_and_registry() {
        let working = "---\nstatus: busy\nfocus: Fallback focus\nlastActive: 2026-02-01T08:30:00Z\n---\n\n## Blockers\n- Waiting on credentials\n";
        let entry = RegistryEntry {
            name: Some("Eight".into()),
            emoji: Some("🎱".into()),
            ..Default::default()
        };
        let now = Utc::now();
        let agent = build_agent("eight", working, Some(&entry), now);
        assert_eq!(agent.name, "Eight");
        assert_eq!(agent.emoji, "🎱");
        assert_eq!(agent.role, "Agent");
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.focus.as_deref(), Some("Fallback focus"));
        assert_eq!(agent.blockers, Some(vec!["Waiting on credentials".to_string()]));
        assert_eq!(
            agent.last_active,
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_offline_is_blocked() {
        let agent = build_agent("intel", "---\nstatus: offline\n---\n", None, Utc::now());
        assert_eq!(agent.status, AgentStatus::Blocked);
    }

    #[test]
    fn test_status_only_from_frontmatter_words() {
        let now = Utc::now();
        for working in [
            "---\nstatus: working\n---\n",
            "---\nstatus: blocked\n---\n",
            "# WORKING\n\nstatus: active\n",
        ] {
            assert_eq!(
                build_agent("eight", working, None, now).status,
                AgentStatus::Idle,
                "{:?}",
                working
            );
        }
        let active = build_agent("eight", "---\nstatus: active\n---\n", None, now);
        assert_eq!(active.status, AgentStatus::Working);
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status(Some("active")), AgentStatus::Working);
        assert_eq!(map_status(Some("busy")), AgentStatus::Working);
        assert_eq!(map_status(Some("offline")), AgentStatus::Blocked);
        assert_eq!(map_status(Some("idle")), AgentStatus::Idle);
        assert_eq!(map_status(None), AgentStatus::Idle);
    }

    #[test]
    fn test_parse_note_frontmatter() {
        let text = "---\nid: vn-42\ntitle: Dealership sync\ncreated: 2026-01-30T09:15:00Z\nsummary: Weekly check-in\ntags:\n  - GA4 is live\nactionItems:\n  - Send the report\nstatus: ready\n---\n\nFull transcript here.\n";
        let note = parse_note("whatever.md", text, NoteType::Meeting, today());
        assert_eq!(note.id, "vn-42");
        assert_eq!(note.title, "Dealership sync");
        assert_eq!(note.date, "2026-01-30");
        assert_eq!(note.synopsis, "Weekly check-in");
        assert_eq!(note.takeaways, vec!["GA4 is live"]);
        assert_eq!(note.actions.len(), 1);
        assert!(!note.actions[0].done);
        assert_eq!(note.column, Column::Action);
        assert_eq!(note.transcript, "Full transcript here.");
    }

    #[test]
    fn test_parse_note_fallbacks() {
        let note = parse_note("2026-01-15-standup.md", "Just text.", NoteType::Voice, today());
        assert_eq!(note.id, "2026-01-15-standup");
        assert_eq!(note.title, "2026-01-15-standup");
        assert_eq!(note.date, "2026-01-15");
        assert_eq!(note.column, Column::Inbox);

        let undated = parse_note("idea.md", "", NoteType::Voice, today());
        assert_eq!(undated.date, "2026-02-02");
    }

    #[test]
    fn test_column_mapping() {
        assert_eq!(column_for_status(Some("processing")), Column::Inbox);
        assert_eq!(column_for_status(Some("ready")), Column::Action);
        assert_eq!(column_for_status(Some("archived")), Column::Done);
        assert_eq!(column_for_status(Some("weird")), Column::Inbox);
        assert_eq!(column_for_status(None), Column::Inbox);
    }

    #[test]
    fn test_date_in_name() {
        assert_eq!(date_in_name("meeting-2026-02-01.md").as_deref(), Some("2026-02-01"));
        assert_eq!(date_in_name("no-date.md"), None);
        assert_eq!(date_in_name("2026-13-40.md"), None);
    }
}
