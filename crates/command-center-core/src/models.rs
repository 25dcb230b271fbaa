//! Domain records supplied by data sources.
//!
//! Notes feed the kanban board. Agents, their detail documents and tasks feed
//! the squad view. Notes, agents and detail documents are flattened into
//! [`SearchableItem`](crate::search::SearchableItem)s when an index is built;
//! tasks and activities are not searched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of recording a note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Voice,
    Meeting,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Voice => "voice",
            NoteType::Meeting => "meeting",
        }
    }
}

/// Kanban column a note currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Inbox,
    Review,
    Action,
    Done,
}

impl Column {
    /// Board order, left to right.
    pub const ALL: [Column; 4] = [Column::Inbox, Column::Review, Column::Action, Column::Done];

    pub fn label(&self) -> &'static str {
        match self {
            Column::Inbox => "Inbox",
            Column::Review => "Review",
            Column::Action => "Action",
            Column::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inbox" => Some(Column::Inbox),
            "review" => Some(Column::Review),
            "action" => Some(Column::Action),
            "done" => Some(Column::Done),
            _ => None,
        }
    }
}

/// A follow-up item attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub text: String,
    pub done: bool,
}

/// A voice or meeting note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub title: String,
    pub synopsis: String,
    pub takeaways: Vec<String>,
    pub actions: Vec<Action>,
    pub transcript: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub column: Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Working,
    Blocked,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Working => "working",
            AgentStatus::Blocked => "blocked",
        }
    }
}

/// An agent in the squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub role: String,
    pub status: AgentStatus,
    pub focus: Option<String>,
    pub blockers: Option<Vec<String>>,
    pub last_active: DateTime<Utc>,
    pub color: String,
}

/// Where a mission-control task stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Inbox,
    Assigned,
    InProgress,
    Review,
    Done,
    Blocked,
}

impl TaskStatus {
    /// Board order, left to right.
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Inbox,
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Inbox => "inbox",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Inbox => "Inbox",
            TaskStatus::Assigned => "Assigned",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
        }
    }

    /// Accepts `in_progress`, `in-progress` and any casing.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|st| st.as_str() == wanted)
    }
}

/// A unit of work tracked for the squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Agent ids. Empty means unassigned.
    pub assigned_to: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One dated entry of an agent's daily log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNote {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Raw markdown.
    pub content: String,
}

/// An agent together with its long-form status documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub agent: Agent,
    /// Raw WORKING.md, if the agent has one.
    pub working_md: Option<String>,
    /// Raw SOUL.md, if the agent has one.
    pub soul_md: Option<String>,
    /// Recent daily notes, newest first.
    pub daily_notes: Vec<DailyNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    TaskCreated,
    TaskAssigned,
    StatusChanged,
    CommentPosted,
    DocumentCreated,
    AgentStatus,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::TaskCreated => "task_created",
            ActivityType::TaskAssigned => "task_assigned",
            ActivityType::StatusChanged => "status_changed",
            ActivityType::CommentPosted => "comment_posted",
            ActivityType::DocumentCreated => "document_created",
            ActivityType::AgentStatus => "agent_status",
        }
    }
}

/// An entry in the activity stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub agent_id: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the whole squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadOverview {
    pub agents: Vec<Agent>,
    pub last_updated: DateTime<Utc>,
}
