//! Kanban board, task views and squad summaries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Agent, AgentStatus, Column, Note, NoteType, Task, TaskStatus};

/// Notes grouped into the fixed column order, optionally one note type only.
pub fn board(notes: &[Note], note_type: Option<NoteType>) -> Vec<(Column, Vec<&Note>)> {
    Column::ALL
        .iter()
        .map(|col| {
            let in_column = notes
                .iter()
                .filter(|n| n.column == *col)
                .filter(|n| note_type.map_or(true, |t| n.note_type == t))
                .collect();
            (*col, in_column)
        })
        .collect()
}

/// Number of actions not yet done, across all notes.
pub fn pending_actions(notes: &[Note]) -> usize {
    notes
        .iter()
        .flat_map(|n| n.actions.iter())
        .filter(|a| !a.done)
        .count()
}

/// Move a note to another column. Returns `false` if no note has that id.
pub fn move_note(notes: &mut [Note], note_id: &str, column: Column) -> bool {
    match notes.iter_mut().find(|n| n.id == note_id) {
        Some(note) => {
            note.column = column;
            true
        }
        None => false,
    }
}

pub fn tasks_by_status(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

pub fn tasks_for_agent<'a>(tasks: &'a [Task], agent_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.assigned_to.iter().any(|a| a == agent_id))
        .collect()
}

/// Rank used by [`prioritized_tasks`]: lower sorts first.
pub fn task_priority(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Blocked => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Review => 2,
        TaskStatus::Assigned => 3,
        TaskStatus::Inbox => 4,
        TaskStatus::Done => 5,
    }
}

/// Tasks needing attention first: blocked, in progress, review, assigned,
/// inbox, done. Equal statuses keep their input order.
pub fn prioritized_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|t| task_priority(t.status));
    sorted
}

/// Tasks grouped by status in board order, optionally only one agent's.
pub fn task_board<'a>(
    tasks: &'a [Task],
    agent_id: Option<&str>,
) -> Vec<(TaskStatus, Vec<&'a Task>)> {
    let visible = match agent_id {
        Some(id) => tasks_for_agent(tasks, id),
        None => tasks.iter().collect(),
    };
    TaskStatus::ALL
        .iter()
        .map(|status| {
            let in_status = visible.iter().copied().filter(|t| t.status == *status).collect();
            (*status, in_status)
        })
        .collect()
}

/// Short human form of how long ago `then` was: `just now`, `5m ago`,
/// `3h ago`, `2d ago`, or the date itself after a week.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SquadCounts {
    pub working: usize,
    pub blocked: usize,
    pub idle: usize,
}

pub fn squad_counts(agents: &[Agent]) -> SquadCounts {
    agents
        .iter()
        .fold(SquadCounts::default(), |mut counts, agent| {
            match agent.status {
                AgentStatus::Working => counts.working += 1,
                AgentStatus::Blocked => counts.blocked += 1,
                AgentStatus::Idle => counts.idle += 1,
            }
            counts
        })
}
