//! `cmdc tasks`: mission-control tasks as a priority list or a status board.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use command_center_core::board::{prioritized_tasks, relative_time, task_board, tasks_for_agent};
use command_center_core::models::{Task, TaskStatus};
use command_center_core::source::DataSource;

/// Which tasks to show.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub agent: Option<String>,
}

impl TaskFilter {
    pub fn parse(status: Option<&str>, agent: Option<&str>) -> Result<Self> {
        let status = match status {
            None => None,
            Some(raw) => match TaskStatus::parse(raw) {
                Some(s) => Some(s),
                None => bail!(
                    "Unknown task status: '{}'. Use inbox, assigned, in_progress, review, done or blocked.",
                    raw
                ),
            },
        };
        Ok(Self {
            status,
            agent: agent.map(str::to_string).filter(|a| !a.is_empty()),
        })
    }
}

pub async fn run_tasks(
    source: &dyn DataSource,
    filter: &TaskFilter,
    board: bool,
    json: bool,
) -> Result<()> {
    let tasks = source.tasks().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks_json(&tasks, filter, board))?);
    } else if board {
        print!("{}", format_task_board(&tasks, filter, Utc::now()));
    } else {
        let selected = select_tasks(&tasks, filter);
        if selected.is_empty() {
            println!("No tasks.");
        } else {
            print!("{}", format_task_list(&selected, Utc::now()));
        }
    }
    Ok(())
}

/// Filtered tasks, most urgent first.
pub fn select_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let visible = match filter.agent.as_deref() {
        Some(agent) => tasks_for_agent(tasks, agent),
        None => tasks.iter().collect(),
    };
    prioritized_tasks(
        visible
            .into_iter()
            .filter(|t| filter.status.map_or(true, |s| t.status == s)),
    )
}

/// `{"tasks": [...]}` in priority order, or `{"columns": [...]}` for the board.
pub fn tasks_json(tasks: &[Task], filter: &TaskFilter, board: bool) -> serde_json::Value {
    if !board {
        return json!({ "tasks": select_tasks(tasks, filter) });
    }
    let columns: Vec<serde_json::Value> = task_board(tasks, filter.agent.as_deref())
        .into_iter()
        .filter(|(status, _)| filter.status.map_or(true, |s| s == *status))
        .map(|(status, in_status)| {
            json!({
                "status": status,
                "label": status.label(),
                "tasks": in_status,
            })
        })
        .collect();
    json!({ "columns": columns })
}

pub fn format_task_list(tasks: &[&Task], now: DateTime<Utc>) -> String {
    tasks.iter().map(|t| format_task_line(t, now)).collect()
}

fn assignees(task: &Task) -> String {
    if task.assigned_to.is_empty() {
        "?".to_string()
    } else {
        task.assigned_to.join(",")
    }
}

fn format_task_line(task: &Task, now: DateTime<Utc>) -> String {
    format!(
        "[{:<11}] {:<48} {:<14} {}\n    {}\n",
        task.status.label(),
        task.title,
        assignees(task),
        relative_time(task.updated_at, now),
        task.description
    )
}

pub fn format_task_board(tasks: &[Task], filter: &TaskFilter, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for (status, in_status) in task_board(tasks, filter.agent.as_deref()) {
        if filter.status.is_some_and(|s| s != status) {
            continue;
        }
        out.push_str(&format!("{} ({})\n", status.label(), in_status.len()));
        for task in in_status {
            out.push_str(&format!(
                "  - {} [{}] {}\n",
                task.title,
                assignees(task),
                relative_time(task.updated_at, now)
            ));
        }
    }
    out
}
