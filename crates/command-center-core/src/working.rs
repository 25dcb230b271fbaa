//! WORKING.md parsing.
//!
//! An agent's WORKING.md is its live status board: a frontmatter block with
//! the coarse status, then `## Current Focus`, `## Active Tasks` and
//! `## Blockers` sections. [`parse_working_md`] extracts those into a
//! [`ParsedWorkingMd`].

use serde::Serialize;

use crate::markdown::{frontmatter_str, scan_blocks, section, section_any, split_frontmatter, Block};

/// Coarse status as written by the agent itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingStatus {
    Active,
    Idle,
    Blocked,
}

impl WorkingStatus {
    /// Map a raw status word. Unknown words yield `None`.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "active" | "working" | "busy" => Some(WorkingStatus::Active),
            "blocked" | "offline" => Some(WorkingStatus::Blocked),
            "idle" => Some(WorkingStatus::Idle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedWorkingMd {
    pub focus: Option<String>,
    pub blockers: Option<Vec<String>>,
    pub active_tasks: Vec<String>,
    pub status: Option<WorkingStatus>,
}

/// Placeholder focus lines that mean "nothing in progress".
const IDLE_FOCUS: [&str; 2] = ["None", "Awaiting assignment"];

pub fn parse_working_md(content: &str) -> ParsedWorkingMd {
    if content.trim().is_empty() {
        return ParsedWorkingMd::default();
    }

    let (frontmatter, body) = split_frontmatter(content);
    let blocks = scan_blocks(body);

    let focus = section(&blocks, "Current Focus").and_then(|blocks| {
        blocks
            .iter()
            .filter_map(Block::line_text)
            .find(|line| !line.starts_with('_') && !IDLE_FOCUS.contains(line))
            .map(str::to_string)
    });

    let blockers = section_any(&blocks, &["Blockers", "Blocker"]).and_then(|blocks| {
        let explicitly_none = blocks.iter().filter_map(Block::line_text).any(|line| {
            line.contains("_None") || line.contains("No blockers")
        });
        if explicitly_none {
            return None;
        }
        let lines: Vec<String> = blocks
            .iter()
            .filter_map(Block::line_text)
            .filter(|line| !line.starts_with('_'))
            .map(str::to_string)
            .collect();
        (!lines.is_empty()).then_some(lines)
    });

    let active_tasks = section_any(&blocks, &["Active Tasks", "Active Task"])
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| match b {
                    Block::Checklist { checked: false, text } if !text.is_empty() => {
                        Some(text.clone())
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let status = frontmatter_str(frontmatter.as_ref(), "status")
        .and_then(|s| WorkingStatus::from_word(&s))
        .or_else(|| find_status_line(body));

    ParsedWorkingMd {
        focus,
        blockers,
        active_tasks,
        status,
    }
}

/// First `status: <word>` in free text whose word is a known status.
fn find_status_line(text: &str) -> Option<WorkingStatus> {
    let lower = text.to_lowercase();
    lower.match_indices("status:").find_map(|(i, m)| {
        let word: String = lower[i + m.len()..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect();
        WorkingStatus::from_word(&word)
    })
}
