//! `cmdc agents` and `cmdc agent <id>`.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use command_center_core::board::{relative_time, squad_counts};
use command_center_core::models::{Agent, AgentDetail, SquadOverview};
use command_center_core::source::DataSource;
use command_center_core::working::parse_working_md;

pub async fn run_agents(source: &dyn DataSource, json: bool) -> Result<()> {
    let overview = source.squad_overview().await?;
    if json {
        let value = json!({
            "agents": overview.agents,
            "lastUpdated": overview.last_updated,
            "counts": squad_counts(&overview.agents),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_squad(&overview, Utc::now()));
    }
    Ok(())
}

pub async fn run_agent(source: &dyn DataSource, agent_id: &str, json: bool) -> Result<()> {
    let Some(detail) = source.agent_detail(agent_id).await? else {
        bail!("Agent not found: {}", agent_id);
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&detail_json(&detail))?);
    } else {
        print!("{}", format_detail(&detail, Utc::now()));
    }
    Ok(())
}

/// Agent detail plus the sections parsed out of its WORKING.md.
pub fn detail_json(detail: &AgentDetail) -> serde_json::Value {
    let parsed = parse_working_md(detail.working_md.as_deref().unwrap_or_default());
    json!({
        "agent": detail.agent,
        "workingMd": detail.working_md,
        "soulMd": detail.soul_md,
        "dailyNotes": detail.daily_notes,
        "parsed": {
            "focus": parsed.focus,
            "blockers": parsed.blockers,
            "activeTasks": parsed.active_tasks,
            "status": parsed.status,
        },
    })
}

pub fn format_squad(overview: &SquadOverview, now: DateTime<Utc>) -> String {
    let counts = squad_counts(&overview.agents);
    let mut out = format!(
        "Squad: {} working, {} blocked, {} idle (updated {})\n",
        counts.working,
        counts.blocked,
        counts.idle,
        relative_time(overview.last_updated, now)
    );
    for agent in &overview.agents {
        out.push_str(&format_agent_line(agent, now));
    }
    out
}

fn format_agent_line(agent: &Agent, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{} {:<10} {:<8} {:<20} {}\n",
        agent.emoji,
        agent.name,
        agent.status.as_str(),
        agent.role,
        relative_time(agent.last_active, now)
    );
    if let Some(focus) = &agent.focus {
        line.push_str(&format!("    focus: {}\n", focus));
    }
    for blocker in agent.blockers.iter().flatten() {
        line.push_str(&format!("    blocked: {}\n", blocker));
    }
    line
}

pub fn format_detail(detail: &AgentDetail, now: DateTime<Utc>) -> String {
    let agent = &detail.agent;
    let parsed = parse_working_md(detail.working_md.as_deref().unwrap_or_default());

    let mut out = format!(
        "{} {} ({}), {}\nstatus: {}\nlast active: {}\n",
        agent.emoji,
        agent.name,
        agent.id,
        agent.role,
        agent.status.as_str(),
        relative_time(agent.last_active, now)
    );
    if let Some(focus) = parsed.focus.as_ref().or(agent.focus.as_ref()) {
        out.push_str(&format!("focus: {}\n", focus));
    }
    if let Some(blockers) = &parsed.blockers {
        out.push_str("blockers:\n");
        for b in blockers {
            out.push_str(&format!("  - {}\n", b));
        }
    }
    if !parsed.active_tasks.is_empty() {
        out.push_str("active tasks:\n");
        for task in &parsed.active_tasks {
            out.push_str(&format!("  - [ ] {}\n", task));
        }
    }
    if !detail.daily_notes.is_empty() {
        out.push_str("daily notes:\n");
        for note in &detail.daily_notes {
            out.push_str(&format!("  {} ({} lines)\n", note.date, note.content.lines().count()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use command_center_core::source::mock::MockDataSource;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_format_squad() {
        let overview = MockDataSource::at(now()).squad_overview().await.unwrap();
        let text = format_squad(&overview, now());
        assert!(text.starts_with("Squad: 2 working, 1 blocked, 2 idle (updated just now)"));
        assert!(text.contains("blocked: "));
    }

    #[tokio::test]
    async fn test_format_detail() {
        let detail = MockDataSource::at(now())
            .agent_detail("intel")
            .await
            .unwrap()
            .unwrap();
        let text = format_detail(&detail, now());
        assert!(text.contains("(intel)"));
        assert!(text.contains("blockers:\n  - Waiting on external dependency"));
        assert!(text.contains("active tasks:\n  - [ ] Primary task in progress"));
        assert!(text.contains("daily notes:\n  2026-02-02"));
    }

    #[tokio::test]
    async fn test_detail_json_has_parsed_sections() {
        let detail = MockDataSource::at(now())
            .agent_detail("bam")
            .await
            .unwrap()
            .unwrap();
        let value = detail_json(&detail);
        assert_eq!(value["agent"]["id"], "bam");
        assert_eq!(value["parsed"]["activeTasks"].as_array().unwrap().len(), 2);
        assert_eq!(value["dailyNotes"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_detail_json_reports_declared_status() {
        let detail = MockDataSource::at(now())
            .agent_detail("intel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail_json(&detail)["parsed"]["status"], "blocked");
    }
}
