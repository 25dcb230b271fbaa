//! In-memory [`DataSource`] backed by fixed fixtures.
//!
//! Used for development, demos and tests. Relative timestamps (last active,
//! activity times, daily note dates) are computed from a reference instant,
//! so a source built with [`MockDataSource::at`] is fully deterministic.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::{
    Action, Activity, ActivityType, Agent, AgentDetail, AgentStatus, Column, DailyNote, Note,
    NoteType, SquadOverview, Task, TaskStatus,
};

use super::DataSource;

/// Number of synthesized daily notes per agent.
const MOCK_DAILY_NOTES: i64 = 5;

pub struct MockDataSource {
    now: DateTime<Utc>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Fixtures relative to a fixed reference instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn agents(&self) -> Result<Vec<Agent>> {
        Ok(mock_agents_at(self.now))
    }

    async fn notes(&self) -> Result<Vec<Note>> {
        Ok(sample_notes())
    }

    async fn activity(&self) -> Result<Vec<Activity>> {
        let mut activity = mock_activity_at(self.now);
        activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activity)
    }

    async fn agent_detail(&self, agent_id: &str) -> Result<Option<AgentDetail>> {
        let Some(agent) = mock_agents_at(self.now).into_iter().find(|a| a.id == agent_id) else {
            return Ok(None);
        };

        let working_md = mock_working_md(&agent);
        let soul_md = mock_soul_md(&agent);
        let daily_notes = (0..MOCK_DAILY_NOTES)
            .map(|i| {
                let date = (self.now - Duration::days(i)).format("%Y-%m-%d").to_string();
                DailyNote {
                    content: mock_daily_note(&agent, &date),
                    date,
                }
            })
            .collect();

        Ok(Some(AgentDetail {
            agent,
            working_md: Some(working_md),
            soul_md: Some(soul_md),
            daily_notes,
        }))
    }

    async fn squad_overview(&self) -> Result<SquadOverview> {
        Ok(SquadOverview {
            agents: mock_agents_at(self.now),
            last_updated: self.now,
        })
    }

    async fn memory(&self) -> Result<Option<String>> {
        Ok(Some(MOCK_MEMORY.to_string()))
    }

    async fn tasks(&self) -> Result<Vec<Task>> {
        Ok(mock_tasks_at(self.now))
    }
}

const MOCK_MEMORY: &str = "# MEMORY.md

## People
- Brad owns the GA4 data exports and prefers CSV over JSON
- O'Neil approves budget for Sam Boswell rooftops

## Decisions
- Plaud notes sync into the kanban inbox automatically
- Visual regression runs nightly before the morning briefing
";

fn mock_working_md(agent: &Agent) -> String {
    let status_line = match agent.status {
        AgentStatus::Working => "🟢 Active",
        AgentStatus::Blocked => "🔴 Blocked",
        AgentStatus::Idle => "⚪ Idle",
    };
    let blockers = if agent.status == AgentStatus::Blocked {
        "- Waiting on external dependency"
    } else {
        "_None currently_"
    };
    format!(
        "---
id: {id}
status: {status}
focus: {focus_fm}
lastActive: {last_active}
---

# WORKING.md - Current State

## Status: {status_line}

## Current Focus
{focus}

## Active Tasks
- [ ] Primary task in progress
- [ ] Secondary follow-up item
- [x] Previously completed item

## Blockers
{blockers}

## Recent Completions
- Completed initial setup (yesterday)
- Reviewed project requirements (2 days ago)
",
        id = agent.id,
        status = agent.status.as_str(),
        focus_fm = agent.focus.as_deref().unwrap_or("None"),
        last_active = agent.last_active.to_rfc3339(),
        focus = agent.focus.as_deref().unwrap_or("Awaiting assignment"),
    )
}

fn mock_soul_md(agent: &Agent) -> String {
    let (mission, personality, expertise) = match agent.id.as_str() {
        "bam" => (
            "Architect and guide the AI agent ecosystem, ensuring seamless collaboration between agents.",
            ["Strategic thinker", "Systems architect", "Collaborative leader"],
            ["AI Architecture", "Agent Coordination", "System Design"],
        ),
        "eight" => (
            "Build and maintain dealership integrations with pixel-perfect attention to detail.",
            ["Detail-oriented", "Dealership domain expert", "Integration specialist"],
            ["GA4 Integration", "Dealership Systems", "Web Development"],
        ),
        "murphie" => (
            "Ensure quality through comprehensive testing, visual regression, and automated QA.",
            ["Quality obsessed", "Visual-first mindset", "Thorough and methodical"],
            ["Visual Testing", "Playwright/Puppeteer", "QA Automation"],
        ),
        "daily" => (
            "Synthesize information from multiple sources into actionable daily briefings.",
            ["Information synthesizer", "Clear communicator", "Early riser"],
            ["Information Synthesis", "Report Generation", "Calendar Integration"],
        ),
        "intel" => (
            "Research, analyze, and provide strategic intelligence on competitors and markets.",
            ["Analytical mind", "Research-driven", "Pattern recognition"],
            ["Market Research", "Competitive Analysis", "Data Mining"],
        ),
        _ => (
            "Support the team with specialized capabilities.",
            ["Dedicated team member", "Problem solver", "Continuous learner"],
            ["General Development", "Problem Solving", "Documentation"],
        ),
    };
    let bullets = |items: [&str; 3]| {
        items
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "---
id: {id}
name: {name}
emoji: \"{emoji}\"
role: {role}
version: 1.0.0
---

# SOUL.md - {name}

You're the **{name}** {emoji}

## Mission
{mission}

## Personality
{personality}

## Expertise Areas
{expertise}

## Communication Style
- Evidence-based approach
- Clear and concise updates
- Proactive problem identification

## Values
- Quality over speed
- Continuous improvement
- Team collaboration
",
        id = agent.id,
        name = agent.name,
        emoji = agent.emoji,
        role = agent.role,
        personality = bullets(personality),
        expertise = bullets(expertise),
    )
}

fn mock_daily_note(agent: &Agent, date: &str) -> String {
    format!(
        "# Daily Notes - {date}

## Morning
- Started work on {focus}
- Reviewed overnight updates

## Progress
- Made progress on primary objectives
- Addressed blocking issues

## Notes
- Context for tomorrow: continue current focus
",
        focus = agent.focus.as_deref().unwrap_or("project tasks"),
    )
}

/// The five fixture agents, with activity times relative to `now`.
pub fn mock_agents_at(now: DateTime<Utc>) -> Vec<Agent> {
    let agent = |id: &str,
                 name: &str,
                 emoji: &str,
                 role: &str,
                 status: AgentStatus,
                 focus: Option<&str>,
                 blockers: Option<Vec<&str>>,
                 ago: Duration,
                 color: &str| Agent {
        id: id.to_string(),
        name: name.to_string(),
        emoji: emoji.to_string(),
        role: role.to_string(),
        status,
        focus: focus.map(str::to_string),
        blockers: blockers.map(|b| b.into_iter().map(str::to_string).collect()),
        last_active: now - ago,
        color: color.to_string(),
    };

    vec![
        agent("bam", "Bam", "💥", "AI Architect", AgentStatus::Idle, None, None, Duration::minutes(5), "leo"),
        agent(
            "eight",
            "Eight",
            "🏢",
            "Dealership Dev",
            AgentStatus::Working,
            Some("GA4 integration for Sam Boswell"),
            None,
            Duration::seconds(30),
            "raph",
        ),
        agent(
            "murphie",
            "Murphie",
            "🧪",
            "QA Specialist",
            AgentStatus::Working,
            Some("Visual regression test suite"),
            None,
            Duration::minutes(2),
            "donnie",
        ),
        agent(
            "daily",
            "Daily Brief",
            "📰",
            "Strategic Synthesis",
            AgentStatus::Idle,
            None,
            None,
            Duration::hours(8),
            "mikey",
        ),
        agent(
            "intel",
            "Molt Intel",
            "🔍",
            "Research & Analysis",
            AgentStatus::Blocked,
            Some("Competitor pricing analysis"),
            Some(vec!["Waiting on API credentials for automotive data provider"]),
            Duration::minutes(45),
            "leo",
        ),
    ]
}

pub fn mock_agents() -> Vec<Agent> {
    mock_agents_at(Utc::now())
}

pub fn sample_notes() -> Vec<Note> {
    let note = |id: &str,
                note_type: NoteType,
                title: &str,
                synopsis: &str,
                takeaways: &[&str],
                actions: &[(&str, bool)],
                transcript: &str,
                date: &str,
                column: Column| Note {
        id: id.to_string(),
        note_type,
        title: title.to_string(),
        synopsis: synopsis.to_string(),
        takeaways: takeaways.iter().map(|t| t.to_string()).collect(),
        actions: actions
            .iter()
            .map(|(text, done)| Action {
                text: text.to_string(),
                done: *done,
            })
            .collect(),
        transcript: transcript.to_string(),
        date: date.to_string(),
        column,
    };

    vec![
        note(
            "1",
            NoteType::Voice,
            "Testing the New Recording Device Functionality",
            "An exploration of a new recording device to determine if it captures audio continuously or only generates summaries.",
            &[
                "The speaker is unsure about the functionality of a new recording device",
                "The primary question is whether the device records everything continuously or only creates summaries",
                "A test is being conducted to understand the device behavior",
            ],
            &[
                ("Test the mark feature by pushing the button and reviewing the output", false),
                ("Verify if the device records all words or only creates summaries", true),
            ],
            "00:00:28\nSo this is my new recording device that I'm using right now. And I'm trying to see if it's recording me.\n\n00:00:55\nSo it's not going to record every word, I guess. It's just going to record highlights about the things that I'm saying.",
            "2026-02-01",
            Column::Inbox,
        ),
        note(
            "2",
            NoteType::Voice,
            "Quick idea: Dealership dashboard redesign",
            "Thoughts on simplifying the main dashboard view for dealership managers.",
            &[
                "Current dashboard is too cluttered",
                "Need KPI widgets front and center",
                "Mobile view needs complete rethink",
            ],
            &[],
            "00:00:05\nJust had a thought about the dashboard...",
            "2026-01-31",
            Column::Review,
        ),
        note(
            "3",
            NoteType::Voice,
            "Reminder: Call Brad about data export",
            "Need to follow up with Brad on the GA4 data format.",
            &["Brad prefers CSV over JSON", "Weekly exports on Mondays"],
            &[("Schedule call with Brad", false)],
            "00:00:02\nDon't forget to call Brad...",
            "2026-02-02",
            Column::Action,
        ),
        note(
            "4",
            NoteType::Meeting,
            "Sam Boswell Q1 Planning Discussion",
            "Quarterly planning meeting with O'Neil and Brad to discuss marketing strategy and GA4 integration timeline.",
            &[
                "GA4 integration is priority for Q1",
                "Brad will provide historical data by Feb 15",
                "O'Neil approved budget for additional rooftop rollout",
            ],
            &[
                ("Schedule follow-up with Brad on data format", false),
                ("Draft integration timeline document", false),
                ("Send O'Neil the revised proposal", false),
            ],
            "00:01:12\nAlright, so let's talk about Q1 priorities for Sam Boswell...",
            "2026-02-01",
            Column::Inbox,
        ),
        note(
            "5",
            NoteType::Meeting,
            "Vendor call with Analytics provider",
            "Discussion about API limits and pricing tiers for scaled usage.",
            &[
                "Current tier allows 10k calls per day",
                "Enterprise tier needed for multi-rooftop",
                "They offered 20% discount for annual commit",
            ],
            &[
                ("Compare pricing with alternatives", false),
                ("Get approval from O'Neil for annual commit", false),
            ],
            "00:00:30\nThanks for hopping on this call...",
            "2026-01-30",
            Column::Action,
        ),
        note(
            "6",
            NoteType::Meeting,
            "Shawn sync: Next Automotive roadmap",
            "Weekly sync with Shawn on consulting pipeline and deliverables.",
            &[
                "Two new leads in pipeline",
                "Sam Boswell expansion on track",
                "Need to hire contractor for frontend",
            ],
            &[
                ("Review contractor candidates", true),
                ("Prep deck for new lead pitch", false),
            ],
            "00:00:15\nHey, let's go through the week...",
            "2026-01-29",
            Column::Review,
        ),
    ]
}

pub fn mock_activity_at(now: DateTime<Utc>) -> Vec<Activity> {
    let entries: [(&str, ActivityType, &str, &str, Duration); 15] = [
        ("act-1", ActivityType::StatusChanged, "eight", "Started working on \"GA4 event tracking for VDP pages\"", Duration::seconds(30)),
        ("act-2", ActivityType::TaskCreated, "bam", "Created task \"PDF report generator for Murphie\"", Duration::minutes(30)),
        ("act-3", ActivityType::CommentPosted, "murphie", "Commented on \"Visual testing pipeline\": \"Playwright integration working, need screenshot diff setup\"", Duration::minutes(45)),
        ("act-4", ActivityType::StatusChanged, "intel", "Marked \"Competitor pricing scraper\" as blocked - waiting on API access", Duration::hours(1)),
        ("act-5", ActivityType::TaskAssigned, "bam", "Assigned \"Review Plaud kanban mobile UX\" to Murphie", Duration::hours(2)),
        ("act-6", ActivityType::DocumentCreated, "daily", "Generated morning briefing for Feb 2", Duration::hours(8)),
        ("act-7", ActivityType::StatusChanged, "daily", "Went idle after completing briefing", Duration::hours(8)),
        ("act-8", ActivityType::TaskCreated, "eight", "Created task \"Junction table migration\"", Duration::hours(12)),
        ("act-9", ActivityType::StatusChanged, "murphie", "Started working on \"Visual regression test suite\"", Duration::hours(14)),
        ("act-10", ActivityType::TaskAssigned, "bam", "Assigned \"GA4 event tracking\" to Eight", Duration::days(2)),
        ("act-11", ActivityType::CommentPosted, "intel", "Commented on pricing analysis: \"Found 3 competitors with similar feature sets\"", Duration::days(2)),
        ("act-12", ActivityType::StatusChanged, "eight", "Completed \"Rooftop selector component\"", Duration::days(3)),
        ("act-13", ActivityType::AgentStatus, "bam", "Session started - reviewing agent architecture", Duration::minutes(5)),
        ("act-14", ActivityType::DocumentCreated, "murphie", "Created QA checklist for mobile testing", Duration::hours(4)),
        ("act-15", ActivityType::TaskCreated, "intel", "Created research brief \"AI coding assistants market analysis\"", Duration::days(5)),
    ];

    entries
        .into_iter()
        .map(|(id, activity_type, agent_id, description, ago)| Activity {
            id: id.to_string(),
            activity_type,
            agent_id: agent_id.to_string(),
            description: description.to_string(),
            timestamp: now - ago,
        })
        .collect()
}

pub fn mock_tasks_at(now: DateTime<Utc>) -> Vec<Task> {
    let tasks: [(&str, &str, &str, TaskStatus, &[&str], Duration, Duration); 7] = [
        (
            "task-1",
            "GA4 event tracking for VDP pages",
            "Implement Google Analytics 4 event tracking for all vehicle detail pages across Sam Boswell rooftops.",
            TaskStatus::InProgress,
            &["eight"],
            Duration::days(2),
            Duration::minutes(30),
        ),
        (
            "task-2",
            "Set up Murphie visual testing pipeline",
            "Configure agent-browser integration for automated visual regression tests.",
            TaskStatus::InProgress,
            &["murphie"],
            Duration::days(3),
            Duration::minutes(2),
        ),
        (
            "task-3",
            "Competitor pricing scraper - blocked on access",
            "Need API credentials for automotive data provider.",
            TaskStatus::Blocked,
            &["intel"],
            Duration::days(5),
            Duration::minutes(45),
        ),
        (
            "task-4",
            "Review Plaud kanban mobile UX",
            "Test the new mobile-optimized kanban on actual devices.",
            TaskStatus::Review,
            &["bam", "murphie"],
            Duration::days(1),
            Duration::minutes(10),
        ),
        (
            "task-5",
            "Morning briefing automation",
            "Auto-generate daily briefings from calendar, emails, and project updates.",
            TaskStatus::Done,
            &["daily"],
            Duration::days(7),
            Duration::hours(8),
        ),
        (
            "task-6",
            "PDF report generator for Murphie",
            "Create mobile-optimized PDF reports with screenshots and executive summaries.",
            TaskStatus::Inbox,
            &[],
            Duration::minutes(30),
            Duration::minutes(30),
        ),
        (
            "task-7",
            "Junction table migration for Eight",
            "Migrate dealership relationships to proper junction table architecture.",
            TaskStatus::Assigned,
            &["eight"],
            Duration::hours(12),
            Duration::hours(6),
        ),
    ];

    tasks
        .into_iter()
        .map(
            |(id, title, description, status, assigned_to, created_ago, updated_ago)| Task {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                status,
                assigned_to: assigned_to.iter().map(|a| a.to_string()).collect(),
                created_at: now - created_ago,
                updated_at: now - updated_ago,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{search, SearchOptions, SearchResultType};
    use crate::source::index_from_source;
    use crate::working::{parse_working_md, WorkingStatus};
    use chrono::TimeZone;

    fn fixed_source() -> MockDataSource {
        MockDataSource::at(Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_agent_detail_synthesized() {
        let source = fixed_source();
        let detail = source.agent_detail("intel").await.unwrap().unwrap();
        assert_eq!(detail.daily_notes.len(), 5);
        assert_eq!(detail.daily_notes[0].date, "2026-02-02");
        assert_eq!(detail.daily_notes[4].date, "2026-01-29");

        let parsed = parse_working_md(detail.working_md.as_deref().unwrap());
        assert_eq!(parsed.focus.as_deref(), Some("Competitor pricing analysis"));
        assert_eq!(parsed.status, Some(WorkingStatus::Blocked));
        assert_eq!(
            parsed.blockers,
            Some(vec!["Waiting on external dependency".to_string()])
        );
        assert_eq!(parsed.active_tasks.len(), 2);
        assert!(detail.soul_md.unwrap().contains("Market Research"));
    }

    #[tokio::test]
    async fn test_tasks_fixture() {
        let source = fixed_source();
        let tasks = source.tasks().await.unwrap();
        assert_eq!(tasks.len(), 7);
        assert!(tasks.iter().all(|t| t.updated_at >= t.created_at));
        let unassigned: Vec<&str> = tasks
            .iter()
            .filter(|t| t.assigned_to.is_empty())
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(unassigned, vec!["task-6"]);
        assert_eq!(tasks[2].status, TaskStatus::Blocked);
    }

    #[tokio::test]
    async fn test_unknown_agent_detail() {
        assert!(fixed_source().agent_detail("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_activity_sorted_newest_first() {
        let activity = fixed_source().activity().await.unwrap();
        assert_eq!(activity.len(), 15);
        assert_eq!(activity[0].id, "act-1");
        assert!(activity.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_index_from_mock_source() {
        let index = index_from_source(&fixed_source()).await.unwrap();
        // 6 notes + 5 agents × (1 profile + 5 daily) + memory
        assert_eq!(index.items.len(), 6 + 5 * 6 + 1);

        let results = search(&index, "dealership dashboard", &SearchOptions::default());
        assert_eq!(results[0].id, "note-2");
        assert_eq!(results[0].result_type, SearchResultType::Note);
        assert!(results[0].snippet.contains("**dealership** **dashboard**"));

        let memory = search(
            &index,
            "csv",
            &SearchOptions {
                types: Some(vec![SearchResultType::Memory]),
                ..Default::default()
            },
        );
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].id, "memory-main");
    }
}
