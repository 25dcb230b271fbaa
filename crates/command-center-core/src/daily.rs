//! Activity extraction from daily logs.
//!
//! Daily logs (`YYYY-MM-DD.md`) are free-form. The parser recognises:
//!
//! | Line | Activity |
//! |------|----------|
//! | `## 14:32 - Title` | `Started: Title`, and the clock moves to 14:32 |
//! | `## 14:32` | clock moves to 14:32 |
//! | `## Anything else` | clock advances one synthetic hour from 09:00 |
//! | `- [tag] text` | `text`, type from the tag |
//! | `- [x] text` / `- ✅ text` | `Completed: text` |
//! | `- text` (over 15 chars) | `text`, type from keywords |

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sha2::{Digest, Sha256};

use crate::markdown::strip_inline;
use crate::models::{Activity, ActivityType};

const DEFAULT_TIME: &str = "12:00";
const FIRST_SYNTHETIC_HOUR: u32 = 9;
const MIN_BULLET_LEN: usize = 15;

/// Parse every activity in one daily log dated `date` (`YYYY-MM-DD`).
pub fn parse_daily_activities(content: &str, date: &str) -> Vec<Activity> {
    let mut activities = Vec::new();
    let mut clock = DEFAULT_TIME.to_string();
    let mut synthetic_hour = FIRST_SYNTHETIC_HOUR;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_date_title(trimmed) {
            continue;
        }

        if let Some(heading) = trimmed.strip_prefix("## ") {
            let heading = heading.trim();
            if let Some((time, title)) = parse_timestamp_heading(heading) {
                clock = time;
                if let Some(title) = title {
                    activities.push(make_activity(
                        &format!("Started: {}", title),
                        date,
                        &clock,
                        ActivityType::StatusChanged,
                    ));
                }
            } else {
                clock = format!("{:02}:00", synthetic_hour);
                synthetic_hour += 1;
                if synthetic_hour > 23 {
                    synthetic_hour = FIRST_SYNTHETIC_HOUR;
                }
            }
            continue;
        }

        let Some(text) = strip_list_marker(trimmed) else {
            continue;
        };

        if let Some((tag, description)) = parse_tagged(text) {
            activities.push(make_activity(description, date, &clock, tag_type(tag)));
            continue;
        }

        if let Some(done) = parse_completed(text) {
            activities.push(make_activity(
                &format!("Completed: {}", done),
                date,
                &clock,
                ActivityType::StatusChanged,
            ));
            continue;
        }

        if text.starts_with("http://") || text.starts_with("https://") {
            continue;
        }
        if text.chars().count() > MIN_BULLET_LEN && !is_scratch_marker(text) {
            activities.push(make_activity(text, date, &clock, keyword_type(text)));
        }
    }

    activities
}

fn is_date_title(line: &str) -> bool {
    line.strip_prefix("# ")
        .and_then(|rest| rest.get(..10))
        .is_some_and(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok())
}

/// `14:32` or `14:32 - Title` (an en dash is accepted too).
fn parse_timestamp_heading(heading: &str) -> Option<(String, Option<String>)> {
    let time_end = heading
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(heading.len());
    let (time, rest) = heading.split_at(time_end);

    let (h, m) = time.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;

    let rest = rest.trim();
    let title = if rest.is_empty() {
        None
    } else {
        let t = rest.strip_prefix('-').or_else(|| rest.strip_prefix('–'))?;
        Some(t.trim().to_string()).filter(|t| !t.is_empty())
    };

    Some((format!("{:02}:{:02}", hour, minute), title))
}

fn strip_list_marker(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

/// `[tag] description`, excluding `[x]` / `[ ]` checkboxes.
fn parse_tagged(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('[')?;
    let close = inner.find(']')?;
    let tag = &inner[..close];
    if tag.trim().is_empty() || tag.eq_ignore_ascii_case("x") {
        return None;
    }
    let description = inner[close + 1..].trim();
    (!description.is_empty()).then_some((tag, description))
}

fn parse_completed(text: &str) -> Option<&str> {
    let rest = text
        .strip_prefix("[x]")
        .or_else(|| text.strip_prefix("[X]"))
        .or_else(|| text.strip_prefix('✅'))?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

fn is_scratch_marker(text: &str) -> bool {
    let upper = text.to_uppercase();
    ["TODO:", "FIXME:", "NOTE:"].iter().any(|m| upper.starts_with(m))
}

/// Map a `[tag]` to an activity type.
pub fn tag_type(tag: &str) -> ActivityType {
    let tag = tag.to_lowercase();
    if tag.contains("status") || tag.contains("change") {
        ActivityType::StatusChanged
    } else if tag.contains("task") && tag.contains("create") {
        ActivityType::TaskCreated
    } else if tag.contains("assign") {
        ActivityType::TaskAssigned
    } else if tag.contains("comment") || tag.contains("note") {
        ActivityType::CommentPosted
    } else if tag.contains("document") || tag.contains("create") {
        ActivityType::DocumentCreated
    } else if tag.contains("agent") {
        ActivityType::AgentStatus
    } else {
        ActivityType::StatusChanged
    }
}

/// Guess an activity type from the words in a bullet.
pub fn keyword_type(text: &str) -> ActivityType {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

    if has(&["create", "created", "build", "built", "implement", "implemented", "add", "added"]) {
        ActivityType::DocumentCreated
    } else if has(&["assign", "assigned", "delegate", "delegated"]) {
        ActivityType::TaskAssigned
    } else if has(&["start", "started", "working", "began", "progress"]) {
        ActivityType::StatusChanged
    } else if has(&["comment", "note", "noted", "feedback"]) {
        ActivityType::CommentPosted
    } else if has(&["merge", "merged", "pr", "commit"]) || lower.contains("pull request") {
        ActivityType::DocumentCreated
    } else {
        ActivityType::StatusChanged
    }
}

/// Attribute a line to an agent by keyword, falling back to `bam`.
pub fn detect_agent(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let mentions = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

    if mentions(&["murphie", "testing", "qa"]) {
        "murphie"
    } else if mentions(&["eight", "dealership", "ga4"]) {
        "eight"
    } else if mentions(&["daily", "briefing", "morning brief"]) {
        "daily"
    } else if mentions(&["intel", "research", "competitor"]) {
        "intel"
    } else {
        "bam"
    }
}

fn make_activity(description: &str, date: &str, time: &str, activity_type: ActivityType) -> Activity {
    let timestamp = parse_timestamp(date, time).unwrap_or_else(Utc::now);
    Activity {
        id: format!(
            "daily-{}-{}-{}",
            date,
            time.replace(':', ""),
            short_hash(&format!("{date}{time}{description}"))
        ),
        activity_type,
        agent_id: detect_agent(description).to_string(),
        description: strip_inline(description),
        timestamp,
    }
}

fn parse_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const LOG: &str = "# 2026-02-02

## 08:15 - Standup
- [task_created] Wrote the GA4 tracking plan
- [x] Reviewed **Murphie** regression report

## Afternoon
- Implemented the competitor price scraper
- short item
- https://example.com/link-only-line-here
- TODO: clean this up later please
- ✅ Shipped `ga4` [dashboard](https://x.y/d)
";

    #[test]
    fn test_parse_daily_log() {
        let acts = parse_daily_activities(LOG, "2026-02-02");
        let descriptions: Vec<&str> = acts.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Started: Standup",
                "Wrote the GA4 tracking plan",
                "Completed: Reviewed Murphie regression report",
                "Implemented the competitor price scraper",
                "Completed: Shipped ga4 dashboard",
            ]
        );

        assert_eq!(acts[0].activity_type, ActivityType::StatusChanged);
        assert_eq!(acts[1].activity_type, ActivityType::TaskCreated);
        assert_eq!(acts[3].activity_type, ActivityType::DocumentCreated);

        assert_eq!(acts[0].timestamp.hour(), 8);
        assert_eq!(acts[0].timestamp.minute(), 15);
        // "## Afternoon" is the first untimed heading.
        assert_eq!(acts[3].timestamp.hour(), 9);

        assert_eq!(acts[1].agent_id, "eight");
        assert_eq!(acts[2].agent_id, "murphie");
        assert_eq!(acts[3].agent_id, "intel");
        assert!(acts[0].id.starts_with("daily-2026-02-02-0815-"));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let a = parse_daily_activities(LOG, "2026-02-02");
        let b = parse_daily_activities(LOG, "2026-02-02");
        let ids_a: Vec<&str> = a.iter().map(|x| x.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|x| x.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_synthetic_clock_wraps() {
        let mut log = String::new();
        for i in 0..16 {
            log.push_str(&format!("## Section {}\n", i));
        }
        log.push_str("- Something long enough to count\n");
        let acts = parse_daily_activities(&log, "2026-02-02");
        // 09..=23 is fifteen headings, the sixteenth wraps to 09.
        assert_eq!(acts[0].timestamp.hour(), 9);
    }

    #[test]
    fn test_timestamp_heading_forms() {
        assert_eq!(
            parse_timestamp_heading("9:05 – Deploy"),
            Some(("09:05".to_string(), Some("Deploy".to_string())))
        );
        assert_eq!(parse_timestamp_heading("14:32"), Some(("14:32".to_string(), None)));
        assert_eq!(parse_timestamp_heading("Notes"), None);
        assert_eq!(parse_timestamp_heading("14:32 Deploy"), None);
    }

    #[test]
    fn test_keyword_and_tag_types() {
        assert_eq!(keyword_type("Delegated the review to Eight"), ActivityType::TaskAssigned);
        assert_eq!(keyword_type("Merged PR for tracking"), ActivityType::DocumentCreated);
        assert_eq!(keyword_type("Left feedback on copy"), ActivityType::CommentPosted);
        assert_eq!(tag_type("agent"), ActivityType::AgentStatus);
        assert_eq!(tag_type("assign"), ActivityType::TaskAssigned);
        assert_eq!(tag_type("whatever"), ActivityType::StatusChanged);
    }

    #[test]
    fn test_detect_agent_default() {
        assert_eq!(detect_agent("Refactored the gateway"), "bam");
        assert_eq!(detect_agent("Morning brief sent"), "daily");
    }
}
