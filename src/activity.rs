//! `cmdc activity`: the activity feed, newest first.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use command_center_core::board::relative_time;
use command_center_core::models::Activity;
use command_center_core::source::DataSource;

pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

pub async fn run_activity(source: &dyn DataSource, limit: Option<usize>, json: bool) -> Result<()> {
    let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    if limit == 0 {
        bail!("--limit must be >= 1");
    }
    let mut activity = source.activity().await?;
    activity.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&activity)?);
    } else if activity.is_empty() {
        println!("No activity.");
    } else {
        print!("{}", format_activity(&activity, Utc::now()));
    }
    Ok(())
}

pub fn format_activity(activity: &[Activity], now: DateTime<Utc>) -> String {
    activity
        .iter()
        .map(|a| {
            format!(
                "{:<10} {:<8} {:<16} {}\n",
                relative_time(a.timestamp, now),
                a.agent_id,
                a.activity_type.as_str(),
                a.description
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use command_center_core::source::mock::MockDataSource;

    #[tokio::test]
    async fn test_format_activity_newest_first() {
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap();
        let activity = MockDataSource::at(now).activity().await.unwrap();
        let text = format_activity(&activity, now);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), activity.len());
        assert!(activity.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert!(lines[0].contains(&activity[0].description));
    }
}
