//! `cmdc search` and `cmdc interactive`.
//!
//! Both build a fresh index from the configured source. `search` runs one
//! query and exits. `interactive` feeds stdin lines through a debounced
//! [`SearchSession`] and prints each settled result set.

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use command_center_core::search::{
    group_results, search, GroupedResults, SearchOptions, SearchResult, SearchResultType,
};
use command_center_core::source::{index_from_source, DataSource};

use crate::config::Config;
use crate::session::{SearchSession, SearchState};

/// Parse `--type` values. Unknown names are an error.
pub fn parse_types(raw: &[String]) -> Result<Option<Vec<SearchResultType>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let mut types = Vec::new();
    for name in raw.iter().flat_map(|r| r.split(',')).filter(|s| !s.trim().is_empty()) {
        match SearchResultType::parse(name) {
            Some(t) if !types.contains(&t) => types.push(t),
            Some(_) => {}
            None => bail!(
                "Unknown result type: '{}'. Use note, agent, daily-note, or memory.",
                name.trim()
            ),
        }
    }
    Ok(Some(types))
}

pub async fn run_search(
    config: &Config,
    source: &dyn DataSource,
    query: &str,
    types: &[String],
    limit: Option<usize>,
    grouped: bool,
    json: bool,
) -> Result<()> {
    let max_results = limit.unwrap_or(config.search.max_results);
    if max_results == 0 {
        bail!("--limit must be >= 1");
    }
    let options = SearchOptions {
        max_results,
        types: parse_types(types)?,
    };

    let index = index_from_source(source).await?;
    let results = search(&index, query, &options);

    if json {
        let body = if grouped {
            serde_json::to_string_pretty(&group_results(&results))?
        } else {
            serde_json::to_string_pretty(&results)?
        };
        println!("{}", body);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    if grouped {
        print!("{}", format_grouped(&group_results(&results)));
    } else {
        print!("{}", format_results(&results));
    }
    Ok(())
}

pub fn format_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {} / {}\n",
            i + 1,
            result.score,
            result.result_type.as_str(),
            result.title
        ));
        let meta = &result.metadata;
        if let Some(date) = &meta.date {
            out.push_str(&format!("    date: {}\n", date));
        }
        if let Some(agent) = &meta.agent_id {
            out.push_str(&format!("    agent: {}\n", agent));
        }
        out.push_str(&format!("    excerpt: \"{}\"\n", result.snippet));
    }
    out
}

pub fn format_grouped(grouped: &GroupedResults) -> String {
    let sections = [
        ("Notes", &grouped.notes),
        ("Agents", &grouped.agents),
        ("Daily notes", &grouped.daily_notes),
        ("Memory", &grouped.memory),
    ];
    let mut out = String::new();
    for (label, results) in sections {
        if results.is_empty() {
            continue;
        }
        out.push_str(&format!("== {} ({}) ==\n", label, results.len()));
        out.push_str(&format_results(results));
    }
    out
}

pub async fn run_interactive(config: &Config, source: &dyn DataSource) -> Result<()> {
    let index = Arc::new(index_from_source(source).await?);
    eprintln!(
        "Indexed {} items from {}. Type a query; a blank line clears, Ctrl-D quits.",
        index.len(),
        source.name()
    );

    let mut session = SearchSession::new(
        index,
        Duration::from_millis(config.search.debounce_ms),
        config.search.interactive_max_results,
    );
    let mut rx = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => session.set_query(line),
                None => break,
            },
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                print_settled(&state);
            }
        }
    }

    // Input ended: let the last query finish before exiting.
    if session.is_searching() || rx.has_changed().unwrap_or(false) {
        let state = rx.wait_for(|s| !s.is_searching).await?.clone();
        print_settled(&state);
    }
    Ok(())
}

fn print_settled(state: &SearchState) {
    if state.is_searching || state.query.trim().is_empty() {
        return;
    }
    println!("> {} ({} results)", state.query.trim(), state.results.len());
    if state.results.is_empty() {
        println!("No results.");
    } else {
        print!("{}", format_results(&state.results));
    }
}
