//! Search index and query engine.
//!
//! Notes, agents, daily logs and the memory document are flattened into
//! [`SearchableItem`]s by [`build_index`]. [`search`] scores every item in a
//! [`SearchIndex`] against a free-text query and returns ranked
//! [`SearchResult`]s with highlighted snippets. [`group_results`] partitions a
//! ranked list into per-type buckets for sectioned display.
//!
//! Everything here is pure: no I/O, no shared state, and no error paths.
//!
//! # Scoring Algorithm
//!
//! 1. Lowercase and trim the query, split on whitespace, drop terms of one
//!    character. No terms left means no results.
//! 2. Full query found in the title: `+100`.
//! 3. Full query found in the content: `+50`.
//! 4. Per term: found in the title `+20`, plus `min(2 × occurrences, 30)`
//!    for occurrences in the content.
//! 5. Items scoring `0` are dropped.
//! 6. Stable sort by score (desc), truncate to `max_results`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Agent, AgentDetail, Note, NoteType};

/// Length of a snippet window, in characters.
pub const SNIPPET_LEN: usize = 150;

/// How far before the match a snippet window starts, in characters.
const SNIPPET_LEAD: usize = 40;

const ELLIPSIS: &str = "...";

/// Highlight delimiter wrapped around each matched span.
pub const HIGHLIGHT_MARKER: &str = "**";

const TITLE_PHRASE_BONUS: u32 = 100;
const CONTENT_PHRASE_BONUS: u32 = 50;
const TITLE_TERM_BONUS: u32 = 20;
const CONTENT_TERM_WEIGHT: u32 = 2;
const CONTENT_TERM_CAP: u32 = 30;

/// Default result cap for [`search`].
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Kind of record an item was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchResultType {
    Note,
    Agent,
    DailyNote,
    Memory,
}

impl SearchResultType {
    pub const ALL: [SearchResultType; 4] = [
        SearchResultType::Note,
        SearchResultType::Agent,
        SearchResultType::DailyNote,
        SearchResultType::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchResultType::Note => "note",
            SearchResultType::Agent => "agent",
            SearchResultType::DailyNote => "daily-note",
            SearchResultType::Memory => "memory",
        }
    }

    /// Parse a type name as written on the command line or in a query string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "note" | "notes" => Some(SearchResultType::Note),
            "agent" | "agents" => Some(SearchResultType::Agent),
            "daily-note" | "daily" | "daily-notes" => Some(SearchResultType::DailyNote),
            "memory" => Some(SearchResultType::Memory),
            _ => None,
        }
    }
}

/// Rendering hints carried from an item to its results. Never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_type: Option<NoteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_emoji: Option<String>,
}

/// One normalized unit of searchable content.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchableItem {
    pub id: String,
    pub item_type: SearchResultType,
    pub title: String,
    /// Lowercased concatenation of every text field of the source record.
    pub content: String,
    pub metadata: ItemMetadata,
}

/// Immutable snapshot of searchable items.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    pub items: Vec<SearchableItem>,
    pub last_updated: DateTime<Utc>,
}

impl SearchIndex {
    pub fn is_indexed(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: SearchResultType,
    pub title: String,
    /// Excerpt around the best match, terms wrapped in [`HIGHLIGHT_MARKER`].
    pub snippet: String,
    pub score: u32,
    pub metadata: ItemMetadata,
}

/// Everything the index is built from.
#[derive(Debug, Clone, Default)]
pub struct IndexInputs {
    pub notes: Vec<Note>,
    pub agents: Vec<Agent>,
    /// Detail documents keyed by agent id. Agents without an entry are
    /// indexed from their basic fields only.
    pub agent_details: HashMap<String, AgentDetail>,
    /// Freeform MEMORY.md text.
    pub memory: Option<String>,
}

/// Caller-side knobs for [`search`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Restrict results to these types. `None` searches everything.
    pub types: Option<Vec<SearchResultType>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            types: None,
        }
    }
}

/// Results partitioned by type, each bucket in rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedResults {
    pub notes: Vec<SearchResult>,
    pub agents: Vec<SearchResult>,
    pub daily_notes: Vec<SearchResult>,
    pub memory: Vec<SearchResult>,
}

impl GroupedResults {
    pub fn total(&self) -> usize {
        self.notes.len() + self.agents.len() + self.daily_notes.len() + self.memory.len()
    }
}

/// Build a fresh index snapshot.
///
/// Items are appended in a fixed order: every note, then for each agent its
/// profile item followed by its daily log items, then the memory document.
pub fn build_index(inputs: &IndexInputs) -> SearchIndex {
    let mut items = Vec::new();

    for note in &inputs.notes {
        let actions: Vec<&str> = note.actions.iter().map(|a| a.text.as_str()).collect();
        let content = [
            note.title.as_str(),
            note.synopsis.as_str(),
            &note.takeaways.join(" "),
            &actions.join(" "),
            note.transcript.as_str(),
        ]
        .join(" ")
        .to_lowercase();

        items.push(SearchableItem {
            id: format!("note-{}", note.id),
            item_type: SearchResultType::Note,
            title: note.title.clone(),
            content,
            metadata: ItemMetadata {
                date: Some(note.date.clone()),
                note_type: Some(note.note_type),
                ..Default::default()
            },
        });
    }

    for agent in &inputs.agents {
        let detail = inputs.agent_details.get(&agent.id);
        let soul = detail.and_then(|d| d.soul_md.as_deref()).unwrap_or("");
        let working = detail.and_then(|d| d.working_md.as_deref()).unwrap_or("");

        let content = [
            agent.name.as_str(),
            agent.role.as_str(),
            agent.focus.as_deref().unwrap_or(""),
            soul,
            working,
        ]
        .join(" ")
        .to_lowercase();

        let agent_meta = ItemMetadata {
            agent_id: Some(agent.id.clone()),
            agent_name: Some(agent.name.clone()),
            agent_emoji: Some(agent.emoji.clone()),
            ..Default::default()
        };

        items.push(SearchableItem {
            id: format!("agent-{}", agent.id),
            item_type: SearchResultType::Agent,
            title: format!("{} {}", agent.emoji, agent.name),
            content,
            metadata: agent_meta.clone(),
        });

        for daily in detail.map(|d| d.daily_notes.as_slice()).unwrap_or(&[]) {
            items.push(SearchableItem {
                id: format!("daily-{}-{}", agent.id, daily.date),
                item_type: SearchResultType::DailyNote,
                title: format!("{} {} - {}", agent.emoji, agent.name, daily.date),
                content: daily.content.to_lowercase(),
                metadata: ItemMetadata {
                    date: Some(daily.date.clone()),
                    ..agent_meta.clone()
                },
            });
        }
    }

    if let Some(memory) = inputs.memory.as_deref().filter(|m| !m.is_empty()) {
        items.push(SearchableItem {
            id: "memory-main".to_string(),
            item_type: SearchResultType::Memory,
            title: "MEMORY.md".to_string(),
            content: memory.to_lowercase(),
            metadata: ItemMetadata::default(),
        });
    }

    SearchIndex {
        items,
        last_updated: Utc::now(),
    }
}

/// Lowercase, trim and split a raw query into scoring terms.
///
/// Returns the normalized full query and its terms. Terms of a single
/// character are discarded.
pub fn normalize_query(raw: &str) -> (String, Vec<String>) {
    let normalized = raw.trim().to_lowercase();
    let terms = normalized
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect();
    (normalized, terms)
}

/// Score and rank the index against `query`.
///
/// Never fails: an empty or all-single-character query yields no results.
pub fn search(index: &SearchIndex, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
    let (full_query, terms) = normalize_query(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = index
        .items
        .iter()
        .filter(|item| match &options.types {
            Some(types) => types.contains(&item.item_type),
            None => true,
        })
        .filter_map(|item| {
            let score = score_item(item, &terms, &full_query);
            if score == 0 {
                return None;
            }
            let snippet = best_snippet(&item.content, &terms, &full_query);
            Some(SearchResult {
                id: item.id.clone(),
                result_type: item.item_type,
                title: item.title.clone(),
                snippet: highlight_matches(&snippet, &terms),
                score,
                metadata: item.metadata.clone(),
            })
        })
        .collect();

    // `sort_by` is stable: equal scores keep index order.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(options.max_results);
    results
}

/// Additive relevance score of one item.
pub fn score_item(item: &SearchableItem, terms: &[String], full_query: &str) -> u32 {
    let title = item.title.to_lowercase();
    let content = item.content.as_str();
    let mut score = 0;

    if title.contains(full_query) {
        score += TITLE_PHRASE_BONUS;
    }
    if content.contains(full_query) {
        score += CONTENT_PHRASE_BONUS;
    }

    for term in terms {
        if title.contains(term.as_str()) {
            score += TITLE_TERM_BONUS;
        }
        let count = content.matches(term.as_str()).count() as u32;
        score += count.saturating_mul(CONTENT_TERM_WEIGHT).min(CONTENT_TERM_CAP);
    }

    score
}

/// Cut a window of up to [`SNIPPET_LEN`] characters around the best match.
///
/// The full query is preferred, then the first term (in query order) that
/// occurs. Without any match the snippet is the head of the content followed
/// by `...`, whatever its length.
pub fn best_snippet(content: &str, terms: &[String], full_query: &str) -> String {
    let found = content
        .find(full_query)
        .or_else(|| terms.iter().find_map(|t| content.find(t.as_str())));

    let total = content.chars().count();

    let Some(byte_idx) = found else {
        let head: String = content.chars().take(SNIPPET_LEN).collect();
        return format!("{head}{ELLIPSIS}");
    };

    let idx = content[..byte_idx].chars().count();
    let start = idx.saturating_sub(SNIPPET_LEAD);
    let end = total.min(idx + SNIPPET_LEN - SNIPPET_LEAD);

    let mut snippet: String = content.chars().skip(start).take(end - start).collect();
    if start > 0 {
        snippet.insert_str(0, ELLIPSIS);
    }
    if end < total {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

/// Wrap every case-insensitive occurrence of every term in
/// [`HIGHLIGHT_MARKER`]s.
///
/// Spans are located on the unmarked text and merged when they overlap or
/// touch, so each highlighted region gets exactly one pair of markers.
/// Matching runs on a per-character lowercase copy of `text`, and every span
/// is widened back to whole characters of the original, so scripts whose
/// lowercase form has a different byte length are still matched.
pub fn highlight_matches(text: &str, terms: &[String]) -> String {
    // (lowered offset, original start, original end) per character of `text`
    let mut origin: Vec<(usize, usize, usize)> = Vec::with_capacity(text.len());
    let mut lowered = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        origin.push((lowered.len(), i, i + c.len_utf8()));
        lowered.extend(c.to_lowercase());
    }
    let to_original = |lo: usize, hi: usize| {
        let first = origin[origin.partition_point(|o| o.0 <= lo) - 1];
        let last = origin[origin.partition_point(|o| o.0 < hi) - 1];
        (first.1, last.2)
    };

    let mut spans: Vec<(usize, usize)> = terms
        .iter()
        .filter(|t| !t.is_empty())
        .flat_map(|t| {
            let needle = t.to_lowercase();
            lowered
                .match_indices(needle.as_str())
                .map(|(i, m)| to_original(i, i + m.len()))
                .collect::<Vec<_>>()
        })
        .collect();

    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len() + merged.len() * 2 * HIGHLIGHT_MARKER.len());
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&text[cursor..start]);
        out.push_str(HIGHLIGHT_MARKER);
        out.push_str(&text[start..end]);
        out.push_str(HIGHLIGHT_MARKER);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Partition ranked results into per-type buckets without reordering.
pub fn group_results(results: &[SearchResult]) -> GroupedResults {
    let mut grouped = GroupedResults::default();
    for r in results {
        let bucket = match r.result_type {
            SearchResultType::Note => &mut grouped.notes,
            SearchResultType::Agent => &mut grouped.agents,
            SearchResultType::DailyNote => &mut grouped.daily_notes,
            SearchResultType::Memory => &mut grouped.memory,
        };
        bucket.push(r.clone());
    }
    grouped
}
