//! Line-oriented markdown scanner.
//!
//! Status documents in the content repository are loosely structured:
//! optional YAML frontmatter, `##` sections, checklists and bullets. Rather
//! than pattern-matching the raw text, each document is scanned once into a
//! flat list of typed [`Block`]s, and sections are sliced out of that list.
//!
//! ```rust
//! use command_center_core::markdown::{scan_blocks, section, Block};
//!
//! let blocks = scan_blocks("## Current Focus\n- Ship it\n## Blockers\n_None_");
//! let focus = section(&blocks, "Current Focus").unwrap();
//! assert_eq!(focus, &[Block::Bullet("Ship it".to_string())]);
//! ```

use serde_yaml::Value;

/// One scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// A `---` horizontal rule.
    Rule,
    Checklist { checked: bool, text: String },
    Bullet(String),
    Text(String),
}

impl Block {
    /// Plain text carried by a bullet or text line.
    pub fn line_text(&self) -> Option<&str> {
        match self {
            Block::Bullet(t) | Block::Text(t) => Some(t),
            _ => None,
        }
    }
}

const FENCE: &str = "---";

/// Split leading YAML frontmatter from the body.
///
/// Frontmatter is opened by a first line of exactly `---` and closed by the
/// next such line. Malformed YAML yields `None` but the body is still the
/// text after the closing fence. Without an opening fence the whole text is
/// the body.
pub fn split_frontmatter(text: &str) -> (Option<Value>, &str) {
    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FENCE => {}
        _ => return (None, text),
    }

    let mut offset = text.split_inclusive('\n').next().map_or(0, str::len);
    let yaml_start = offset;
    for line in lines {
        if line.trim_end() == FENCE {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            let value = serde_yaml::from_str::<Value>(yaml)
                .ok()
                .filter(|v| !v.is_null());
            return (value, body);
        }
        offset += line.len();
    }

    // Unterminated fence: treat as plain text.
    (None, text)
}

/// Look up a string-ish frontmatter field.
///
/// Numbers and booleans are rendered to strings, since hand-written YAML
/// often leaves dates and versions unquoted.
pub fn frontmatter_str(fm: Option<&Value>, key: &str) -> Option<String> {
    match fm?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Look up a list-of-strings frontmatter field.
pub fn frontmatter_list(fm: Option<&Value>, key: &str) -> Vec<String> {
    match fm.and_then(|v| v.get(key)) {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Scan text into blocks, one per non-empty line.
pub fn scan_blocks(text: &str) -> Vec<Block> {
    text.lines().filter_map(scan_line).collect()
}

fn scan_line(line: &str) -> Option<Block> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == FENCE {
        return Some(Block::Rule);
    }
    if let Some(heading) = scan_heading(trimmed) {
        return Some(heading);
    }
    if let Some(rest) = strip_bullet(trimmed) {
        if let Some(item) = scan_checklist(rest) {
            return Some(item);
        }
        return Some(Block::Bullet(rest.trim().to_string()));
    }
    Some(Block::Text(trimmed.to_string()))
}

fn scan_heading(line: &str) -> Option<Block> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(Block::Heading {
        level: level as u8,
        text: rest.trim().to_string(),
    })
}

fn strip_bullet(line: &str) -> Option<&str> {
    ["- ", "* ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
}

fn scan_checklist(rest: &str) -> Option<Block> {
    let inner = rest.trim_start().strip_prefix('[')?;
    let close = inner.find(']')?;
    let mark = inner[..close].trim();
    let checked = match mark {
        "" => false,
        "x" | "X" => true,
        _ => return None,
    };
    Some(Block::Checklist {
        checked,
        text: inner[close + 1..].trim().to_string(),
    })
}

/// Normalize a heading for comparison: lowercase, no whitespace, anything
/// after a `:` dropped.
fn heading_key(text: &str) -> String {
    let head = text.split(':').next().unwrap_or(text);
    head.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Blocks belonging to the first `##` section named `name`.
///
/// Matching ignores case and whitespace, so `"Active Tasks"` matches
/// `## active  tasks`. The section runs until the next heading of level 2
/// or higher, or a horizontal rule.
pub fn section<'a>(blocks: &'a [Block], name: &str) -> Option<&'a [Block]> {
    let key = heading_key(name);
    let start = blocks.iter().position(|b| {
        matches!(b, Block::Heading { level: 2, text } if heading_key(text) == key)
    })? + 1;

    let len = blocks[start..]
        .iter()
        .position(|b| matches!(b, Block::Heading { level, .. } if *level <= 2) || *b == Block::Rule)
        .unwrap_or(blocks.len() - start);

    Some(&blocks[start..start + len])
}

/// Like [`section`], accepting any of several names.
pub fn section_any<'a>(blocks: &'a [Block], names: &[&str]) -> Option<&'a [Block]> {
    names.iter().find_map(|n| section(blocks, n))
}

/// Turn inline markdown into plain text: bold markers dropped, code spans
/// unwrapped, `[text](url)` links reduced to their text.
pub fn strip_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text.replace("**", "");

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let link = after.find("](").and_then(|mid| {
            let tail = &after[mid + 2..];
            tail.find(')').map(|close| (mid, mid + 2 + close + 1))
        });
        match link {
            Some((mid, consumed)) if !after[..mid].contains('[') => {
                out.push_str(&after[..mid]);
                rest = after[consumed..].to_string();
            }
            _ => {
                out.push('[');
                rest = after.to_string();
            }
        }
    }
    out.push_str(&rest);

    out.replace('`', "").trim().to_string()
}
