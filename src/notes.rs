//! `cmdc notes`: the kanban board.

use anyhow::{bail, Result};
use serde_json::json;

use command_center_core::board::{board, pending_actions};
use command_center_core::models::{Note, NoteType};
use command_center_core::source::DataSource;

pub fn parse_note_type(raw: Option<&str>) -> Result<Option<NoteType>> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        None => Ok(None),
        Some("voice") => Ok(Some(NoteType::Voice)),
        Some("meeting") | Some("meetings") => Ok(Some(NoteType::Meeting)),
        Some(other) => bail!("Unknown note type: '{}'. Use voice or meeting.", other),
    }
}

pub async fn run_notes(source: &dyn DataSource, note_type: Option<&str>, json: bool) -> Result<()> {
    let note_type = parse_note_type(note_type)?;
    let notes = source.notes().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board_json(&notes, note_type))?);
    } else {
        print!("{}", format_board(&notes, note_type));
    }
    Ok(())
}

pub fn board_json(notes: &[Note], note_type: Option<NoteType>) -> serde_json::Value {
    let columns: Vec<serde_json::Value> = board(notes, note_type)
        .into_iter()
        .map(|(column, notes)| {
            json!({
                "column": column,
                "label": column.label(),
                "notes": notes,
            })
        })
        .collect();
    json!({
        "columns": columns,
        "pendingActions": pending_actions(notes),
    })
}

pub fn format_board(notes: &[Note], note_type: Option<NoteType>) -> String {
    let mut out = String::new();
    for (column, in_column) in board(notes, note_type) {
        out.push_str(&format!("{} ({})\n", column.label(), in_column.len()));
        for note in in_column {
            let open = note.actions.iter().filter(|a| !a.done).count();
            out.push_str(&format!(
                "  - [{}] {} ({})",
                note.note_type.as_str(),
                note.title,
                note.date
            ));
            if open > 0 {
                out.push_str(&format!(" {} open action(s)", open));
            }
            out.push('\n');
        }
    }
    out.push_str(&format!("Pending actions: {}\n", pending_actions(notes)));
    out
}
