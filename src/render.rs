//! Side-by-side rows over a refined opcode stream, and a plain ANSI terminal preview of them.

use std::{fmt::Write, time::Duration};

use colored::Colorize;

use crate::{
    align::{Opcode, Tag},
    intraline::changed_opcodes,
    utils::trim_terminator,
};

/// One row of a side-by-side view. `None` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideBySideRow<'a> {
    pub old: Option<&'a str>,
    pub new: Option<&'a str>,
    pub changed: bool,
    /// The pair was synchronized by the refiner and is worth an intra-line diff.
    pub similar: bool,
}

/// Expand opcodes into rows; a multi-line `Replace` pairs lines by position.
pub fn rows<'a, S: AsRef<str>>(old: &'a [S], new: &'a [S], opcodes: &[Opcode]) -> Vec<SideBySideRow<'a>> {
    let mut out = Vec::new();
    for op in opcodes {
        match op.tag {
            Tag::Equal => out.extend(op.old_range().zip(op.new_range()).map(|(i, j)| SideBySideRow {
                old: Some(old[i].as_ref()),
                new: Some(new[j].as_ref()),
                changed: false,
                similar: false,
            })),
            Tag::Delete => out.extend(op.old_range().map(|i| SideBySideRow {
                old: Some(old[i].as_ref()),
                new: None,
                changed: true,
                similar: false,
            })),
            Tag::Insert => out.extend(op.new_range().map(|j| SideBySideRow {
                old: None,
                new: Some(new[j].as_ref()),
                changed: true,
                similar: false,
            })),
            Tag::Replace => {
                let similar = op.old_len() == 1 && op.new_len() == 1;
                for k in 0..op.old_len().max(op.new_len()) {
                    out.push(SideBySideRow {
                        old: (k < op.old_len()).then(|| old[op.i1 + k].as_ref()),
                        new: (k < op.new_len()).then(|| new[op.j1 + k].as_ref()),
                        changed: true,
                        similar,
                    });
                }
            }
        }
    }
    out
}

/// Render rows as fixed-width colored columns, one line per row.
///
/// Changed old cells get a red background, changed new cells green, empty cells yellow.
/// Similar rows are followed by their intra-line opcodes.
pub fn render_ansi(rows: &[SideBySideRow<'_>], width: usize, time_limit: Duration) -> String {
    let mut out = String::new();
    for row in rows {
        let old_cell = cell(row.old, width, row.changed, Column::Old);
        let new_cell = cell(row.new, width, row.changed, Column::New);
        let _ = write!(out, "{old_cell}|{new_cell}");

        if row.similar {
            let intra = changed_opcodes(
                row.old.map(trim_terminator),
                row.new.map(trim_terminator),
                time_limit,
            );
            let listed: Vec<String> = intra.iter().map(Opcode::to_string).collect();
            let _ = write!(out, "  [{}]", listed.join(", "));
        }
        out.push('\n');
    }
    out
}

enum Column {
    Old,
    New,
}

fn cell(text: Option<&str>, width: usize, changed: bool, column: Column) -> String {
    let body = text.map(trim_terminator).unwrap_or_default();
    let padded = format!("{body:<width$}");
    match (text, changed, column) {
        (None, _, _) => padded.on_yellow().to_string(),
        (Some(_), true, Column::Old) => padded.on_red().to_string(),
        (Some(_), true, Column::New) => padded.on_green().to_string(),
        (Some(_), false, _) => padded,
    }
}
