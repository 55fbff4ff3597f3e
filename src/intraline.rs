//! Character-level differ for highlight extraction.
//!
//! Runs a time-bounded Myers diff (via `similar`) over the chars of two texts and turns the
//! resulting opcodes into highlight ranges. A delete immediately followed by an insert is a
//! [`CharEdit::Modification`]: one removed range on the old side and one added range on the
//! new side. Offsets and lengths count chars, not bytes.

use std::time::{Duration, Instant};

use similar::{Algorithm, DiffTag, TextDiff};

use crate::align::{Opcode, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Added,
    Removed,
}

/// A highlighted char span on one side's plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightRange {
    pub start: usize,
    pub len: usize,
    pub kind: HighlightKind,
}

impl HighlightRange {
    pub const fn new(start: usize, len: usize, kind: HighlightKind) -> Self {
        Self { start, len, kind }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One character-level edit, paired when a removal is directly replaced by an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharEdit {
    Removed(HighlightRange),
    Added(HighlightRange),
    Modification {
        removed: HighlightRange,
        added: HighlightRange,
    },
}

/// Highlights for the old side and the new side.
pub type SideHighlights = (Vec<HighlightRange>, Vec<HighlightRange>);

/// Char-level opcodes (`Equal`/`Delete`/`Insert`) turning `old` into `new`.
///
/// When `time_limit` runs out the differ stops refining and the remaining region is
/// reported as a plain delete plus insert; the stream still covers both texts.
pub fn char_diff(old: &str, new: &str, time_limit: Duration) -> Vec<Opcode> {
    let started = Instant::now();
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(time_limit)
        .diff_chars(old, new);

    let mut opcodes = Vec::with_capacity(diff.ops().len());
    for op in diff.ops() {
        let (tag, o, n) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                opcodes.push(Opcode::new(Tag::Equal, o.start, o.end, n.start, n.end));
            }
            DiffTag::Delete => {
                opcodes.push(Opcode::new(Tag::Delete, o.start, o.end, n.start, n.start));
            }
            DiffTag::Insert => {
                opcodes.push(Opcode::new(Tag::Insert, o.start, o.start, n.start, n.end));
            }
            DiffTag::Replace => {
                opcodes.push(Opcode::new(Tag::Delete, o.start, o.end, n.start, n.start));
                opcodes.push(Opcode::new(Tag::Insert, o.end, o.end, n.start, n.end));
            }
        }
    }

    let elapsed = started.elapsed();
    if elapsed >= time_limit {
        tracing::warn!(
            "char diff exceeded its {:?} budget ({:?}); result may be approximate",
            time_limit,
            elapsed
        );
    }
    opcodes
}

/// Group char opcodes into edits, pairing each delete that is directly followed by an insert.
pub fn char_edits(opcodes: &[Opcode]) -> Vec<CharEdit> {
    let mut edits = Vec::new();
    let mut iter = opcodes.iter().peekable();

    while let Some(op) = iter.next() {
        let removed = HighlightRange::new(op.i1, op.old_len(), HighlightKind::Removed);
        let added = HighlightRange::new(op.j1, op.new_len(), HighlightKind::Added);
        match op.tag {
            Tag::Equal => {}
            Tag::Insert => edits.push(CharEdit::Added(added)),
            Tag::Replace => edits.push(CharEdit::Modification { removed, added }),
            Tag::Delete => match iter.peek() {
                Some(next) if next.tag == Tag::Insert => {
                    let added = HighlightRange::new(next.j1, next.new_len(), HighlightKind::Added);
                    iter.next();
                    edits.push(CharEdit::Modification { removed, added });
                }
                _ => edits.push(CharEdit::Removed(removed)),
            },
        }
    }
    edits
}

/// Split edits into per-side highlight lists, each in increasing offset order.
pub fn side_highlights(edits: &[CharEdit]) -> SideHighlights {
    let mut old_side = Vec::new();
    let mut new_side = Vec::new();
    for edit in edits {
        match *edit {
            CharEdit::Removed(r) => old_side.push(r),
            CharEdit::Added(a) => new_side.push(a),
            CharEdit::Modification { removed, added } => {
                old_side.push(removed);
                new_side.push(added);
            }
        }
    }
    (old_side, new_side)
}

/// Highlights for one paired line. An absent side yields no highlights at all.
pub fn highlight_pair(old: Option<&str>, new: Option<&str>, time_limit: Duration) -> SideHighlights {
    let (Some(old), Some(new)) = (old, new) else {
        return (Vec::new(), Vec::new());
    };
    side_highlights(&char_edits(&char_diff(old, new, time_limit)))
}

/// Non-equal char opcodes for one paired line; empty when either side is absent.
pub fn changed_opcodes(old: Option<&str>, new: Option<&str>, time_limit: Duration) -> Vec<Opcode> {
    match (old, new) {
        (Some(old), Some(new)) => char_diff(old, new, time_limit)
            .into_iter()
            .filter(|op| op.tag != Tag::Equal)
            .collect(),
        _ => Vec::new(),
    }
}
