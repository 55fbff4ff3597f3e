//! Collapse manager: hides the interior of long unchanged runs behind placeholder lines and
//! keeps both displayed streams addressable by original line number.
//!
//! Hidden lines live in an engine-owned table of [`CollapsedSection`]s, indexed by position.
//! Each displayed stream is a list of [`DisplayBlock`]s; a placeholder block refers to its
//! section by index. Original line numbers are a derived projection ([`LineNumbers`]) built
//! lazily and dropped on every structural change.

use std::cell::OnceCell;

use crate::{
    align::{Opcode, Tag},
    utils::{join_lines, split_lines, trim_terminator},
};

/// One of the two compared documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Old, Side::New];

    fn slot(self) -> usize {
        match self {
            Side::Old => 0,
            Side::New => 1,
        }
    }
}

/// Lines removed from display when a long equal run was collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedSection {
    pub index: usize,
    pub hidden_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Normal,
    /// Stands in for the collapsed section with this index.
    Placeholder(usize),
}

/// One rendered line of a displayed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBlock {
    pub text: String,
    pub kind: BlockKind,
}

impl DisplayBlock {
    fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: BlockKind::Normal,
        }
    }

    fn placeholder(index: usize, hidden: usize) -> Self {
        Self {
            text: placeholder_text(hidden),
            kind: BlockKind::Placeholder(index),
        }
    }
}

/// Text shown in place of `hidden` collapsed lines.
pub fn placeholder_text(hidden: usize) -> String {
    format!("⋯ {hidden} unchanged lines ⋯\n")
}

/// Displayed position of one placeholder on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderPosition {
    pub old: usize,
    pub new: usize,
}

impl PlaceholderPosition {
    fn get(&self, side: Side) -> usize {
        match side {
            Side::Old => self.old,
            Side::New => self.new,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Old => &mut self.old,
            Side::New => &mut self.new,
        }
    }
}

/// What a displayed block maps back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLine {
    /// 1-based line number in the original document.
    Normal(usize),
    Placeholder(usize),
}

/// Per-block original line numbers for one displayed stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineNumbers {
    lines: Vec<DisplayLine>,
}

impl LineNumbers {
    /// Walk the stream from line 1: a normal block consumes one line, a placeholder
    /// consumes its section's hidden lines.
    fn build(blocks: &[DisplayBlock], sections: &[CollapsedSection]) -> Self {
        let mut lines = Vec::with_capacity(blocks.len());
        let mut next = 1usize;
        for block in blocks {
            match block.kind {
                BlockKind::Normal => {
                    lines.push(DisplayLine::Normal(next));
                    next += 1;
                }
                BlockKind::Placeholder(index) => {
                    lines.push(DisplayLine::Placeholder(index));
                    next += sections.get(index).map_or(0, |s| s.hidden_lines.len());
                }
            }
        }
        Self { lines }
    }

    pub fn get(&self, block: usize) -> Option<DisplayLine> {
        self.lines.get(block).copied()
    }

    pub fn as_slice(&self) -> &[DisplayLine] {
        &self.lines
    }
}

/// Owner of the displayed streams, the collapsed-section table and the placeholder table.
#[derive(Debug, Default)]
pub struct CollapseManager {
    streams: [Vec<DisplayBlock>; 2],
    sections: Vec<CollapsedSection>,
    /// Indexed like `sections`.
    placeholders: Vec<PlaceholderPosition>,
    line_numbers: [OnceCell<LineNumbers>; 2],
    revision: u64,
}

/// Build the displayed streams for a line-level opcode stream.
///
/// Equal runs longer than `threshold` (and longer than `2 * context`, so at least one line
/// is hidden) keep `context` lines visible at each edge and hide the rest behind one
/// placeholder per side.
pub fn collapse<S: AsRef<str>>(
    opcodes: &[Opcode],
    old: &[S],
    new: &[S],
    threshold: usize,
    context: usize,
) -> CollapseManager {
    let mut manager = CollapseManager::default();

    for op in opcodes {
        let count = op.old_len();
        if op.tag != Tag::Equal || count <= threshold || count <= 2 * context {
            manager.push_lines(Side::Old, &old[op.old_range()]);
            manager.push_lines(Side::New, &new[op.new_range()]);
            continue;
        }

        manager.push_lines(Side::Old, &old[op.i1..op.i1 + context]);
        manager.push_lines(Side::New, &new[op.j1..op.j1 + context]);

        let hidden_lines: Vec<String> = old[op.i1 + context..op.i2 - context]
            .iter()
            .map(|l| l.as_ref().to_owned())
            .collect();
        let index = manager.sections.len();
        tracing::trace!(
            "collapsing {} of {} equal lines at old {} / new {} into section {}",
            hidden_lines.len(),
            count,
            op.i1,
            op.j1,
            index
        );
        manager.placeholders.push(PlaceholderPosition {
            old: manager.streams[0].len(),
            new: manager.streams[1].len(),
        });
        for side in Side::BOTH {
            manager.streams[side.slot()].push(DisplayBlock::placeholder(index, hidden_lines.len()));
        }
        manager.sections.push(CollapsedSection {
            index,
            hidden_lines,
        });

        manager.push_lines(Side::Old, &old[op.i2 - context..op.i2]);
        manager.push_lines(Side::New, &new[op.j2 - context..op.j2]);
    }

    manager
}

impl CollapseManager {
    fn push_lines<S: AsRef<str>>(&mut self, side: Side, lines: &[S]) {
        self.streams[side.slot()].extend(lines.iter().map(|l| DisplayBlock::normal(l.as_ref())));
    }

    fn invalidate(&mut self) {
        for cache in &mut self.line_numbers {
            cache.take();
        }
        self.revision += 1;
    }

    /// Counter bumped on every structural change to the displayed streams.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn blocks(&self, side: Side) -> &[DisplayBlock] {
        &self.streams[side.slot()]
    }

    pub fn display_text(&self, side: Side) -> String {
        let texts: Vec<&str> = self.blocks(side).iter().map(|b| b.text.as_str()).collect();
        join_lines(&texts)
    }

    pub fn sections(&self) -> &[CollapsedSection] {
        &self.sections
    }

    /// Displayed position of section `index`'s placeholder on `side`.
    pub fn placeholder_position(&self, index: usize, side: Side) -> Option<usize> {
        self.placeholders.get(index).map(|p| p.get(side))
    }

    pub fn placeholder_positions(&self) -> &[PlaceholderPosition] {
        &self.placeholders
    }

    /// Cached original-line mapping for `side`, rebuilt after any structural change.
    pub fn line_numbers(&self, side: Side) -> &LineNumbers {
        self.line_numbers[side.slot()]
            .get_or_init(|| LineNumbers::build(self.blocks(side), &self.sections))
    }

    /// Original line number of a displayed block; `None` for placeholders and out of range.
    pub fn original_line_number(&self, side: Side, block: usize) -> Option<usize> {
        match self.line_numbers(side).get(block)? {
            DisplayLine::Normal(n) => Some(n),
            DisplayLine::Placeholder(_) => None,
        }
    }

    /// Put section `index` back into both streams.
    ///
    /// Returns `false` (and changes nothing) when `index` is out of range. Later sections
    /// and their placeholders are renumbered down by one.
    pub fn expand(&mut self, index: usize) -> bool {
        if index >= self.sections.len() {
            tracing::debug!(
                "expand of section {} ignored, only {} collapsed",
                index,
                self.sections.len()
            );
            return false;
        }

        let section = self.sections.remove(index);
        let position = self.placeholders.remove(index);
        let hidden = section.hidden_lines.len();

        for side in Side::BOTH {
            let Some(at) = self.locate_placeholder(side, position.get(side), index) else {
                tracing::warn!("placeholder for section {} missing on {:?} side", index, side);
                continue;
            };
            let restored = section.hidden_lines.iter().map(DisplayBlock::normal);
            self.streams[side.slot()].splice(at..at + 1, restored);

            for block in &mut self.streams[side.slot()] {
                if let BlockKind::Placeholder(k) = &mut block.kind
                    && *k > index
                {
                    *k -= 1;
                }
            }
            for p in &mut self.placeholders {
                let pos = p.get_mut(side);
                if *pos > at {
                    *pos = *pos + hidden - 1;
                }
            }
        }
        for s in &mut self.sections[index..] {
            s.index -= 1;
        }

        tracing::debug!("expanded section {} ({} lines)", index, hidden);
        self.invalidate();
        true
    }

    /// Check the recorded position, falling back to a scan if it drifted.
    fn locate_placeholder(&self, side: Side, recorded: usize, index: usize) -> Option<usize> {
        let blocks = self.blocks(side);
        let wanted = BlockKind::Placeholder(index);
        if blocks.get(recorded).is_some_and(|b| b.kind == wanted) {
            return Some(recorded);
        }
        blocks.iter().position(|b| b.kind == wanted)
    }

    /// Replace the text of a normal displayed block with `text` (zero or more lines).
    ///
    /// If `text` does not end in a line terminator it inherits the replaced block's
    /// terminator, so each block stays exactly one displayed line.
    /// Placeholder blocks and out-of-range blocks are left alone and yield `false`.
    pub fn edit_block(&mut self, side: Side, block: usize, text: &str) -> bool {
        let terminator = match self.blocks(side).get(block) {
            Some(b) if b.kind == BlockKind::Normal => &b.text[trim_terminator(&b.text).len()..],
            _ => return false,
        };

        let mut text = text.to_string();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push_str(terminator);
        }
        let lines = split_lines(&text);
        let added = lines.len();
        self.streams[side.slot()].splice(block..block + 1, lines.into_iter().map(DisplayBlock::normal));
        for p in &mut self.placeholders {
            let pos = p.get_mut(side);
            if *pos > block {
                *pos = *pos + added - 1;
            }
        }

        self.invalidate();
        true
    }
}
