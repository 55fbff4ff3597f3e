//! The diff engine a presentation layer talks to.
//!
//! One recompute pass runs Alignment → Refine → Collapse → Highlight. [`DiffEngine::set_diff_text`]
//! replaces every piece of engine state; [`DiffEngine::expand_section`] and
//! [`DiffEngine::edit_block`] mutate the displayed streams incrementally without realigning.

use crate::{
    align::{Opcode, Tag, align, refine_opcodes},
    collapse::{CollapseManager, CollapsedSection, Side, collapse},
    config::EngineConfig,
    intraline::{
        HighlightRange, SideHighlights, char_diff, char_edits, highlight_pair, side_highlights,
    },
    render::{SideBySideRow, rows},
    utils::split_lines,
};

/// Highlights for one synchronized line pair of the refined stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairHighlight {
    /// The single-line `Replace` opcode the pair comes from.
    pub opcode: Opcode,
    pub old: Vec<HighlightRange>,
    pub new: Vec<HighlightRange>,
}

#[derive(Debug, Default)]
pub struct DiffEngine {
    config: EngineConfig,
    old_lines: Vec<String>,
    new_lines: Vec<String>,
    opcodes: Vec<Opcode>,
    view: CollapseManager,
    highlights: SideHighlights,
}

impl DiffEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reset everything from two raw texts and run a full recompute pass.
    pub fn set_diff_text(&mut self, old: &str, new: &str) -> &mut Self {
        self.old_lines = split_lines(old);
        self.new_lines = split_lines(new);

        let aligned = align(&self.old_lines, &self.new_lines, self.config.autojunk);
        self.opcodes = refine_opcodes(
            &self.old_lines,
            &self.new_lines,
            &aligned,
            self.config.sync_cutoff,
            self.config.autojunk,
        );
        self.view = collapse(
            &self.opcodes,
            &self.old_lines,
            &self.new_lines,
            self.config.collapse_threshold,
            self.config.context_lines,
        );
        tracing::debug!(
            "diff run: {} old / {} new lines, {} aligned opcodes, {} refined, {} collapsed sections",
            self.old_lines.len(),
            self.new_lines.len(),
            aligned.len(),
            self.opcodes.len(),
            self.view.sections().len()
        );

        self.recompute_highlights();
        self
    }

    /// Char-level highlights over the whole displayed text of both sides.
    pub fn recompute_highlights(&mut self) -> &SideHighlights {
        let old = self.view.display_text(Side::Old);
        let new = self.view.display_text(Side::New);
        let ops = char_diff(&old, &new, self.config.char_diff_timeout);
        self.highlights = side_highlights(&char_edits(&ops));
        &self.highlights
    }

    /// Highlights from the last recompute pass.
    pub fn highlights(&self) -> &SideHighlights {
        &self.highlights
    }

    /// Char-level highlights for every synchronized line pair of the refined stream.
    pub fn pair_highlights(&self) -> Vec<PairHighlight> {
        self.opcodes
            .iter()
            .filter(|op| op.tag == Tag::Replace && op.old_len() == 1 && op.new_len() == 1)
            .map(|op| {
                let (old, new) = highlight_pair(
                    self.old_lines.get(op.i1).map(String::as_str),
                    self.new_lines.get(op.j1).map(String::as_str),
                    self.config.char_diff_timeout,
                );
                PairHighlight {
                    opcode: *op,
                    old,
                    new,
                }
            })
            .collect()
    }

    /// Expand collapsed section `index`; out of range is a no-op returning `false`.
    pub fn expand_section(&mut self, index: usize) -> bool {
        if !self.view.expand(index) {
            return false;
        }
        self.recompute_highlights();
        true
    }

    /// Apply an edit reported by the presentation layer to one displayed block.
    ///
    /// Highlights are not recomputed here; the caller's debounced pass does that.
    pub fn edit_block(&mut self, side: Side, block: usize, text: &str) -> bool {
        self.view.edit_block(side, block, text)
    }

    pub fn display_text(&self, side: Side) -> String {
        self.view.display_text(side)
    }

    pub fn original_line_number(&self, side: Side, block: usize) -> Option<usize> {
        self.view.original_line_number(side, block)
    }

    pub fn opcodes(&self) -> &[Opcode] {
        &self.opcodes
    }

    pub fn lines(&self, side: Side) -> &[String] {
        match side {
            Side::Old => &self.old_lines,
            Side::New => &self.new_lines,
        }
    }

    pub fn sections(&self) -> &[CollapsedSection] {
        self.view.sections()
    }

    pub fn view(&self) -> &CollapseManager {
        &self.view
    }

    /// Side-by-side rows for the refined stream (collapsing not applied).
    pub fn rows(&self) -> Vec<SideBySideRow<'_>> {
        rows(&self.old_lines, &self.new_lines, &self.opcodes)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::intraline::HighlightKind;

    fn engine(threshold: usize, context: usize) -> DiffEngine {
        DiffEngine::new(EngineConfig {
            collapse_threshold: threshold,
            context_lines: context,
            char_diff_timeout: Duration::from_millis(500),
            ..Default::default()
        })
    }

    /// A full run wires alignment, refinement and collapsing together.
    #[test]
    fn full_pass() {
        let old: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let new = old.replace("line 10\n", "line ten\n");

        let mut e = engine(5, 2);
        e.set_diff_text(&old, &new);
        assert_eq!(e.opcodes()[1], Opcode::new(Tag::Replace, 9, 10, 9, 10));
        assert_eq!(e.sections().len(), 2);
        // 2 + ph + 2 + changed + 2 + ph + 2
        assert_eq!(e.view().blocks(Side::Old).len(), 11);
        assert_eq!(e.original_line_number(Side::New, 5), Some(10));
    }

    /// Expanding recomputes highlights against the new display text.
    #[test]
    fn expand_recomputes_highlights() {
        let old: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let new = old.replace("line 10\n", "line 1O\n");

        let mut e = engine(5, 2);
        e.set_diff_text(&old, &new);
        let before = e.highlights().clone();
        assert_eq!(before.0.len(), 1);

        assert!(e.expand_section(0));
        let (old_hl, new_hl) = e.highlights().clone();
        // the changed char moved down by the restored lines
        assert!(old_hl[0].start > before.0[0].start);
        assert_eq!(old_hl[0].kind, HighlightKind::Removed);
        assert_eq!(new_hl[0].kind, HighlightKind::Added);
        assert!(!e.expand_section(5));
    }

    /// Each synchronized line pair gets its own char-level highlights.
    #[test]
    fn pair_highlights_for_sync_lines() {
        let mut e = engine(100, 3);
        e.set_diff_text("keep\ndef f(x):\nend\n", "keep\ndef f(y):\nend\n");
        let pairs = e.pair_highlights();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].old, vec![HighlightRange::new(6, 1, HighlightKind::Removed)]);
        assert_eq!(pairs[0].new, vec![HighlightRange::new(6, 1, HighlightKind::Added)]);
    }

    /// A new run discards the collapsed state of the previous one.
    #[test]
    fn set_diff_text_resets_state() {
        let same: String = "L\n".repeat(10);
        let mut e = engine(5, 3);
        e.set_diff_text(&same, &same);
        assert_eq!(e.sections().len(), 1);
        e.set_diff_text("a\n", "b\n");
        assert!(e.sections().is_empty());
        assert_eq!(e.display_text(Side::New), "b\n");
        assert_eq!(e.lines(Side::Old), ["a\n".to_string()]);
    }

    /// Editing the new side shifts its numbering but leaves the old side alone.
    #[test]
    fn edit_block_updates_numbering() {
        let same: String = "L\n".repeat(10);
        let mut e = engine(5, 3);
        e.set_diff_text(&same, &same);
        assert!(e.edit_block(Side::New, 1, ""));
        assert_eq!(e.original_line_number(Side::New, 3), Some(7));
        assert_eq!(e.original_line_number(Side::Old, 4), Some(8));
        e.recompute_highlights();
        assert_eq!(e.highlights().0.len(), 1);
        assert!(e.highlights().1.is_empty());
    }
}
