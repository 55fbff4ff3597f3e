//! Replace-block refinement.
//!
//! A `Replace` opcode from the aligner says "these old lines became these new lines" and
//! nothing more. The refiner looks inside the block for a synchronization pair, either the
//! most similar non-identical line pair above the cutoff or, failing that, the first
//! identical pair, and recurses on both sides of it. The result pairs near-identical lines
//! one to one so they can be highlighted at character level.

use super::{Opcode, SequenceMatcher, Tag, coalesce_equal};

/// Refine every `Replace` in `opcodes`, leaving other opcodes untouched.
///
/// Adjacent `Equal` opcodes produced by refinement are merged with their neighbours.
pub fn refine_opcodes<S: AsRef<str>>(
    old: &[S],
    new: &[S],
    opcodes: &[Opcode],
    cutoff: f64,
    autojunk: bool,
) -> Vec<Opcode> {
    let mut out = Vec::with_capacity(opcodes.len());
    for op in opcodes {
        if op.tag == Tag::Replace {
            out.extend(refine_replace(old, new, *op, cutoff, autojunk));
        } else {
            out.push(*op);
        }
    }
    coalesce_equal(out)
}

/// Split one `Replace` opcode into finer opcodes over exactly the same ranges.
pub fn refine_replace<S: AsRef<str>>(
    old: &[S],
    new: &[S],
    op: Opcode,
    cutoff: f64,
    autojunk: bool,
) -> Vec<Opcode> {
    let old_chars: Vec<Vec<char>> = old[op.old_range()]
        .iter()
        .map(|l| l.as_ref().chars().collect())
        .collect();
    let new_chars: Vec<Vec<char>> = new[op.new_range()]
        .iter()
        .map(|l| l.as_ref().chars().collect())
        .collect();

    let block = ReplaceBlock {
        old: &old_chars,
        new: &new_chars,
        base_i: op.i1,
        base_j: op.j1,
        cutoff,
        autojunk,
    };
    let mut out = Vec::new();
    block.refine(0, old_chars.len(), 0, new_chars.len(), &mut out);
    out
}

/// A replace block's lines as char vectors; indices are relative to the block.
struct ReplaceBlock<'a> {
    old: &'a [Vec<char>],
    new: &'a [Vec<char>],
    base_i: usize,
    base_j: usize,
    cutoff: f64,
    autojunk: bool,
}

impl ReplaceBlock<'_> {
    fn emit(&self, out: &mut Vec<Opcode>, tag: Tag, i1: usize, i2: usize, j1: usize, j2: usize) {
        out.push(Opcode::new(
            tag,
            self.base_i + i1,
            self.base_i + i2,
            self.base_j + j1,
            self.base_j + j2,
        ));
    }

    fn refine(&self, ilo: usize, ihi: usize, jlo: usize, jhi: usize, out: &mut Vec<Opcode>) {
        if ilo == ihi {
            if jlo < jhi {
                self.emit(out, Tag::Insert, ilo, ihi, jlo, jhi);
            }
            return;
        }
        if jlo == jhi {
            self.emit(out, Tag::Delete, ilo, ihi, jlo, jhi);
            return;
        }

        let Some((best_i, best_j, tag)) = self.find_sync(ilo, ihi, jlo, jhi) else {
            tracing::trace!(
                "no sync pair in old[{}..{}] / new[{}..{}]",
                self.base_i + ilo,
                self.base_i + ihi,
                self.base_j + jlo,
                self.base_j + jhi
            );
            self.emit(out, Tag::Replace, ilo, ihi, jlo, jhi);
            return;
        };

        self.refine(ilo, best_i, jlo, best_j, out);
        self.emit(out, tag, best_i, best_i + 1, best_j, best_j + 1);
        self.refine(best_i + 1, ihi, best_j + 1, jhi, out);
    }

    /// Pick the synchronization pair: the best similar pair if one reaches the cutoff,
    /// otherwise the first identical pair, scanning new-major.
    fn find_sync(&self, ilo: usize, ihi: usize, jlo: usize, jhi: usize) -> Option<(usize, usize, Tag)> {
        let mut best: Option<(f64, usize, usize)> = None;
        let mut identical: Option<(usize, usize)> = None;

        for j in jlo..jhi {
            let mut cruncher = SequenceMatcher::new(&self.old[ilo], &self.new[j], self.autojunk);
            for i in ilo..ihi {
                if self.old[i] == self.new[j] {
                    if identical.is_none() {
                        identical = Some((i, j));
                    }
                    continue;
                }
                cruncher.set_seq1(&self.old[i]);

                let bar = best.map(|(ratio, _, _)| ratio);
                let clears = |ratio: f64| match bar {
                    Some(b) => ratio > b,
                    None => ratio >= self.cutoff,
                };
                if clears(cruncher.real_quick_ratio()) && clears(cruncher.quick_ratio()) {
                    let ratio = cruncher.ratio();
                    if clears(ratio) {
                        best = Some((ratio, i, j));
                    }
                }
            }
        }

        match (best, identical) {
            (Some((_, i, j)), _) => Some((i, j, Tag::Replace)),
            (None, Some((i, j))) => Some((i, j, Tag::Equal)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::align::{align, tests::assert_covers};

    const CUTOFF: f64 = 0.75;

    fn replace_all(old: &[&str], new: &[&str]) -> Vec<Opcode> {
        let op = Opcode::new(Tag::Replace, 0, old.len(), 0, new.len());
        refine_replace(old, new, op, CUTOFF, false)
    }

    /// A near-identical middle line splits the block into three one-line opcodes.
    #[test]
    fn similar_line_becomes_sync_point() {
        let ops = replace_all(
            &["aaa\n", "def f(x):\n", "bbb\n"],
            &["xyz\n", "def f(y):\n", "qrs\n"],
        );
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Replace, 0, 1, 0, 1),
                Opcode::new(Tag::Replace, 1, 2, 1, 2),
                Opcode::new(Tag::Replace, 2, 3, 2, 3),
            ]
        );
    }

    /// With nothing similar, an identical line anchors the split as an Equal.
    #[test]
    fn identical_line_used_as_fallback() {
        let ops = replace_all(&["qq", "same", "ww"], &["zz", "same", "yy"]);
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Replace, 0, 1, 0, 1),
                Opcode::new(Tag::Equal, 1, 2, 1, 2),
                Opcode::new(Tag::Replace, 2, 3, 2, 3),
            ]
        );
    }

    /// When several pairs clear the cutoff, the highest ratio wins even if it is scanned later.
    #[test]
    fn highest_ratio_pair_wins() {
        // "abcdefghXY" scores 0.8 against "abcdefghij", "abcdefghiX" scores 0.9.
        let ops = replace_all(&["abcdefghXY", "abcdefghiX"], &["abcdefghij"]);
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Delete, 0, 1, 0, 0),
                Opcode::new(Tag::Replace, 1, 2, 0, 1),
            ]
        );

        let ops = replace_all(&["abcdefghij"], &["abcdefghXY", "abcdefghiX"]);
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Insert, 0, 0, 0, 1),
                Opcode::new(Tag::Replace, 0, 1, 1, 2),
            ]
        );
    }

    /// A similar pair above the cutoff wins over an identical pair.
    #[test]
    fn similar_pair_beats_identical_pair() {
        let ops = replace_all(&["abcdefgh", "same"], &["same", "abcdefgx"]);
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Insert, 0, 0, 0, 1),
                Opcode::new(Tag::Replace, 0, 1, 1, 2),
                Opcode::new(Tag::Delete, 1, 2, 2, 2),
            ]
        );
    }

    /// Leftover lines after the sync pair become a pure Insert.
    #[test]
    fn leftovers_become_insert() {
        let ops = replace_all(&["one line changed"], &["one line changes", "brand new"]);
        assert_eq!(
            ops,
            vec![
                Opcode::new(Tag::Replace, 0, 1, 0, 1),
                Opcode::new(Tag::Insert, 1, 1, 1, 2),
            ]
        );
    }

    /// Unrelated lines stay as one opaque Replace.
    #[test]
    fn unrelated_block_is_kept_whole() {
        let ops = replace_all(&["alpha", "beta"], &["12345", "67890", "+-*/"]);
        assert_eq!(ops, vec![Opcode::new(Tag::Replace, 0, 2, 0, 3)]);
    }

    /// Offsets of a block deep inside the file are carried through.
    #[test]
    fn refine_inside_stream_keeps_offsets() {
        let old = ["keep\n", "let x = 1;\n", "tail\n"];
        let new = ["keep\n", "let x = 2;\n", "tail\n"];
        let ops = align(&old, &new, false);
        let refined = refine_opcodes(&old, &new, &ops, CUTOFF, false);
        assert_eq!(refined, ops);
        assert_eq!(refined[1], Opcode::new(Tag::Replace, 1, 2, 1, 2));
    }

    fn to_lines(raw: &[u8]) -> Vec<String> {
        // small vocabulary with near-duplicates so every refiner branch gets exercised
        const WORDS: [&str; 6] = ["alpha", "alphb", "beta", "betx", "gamma", "delta"];
        raw.iter().map(|b| WORDS[*b as usize % WORDS.len()].to_string()).collect()
    }

    quickcheck! {
        /// Refinement covers exactly the ranges of the stream it refines.
        fn prop_refiner_soundness(old: Vec<u8>, new: Vec<u8>) -> bool {
            let (old, new) = (to_lines(&old), to_lines(&new));
            let ops = align(&old, &new, false);
            let refined = refine_opcodes(&old, &new, &ops, CUTOFF, false);
            assert_covers(&refined, old.len(), new.len());

            for op in ops.iter().filter(|op| op.tag == Tag::Replace) {
                let sub = refine_replace(&old, &new, *op, CUTOFF, false);
                let (mut i, mut j) = (op.i1, op.j1);
                for s in &sub {
                    assert_eq!((s.i1, s.j1), (i, j), "gap inside refined {op}");
                    i = s.i2;
                    j = s.j2;
                }
                assert_eq!((i, j), (op.i2, op.j2), "refined {op} stops short");
            }

            let no_adjacent_equal = refined
                .windows(2)
                .all(|w| !(w[0].tag == Tag::Equal && w[1].tag == Tag::Equal));
            let equal_ok = refined
                .iter()
                .filter(|op| op.tag == Tag::Equal)
                .all(|op| old[op.old_range()] == new[op.new_range()]);
            no_adjacent_equal && equal_ok
        }
    }
}
