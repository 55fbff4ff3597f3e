//! Line alignment: opcode and matching-block types, the Ratcliff/Obershelp matcher and the
//! replace-block refiner that splits opaque replacements around synchronization lines.
//!
//! An opcode stream for a pair `(old, new)` always partitions `[0, old.len())` and
//! `[0, new.len())` contiguously and in order. Streams produced by [`align`] never repeat
//! a tag twice in a row; refined streams never hold two adjacent `Equal` opcodes.

pub mod matcher;
pub mod refine;

use std::{fmt, hash::Hash, ops::Range};

pub use matcher::SequenceMatcher;
pub use refine::{refine_opcodes, refine_replace};

/// How a range of `old` maps to a range of `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Equal,
    Delete,
    Insert,
    Replace,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Equal => "Equal",
            Tag::Delete => "Delete",
            Tag::Insert => "Insert",
            Tag::Replace => "Replace",
        })
    }
}

/// `old[i1..i2]` corresponds to `new[j1..j2]` under `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    pub tag: Tag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl Opcode {
    pub const fn new(tag: Tag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self {
            tag,
            i1,
            i2,
            j1,
            j2,
        }
    }

    pub fn old_range(&self) -> Range<usize> {
        self.i1..self.i2
    }

    pub fn new_range(&self) -> Range<usize> {
        self.j1..self.j2
    }

    pub fn old_len(&self) -> usize {
        self.i2 - self.i1
    }

    pub fn new_len(&self) -> usize {
        self.j2 - self.j1
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{},{},{})",
            self.tag, self.i1, self.i2, self.j1, self.j2
        )
    }
}

/// A maximal common run: `old[a..a+size] == new[b..b+size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchingBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Align two sequences into an opcode stream covering both exactly.
///
/// Total over any input: empty `old` yields a single `Insert`, empty `new` a single
/// `Delete`, and two empty sequences yield no opcodes.
pub fn align<T: Hash + Eq>(old: &[T], new: &[T], autojunk: bool) -> Vec<Opcode> {
    let matcher = SequenceMatcher::new(old, new, autojunk);
    opcodes_from_blocks(&matcher.matching_blocks(), old.len(), new.len())
}

/// Synthesize opcodes from ordered, non-overlapping, merged matching blocks.
pub fn opcodes_from_blocks(blocks: &[MatchingBlock], old_len: usize, new_len: usize) -> Vec<Opcode> {
    let mut opcodes = Vec::with_capacity(blocks.len() * 2 + 1);
    let (mut i, mut j) = (0usize, 0usize);

    let sentinel = MatchingBlock {
        a: old_len,
        b: new_len,
        size: 0,
    };
    for block in blocks.iter().chain(std::iter::once(&sentinel)) {
        let tag = match (i < block.a, j < block.b) {
            (true, true) => Some(Tag::Replace),
            (true, false) => Some(Tag::Delete),
            (false, true) => Some(Tag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            opcodes.push(Opcode::new(tag, i, block.a, j, block.b));
        }
        i = block.a + block.size;
        j = block.b + block.size;
        if block.size > 0 {
            opcodes.push(Opcode::new(Tag::Equal, block.a, i, block.b, j));
        }
    }

    opcodes
}

/// Merge runs of adjacent `Equal` opcodes into one.
pub fn coalesce_equal(opcodes: Vec<Opcode>) -> Vec<Opcode> {
    let mut out: Vec<Opcode> = Vec::with_capacity(opcodes.len());
    for op in opcodes {
        if let Some(tail) = out.last_mut()
            && tail.tag == Tag::Equal
            && op.tag == Tag::Equal
            && tail.i2 == op.i1
            && tail.j2 == op.j1
        {
            tail.i2 = op.i2;
            tail.j2 = op.j2;
            continue;
        }
        out.push(op);
    }
    out
}
