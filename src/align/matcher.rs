//! Ratcliff/Obershelp sequence matcher: recursive longest-common-block search plus the
//! three similarity estimates (`real_quick_ratio` <= `quick_ratio` bound chain over
//! `ratio`) the refiner uses to rank candidate line pairs.

use std::hash::Hash;

use ahash::AHashMap;

use super::MatchingBlock;

/// `new` sequences shorter than this are never pruned by autojunk.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Matcher over two borrowed sequences.
///
/// The index of `b` is built once in [`SequenceMatcher::new`]; `a` can be swapped with
/// [`SequenceMatcher::set_seq1`] to compare many sequences against the same `b`.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each element of `b`, popular elements removed when autojunk is on.
    b2j: AHashMap<&'a T, Vec<usize>>,
    /// Full element counts of `b`, used by `quick_ratio`.
    b_counts: AHashMap<&'a T, usize>,
}

impl<'a, T: Hash + Eq> SequenceMatcher<'a, T> {
    /// Build a matcher for `a` against `b`.
    ///
    /// With `autojunk`, any element of a `b` of at least 200 items that occurs more than
    /// `len / 100 + 1` times is not used to seed matches.
    pub fn new(a: &'a [T], b: &'a [T], autojunk: bool) -> Self {
        let mut b2j: AHashMap<&'a T, Vec<usize>> = AHashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }
        let b_counts = b2j.iter().map(|(k, v)| (*k, v.len())).collect();

        if autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            let before = b2j.len();
            b2j.retain(|_, positions| positions.len() <= ntest);
            let popular = before - b2j.len();
            if popular > 0 {
                tracing::trace!("autojunk pruned {} popular elements (ntest = {})", popular, ntest);
            }
        }

        Self { a, b, b2j, b_counts }
    }

    /// Replace the first sequence, keeping the index built for `b`.
    pub fn set_seq1(&mut self, a: &'a [T]) {
        self.a = a;
    }

    /// Longest block with `a[i..i+k] == b[j..j+k]` inside `a[alo..ahi]` × `b[blo..bhi]`.
    ///
    /// Ties resolve to the earliest start in `a`, then in `b`. A zero-sized block means the
    /// ranges share nothing.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);

        // j2len[j] = length of the longest match ending at a[i-1], b[j]
        let mut j2len: AHashMap<usize, usize> = AHashMap::new();
        for i in alo..ahi {
            let mut next: AHashMap<usize, usize> = AHashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow across elements autojunk kept out of the index.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        MatchingBlock {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }

    /// All maximal matching blocks in increasing `(a, b)` order, adjacent blocks merged.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            found.push(m);
            if alo < m.a && blo < m.b {
                pending.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                pending.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        found.sort_by_key(|m| (m.a, m.b));

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(found.len());
        for m in found {
            match merged.last_mut() {
                Some(tail) if tail.a + tail.size == m.a && tail.b + tail.size == m.b => {
                    tail.size += m.size;
                }
                _ => merged.push(m),
            }
        }
        merged
    }

    /// Similarity in `[0, 1]`: `2 * matched / (len(a) + len(b))`; two empties score 1.
    pub fn ratio(&self) -> f64 {
        let matched = self.matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matched, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from the multiset intersection.
    pub fn quick_ratio(&self) -> f64 {
        let mut avail: AHashMap<&T, isize> = AHashMap::new();
        let mut matched = 0usize;
        for elt in self.a {
            let left = avail
                .entry(elt)
                .or_insert_with(|| self.b_counts.get(elt).copied().unwrap_or(0) as isize);
            *left -= 1;
            if *left >= 0 {
                matched += 1;
            }
        }
        calculate_ratio(matched, self.a.len() + self.b.len())
    }

    /// Upper bound on [`quick_ratio`](Self::quick_ratio) from the lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }
}

fn calculate_ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    /// The longest run wins and ties go to the earliest position.
    #[test]
    fn longest_match_prefers_earliest() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let m = SequenceMatcher::new(&a, &b, false);
        assert_eq!(
            m.find_longest_match(0, 5, 0, 9),
            MatchingBlock { a: 0, b: 4, size: 5 }
        );

        let a = chars("ab");
        let b = chars("abab");
        let m = SequenceMatcher::new(&a, &b, false);
        assert_eq!(
            m.find_longest_match(0, 2, 0, 4),
            MatchingBlock { a: 0, b: 0, size: 2 }
        );
    }

    /// Blocks come back ordered and merged.
    #[test]
    fn matching_blocks_are_ordered() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let m = SequenceMatcher::new(&a, &b, false);
        assert_eq!(
            m.matching_blocks(),
            vec![
                MatchingBlock { a: 0, b: 0, size: 2 },
                MatchingBlock { a: 3, b: 2, size: 2 },
            ]
        );
    }

    /// The three estimates bound each other and the classic example scores 0.75.
    #[test]
    fn ratio_bounds() {
        let a = chars("abcd");
        let b = chars("bcde");
        let m = SequenceMatcher::new(&a, &b, false);
        assert_eq!(m.ratio(), 0.75);
        assert!(m.quick_ratio() >= m.ratio());
        assert!(m.real_quick_ratio() >= m.quick_ratio());

        let empty: Vec<char> = vec![];
        assert_eq!(SequenceMatcher::new(&empty, &empty, false).ratio(), 1.0);
        assert_eq!(SequenceMatcher::new(&a, &empty, false).ratio(), 0.0);
    }

    /// Swapping the first sequence reuses the index of the second.
    #[test]
    fn set_seq1_reuses_index() {
        let b = chars("hello");
        let a1 = chars("hello");
        let a2 = chars("jello");
        let mut m = SequenceMatcher::new(&a1, &b, false);
        assert_eq!(m.ratio(), 1.0);
        m.set_seq1(&a2);
        assert_eq!(m.ratio(), 0.8);
    }

    /// Autojunk stops a popular element from seeding matches but not from extending them.
    #[test]
    fn autojunk_prunes_popular_elements() {
        let mut b = vec![0u8; 300];
        b[150] = 7;
        let a = vec![0u8, 7, 0];

        let plain = SequenceMatcher::new(&a, &b, false);
        assert_eq!(plain.find_longest_match(0, 3, 0, 300).size, 3);

        let junked = SequenceMatcher::new(&a, &b, true);
        let m = junked.find_longest_match(0, 3, 0, 300);
        // seeded on the rare `7`, then grown over the popular zeros on both edges
        assert_eq!(m, MatchingBlock { a: 0, b: 149, size: 3 });

        // nothing seeds, so only the edge extension at (alo, blo) can match
        let only_popular = vec![0u8; 3];
        let junked = SequenceMatcher::new(&only_popular, &b, true);
        assert_eq!(
            junked.find_longest_match(0, 3, 10, 300),
            MatchingBlock { a: 0, b: 10, size: 3 }
        );
        assert_eq!(junked.find_longest_match(0, 3, 150, 151).size, 0);
    }
}
