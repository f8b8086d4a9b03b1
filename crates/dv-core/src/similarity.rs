//! Gestalt (Ratcliff/Obershelp) string similarity
//!
//! The ratio is `2 * M / (|a| + |b|)` where `M` is the total length of the
//! matching blocks found by repeatedly taking the longest common run and
//! recursing on the pieces to its left and right. Lengths are counted in
//! Unicode scalar values.

use std::collections::HashMap;

/// Similarity ratio in `[0, 1]`.
///
/// `1.0` only for identical strings (including two empty strings), `0.0`
/// when no character lines up. The pair is put in a canonical order first so
/// the result does not depend on argument order.
pub fn ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let matcher = SequenceMatcher::new(a, b);

    let total = matcher.a.len() + matcher.b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matcher.matched_len() as f64 / total as f64
}

/// A matching block: `a[a_start..a_start + len] == b[b_start..b_start + len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// Positions of each character of `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        Self { a, b, b2j }
    }

    fn matched_len(&self) -> usize {
        self.matching_blocks().iter().map(|blk| blk.len).sum()
    }

    /// All matching blocks, sorted by position
    fn matching_blocks(&self) -> Vec<Block> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let blk = self.find_longest_match(alo, ahi, blo, bhi);
            if blk.len == 0 {
                continue;
            }
            if alo < blk.a_start && blo < blk.b_start {
                queue.push((alo, blk.a_start, blo, blk.b_start));
            }
            if blk.a_start + blk.len < ahi && blk.b_start + blk.len < bhi {
                queue.push((blk.a_start + blk.len, ahi, blk.b_start + blk.len, bhi));
            }
            blocks.push(blk);
        }

        blocks.sort_by_key(|blk| (blk.a_start, blk.b_start));
        blocks
    }

    /// Longest block inside `a[alo..ahi]` x `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
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
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            j2len = next;
        }

        Block {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }
}
