//! Gestalt pattern matching similarity.
//!
//! Finds the longest common contiguous block of two strings, then repeats on
//! the unmatched segments to its left and right. With `M` the total length of
//! all matched blocks, the ratio is `2M / (len(a) + len(b))`, lengths counted
//! in chars.
//!
//! Two empty strings score `1.0`: there is nothing to disagree on.
//!
//! Block selection is order sensitive when several longest blocks tie, so
//! `"tide"`/`"diet"` would give 0.25 one way and 0.5 the other. [`similarity`]
//! always matches the pair in lexicographic order, which makes it symmetric.

/// A matched block: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Similarity ratio of two strings in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = first.chars().collect();
    let b: Vec<char> = second.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = blocks(&a, &b).iter().map(|m| m.len).sum();
    2.0 * matched as f64 / total as f64
}

/// Matched blocks of `a` against `b`, sorted by position, in char offsets.
///
/// Unlike [`similarity`] this keeps the argument order.
pub fn matching_blocks(a: &str, b: &str) -> Vec<MatchingBlock> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    blocks(&a, &b)
}

fn blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut found = Vec::new();
    // Explicit stack of (alo, ahi, blo, bhi) segments still to search.
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let block = longest_match(a, b, alo, ahi, blo, bhi);
        if block.len == 0 {
            continue;
        }
        let (i, j, k) = (block.a_start, block.b_start, block.len);
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
        found.push(block);
    }

    found.sort_by_key(|m| (m.a_start, m.b_start));
    found
}

/// Longest common block within `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: alo,
        b_start: blo,
        len: 0,
    };
    if alo >= ahi || blo >= bhi {
        return best;
    }

    let width = bhi - blo;
    // run[j + 1]: length of the common suffix ending at a[i] and b[blo + j]
    let mut prev = vec![0usize; width + 1];
    let mut run = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in 0..width {
            run[j + 1] = if a[i] == b[blo + j] { prev[j] + 1 } else { 0 };
            let k = run[j + 1];
            if k > best.len {
                best = MatchingBlock {
                    a_start: i + 1 - k,
                    b_start: blo + j + 1 - k,
                    len: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    best
}
