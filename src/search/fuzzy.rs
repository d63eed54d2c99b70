//! Fuzzy string scoring shared by role resolution and skill-name lookup.
//!
//! The base score is the Ratcliff/Obershelp "gestalt pattern matching" ratio:
//! `2 * M / (|a| + |b|)`, where `M` is the number of characters covered by
//! recursively finding the longest common substring and then matching the
//! pieces to its left and right. Identical strings score 1.0, disjoint
//! strings 0.0.
//!
//! On top of that, [`match_score`] applies a containment boost: if either
//! string contains the other, the score is raised to at least the boost value.
//! "react" vs "react.js" therefore clears typical thresholds even though the
//! raw ratio is lower.

/// Default floor applied when one string contains the other.
pub const DEFAULT_CONTAINMENT_BOOST: f32 = 0.85;

/// Best candidate found by [`best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    pub score: f32,
}

/// Gestalt pattern matching ratio in `[0, 1]`, computed over chars.
#[must_use]
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_chars(&a, &b);
    (2.0 * matched as f64 / total as f64) as f32
}

/// [`sequence_ratio`] with the containment boost applied.
#[must_use]
pub fn match_score(query: &str, candidate: &str, containment_boost: f32) -> f32 {
    let score = sequence_ratio(query, candidate);
    if query.contains(candidate) || candidate.contains(query) {
        score.max(containment_boost)
    } else {
        score
    }
}

/// Scan `candidates` in order and keep the highest [`match_score`].
///
/// Only a strictly greater score replaces the current best, so among equal
/// scores the earliest candidate wins. Callers that need reproducible results
/// must supply candidates in a stable order. The threshold check is left to
/// the caller.
pub fn best_match<'a, I>(query: &str, candidates: I, containment_boost: f32) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<FuzzyMatch<'a>> = None;
    for candidate in candidates {
        let score = match_score(query, candidate, containment_boost);
        if best.is_none_or(|current| score > current.score) {
            best = Some(FuzzyMatch { candidate, score });
        }
    }
    best
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0usize;
    let mut pending = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_common_block(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

// Longest common substring of a[alo..ahi] and b[blo..bhi]; ties resolve to
// the block starting earliest in `a`, then earliest in `b`.
fn longest_common_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0usize);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let run = prev[slot - 1] + 1;
                cur[slot] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                cur[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}
