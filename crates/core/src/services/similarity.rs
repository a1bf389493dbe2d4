//! Ratcliff/Obershelp string similarity.
//!
//! `ratio(a, b) = 2 * M / (len(a) + len(b))` where `M` is the number of
//! characters in the matching blocks found by repeatedly taking the longest
//! common substring and recursing on the pieces to its left and right.
//! Among equally long common substrings the one starting earliest in `a`
//! (then earliest in `b`) is taken, so results are fully deterministic.

/// Similarity in `0.0..=1.0`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Cheap upper bound on [`ratio`], from lengths alone.
pub fn ratio_upper_bound(a: &str, b: &str) -> f64 {
    let la = a.chars().count();
    let lb = b.chars().count();
    let total = la + lb;
    if total == 0 {
        return 1.0;
    }
    2.0 * la.min(lb) as f64 / total as f64
}

/// The first key (in iteration order) with the highest ratio to `word`,
/// provided that ratio is at least `cutoff`.
pub fn best_match<'a, I>(word: &str, keys: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for key in keys {
        let bound = ratio_upper_bound(word, key);
        if bound < cutoff {
            continue;
        }
        // A later key only wins by being strictly better.
        if let Some((_, score)) = best {
            if bound <= score {
                continue;
            }
        }
        let score = ratio(word, key);
        if score >= cutoff && best.map_or(true, |(_, s)| score > s) {
            best = Some((key, score));
        }
    }
    best
}

/// Up to `n` keys scoring at least `cutoff`, best first; equal scores keep
/// iteration order.
pub fn close_matches<'a, I>(word: &str, keys: I, n: usize, cutoff: f64) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(&'a str, f64)> = keys
        .into_iter()
        .filter(|key| ratio_upper_bound(word, key) >= cutoff)
        .map(|key| (key, ratio(word, key)))
        .filter(|(_, score)| *score >= cutoff)
        .collect();
    // Stable sort keeps iteration order among ties.
    scored.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(n);
    scored
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_in_a, start_in_b, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    let width = bhi - blo;
    // prev[jj + 1] = length of the common suffix ending at a[i-1], b[blo+jj]
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for jj in 0..width {
            let j = blo + jj;
            if a[i] == b[j] {
                let k = prev[jj] + 1;
                curr[jj + 1] = k;
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            } else {
                curr[jj + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_len)
}
