//! Typo correction by longest-common-subsequence similarity.

/// `2·LCS(a, b) / (|a| + |b|)`, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }

    // Two-row LCS table.
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    2.0 * prev[b.len()] as f64 / total as f64
}

/// Best candidate scoring above `threshold` under `score`.
/// Ties go to the candidate seen first.
pub fn best_match_by<'a, I, F>(candidates: I, threshold: f64, score: F) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> f64,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let s = score(candidate);
        if s <= threshold {
            continue;
        }
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((candidate, s)),
        }
    }
    best.map(|(c, _)| c)
}

/// The correction for `raw`, if any. A name that is already a candidate
/// needs no correction.
pub fn best_match<'a, I>(raw: &str, candidates: I, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<&'a str> = candidates.into_iter().collect();
    if candidates.iter().any(|c| *c == raw) {
        return None;
    }
    best_match_by(candidates, threshold, |c| similarity(raw, c))
}

/// Up to `n` candidates scoring at least `cutoff`, best first.
pub fn close_matches<'a, I>(raw: &str, candidates: I, n: usize, cutoff: f64) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .map(|c| (c, similarity(raw, c)))
        .filter(|(_, s)| *s >= cutoff)
        .collect();
    // Stable sort keeps registration order among equal scores.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(n).map(|(c, _)| c).collect()
}
