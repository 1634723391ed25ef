//! Similarity ratio between normalized keys.

/// Normalized Levenshtein ratio in `[0, 1]`: `1 - distance / max_len`,
/// counted in chars.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Upper bound on `ratio` from lengths alone. The edit distance is at least
/// the length difference, so the ratio cannot exceed `min_len / max_len`.
pub fn ratio_bound(len_a: usize, len_b: usize) -> f64 {
    let max = len_a.max(len_b);
    if max == 0 {
        return 1.0;
    }
    len_a.min(len_b) as f64 / max as f64
}
