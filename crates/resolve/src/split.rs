//! Multi-name cell splitting.
//!
//! Policy, applied in order:
//! 1. Split on delimiter characters (default `,` `;` `|` and newline).
//! 2. A fragment that is only a generational suffix (`Jr.`, `Filho`, ...) is
//!    glued back onto the fragment before it, so `"Silva, Jr."` stays whole.
//! 3. Inside a fragment, split on a conjunction word (`e`, `and`, `&`) only
//!    when both sides hold at least two words. `"Silva e Souza"` is kept as a
//!    compound surname; `"João Silva e Maria Souza"` becomes two names.
//! 4. Trim every fragment and drop empty ones.

use serde::Deserialize;

use crate::normalize::normalize;

/// Suffixes that never stand alone as a name. Compared on normalized text.
const GENERATIONAL_SUFFIXES: &[&str] = &[
    "jr", "jr.", "junior", "filho", "neto", "sobrinho", "sr", "sr.", "segundo",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    /// Characters that always separate names.
    pub delimiters: Vec<char>,
    /// Whole words that separate two full names.
    pub conjunctions: Vec<String>,
    /// Separator used when joining identifiers back into one cell.
    pub join_with: String,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            delimiters: vec![',', ';', '|', '\n'],
            conjunctions: vec!["e".into(), "and".into(), "&".into()],
            join_with: ", ".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Splitter {
    policy: SplitPolicy,
}

impl Splitter {
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Split a cell into individual, trimmed names.
    pub fn split(&self, raw: &str) -> Vec<String> {
        let mut fragments: Vec<String> = Vec::new();
        for piece in raw.split(|c: char| self.policy.delimiters.contains(&c)) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if is_suffix(piece) {
                if let Some(prev) = fragments.last_mut() {
                    prev.push_str(", ");
                    prev.push_str(piece);
                    continue;
                }
            }
            fragments.push(piece.to_string());
        }

        fragments
            .into_iter()
            .flat_map(|f| self.split_conjunctions(&f))
            .collect()
    }

    /// Join identifiers (or names) with the policy separator.
    pub fn join<S: AsRef<str>>(&self, parts: &[S]) -> String {
        parts
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(&self.policy.join_with)
    }

    fn split_conjunctions(&self, fragment: &str) -> Vec<String> {
        let words: Vec<&str> = fragment.split_whitespace().collect();
        let mut out = Vec::new();
        let mut start = 0;

        let mut i = 0;
        while i < words.len() {
            if self.is_conjunction(words[i]) {
                let left = i - start;
                let right_end = self.next_conjunction(&words, i + 1).unwrap_or(words.len());
                let right = right_end - (i + 1);
                if left >= 2 && right >= 2 {
                    out.push(words[start..i].join(" "));
                    start = i + 1;
                }
            }
            i += 1;
        }

        let tail = words[start..].join(" ");
        if !tail.is_empty() {
            out.push(tail);
        }
        out
    }

    fn next_conjunction(&self, words: &[&str], from: usize) -> Option<usize> {
        (from..words.len()).find(|&j| self.is_conjunction(words[j]))
    }

    fn is_conjunction(&self, word: &str) -> bool {
        let key = normalize(word);
        self.policy.conjunctions.iter().any(|c| normalize(c) == key)
    }
}

fn is_suffix(fragment: &str) -> bool {
    let key = normalize(fragment);
    GENERATIONAL_SUFFIXES.contains(&key.as_str())
}
