use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::MatchPolicy;
use crate::lookup::LookupTable;
use crate::model::{Candidate, ResolutionOutcome};
use crate::normalize::normalize;
use crate::similarity::{ratio, ratio_bound};

/// Resolves names against a borrowed lookup table.
pub struct Resolver<'a> {
    table: &'a LookupTable,
    policy: MatchPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a LookupTable, policy: MatchPolicy) -> Self {
        Self { table, policy }
    }

    /// Resolve a raw name. Blank names are `NotFound`.
    pub fn resolve(&self, name: &str) -> ResolutionOutcome {
        self.resolve_key(&normalize(name))
    }

    /// True when `key` names exactly one identifier in the table.
    pub fn is_exact(&self, key: &str) -> bool {
        self.table.exact(key).is_some()
    }

    /// Resolve an already-normalized key.
    pub fn resolve_key(&self, key: &str) -> ResolutionOutcome {
        if key.is_empty() {
            return ResolutionOutcome::NotFound;
        }

        if let Some(entry) = self.table.exact(key) {
            return ResolutionOutcome::Resolved {
                identifier: entry.identifier.clone(),
                score: 1.0,
            };
        }

        let scored = self.scan(key);
        if scored.is_empty() {
            return ResolutionOutcome::NotFound;
        }

        // Accept only when the top tier names one identifier, none of it collided.
        let accepted: Vec<&Scored> = scored
            .iter()
            .filter(|s| s.candidate.score >= self.policy.accept_threshold)
            .collect();
        if let [only] = accepted.as_slice() {
            if !only.collided {
                return ResolutionOutcome::Resolved {
                    identifier: only.candidate.identifier.clone(),
                    score: only.candidate.score,
                };
            }
        }

        ResolutionOutcome::Ambiguous(scored.into_iter().map(|s| s.candidate).collect())
    }

    /// Score every key within reach of the ambiguous threshold. One candidate
    /// per identifier (its best alias), sorted best first.
    fn scan(&self, key: &str) -> Vec<Scored> {
        let key_len = key.chars().count();
        let floor = self.policy.ambiguous_threshold;
        let mut best: BTreeMap<&str, Scored> = BTreeMap::new();

        for (other, entry, collided) in self.table.entries() {
            if ratio_bound(key_len, other.chars().count()) < floor {
                continue;
            }
            let score = ratio(key, other);
            if score < floor {
                continue;
            }

            let better = match best.get(entry.identifier.as_str()) {
                Some(prev) => score > prev.candidate.score,
                None => true,
            };
            if better {
                best.insert(
                    entry.identifier.as_str(),
                    Scored {
                        candidate: Candidate {
                            identifier: entry.identifier.clone(),
                            alias: entry.alias.clone(),
                            group: entry.group.clone(),
                            score,
                        },
                        collided,
                    },
                );
            }
        }

        let mut scored: Vec<Scored> = best.into_values().collect();
        scored.sort_by(|a, b| compare_candidates(&a.candidate, &b.candidate));
        scored
    }
}

struct Scored {
    candidate: Candidate,
    collided: bool,
}

/// Descending score, then identifier, then alias.
fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.identifier.cmp(&b.identifier))
        .then_with(|| a.alias.cmp(&b.alias))
}
