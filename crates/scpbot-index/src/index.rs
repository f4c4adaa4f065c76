//! Inverted index with fuzzy search over multi-word keys.

use std::collections::{HashMap, HashSet};

use crate::distance::Costs;
use crate::tokenizer::tokenize;

/// A stored key/value pair. Entries are immutable once inserted and are
/// identified by their position in the entry arena.
struct Entry<V> {
    key: Vec<String>,
    value: V,
}

/// Maps multi-word text keys to values and answers approximate lookups
/// under a token-level edit distance.
///
/// The index is append-only: there is no removal or update. Build it with
/// `insert`/`insert_all`, then query it; `search` takes `&self` and is safe
/// from any number of concurrent readers once insertion is done, while
/// inserts themselves need external synchronization.
pub struct FuzzyIndex<V> {
    costs: Costs,
    entries: Vec<Entry<V>>,
    /// Token → ids of entries whose key contains the token, one posting per
    /// occurrence. Duplicate postings from repeated tokens are collapsed at
    /// query time by the id-keyed dedup.
    buckets: HashMap<String, Vec<usize>>,
}

impl<V> FuzzyIndex<V> {
    /// Creates an empty index with the given edit-distance costs.
    pub fn new(costs: Costs) -> Self {
        Self {
            costs,
            entries: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a value under the given text key.
    ///
    /// No uniqueness check: inserting the same text or value twice keeps
    /// both as independent entries.
    pub fn insert(&mut self, text: &str, value: V) {
        let key = tokenize(text);
        let id = self.entries.len();
        for token in &key {
            self.buckets.entry(token.clone()).or_default().push(id);
        }
        self.entries.push(Entry { key, value });
    }

    /// Adds every pair in order; equivalent to repeated `insert` calls.
    pub fn insert_all<S, I>(&mut self, pairs: I)
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, V)>,
    {
        for (text, value) in pairs {
            self.insert(text.as_ref(), value);
        }
    }

    /// Returns the values whose keys best match `query`, ranked by
    /// ascending edit distance.
    ///
    /// If any key matches exactly (distance 0), only the exact matches are
    /// returned, capped at `max` and ignoring `min`. Otherwise the ranked
    /// list is cut off at the first score increase past the `min`-count
    /// guarantee (ties always extend the result), again capped at `max`.
    /// The first candidate is always eligible even with `min = 0`.
    ///
    /// Empty queries, an empty index, and queries sharing no token with any
    /// key all produce an empty result, never an error.
    pub fn search(&self, query: &str, min: usize, max: usize) -> Vec<&V> {
        let q = tokenize(query);

        // Candidate fan-out: union the postings of every query token,
        // dedup by entry id in first-seen order, score the survivors.
        let mut seen = HashSet::new();
        let mut scored: Vec<(usize, u32)> = Vec::new();
        for token in &q {
            let Some(ids) = self.buckets.get(token) else {
                continue;
            };
            for &id in ids {
                if seen.insert(id) {
                    scored.push((id, self.costs.distance(&q, &self.entries[id].key)));
                }
            }
        }
        // Stable: tied scores keep their gathering order.
        scored.sort_by_key(|&(_, dist)| dist);

        if scored.first().is_some_and(|&(_, dist)| dist == 0) {
            return scored
                .iter()
                .take_while(|&&(_, dist)| dist == 0)
                .take(max)
                .map(|&(id, _)| &self.entries[id].value)
                .collect();
        }

        let mut picked = Vec::new();
        let mut last: Option<u32> = None;
        for &(id, dist) in &scored {
            if picked.len() == max {
                break;
            }
            // Keep until the min-count guarantee holds, then only while the
            // score plateaus. The first candidate is always kept so that
            // min = 0 still returns the best match.
            if last.is_some() && picked.len() >= min && last != Some(dist) {
                break;
            }
            picked.push(&self.entries[id].value);
            last = Some(dist);
        }
        picked
    }
}
