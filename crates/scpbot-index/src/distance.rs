//! Token-level edit distance with branch-and-bound pruning.

/// Per-operation costs for the token edit distance.
///
/// Directionality is fixed: the query is the source, the stored key the
/// target. `drop` pays for discarding a query token, `insert` pays for a
/// key token the query lacks, `substitute` pays for a mismatched aligned
/// pair. All three must be non-negative; zero is allowed but makes the
/// matching operation free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Costs {
    pub drop: u32,
    pub substitute: u32,
    pub insert: u32,
}

impl Costs {
    pub fn new(drop: u32, substitute: u32, insert: u32) -> Self {
        Self {
            drop,
            substitute,
            insert,
        }
    }

    /// Minimal total cost of transforming `query` into `key`.
    ///
    /// Exact: pruning never changes the result, only skips branches that
    /// provably cannot beat the best complete transformation found so far.
    /// No memoization is used, so very long token sequences with a high
    /// `substitute` relative to `drop + insert` can degrade to exponential
    /// time; wiki titles are short enough that this does not matter.
    pub fn distance(&self, query: &[String], key: &[String]) -> u32 {
        self.bounded(query, key, 0, u32::MAX)
    }

    /// Branch-and-bound search over the remaining suffix pair.
    ///
    /// `cur` is the cost spent so far, `cur_min` the best complete cost
    /// seen so far. Returns the cheapest complete cost found under
    /// `cur_min`, or `cur_min` unchanged when this branch cannot improve
    /// on it.
    fn bounded(&self, l: &[String], r: &[String], cur: u32, mut cur_min: u32) -> u32 {
        if cur >= cur_min {
            return cur_min;
        }

        // Matching leading tokens align for free.
        let (mut l, mut r) = (l, r);
        while let (Some(a), Some(b)) = (l.first(), r.first()) {
            if a != b {
                break;
            }
            l = &l[1..];
            r = &r[1..];
        }

        // The length gap alone forces that many single-operation edits on
        // the longer side; prune when even that floor cannot win. All
        // arithmetic saturates so extreme configured costs pin at the
        // unconstrained bound instead of wrapping.
        let floor = if l.len() >= r.len() {
            (self.drop).saturating_mul((l.len() - r.len()) as u32)
        } else {
            (self.insert).saturating_mul((r.len() - l.len()) as u32)
        };
        if cur.saturating_add(floor) >= cur_min {
            return cur_min;
        }

        if l.is_empty() {
            return cur.saturating_add(self.insert.saturating_mul(r.len() as u32));
        }
        if r.is_empty() {
            return cur.saturating_add(self.drop.saturating_mul(l.len() as u32));
        }

        cur_min = self.bounded(&l[1..], r, cur.saturating_add(self.drop), cur_min);
        cur_min = self.bounded(l, &r[1..], cur.saturating_add(self.insert), cur_min);
        // A substitution is only worth exploring when it is strictly
        // cheaper than the drop + insert pair that covers the same tokens.
        if (self.substitute as u64) < self.drop as u64 + self.insert as u64 {
            cur_min = self.bounded(&l[1..], &r[1..], cur.saturating_add(self.substitute), cur_min);
        }
        cur_min
    }
}
