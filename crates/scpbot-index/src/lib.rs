//! # ScpBot Index
//!
//! Fuzzy lookup structure mapping multi-word text keys to values.
//! This is the search core the wiki layer builds its title index on.
//!
//! ## Design
//! - **Inverted index** — token → postings list, narrows candidates to
//!   entries sharing at least one word with the query
//! - **Token-level edit distance** — configurable drop/substitute/insert
//!   costs, computed by recursive branch-and-bound (no DP table)
//! - **Result selection** — exact matches short-circuit everything else;
//!   otherwise a minimum-count guarantee plus a score-plateau cutoff
//! - Append-only: build once, then query from as many readers as you like
//!
//! ## How a search runs
//! ```text
//! "scp foundation"
//!   ↓ tokenize (lowercase, whitespace split)
//! ["scp", "foundation"]
//!   ↓ union postings for each token, dedup by entry id
//! candidate entries
//!   ↓ score with branch-and-bound edit distance, stable sort
//! ranked entries
//!   ↓ exact-match override / plateau cutoff / max cap
//! values
//! ```

pub mod distance;
pub mod index;
pub mod tokenizer;

pub use distance::Costs;
pub use index::FuzzyIndex;
pub use tokenizer::tokenize;
