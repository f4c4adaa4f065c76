//! # ScpBot Wiki
//!
//! Loads the SCP wiki series listings and answers lookups.
//!
//! ## Design
//! - Series pages fetched concurrently at startup; series 1 also tells us
//!   how many series exist
//! - Parsed entries feed two read-only structures: a fuzzy title index
//!   and a number → entry map
//! - After `load` returns, everything is queries — no refresh, no mutation

mod parse;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use futures::future::try_join_all;

use scpbot_core::config::SearchConfig;
use scpbot_core::error::{Result, ScpBotError};
use scpbot_index::{Costs, FuzzyIndex};

/// Canonical base URL of the wiki.
pub const WIKI_URL: &str = "https://scp-wiki.wikidot.com/";

/// One wiki article: its number and display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub number: u32,
    pub title: String,
}

impl Entry {
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
        }
    }

    /// Canonical article URL; numbers below 100 are zero-padded to three
    /// digits the way the wiki slugs them.
    pub fn url(&self) -> String {
        format!("{WIKI_URL}scp-{:03}", self.number)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.url(), self.title)
    }
}

/// One series listing page.
struct Series {
    number: u32,
    page: String,
}

impl Series {
    fn url(number: u32) -> String {
        if number == 1 {
            format!("{WIKI_URL}scp-series")
        } else {
            format!("{WIKI_URL}scp-series-{number}")
        }
    }

    async fn fetch(client: &reqwest::Client, number: u32) -> Result<Self> {
        tracing::debug!("Fetching series {number}");
        let response = client
            .get(Self::url(number))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ScpBotError::Wiki(format!("Failed to fetch series {number}: {e}")))?;
        let page = response
            .text()
            .await
            .map_err(|e| ScpBotError::Wiki(format!("Failed to read series {number}: {e}")))?;
        Ok(Self { number, page })
    }

    fn entries(&self) -> Vec<Entry> {
        parse::series_entries(&self.page, self.number)
    }
}

/// The loaded wiki: fuzzy title search plus direct number lookup.
pub struct ScpWiki {
    titles: FuzzyIndex<Entry>,
    numbers: HashMap<u32, Entry>,
    min_results: usize,
    max_results: usize,
}

impl ScpWiki {
    /// Fetches every series listing and builds the lookup structures.
    pub async fn load(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ScpBot/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScpBotError::Wiki(format!("Failed to build HTTP client: {e}")))?;

        // The first series page links all the others.
        let first = Series::fetch(&client, 1).await?;
        let total = parse::total_series_count(&first.page)?;
        tracing::info!("Loading {total} series");

        let rest = try_join_all((2..=total).map(|n| Series::fetch(&client, n))).await?;

        let mut all = first.entries();
        for series in &rest {
            all.extend(series.entries());
        }

        Ok(Self::from_entries(config, all))
    }

    /// Builds the lookup structures from already-parsed entries.
    pub fn from_entries(config: &SearchConfig, all: Vec<Entry>) -> Self {
        let costs = Costs::new(
            config.drop_cost,
            config.substitute_cost,
            config.insert_cost,
        );
        let mut titles = FuzzyIndex::new(costs);
        let mut numbers: HashMap<u32, Entry> = HashMap::new();

        for entry in all {
            if let Some(prev) = numbers.get(&entry.number) {
                tracing::warn!(
                    "Duplicate entries for number {}: '{}' / '{}'",
                    entry.number,
                    prev.title,
                    entry.title
                );
            }
            titles.insert(&entry.title, entry.clone());
            numbers.entry(entry.number).or_insert(entry);
        }

        Self {
            titles,
            numbers,
            min_results: config.min_results,
            max_results: config.max_results,
        }
    }

    /// Fuzzy title search with the configured result bounds.
    pub fn search_title(&self, title: &str) -> Vec<&Entry> {
        self.titles.search(title, self.min_results, self.max_results)
    }

    /// Direct lookup by entry number.
    pub fn entry(&self, number: u32) -> Option<&Entry> {
        self.numbers.get(&number)
    }

    pub fn entry_count(&self) -> usize {
        self.numbers.len()
    }

    /// All loaded entries, in no particular order.
    pub fn all_entries(&self) -> impl Iterator<Item = &Entry> {
        self.numbers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki(entries: Vec<Entry>) -> ScpWiki {
        ScpWiki::from_entries(&SearchConfig::default(), entries)
    }

    #[test]
    fn test_url_zero_padding() {
        assert_eq!(Entry::new(49, "x").url(), format!("{WIKI_URL}scp-049"));
        assert_eq!(Entry::new(173, "x").url(), format!("{WIKI_URL}scp-173"));
        assert_eq!(Entry::new(1000, "x").url(), format!("{WIKI_URL}scp-1000"));
    }

    #[test]
    fn test_display_is_url_tab_title() {
        let entry = Entry::new(173, "The Sculpture");
        assert_eq!(
            entry.to_string(),
            format!("{WIKI_URL}scp-173\tThe Sculpture")
        );
    }

    #[test]
    fn test_series_urls() {
        assert_eq!(Series::url(1), format!("{WIKI_URL}scp-series"));
        assert_eq!(Series::url(4), format!("{WIKI_URL}scp-series-4"));
    }

    #[test]
    fn test_number_and_title_lookup() {
        let w = wiki(vec![
            Entry::new(173, "The Sculpture"),
            Entry::new(682, "Hard-to-Destroy Reptile"),
        ]);
        assert_eq!(w.entry_count(), 2);
        assert_eq!(w.entry(682).unwrap().title, "Hard-to-Destroy Reptile");
        assert!(w.entry(5000).is_none());

        let found = w.search_title("the sculpture");
        assert_eq!(found, vec![&Entry::new(173, "The Sculpture")]);
    }

    #[test]
    fn test_fuzzy_title_search() {
        let w = wiki(vec![
            Entry::new(173, "The Sculpture"),
            Entry::new(682, "Hard-to-Destroy Reptile"),
        ]);
        // Partial query still finds the reptile via its shared token.
        let found = w.search_title("reptile");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, 682);
    }

    #[test]
    fn test_duplicate_numbers_keep_first() {
        let w = wiki(vec![
            Entry::new(173, "The Sculpture"),
            Entry::new(173, "The Other Sculpture"),
        ]);
        assert_eq!(w.entry_count(), 1);
        assert_eq!(w.entry(173).unwrap().title, "The Sculpture");
        // Both stay searchable by title.
        assert_eq!(w.search_title("the other sculpture").len(), 1);
    }
}
