//! # ScpBot Agent
//!
//! Message routing: decides which chat messages deserve a reply and
//! assembles it from wiki lookups.
//!
//! A message is handled when it contains the word "scp" or mentions the
//! bot, and never when its author is a bot. Every number in the message is
//! looked up directly; every quoted span is run through the fuzzy title
//! search.

use regex::Regex;

use scpbot_core::types::{IncomingMessage, OutgoingMessage};
use scpbot_wiki::ScpWiki;

pub struct ScpAgent {
    wiki: ScpWiki,
    /// Matches messages that request a wiki lookup.
    trigger: Regex,
    /// Matches numbers for entry lookups.
    number_finder: Regex,
    /// Matches a quoted search string.
    search_finder: Regex,
}

impl ScpAgent {
    pub fn new(wiki: ScpWiki) -> Self {
        Self {
            wiki,
            trigger: Regex::new(r"(?i)(^|\W)scp(-|$|\W)").expect("valid regex"),
            number_finder: Regex::new(r"[0-9]+").expect("valid regex"),
            search_finder: Regex::new(r#"(".*?"|'.*?')"#).expect("valid regex"),
        }
    }

    pub fn wiki(&self) -> &ScpWiki {
        &self.wiki
    }

    /// Builds the reply for one incoming message, if it deserves one.
    pub fn handle(&self, msg: &IncomingMessage) -> Option<OutgoingMessage> {
        if msg.sender_is_bot {
            return None;
        }
        if !self.trigger.is_match(&msg.content) && !msg.mentioned_me {
            return None;
        }

        let mut lines: Vec<String> = Vec::new();

        // Plain numbers resolve directly; unknown ones are skipped.
        for m in self.number_finder.find_iter(&msg.content) {
            if let Ok(number) = m.as_str().parse::<u32>()
                && let Some(entry) = self.wiki.entry(number)
            {
                lines.push(entry.to_string());
            }
        }

        // Quoted spans are fuzzy title searches, each under its own header.
        for m in self.search_finder.find_iter(&msg.content) {
            let quoted = m.as_str();
            let query = &quoted[1..quoted.len() - 1];
            lines.push(format!("> {query}:"));
            let results = self.wiki.search_title(query);
            if results.is_empty() {
                lines.push("No results found.".into());
            } else {
                lines.extend(results.iter().map(|e| e.to_string()));
            }
        }

        if lines.is_empty() {
            return None;
        }

        tracing::debug!("Replying with {} line(s)", lines.len());
        Some(OutgoingMessage {
            thread_id: msg.thread_id.clone(),
            content: lines.join("\n"),
        })
    }
}
