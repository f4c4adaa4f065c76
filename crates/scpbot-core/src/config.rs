//! ScpBot configuration system.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScpBotError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScpBotConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

impl ScpBotConfig {
    /// Load config from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScpBotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ScpBotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }
}

/// Fuzzy title search tuning.
///
/// The costs weight the token edit distance: `drop_cost` for a query word
/// that matches nothing, `insert_cost` for a title word the query lacks,
/// `substitute_cost` for a mismatched pair. `min_results`/`max_results`
/// bound how many inexact matches a search reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_drop_cost")]
    pub drop_cost: u32,
    #[serde(default = "default_substitute_cost")]
    pub substitute_cost: u32,
    #[serde(default = "default_insert_cost")]
    pub insert_cost: u32,
}

fn default_min_results() -> usize {
    1
}
fn default_max_results() -> usize {
    5
}
fn default_drop_cost() -> u32 {
    2
}
fn default_substitute_cost() -> u32 {
    3
}
fn default_insert_cost() -> u32 {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_results: default_min_results(),
            max_results: default_max_results(),
            drop_cost: default_drop_cost(),
            substitute_cost: default_substitute_cost(),
            insert_cost: default_insert_cost(),
        }
    }
}

/// Discord channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token; when empty, `token_file` is read instead.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_token_file")]
    pub token_file: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_token_file() -> String {
    "token".into()
}
fn default_true() -> bool {
    true
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            token_file: default_token_file(),
            enabled: default_true(),
        }
    }
}

impl DiscordConfig {
    /// Resolve the bot token: the inline value wins, otherwise the token
    /// file is read and trimmed.
    pub fn resolve_token(&self) -> Result<String> {
        if !self.bot_token.is_empty() {
            return Ok(self.bot_token.clone());
        }
        let raw = std::fs::read_to_string(&self.token_file).map_err(|e| {
            ScpBotError::Config(format!("Failed to read token file '{}': {e}", self.token_file))
        })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(ScpBotError::Config(format!(
                "Token file '{}' is empty",
                self.token_file
            )));
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScpBotConfig::default();
        assert_eq!(config.search.min_results, 1);
        assert_eq!(config.search.max_results, 5);
        assert!(config.discord.enabled);
        assert_eq!(config.discord.token_file, "token");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ScpBotConfig = toml::from_str(
            r#"
            [search]
            max_results = 10
            insert_cost = 2

            [discord]
            bot_token = "abc123"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.search.insert_cost, 2);
        assert_eq!(config.search.min_results, 1);
        assert_eq!(config.search.drop_cost, 2);
        assert_eq!(config.discord.bot_token, "abc123");
        assert!(config.discord.enabled);
    }

    #[test]
    fn test_inline_token_wins_over_file() {
        let discord = DiscordConfig {
            bot_token: "inline".into(),
            token_file: "/nonexistent/token".into(),
            enabled: true,
        };
        assert_eq!(discord.resolve_token().unwrap(), "inline");
    }

    #[test]
    fn test_missing_token_file_errors() {
        let discord = DiscordConfig {
            bot_token: String::new(),
            token_file: "/nonexistent/token".into(),
            enabled: true,
        };
        assert!(discord.resolve_token().is_err());
    }
}
