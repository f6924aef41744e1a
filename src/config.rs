use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chatter::{Chatter, ReplyPolicy, DEFAULT_REPLY_LENGTH};
use crate::registry::NamespaceRegistry;
use crate::tokenizer::{Tokenizer, DEFAULT_SPLIT_PATTERN};

/// Runtime settings, read from an optional JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one `<namespace>.db` per namespace
    pub data_dir: PathBuf,
    /// Regex separating words in incoming text
    pub split_pattern: String,
    /// Words per reply
    pub reply_length: usize,
    /// Namespace used by the command line
    pub namespace: String,
    /// Reply to every message, not only mentions
    pub always_reply: bool,
    /// Name that counts as a mention
    pub bot_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db"),
            split_pattern: DEFAULT_SPLIT_PATTERN.to_string(),
            reply_length: DEFAULT_REPLY_LENGTH,
            namespace: "cli".to_string(),
            always_reply: true,
            bot_name: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from JSON text; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).context("Invalid config JSON")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn tokenizer(&self) -> Result<Tokenizer> {
        Tokenizer::new(&self.split_pattern)
            .context(format!("Invalid split pattern: {}", self.split_pattern))
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        ReplyPolicy {
            reply_length: self.reply_length,
            always_reply: self.always_reply,
            bot_name: self.bot_name.clone(),
        }
    }

    pub fn chatter(&self) -> Result<Chatter> {
        Ok(Chatter::new(self.tokenizer()?, self.reply_policy()))
    }

    pub fn registry(&self) -> NamespaceRegistry {
        NamespaceRegistry::in_directory(&self.data_dir)
    }
}
