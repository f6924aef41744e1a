use crate::ingest::ingest;
use crate::store::{ChainResult, ChainStore};
use crate::tokenizer::Tokenizer;
use crate::walk::generate;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

pub const DEFAULT_REPLY_LENGTH: usize = 50;

/// Decides how long a reply to an incoming message should be
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPolicy {
    /// Words per reply when replying
    pub reply_length: usize,
    /// Reply to every message instead of only when mentioned
    pub always_reply: bool,
    /// Name that counts as a mention, matched case-insensitively
    pub bot_name: Option<String>,
}

impl ReplyPolicy {
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.bot_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .is_some_and(|name| text.to_lowercase().contains(&name.to_lowercase()))
    }

    /// Reply length for a message; zero means learn without replying
    pub fn reply_length_for(&self, text: &str) -> usize {
        if self.always_reply || self.mentioned_in(text) {
            self.reply_length
        } else {
            0
        }
    }
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            reply_length: DEFAULT_REPLY_LENGTH,
            always_reply: false,
            bot_name: None,
        }
    }
}

/// Learns from every message and answers with a walk seeded from it
pub struct Chatter {
    tokenizer: Tokenizer,
    policy: ReplyPolicy,
}

impl Chatter {
    pub fn new(tokenizer: Tokenizer, policy: ReplyPolicy) -> Self {
        Self { tokenizer, policy }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn policy(&self) -> &ReplyPolicy {
        &self.policy
    }

    /// Record `text`, then walk from a random adjacent pair of its words.
    ///
    /// Returns no words when `max_length` is zero or the text has fewer than
    /// two words; the text is recorded either way.
    pub fn record_and_generate<R: Rng>(
        &self,
        store: &ChainStore,
        text: &str,
        max_length: usize,
        rng: &mut R,
    ) -> ChainResult<Vec<String>> {
        let words = self.tokenizer.split(text);
        ingest(store, &words)?;

        if max_length < 1 || words.len() < 2 {
            return Ok(Vec::new());
        }

        let seed = rng.gen_range(0..words.len() - 1);
        generate(
            store,
            &words[seed],
            Some(words[seed + 1].as_str()),
            max_length,
            rng,
        )
    }

    /// Handle one incoming message, returning the reply text if any
    pub fn reply<R: Rng>(
        &self,
        store: &ChainStore,
        text: &str,
        rng: &mut R,
    ) -> ChainResult<Option<String>> {
        let max_length = self.policy.reply_length_for(text);
        let words = self.record_and_generate(store, text, max_length, rng)?;

        if words.is_empty() {
            return Ok(None);
        }
        Ok(Some(words.join(" ")))
    }
}
