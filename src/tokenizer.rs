use crate::store::SENTINEL;
use regex::Regex;

/// Commas and whitespace separate words by default
pub const DEFAULT_SPLIT_PATTERN: &str = r"[,\s]+";

/// Splits raw text into words on a caller-supplied delimiter pattern
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Compile a tokenizer from a regex delimiter pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// The delimiter pattern as given
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Split text into words, dropping empty fragments left by leading or
    /// trailing delimiters
    pub fn split(&self, text: &str) -> Vec<String> {
        self.pattern
            .split(text)
            .filter(|word| !word.is_empty() && *word != SENTINEL)
            .map(str::to_string)
            .collect()
    }
}
