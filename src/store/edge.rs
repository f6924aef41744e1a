use serde::{Deserialize, Serialize};

/// End-of-sequence marker stored as `link2` after the last token of a sequence.
/// The tokenizer can never produce it, so it never collides with a real word.
pub const SENTINEL: &str = " ";

/// A stored transition `link1 -> link2` with its accumulated weight
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub link1: String,
    pub link2: String,
    pub n: u64,
}

/// A weight increment for one edge, as applied by `increment_batch`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeDelta {
    pub link1: String,
    pub link2: String,
    pub delta: u64,
}

impl EdgeDelta {
    pub fn new(link1: impl Into<String>, link2: impl Into<String>, delta: u64) -> Self {
        Self {
            link1: link1.into(),
            link2: link2.into(),
            delta,
        }
    }
}

/// One outgoing edge of a source word, as seen by the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub link2: String,
    pub n: u64,
}

impl Transition {
    pub fn new(link2: impl Into<String>, n: u64) -> Self {
        Self {
            link2: link2.into(),
            n,
        }
    }

    /// Whether this transition ends the sequence
    pub fn is_terminal(&self) -> bool {
        self.link2 == SENTINEL
    }
}
