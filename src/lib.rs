// Public API exports
pub mod chatter;
pub mod config;
pub mod ingest;
pub mod registry;
pub mod security;
pub mod store;
pub mod tokenizer;
pub mod walk;

// Re-export main types for convenience
pub use store::{
    ChainError, ChainResult, ChainStats, ChainStore, Edge, EdgeDelta, Transition, SENTINEL,
};

pub use ingest::{bigrams, ingest};
pub use walk::{generate, pick_transition, TransitionSource};

pub use chatter::{Chatter, ReplyPolicy, DEFAULT_REPLY_LENGTH};
pub use config::Config;
pub use registry::{NamespaceRegistry, StorageLocation};
pub use security::NamespaceSanitizer;
pub use tokenizer::{Tokenizer, DEFAULT_SPLIT_PATTERN};
