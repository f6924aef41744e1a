use super::*;
use crate::store::SENTINEL;
use crate::tokenizer::DEFAULT_SPLIT_PATTERN;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn chatter(policy: ReplyPolicy) -> Chatter {
    Chatter::new(Tokenizer::new(DEFAULT_SPLIT_PATTERN).unwrap(), policy)
}

fn named_policy(name: &str) -> ReplyPolicy {
    ReplyPolicy {
        bot_name: Some(name.to_string()),
        ..ReplyPolicy::default()
    }
}

#[test]
fn test_reply_is_suffix_of_fresh_sentence() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(ReplyPolicy::default());
    let sentence = ["the", "quick", "brown", "fox", "jumps"];

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let words = chatter
            .record_and_generate(&store, "the quick, brown fox jumps", 50, &mut rng)
            .unwrap();
        // Every word has exactly one successor, so the walk replays the tail
        let start = sentence.len() - words.len();
        assert!(words.len() >= 2);
        assert_eq!(words, sentence[start..].to_vec());

        // Only the first pass creates edges; later passes only add weight
        assert_eq!(store.stats().unwrap().edge_count, 5);
    }
}

#[test]
fn test_reply_respects_max_length() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(ReplyPolicy::default());
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let words = chatter
        .record_and_generate(&store, "one two three four five six seven", 2, &mut rng)
        .unwrap();
    assert_eq!(words.len(), 2);
}

#[test]
fn test_zero_length_still_records() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(ReplyPolicy::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let words = chatter.record_and_generate(&store, "learn this", 0, &mut rng).unwrap();
    assert!(words.is_empty());
    assert_eq!(store.weight("learn", "this").unwrap(), Some(1));
    assert_eq!(store.weight("this", SENTINEL).unwrap(), Some(1));
}

#[test]
fn test_single_word_records_without_reply() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(ReplyPolicy::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let words = chatter.record_and_generate(&store, "  hello  ", 10, &mut rng).unwrap();
    assert!(words.is_empty());
    assert_eq!(store.weight("hello", SENTINEL).unwrap(), Some(1));
}

#[test]
fn test_blank_message_is_noop() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(ReplyPolicy::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert!(chatter.record_and_generate(&store, " , ", 10, &mut rng).unwrap().is_empty());
    assert_eq!(store.stats().unwrap().edge_count, 0);
}

#[test]
fn test_mention_detection() {
    let policy = named_policy("Markovich");

    assert!(policy.mentioned_in("hey markovich, say something"));
    assert!(policy.mentioned_in("MARKOVICH!"));
    assert!(!policy.mentioned_in("nobody here"));
    assert!(!ReplyPolicy::default().mentioned_in("markovich"));
    assert!(!named_policy("").mentioned_in("anything"));
}

#[test]
fn test_reply_length_policy() {
    let policy = named_policy("bot");
    assert_eq!(policy.reply_length_for("hello bot"), DEFAULT_REPLY_LENGTH);
    assert_eq!(policy.reply_length_for("hello there"), 0);

    let always = ReplyPolicy {
        always_reply: true,
        reply_length: 7,
        bot_name: None,
    };
    assert_eq!(always.reply_length_for("anything"), 7);
}

#[test]
fn test_reply_only_when_mentioned() {
    let store = ChainStore::open_in_memory().unwrap();
    let chatter = chatter(named_policy("bot"));
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let quiet = chatter.reply(&store, "just chatting here", &mut rng).unwrap();
    assert_eq!(quiet, None);
    assert_eq!(store.weight("just", "chatting").unwrap(), Some(1));

    let reply = chatter.reply(&store, "hey bot wake up", &mut rng).unwrap().unwrap();
    assert!(!reply.is_empty());
    assert!(reply.split(' ').count() >= 2);
}
