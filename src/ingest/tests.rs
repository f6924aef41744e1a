use super::*;
use crate::store::Edge;

fn edge(link1: &str, link2: &str, n: u64) -> Edge {
    Edge {
        link1: link1.to_string(),
        link2: link2.to_string(),
        n,
    }
}

#[test]
fn test_bigrams_include_end_marker() {
    let edges = bigrams(&["a", "b", "a", "c"]);

    assert_eq!(
        edges,
        vec![
            EdgeDelta::new("a", "b", 1),
            EdgeDelta::new("a", "c", 1),
            EdgeDelta::new("b", "a", 1),
            EdgeDelta::new("c", SENTINEL, 1),
        ]
    );
}

#[test]
fn test_bigrams_collapse_repeats() {
    let edges = bigrams(&["la", "la", "la", "la"]);

    assert_eq!(
        edges,
        vec![
            EdgeDelta::new("la", "la", 3),
            EdgeDelta::new("la", SENTINEL, 1),
        ]
    );
}

#[test]
fn test_bigrams_single_token() {
    let edges = bigrams(&["alone"]);
    assert_eq!(edges, vec![EdgeDelta::new("alone", SENTINEL, 1)]);
}

#[test]
fn test_bigrams_empty() {
    let tokens: [&str; 0] = [];
    assert!(bigrams(&tokens).is_empty());
}

#[test]
fn test_ingest_concrete_scenario() {
    let store = ChainStore::open_in_memory().unwrap();

    let touched = ingest(&store, &["a", "b", "a", "c"]).unwrap();
    assert_eq!(touched, 4);

    assert_eq!(
        store.all_edges().unwrap(),
        vec![
            edge("a", "b", 1),
            edge("a", "c", 1),
            edge("b", "a", 1),
            edge("c", SENTINEL, 1),
        ]
    );
}

#[test]
fn test_ingest_twice_doubles_weights() {
    let store = ChainStore::open_in_memory().unwrap();
    let tokens = vec!["the".to_string(), "cat".to_string(), "the".to_string(), "cat".to_string()];

    ingest(&store, &tokens).unwrap();
    assert_eq!(store.weight("the", "cat").unwrap(), Some(2));
    assert_eq!(store.weight("cat", "the").unwrap(), Some(1));
    assert_eq!(store.weight("cat", SENTINEL).unwrap(), Some(1));

    ingest(&store, &tokens).unwrap();
    assert_eq!(store.weight("the", "cat").unwrap(), Some(4));
    assert_eq!(store.weight("cat", "the").unwrap(), Some(2));
    assert_eq!(store.weight("cat", SENTINEL).unwrap(), Some(2));
}

#[test]
fn test_ingest_empty_is_noop() {
    let store = ChainStore::open_in_memory().unwrap();
    let tokens: Vec<String> = Vec::new();

    assert_eq!(ingest(&store, &tokens).unwrap(), 0);
    assert_eq!(store.stats().unwrap().edge_count, 0);
}

#[test]
fn test_ingest_rejects_sentinel_token() {
    let store = ChainStore::open_in_memory().unwrap();

    let result = ingest(&store, &["hello", SENTINEL, "world"]);
    assert!(matches!(result, Err(ChainError::ConstraintViolation(_))));
    assert_eq!(store.stats().unwrap().edge_count, 0);
}

#[test]
fn test_ingest_rejects_empty_token() {
    let store = ChainStore::open_in_memory().unwrap();

    let result = ingest(&store, &["", "world"]);
    assert!(matches!(result, Err(ChainError::ConstraintViolation(_))));
    assert_eq!(store.stats().unwrap().edge_count, 0);
}

#[test]
fn test_concurrent_ingest_no_lost_update() {
    let store = ChainStore::open_in_memory().unwrap();

    std::thread::scope(|s| {
        for _ in 0..2 {
            let store = store.clone();
            s.spawn(move || ingest(&store, &["ping", "pong"]).unwrap());
        }
    });

    assert_eq!(store.weight("ping", "pong").unwrap(), Some(2));
    assert_eq!(store.weight("pong", SENTINEL).unwrap(), Some(2));
}
