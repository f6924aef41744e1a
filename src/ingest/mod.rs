use crate::store::{ChainError, ChainResult, ChainStore, EdgeDelta, SENTINEL};
use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

/// Turn a token sequence into its collapsed bigram increments.
///
/// Each adjacent pair `(t[i], t[i+1])` counts once, the last token is paired
/// with the end-of-sequence marker, and repeated pairs are summed. The result
/// is ordered by `(link1, link2)`.
pub fn bigrams<S: AsRef<str>>(tokens: &[S]) -> Vec<EdgeDelta> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();

    let words = tokens.iter().map(|t| t.as_ref());
    let successors = tokens
        .iter()
        .skip(1)
        .map(|t| t.as_ref())
        .chain(std::iter::once(SENTINEL));

    for pair in words.zip(successors) {
        *counts.entry(pair).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((link1, link2), delta)| EdgeDelta::new(link1, link2, delta))
        .collect()
}

/// Record one token sequence in the store as a single atomic batch.
///
/// Returns the number of distinct edges touched. An empty sequence is a no-op;
/// a sequence containing an empty token or the end-of-sequence marker is
/// rejected without writing anything.
pub fn ingest<S: AsRef<str>>(store: &ChainStore, tokens: &[S]) -> ChainResult<usize> {
    if tokens.is_empty() {
        return Ok(0);
    }

    if let Some(bad) = tokens
        .iter()
        .map(|t| t.as_ref())
        .find(|t| t.is_empty() || *t == SENTINEL)
    {
        return Err(ChainError::ConstraintViolation(format!(
            "token {bad:?} cannot be recorded as a word"
        )));
    }

    let edges = bigrams(tokens);
    store.increment_batch(&edges)?;

    tracing::debug!(
        tokens = tokens.len(),
        edges = edges.len(),
        "Recorded token sequence"
    );
    Ok(edges.len())
}
