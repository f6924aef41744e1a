use crate::store::{ChainResult, ChainStore, Transition, SENTINEL};
use rand::Rng;


/// Read access to the outgoing edges of a word
pub trait TransitionSource {
    /// All outgoing edges of `link1` in a fixed, stable order.
    ///
    /// Words without edges (including the end-of-sequence marker) yield an
    /// empty list.
    fn edges_from(&self, link1: &str) -> ChainResult<Vec<Transition>>;
}

impl TransitionSource for ChainStore {
    fn edges_from(&self, link1: &str) -> ChainResult<Vec<Transition>> {
        ChainStore::edges_from(self, link1)
    }
}

/// Inverse-CDF selection over `transitions` in the order given.
///
/// Picks the first transition whose running weight reaches `roll * total`,
/// with `roll` in `[0, 1)`. Returns `None` when there is nothing to pick.
pub fn pick_transition(transitions: &[Transition], roll: f64) -> Option<&Transition> {
    // Weights go up to i64::MAX each, so running sums need the wider type
    let total: u128 = transitions.iter().map(|t| u128::from(t.n)).sum();
    if total == 0 {
        return None;
    }

    let threshold = roll * total as f64;
    let mut rank = 0u128;
    transitions
        .iter()
        .find(|t| {
            rank += u128::from(t.n);
            rank as f64 >= threshold
        })
        // roll < 1 always lands inside the table; guard against float edge cases
        .or_else(|| transitions.iter().rev().find(|t| t.n > 0))
}

/// Walk the chain from the seed pair, returning at most `max_length` words.
///
/// The output starts with `seed1`. Each further word is the current word of
/// the walk, after which a successor is drawn with probability proportional to
/// its edge weight, using a fresh roll per hop. The walk stops as soon as the
/// current word has no outgoing edges; a missing `seed2` is the end marker.
pub fn generate<S, R>(
    source: &S,
    seed1: &str,
    seed2: Option<&str>,
    max_length: usize,
    rng: &mut R,
) -> ChainResult<Vec<String>>
where
    S: TransitionSource + ?Sized,
    R: Rng,
{
    if max_length < 1 {
        return Ok(Vec::new());
    }

    let mut words = Vec::with_capacity(max_length.min(64));
    words.push(seed1.to_string());
    let mut current = seed2.unwrap_or(SENTINEL).to_string();

    while words.len() < max_length {
        if current == SENTINEL {
            break;
        }

        let transitions = source.edges_from(&current)?;
        let roll: f64 = rng.gen();
        let Some(next) = pick_transition(&transitions, roll) else {
            break;
        };

        let next = next.link2.clone();
        words.push(std::mem::replace(&mut current, next));
    }

    tracing::debug!(seed = seed1, words = words.len(), "Generated walk");
    Ok(words)
}
