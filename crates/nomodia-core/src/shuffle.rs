//! Tagging and shuffling of pool entries into one question order.

use rand::Rng;

use crate::model::{Question, SetKind};
use crate::pools::QuestionPools;

/// Tag every statement of a pool with its origin.
pub fn tag_pool(kind: SetKind, statements: &[String]) -> Vec<Question> {
    statements
        .iter()
        .enumerate()
        .map(|(index_in_set, text)| Question {
            text: text.clone(),
            set_kind: kind,
            index_in_set,
        })
        .collect()
}

/// Unbiased in-place Fisher-Yates shuffle.
///
/// Walks from the back, swapping each slot with a uniformly chosen slot of
/// the remaining prefix: `n - 1` random draws for `n` items.
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Tag spiral, emotional and general statements (in that order), then
/// shuffle the combined sequence.
pub fn build_shuffled_order<R: Rng>(pools: &QuestionPools, rng: &mut R) -> Vec<Question> {
    let mut order = Vec::with_capacity(pools.total());
    for kind in SetKind::ALL {
        order.extend(tag_pool(kind, pools.for_kind(kind)));
    }
    fisher_yates(&mut order, rng);
    order
}
