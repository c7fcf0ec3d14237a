//! Mini-batching

use crate::encode::EncodedFeatures;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A fresh permutation of `0..len`, drawn once per epoch.
pub fn shuffled_order(len: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Batches of at most `batch_size` rows, gathered from `data` in `order`.
///
/// A `batch_size` of 0 is treated as 1.
pub fn batches<'a>(
    data: &'a EncodedFeatures,
    order: &'a [usize],
    batch_size: usize,
) -> impl Iterator<Item = EncodedFeatures> + 'a {
    order.chunks(batch_size.max(1)).map(move |rows| data.select(rows))
}
