pub mod count;
pub mod pairs;
pub mod pcy;

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::Count;

/// Add every count of `from` into `into`.
pub(crate) fn merge_counts<K: Hash + Eq>(into: &mut HashMap<K, Count>, from: HashMap<K, Count>) {
    for (key, count) in from {
        *into.entry(key).or_insert(0) += count;
    }
}

/// Merge two count tables, folding the smaller into the larger.
pub(crate) fn merged<K: Hash + Eq>(
    mut left: HashMap<K, Count>,
    mut right: HashMap<K, Count>,
) -> HashMap<K, Count> {
    if left.len() < right.len() {
        std::mem::swap(&mut left, &mut right);
    }
    merge_counts(&mut left, right);
    left
}
