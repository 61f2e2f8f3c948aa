use std::collections::HashMap;

use crate::{
    baskets::{scan, BasketSource},
    error::Result,
    itemsets::{merged, pcy::count_buckets},
    types::{BucketCounts, Count, FrequentItems, ItemCounts, ItemId},
};

const APPROX_NUM_UNIQUE_ITEMS: usize = 1024; // arbitrary

/// Everything pass one learns about a bounded basket range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOne {
    pub item_counts: ItemCounts,
    /// Pair occurrences per hash bucket, tallied only when hashing is on.
    pub bucket_counts: Option<BucketCounts>,
    pub baskets: usize,
}

impl PassOne {
    pub fn new(hash_pairs: bool) -> Self {
        Self {
            item_counts: HashMap::with_capacity(APPROX_NUM_UNIQUE_ITEMS),
            bucket_counts: if hash_pairs { Some(HashMap::new()) } else { None },
            baskets: 0,
        }
    }

    pub fn observe(&mut self, basket: &[ItemId]) {
        count_items(&mut self.item_counts, basket);
        if let Some(bucket_counts) = self.bucket_counts.as_mut() {
            count_buckets(bucket_counts, basket);
        }
        self.baskets += 1;
    }

    /// Combine partial results of two disjoint basket ranges.
    pub fn merge(self, other: Self) -> Self {
        let bucket_counts = match (self.bucket_counts, other.bucket_counts) {
            (Some(left), Some(right)) => Some(merged(left, right)),
            (left, right) => left.or(right),
        };

        Self {
            item_counts: merged(self.item_counts, other.item_counts),
            bucket_counts,
            baskets: self.baskets + other.baskets,
        }
    }
}

pub fn count_items(item_counts: &mut ItemCounts, basket: &[ItemId]) {
    for &item in basket {
        *item_counts.entry(item).or_insert(0) += 1;
    }
}

/// Pass one: count singletons over the first `limit` baskets, and pair
/// buckets too when `hash_pairs` is set, in a single scan.
pub fn first_pass<S>(source: &mut S, limit: usize, hash_pairs: bool) -> Result<PassOne>
where
    S: BasketSource + ?Sized,
{
    let mut pass = PassOne::new(hash_pairs);
    scan(source, limit, |basket| pass.observe(basket))?;
    Ok(pass)
}

pub fn count_singletons<S>(source: &mut S, limit: usize) -> Result<ItemCounts>
where
    S: BasketSource + ?Sized,
{
    first_pass(source, limit, false).map(|pass| pass.item_counts)
}

/// Items whose count reaches `threshold`.
pub fn select_frequent_items(item_counts: &ItemCounts, threshold: Count) -> FrequentItems {
    item_counts
        .iter()
        .filter(|&(_, &count)| count >= threshold)
        .map(|(&item, _)| item)
        .collect()
}
