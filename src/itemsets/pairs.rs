use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    baskets::{scan, BasketSource},
    error::Result,
    itemsets::{merge_counts, pcy::FrequencyBitmap},
    types::{Count, FrequentItems, ItemId, Pair},
};

/// Candidate pairs and their exact counts, keyed first element -> second
/// element. Keys keep the positional order of the basket, so `(a, b)` and
/// `(b, a)` are different pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairCounts {
    counts: HashMap<ItemId, HashMap<ItemId, Count>>,
}

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, first: ItemId, second: ItemId) {
        *self
            .counts
            .entry(first)
            .or_insert_with(HashMap::new)
            .entry(second)
            .or_insert(0) += 1;
    }

    pub fn get(&self, first: ItemId, second: ItemId) -> Option<Count> {
        self.counts
            .get(&first)
            .and_then(|seconds| seconds.get(&second))
            .copied()
    }

    /// Number of distinct pair keys.
    pub fn len(&self) -> usize {
        self.counts.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pair, Count)> + '_ {
        self.counts.iter().flat_map(|(&first, seconds)| {
            seconds
                .iter()
                .map(move |(&second, &count)| ((first, second), count))
        })
    }

    /// Pairs whose count reaches `threshold`.
    pub fn frequent(&self, threshold: Count) -> impl Iterator<Item = (Pair, Count)> + '_ {
        self.iter().filter(move |&(_, count)| count >= threshold)
    }

    /// The `n` highest counts, ties broken by ascending pair key.
    pub fn top(&self, n: usize) -> Vec<(Pair, Count)> {
        let mut pairs: Vec<(Pair, Count)> = self.iter().collect();
        pairs.sort_unstable_by(|(left_pair, left), (right_pair, right)| {
            right.cmp(left).then_with(|| left_pair.cmp(right_pair))
        });
        pairs.truncate(n);
        pairs
    }

    /// Count the candidate pairs of one basket.
    ///
    /// A position pair `i < j` is a candidate when both items are frequent
    /// and, if a bitmap is given, the pair hashes to a frequent bucket.
    pub fn observe(
        &mut self,
        basket: &[ItemId],
        frequent_items: &FrequentItems,
        bucket_filter: Option<&FrequencyBitmap>,
    ) {
        for (&first, &second) in basket.iter().tuple_combinations() {
            if !frequent_items.contains(&first) || !frequent_items.contains(&second) {
                continue;
            }
            if let Some(bitmap) = bucket_filter {
                if !bitmap.admits(first, second) {
                    continue;
                }
            }
            self.increment(first, second);
        }
    }

    /// Combine tables counted over disjoint basket ranges.
    pub fn merge(mut self, mut other: Self) -> Self {
        if self.counts.len() < other.counts.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (first, seconds) in other.counts {
            merge_counts(self.counts.entry(first).or_insert_with(HashMap::new), seconds);
        }
        self
    }
}

/// Pass two: exact counts of the candidate pairs in the first `limit` baskets.
pub fn count_pairs<S>(
    source: &mut S,
    limit: usize,
    frequent_items: &FrequentItems,
    bucket_filter: Option<&FrequencyBitmap>,
) -> Result<PairCounts>
where
    S: BasketSource + ?Sized,
{
    let mut pair_counts = PairCounts::new();
    scan(source, limit, |basket| {
        pair_counts.observe(basket, frequent_items, bucket_filter)
    })?;
    Ok(pair_counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baskets::MemoryBaskets;
    use crate::itemsets::pcy::bucket_of;
    use crate::types::BucketCounts;
    use maplit::{hashmap, hashset};

    fn table(pair_counts: &PairCounts) -> HashMap<Pair, Count> {
        pair_counts.iter().collect()
    }

    #[test]
    fn counts_frequent_pairs_by_position() {
        let mut source = MemoryBaskets::new(vec![vec![1, 2, 3], vec![2, 3], vec![1, 3], vec![1, 2]]);
        let pair_counts = count_pairs(&mut source, usize::MAX, &hashset! { 1, 2, 3 }, None).unwrap();

        assert_eq!(
            table(&pair_counts),
            hashmap! {
                (1, 2) => 2,
                (1, 3) => 2,
                (2, 3) => 2,
            }
        );
    }

    #[test]
    fn same_items_in_other_order_are_another_key() {
        let mut source = MemoryBaskets::new(vec![vec![1, 2], vec![2, 1]]);
        let pair_counts = count_pairs(&mut source, usize::MAX, &hashset! { 1, 2 }, None).unwrap();

        assert_eq!(table(&pair_counts), hashmap! { (1, 2) => 1, (2, 1) => 1 });
    }

    #[test]
    fn duplicate_items_form_a_pair() {
        let mut pair_counts = PairCounts::new();
        pair_counts.observe(&[1, 1, 2], &hashset! { 1, 2 }, None);

        assert_eq!(table(&pair_counts), hashmap! { (1, 1) => 1, (1, 2) => 2 });
    }

    #[test]
    fn infrequent_items_are_pruned() {
        let mut pair_counts = PairCounts::new();
        pair_counts.observe(&[1, 2, 3], &hashset! { 1, 3 }, None);

        assert_eq!(table(&pair_counts), hashmap! { (1, 3) => 1 });
    }

    #[test]
    fn bucket_filter_prunes_unset_buckets() {
        let bucket_counts: BucketCounts = hashmap! {
            bucket_of(1, 2) => 5,
            bucket_of(1, 3) => 1,
            bucket_of(2, 3) => 5,
        };
        let bitmap = FrequencyBitmap::build(&bucket_counts, 2).unwrap();

        let mut pair_counts = PairCounts::new();
        pair_counts.observe(&[1, 2, 3], &hashset! { 1, 2, 3 }, Some(&bitmap));

        assert_eq!(table(&pair_counts), hashmap! { (1, 2) => 1, (2, 3) => 1 });
    }

    #[test]
    fn respects_limit() {
        let mut source = MemoryBaskets::new(vec![vec![1, 2], vec![1, 2], vec![1, 2]]);
        let pair_counts = count_pairs(&mut source, 2, &hashset! { 1, 2 }, None).unwrap();

        assert_eq!(pair_counts.get(1, 2), Some(2));
    }

    #[test]
    fn empty_frequent_items_give_empty_table() {
        let mut source = MemoryBaskets::new(vec![vec![1, 2, 3]]);
        let pair_counts = count_pairs(&mut source, usize::MAX, &hashset! {}, None).unwrap();

        assert!(pair_counts.is_empty());
        assert_eq!(pair_counts.len(), 0);
    }

    #[test]
    fn merge_adds_counts() {
        let mut left = PairCounts::new();
        left.increment(1, 2);
        left.increment(1, 3);
        let mut right = PairCounts::new();
        right.increment(1, 2);
        right.increment(4, 5);

        let merged = left.merge(right);
        assert_eq!(
            table(&merged),
            hashmap! { (1, 2) => 2, (1, 3) => 1, (4, 5) => 1 }
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn frequent_and_top() {
        let mut pair_counts = PairCounts::new();
        for _ in 0..3 {
            pair_counts.increment(2, 9);
        }
        for _ in 0..3 {
            pair_counts.increment(1, 4);
        }
        pair_counts.increment(5, 6);

        let frequent: HashMap<Pair, Count> = pair_counts.frequent(2).collect();
        assert_eq!(frequent, hashmap! { (2, 9) => 3, (1, 4) => 3 });
        assert_eq!(pair_counts.top(2), vec![((1, 4), 3), ((2, 9), 3)]);
        assert_eq!(pair_counts.top(10).len(), 3);
    }
}
