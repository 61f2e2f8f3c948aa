use std::convert::TryFrom;

use bitvec::prelude::*;
use itertools::Itertools;

use crate::error::{MiningError, Result};
use crate::types::{BucketCounts, BucketId, Count, ItemId};

const PRIME: BucketId = 31;

/// Bucket of the pair `(first, second)`, order as encountered in the basket.
///
/// Wraps at 32 bits, so the bitmap never needs more than `2^32` bits no
/// matter how large the item ids are.
pub fn bucket_of(first: ItemId, second: ItemId) -> BucketId {
    let mut result: BucketId = 1;
    result = PRIME.wrapping_mul(result).wrapping_add(first);
    result = PRIME.wrapping_mul(result).wrapping_add(second);
    result
}

/// Hash every position pair `i < j` of `basket` and tally its bucket.
pub fn count_buckets(bucket_counts: &mut BucketCounts, basket: &[ItemId]) {
    basket
        .iter()
        .tuple_combinations()
        .for_each(|(&first, &second)| {
            *bucket_counts.entry(bucket_of(first, second)).or_insert(0) += 1;
        });
}

/// One bit per bucket in `0..=max bucket`, set when the bucket is frequent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyBitmap {
    bits: BitVec<usize, Lsb0>,
}

impl FrequencyBitmap {
    /// Fails with [`MiningError::EmptyInput`] when no pair was hashed.
    pub fn build(bucket_counts: &BucketCounts, threshold: Count) -> Result<Self> {
        let largest = bucket_counts
            .keys()
            .copied()
            .max()
            .ok_or(MiningError::EmptyInput)?;
        let len = usize::try_from(largest).map_or(usize::MAX, |largest| largest.saturating_add(1));

        let mut bits: BitVec<usize, Lsb0> = BitVec::repeat(false, len);
        for (&bucket, &count) in bucket_counts {
            if count < threshold {
                continue;
            }
            match usize::try_from(bucket) {
                Ok(index) if index < bits.len() => bits.set(index, true),
                _ => {}
            }
        }

        Ok(Self { bits })
    }

    /// Out-of-range buckets are not frequent.
    pub fn contains(&self, bucket: BucketId) -> bool {
        usize::try_from(bucket)
            .ok()
            .and_then(|index| self.bits.get(index).map(|bit| *bit))
            .unwrap_or(false)
    }

    pub fn admits(&self, first: ItemId, second: ItemId) -> bool {
        self.contains(bucket_of(first, second))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of frequent buckets.
    pub fn count_frequent(&self) -> usize {
        self.bits.count_ones()
    }
}
