use std::collections::{HashMap, HashSet};

pub type ItemId = u32;
pub type Count = u32;

/// Hash slot of a pair.
pub type BucketId = u32;

/// One transaction, items in the order they were read. Duplicates are kept.
pub type Basket = Vec<ItemId>;

pub type ItemCounts = HashMap<ItemId, Count>;
pub type FrequentItems = HashSet<ItemId>;
pub type BucketCounts = HashMap<BucketId, Count>;

/// Pair key as encountered in a basket: (earlier position, later position).
pub type Pair = (ItemId, ItemId);
