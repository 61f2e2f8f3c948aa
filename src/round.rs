//! One mining round: pass one, threshold and candidates, pass two.
//!
//! A-Priori and PCY share this engine. They differ only in whether pass one
//! also hashes pairs into buckets and whether pass two is given the
//! resulting [`FrequencyBitmap`] as an extra filter. All tables belong to
//! the round and are dropped with it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    baskets::{BasketSource, TextBaskets},
    error::{MiningError, Result},
    itemsets::{
        count::{first_pass, select_frequent_items, PassOne},
        pairs::{count_pairs, PairCounts},
        pcy::FrequencyBitmap,
    },
    support::{check_fraction, support_threshold},
    types::{Basket, Count, FrequentItems},
};

/// Basket limit that scans the whole dataset.
pub const UNBOUNDED: usize = usize::MAX;

const SHARD_SIZE: usize = 1024; // baskets per rayon task

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Apriori,
    Pcy,
}

impl Algorithm {
    pub fn hashes_pairs(self) -> bool {
        matches!(self, Algorithm::Pcy)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Apriori => write!(f, "A-Priori"),
            Algorithm::Pcy => write!(f, "PCY"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "apriori" | "a-priori" => Ok(Algorithm::Apriori),
            "pcy" => Ok(Algorithm::Pcy),
            other => Err(MiningError::invalid(format!("unknown algorithm {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundParams {
    /// Number of baskets each pass reads.
    pub basket_limit: usize,
    /// Support as a fraction in `(0, 1]`.
    pub support: f64,
    /// The first round anchors support to the baskets it actually saw;
    /// later rounds anchor it to `basket_limit`.
    pub first_round: bool,
}

impl RoundParams {
    pub fn first(support: f64) -> Self {
        Self {
            basket_limit: UNBOUNDED,
            support,
            first_round: true,
        }
    }

    pub fn sample(basket_limit: usize, support: f64) -> Self {
        Self {
            basket_limit,
            support,
            first_round: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.basket_limit == 0 {
            return Err(MiningError::invalid("basket limit must be at least 1"));
        }
        check_fraction(self.support)
    }

    fn support_base(&self, baskets_seen: usize) -> usize {
        if self.first_round {
            baskets_seen
        } else {
            self.basket_limit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoundPhase {
    Idle,
    ScanningPassOne,
    ComputingThresholdAndCandidates,
    ScanningPassTwo,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Raw counts of every candidate pair, not thresholded.
    pub frequent_pairs: PairCounts,
    pub baskets_observed: usize,
    pub support_threshold: Count,
    /// Size of the frequent item set.
    pub frequent_items: usize,
    /// Set bits of the bucket bitmap, PCY only.
    pub frequent_buckets: Option<usize>,
}

struct Candidates {
    threshold: Count,
    frequent_items: FrequentItems,
    bitmap: Option<FrequencyBitmap>,
}

impl Candidates {
    fn from_pass_one(pass: &PassOne, params: &RoundParams) -> Result<Self> {
        let threshold = support_threshold(params.support, params.support_base(pass.baskets))?;
        let frequent_items = select_frequent_items(&pass.item_counts, threshold);
        let bitmap = pass
            .bucket_counts
            .as_ref()
            .map(|bucket_counts| FrequencyBitmap::build(bucket_counts, threshold))
            .transpose()?;

        Ok(Self {
            threshold,
            frequent_items,
            bitmap,
        })
    }

    fn into_outcome(self, frequent_pairs: PairCounts, baskets_observed: usize) -> RoundOutcome {
        RoundOutcome {
            frequent_pairs,
            baskets_observed,
            support_threshold: self.threshold,
            frequent_items: self.frequent_items.len(),
            frequent_buckets: self.bitmap.as_ref().map(FrequencyBitmap::count_frequent),
        }
    }
}

/// A single round over a basket source. Runs at most once.
pub struct Round<'s, S: ?Sized> {
    source: &'s mut S,
    algorithm: Algorithm,
    params: RoundParams,
    phase: RoundPhase,
}

impl<'s, S: BasketSource + ?Sized> Round<'s, S> {
    /// Parameters are checked here, before any basket is read.
    pub fn new(source: &'s mut S, algorithm: Algorithm, params: RoundParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            source,
            algorithm,
            params,
            phase: RoundPhase::Idle,
        })
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    fn enter(&mut self, next: RoundPhase) {
        debug_assert!(next > self.phase, "{:?} after {:?}", next, self.phase);
        self.phase = next;
    }

    pub fn run(&mut self) -> Result<RoundOutcome> {
        if self.phase != RoundPhase::Idle {
            return Err(MiningError::invalid("round has already run"));
        }
        let limit = self.params.basket_limit;

        self.enter(RoundPhase::ScanningPassOne);
        let pass = first_pass(&mut *self.source, limit, self.algorithm.hashes_pairs())?;
        debug!(
            algorithm = %self.algorithm,
            baskets = pass.baskets,
            items = pass.item_counts.len(),
            buckets = pass.bucket_counts.as_ref().map_or(0, |b| b.len()),
            "pass one done"
        );

        self.enter(RoundPhase::ComputingThresholdAndCandidates);
        let baskets_observed = pass.baskets;
        let candidates = Candidates::from_pass_one(&pass, &self.params)?;
        drop(pass);
        debug!(
            algorithm = %self.algorithm,
            threshold = candidates.threshold,
            frequent_items = candidates.frequent_items.len(),
            frequent_buckets = candidates.bitmap.as_ref().map_or(0, |b| b.count_frequent()),
            "candidates ready"
        );

        self.enter(RoundPhase::ScanningPassTwo);
        let pair_counts = count_pairs(
            &mut *self.source,
            limit,
            &candidates.frequent_items,
            candidates.bitmap.as_ref(),
        )?;
        debug!(
            algorithm = %self.algorithm,
            candidate_pairs = pair_counts.len(),
            "pass two done"
        );

        self.enter(RoundPhase::Done);
        Ok(candidates.into_outcome(pair_counts, baskets_observed))
    }
}

pub fn run_round<S>(source: &mut S, algorithm: Algorithm, params: RoundParams) -> Result<RoundOutcome>
where
    S: BasketSource + ?Sized,
{
    Round::new(source, algorithm, params)?.run()
}

/// Open the dataset at `path` and run one round over it.
pub fn mine_dataset<P: AsRef<Path>>(
    path: P,
    algorithm: Algorithm,
    params: RoundParams,
) -> Result<RoundOutcome> {
    params.validate()?;
    let mut source = TextBaskets::open(path)?;
    run_round(&mut source, algorithm, params)
}

/// Same round as [`run_round`], with both passes sharded across the rayon
/// pool and partial tables merged afterwards.
pub fn run_round_par(
    baskets: &[Basket],
    algorithm: Algorithm,
    params: RoundParams,
) -> Result<RoundOutcome> {
    params.validate()?;
    let baskets = &baskets[..baskets.len().min(params.basket_limit)];
    let hash_pairs = algorithm.hashes_pairs();

    let pass = baskets
        .par_chunks(SHARD_SIZE)
        .map(|shard| {
            let mut pass = PassOne::new(hash_pairs);
            shard.iter().for_each(|basket| pass.observe(basket));
            pass
        })
        .reduce(|| PassOne::new(hash_pairs), PassOne::merge);
    let baskets_observed = pass.baskets;
    let candidates = Candidates::from_pass_one(&pass, &params)?;
    drop(pass);

    let frequent_items = &candidates.frequent_items;
    let bitmap = candidates.bitmap.as_ref();
    let pair_counts = baskets
        .par_chunks(SHARD_SIZE)
        .map(|shard| {
            let mut pair_counts = PairCounts::new();
            for basket in shard {
                pair_counts.observe(basket, frequent_items, bitmap);
            }
            pair_counts
        })
        .reduce(PairCounts::new, PairCounts::merge);
    debug!(
        algorithm = %algorithm,
        baskets = baskets_observed,
        threshold = candidates.threshold,
        candidate_pairs = pair_counts.len(),
        "sharded round done"
    );

    Ok(candidates.into_outcome(pair_counts, baskets_observed))
}
