//! Frequent pair mining with A-Priori and PCY.
//!
//! Both algorithms make two bounded passes over a [`BasketSource`]. Pass one
//! counts single items (PCY also hashes every pair of a basket into a bucket
//! and counts buckets). The counts are thresholded against
//! `floor(support * base)`, and pass two counts exactly the pairs whose
//! items are both frequent (and, for PCY, whose bucket is frequent).
//!
//! ```
//! use freqpairs::{run_round, Algorithm, MemoryBaskets, RoundParams};
//!
//! let mut baskets = MemoryBaskets::new(vec![vec![1, 2, 3], vec![2, 3], vec![1, 3], vec![1, 2]]);
//! let outcome = run_round(&mut baskets, Algorithm::Pcy, RoundParams::first(0.5)).unwrap();
//!
//! assert_eq!(outcome.support_threshold, 2);
//! assert_eq!(outcome.frequent_pairs.get(1, 3), Some(2));
//! ```

pub mod baskets;
pub mod config;
pub mod error;
pub mod itemsets;
pub mod round;
pub mod study;
pub mod support;
pub mod types;

#[cfg(feature = "python")]
pub mod wrapper;

pub use baskets::{BasketSource, MemoryBaskets, TextBaskets};
pub use config::StudyConfig;
pub use error::{MiningError, Result};
pub use itemsets::pairs::PairCounts;
pub use itemsets::pcy::FrequencyBitmap;
pub use round::{
    mine_dataset, run_round, run_round_par, Algorithm, Round, RoundOutcome, RoundParams,
    RoundPhase,
};
pub use study::{run_study, RoundReport, RoundStatus};
