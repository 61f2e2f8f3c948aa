//! Scalability study: run each algorithm over shrinking prefixes of a
//! dataset and time every round.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{
    baskets::{scan, BasketSource, MemoryBaskets, TextBaskets},
    config::StudyConfig,
    error::{MiningError, Result},
    round::{run_round, run_round_par, Algorithm, RoundOutcome, RoundParams},
    support::support_threshold,
    types::{Count, Pair},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Completed,
    /// PCY hashed no pair in pass one, so nothing could be frequent.
    NoBuckets,
    /// The percentage rounds down to zero baskets.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub algorithm: Algorithm,
    pub percent: u32,
    /// Baskets in the whole dataset, as counted by the first round.
    pub dataset_size: usize,
    pub basket_limit: usize,
    pub baskets_observed: usize,
    pub support_threshold: Count,
    pub frequent_items: usize,
    pub candidate_pairs: usize,
    pub frequent_pairs: usize,
    pub elapsed: Duration,
    pub status: RoundStatus,
    pub top_pairs: Vec<(Pair, Count)>,
}

impl RoundReport {
    fn empty(algorithm: Algorithm, percent: u32, dataset_size: usize, status: RoundStatus) -> Self {
        Self {
            algorithm,
            percent,
            dataset_size,
            basket_limit: 0,
            baskets_observed: 0,
            support_threshold: 0,
            frequent_items: 0,
            candidate_pairs: 0,
            frequent_pairs: 0,
            elapsed: Duration::default(),
            status,
            top_pairs: vec![],
        }
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "({}% of Data Size: {})", self.percent, self.dataset_size)?;
        writeln!(f, "  Algorithm: {}", self.algorithm)?;
        if self.status == RoundStatus::Skipped {
            return writeln!(f, "  Skipped: no baskets at this size");
        }
        writeln!(f, "  Runtime: {} ms", self.elapsed.as_millis())?;
        writeln!(
            f,
            "  Baskets: {}, Support: {}",
            self.basket_limit, self.support_threshold
        )?;
        if self.status == RoundStatus::NoBuckets {
            return writeln!(f, "  No pairs hashed in pass one");
        }
        writeln!(
            f,
            "  Frequent items: {}, Candidate pairs: {}, Frequent pairs: {}",
            self.frequent_items, self.candidate_pairs, self.frequent_pairs
        )?;
        for ((first, second), count) in &self.top_pairs {
            writeln!(f, "    [{}, {}, {}]", first, second, count)?;
        }
        Ok(())
    }
}

/// `floor(percent / 100 * total)`.
pub fn basket_limit(percent: u32, total: usize) -> usize {
    (f64::from(percent) / 100.0 * total as f64).floor() as usize
}

/// How a study executes its rounds.
trait Rounds {
    fn run(&mut self, algorithm: Algorithm, params: RoundParams) -> Result<RoundOutcome>;

    fn basket_count(&mut self) -> Result<usize>;
}

struct Sequential<'a, S: ?Sized>(&'a mut S);

impl<'a, S: BasketSource + ?Sized> Rounds for Sequential<'a, S> {
    fn run(&mut self, algorithm: Algorithm, params: RoundParams) -> Result<RoundOutcome> {
        run_round(&mut *self.0, algorithm, params)
    }

    fn basket_count(&mut self) -> Result<usize> {
        scan(&mut *self.0, usize::MAX, |_| {})
    }
}

struct Sharded(MemoryBaskets);

impl Rounds for Sharded {
    fn run(&mut self, algorithm: Algorithm, params: RoundParams) -> Result<RoundOutcome> {
        run_round_par(self.0.as_slice(), algorithm, params)
    }

    fn basket_count(&mut self) -> Result<usize> {
        Ok(self.0.len())
    }
}

/// Open the configured dataset and run the study over it.
pub fn run_study(config: &StudyConfig) -> Result<Vec<RoundReport>> {
    config.validate()?;
    let mut source = TextBaskets::open(&config.dataset)?;
    study(&mut source, config)
}

pub fn study<S: BasketSource + ?Sized>(
    source: &mut S,
    config: &StudyConfig,
) -> Result<Vec<RoundReport>> {
    config.validate()?;

    if config.parallel {
        let baskets = MemoryBaskets::load(source)?;
        info!(baskets = baskets.len(), "dataset loaded into memory");
        run_schedule(&mut Sharded(baskets), config)
    } else {
        run_schedule(&mut Sequential(source), config)
    }
}

fn run_schedule<R: Rounds>(rounds: &mut R, config: &StudyConfig) -> Result<Vec<RoundReport>> {
    let mut reports = Vec::with_capacity(config.algorithms.len() * config.schedule.len());

    for &algorithm in &config.algorithms {
        let mut total: Option<usize> = None;

        for &percent in &config.schedule {
            let params = match total {
                None => RoundParams::first(config.support),
                Some(total) => {
                    let limit = basket_limit(percent, total);
                    if limit == 0 {
                        warn!(%algorithm, percent, total, "round skipped, no baskets");
                        reports.push(RoundReport::empty(
                            algorithm,
                            percent,
                            total,
                            RoundStatus::Skipped,
                        ));
                        continue;
                    }
                    RoundParams::sample(limit, config.support)
                }
            };

            let started = Instant::now();
            let result = rounds.run(algorithm, params);
            let elapsed = started.elapsed();

            let report = match result {
                Ok(outcome) => {
                    let dataset_size = *total.get_or_insert(outcome.baskets_observed);
                    completed(algorithm, percent, dataset_size, &params, outcome, elapsed, config.top)
                }
                Err(MiningError::EmptyInput) => {
                    let dataset_size = match total {
                        Some(total) => total,
                        None => rounds.basket_count()?,
                    };
                    total = Some(dataset_size);
                    warn!(%algorithm, percent, "no pairs hashed in pass one");
                    no_buckets(algorithm, percent, dataset_size, &params, elapsed)?
                }
                Err(e) => return Err(e),
            };

            info!(
                %algorithm,
                percent,
                baskets = report.baskets_observed,
                support = report.support_threshold,
                candidates = report.candidate_pairs,
                frequent = report.frequent_pairs,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "round finished"
            );
            reports.push(report);
        }
    }

    Ok(reports)
}

fn completed(
    algorithm: Algorithm,
    percent: u32,
    dataset_size: usize,
    params: &RoundParams,
    outcome: RoundOutcome,
    elapsed: Duration,
    top: usize,
) -> RoundReport {
    let threshold = outcome.support_threshold;
    let pairs = &outcome.frequent_pairs;
    let top_pairs = pairs
        .top(top)
        .into_iter()
        .filter(|&(_, count)| count >= threshold)
        .collect();

    RoundReport {
        algorithm,
        percent,
        dataset_size,
        basket_limit: if params.first_round {
            outcome.baskets_observed
        } else {
            params.basket_limit
        },
        baskets_observed: outcome.baskets_observed,
        support_threshold: threshold,
        frequent_items: outcome.frequent_items,
        candidate_pairs: pairs.len(),
        frequent_pairs: pairs.frequent(threshold).count(),
        elapsed,
        status: RoundStatus::Completed,
        top_pairs,
    }
}

fn no_buckets(
    algorithm: Algorithm,
    percent: u32,
    dataset_size: usize,
    params: &RoundParams,
    elapsed: Duration,
) -> Result<RoundReport> {
    let (basket_limit, base) = if params.first_round {
        (dataset_size, dataset_size)
    } else {
        (params.basket_limit, params.basket_limit)
    };

    Ok(RoundReport {
        basket_limit,
        baskets_observed: basket_limit.min(dataset_size),
        support_threshold: support_threshold(params.support, base)?,
        elapsed,
        ..RoundReport::empty(algorithm, percent, dataset_size, RoundStatus::NoBuckets)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Basket;

    fn dataset(size: u32) -> MemoryBaskets {
        let baskets: Vec<Basket> = (0..size).map(|i| vec![1, 2, i % 3 + 3]).collect();
        MemoryBaskets::new(baskets)
    }

    fn config(schedule: Vec<u32>) -> StudyConfig {
        StudyConfig {
            support: 0.5,
            schedule,
            ..StudyConfig::default()
        }
    }

    #[test]
    fn basket_limit_floors() {
        assert_eq!(basket_limit(100, 88_162), 88_162);
        assert_eq!(basket_limit(90, 88_162), 79_345);
        assert_eq!(basket_limit(1, 99), 0);
    }

    #[test]
    fn schedule_shrinks_limits_and_supports() {
        let reports = study(&mut dataset(20), &config(vec![100, 50, 10])).unwrap();
        assert_eq!(reports.len(), 6);

        let apriori: Vec<_> = reports
            .iter()
            .filter(|r| r.algorithm == Algorithm::Apriori)
            .map(|r| (r.percent, r.basket_limit, r.baskets_observed, r.support_threshold))
            .collect();
        assert_eq!(apriori, vec![(100, 20, 20, 10), (50, 10, 10, 5), (10, 2, 2, 1)]);

        for report in &reports {
            assert_eq!(report.status, RoundStatus::Completed);
            assert_eq!(report.dataset_size, 20);
            // (1, 2) is in every basket
            assert!(report.frequent_pairs >= 1);
        }
    }

    #[test]
    fn tiny_rounds_are_skipped() {
        let reports = study(&mut dataset(3), &config(vec![100, 10])).unwrap();
        let statuses: Vec<_> = reports.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RoundStatus::Completed,
                RoundStatus::Skipped,
                RoundStatus::Completed,
                RoundStatus::Skipped
            ]
        );
    }

    #[test]
    fn empty_dataset_does_not_abort() {
        let reports = study(&mut MemoryBaskets::default(), &config(vec![100, 50])).unwrap();
        let statuses: Vec<_> = reports.iter().map(|r| (r.algorithm, r.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (Algorithm::Apriori, RoundStatus::Completed),
                (Algorithm::Apriori, RoundStatus::Skipped),
                (Algorithm::Pcy, RoundStatus::NoBuckets),
                (Algorithm::Pcy, RoundStatus::Skipped),
            ]
        );
        assert!(reports.iter().all(|r| r.candidate_pairs == 0));
    }

    #[test]
    fn sharded_study_matches_sequential() {
        let sequential = study(&mut dataset(50), &config(vec![100, 60, 20])).unwrap();
        let sharded = study(
            &mut dataset(50),
            &StudyConfig {
                parallel: true,
                ..config(vec![100, 60, 20])
            },
        )
        .unwrap();

        let strip = |reports: Vec<RoundReport>| -> Vec<RoundReport> {
            reports
                .into_iter()
                .map(|r| RoundReport {
                    elapsed: Duration::default(),
                    ..r
                })
                .collect()
        };
        assert_eq!(strip(sharded), strip(sequential));
    }

    #[test]
    fn top_pairs_are_frequent_and_ordered() {
        let reports = study(
            &mut dataset(9),
            &StudyConfig {
                top: 5,
                ..config(vec![100])
            },
        )
        .unwrap();

        // threshold floor(0.5 * 9) = 4; only (1, 2) occurs that often
        assert_eq!(reports[0].top_pairs, vec![((1, 2), 9)]);
    }

    #[test]
    fn malformed_basket_aborts_study() {
        let mut source = crate::baskets::TextBaskets::new(std::io::Cursor::new(b"1 2\n3 ? 4\n".to_vec()));
        assert!(matches!(
            study(&mut source, &config(vec![100])),
            Err(MiningError::MalformedBasket { index: 1, .. })
        ));
    }

    #[test]
    fn report_layout() {
        let report = RoundReport {
            basket_limit: 8816,
            support_threshold: 88,
            frequent_items: 3,
            candidate_pairs: 2,
            frequent_pairs: 1,
            elapsed: Duration::from_millis(42),
            top_pairs: vec![((39, 48), 120)],
            ..RoundReport::empty(Algorithm::Pcy, 10, 88_162, RoundStatus::Completed)
        };
        let text = report.to_string();
        assert!(text.starts_with("(10% of Data Size: 88162)\n"));
        assert!(text.contains("  Runtime: 42 ms\n"));
        assert!(text.contains("  Baskets: 8816, Support: 88\n"));
        assert!(text.contains("    [39, 48, 120]\n"));
    }
}
