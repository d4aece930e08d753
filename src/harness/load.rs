//! Load-generation helpers: bounded parallel probes and burst policies.
//!
//! These never coordinate shared state. Each request's result is returned
//! independently and aggregated only after every request has completed.

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

/// Run `count` requests with at most `workers` in flight.
///
/// `make(i)` builds the `i`-th request. Results come back in completion
/// order once all of them have finished.
pub async fn run_concurrent<F, Fut, T>(workers: usize, count: usize, make: F) -> Vec<T>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(0..count)
        .map(make)
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

/// Aggregate of a parallel batch: passes only if every request succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyVerdict {
    /// Requests that succeeded
    pub succeeded: usize,
    /// Requests fired
    pub total: usize,
}

impl ConcurrencyVerdict {
    /// Count successes in a batch
    pub fn from_results(results: &[bool]) -> Self {
        Self {
            succeeded: results.iter().filter(|ok| **ok).count(),
            total: results.len(),
        }
    }

    /// All requests succeeded (and there was at least one)
    pub fn passed(&self) -> bool {
        self.total > 0 && self.succeeded == self.total
    }
}

/// Back-to-back request policy tolerating a bounded number of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstPolicy {
    /// Sequential attempts
    pub attempts: usize,
    /// Minimum percentage of attempts that must succeed
    pub min_success_percent: usize,
}

impl Default for BurstPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            min_success_percent: 70,
        }
    }
}

impl BurstPolicy {
    /// Whether `successes` out of `attempts` meets the threshold
    pub fn passes(&self, successes: usize) -> bool {
        successes.saturating_mul(100) >= self.min_success_percent.saturating_mul(self.attempts)
    }

    /// Fewest successes that pass
    pub fn required_successes(&self) -> usize {
        self.min_success_percent
            .saturating_mul(self.attempts)
            .div_ceil(100)
    }
}
