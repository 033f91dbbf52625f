//! Bounded batch fetching.
//!
//! URLs are processed in fixed-size batches. Every request in a batch runs
//! concurrently, the batch is awaited as a whole, then the runner sleeps for a
//! fixed delay before starting the next one. The delay keeps the load on the
//! origin server low enough to avoid being rate limited.

use crate::error::OrarError;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Batch size and inter-batch delay.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of a batch run, split per URL.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub successes: Vec<(String, T)>,
    pub failures: Vec<(String, OrarError)>,
}

impl<T> BatchReport<T> {
    fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Failures that are expected (e.g. schedules not yet published).
    pub fn benign_failures(&self) -> impl Iterator<Item = &(String, OrarError)> {
        self.failures.iter().filter(|(_, e)| e.is_benign())
    }

    /// Failures that should be surfaced to whoever started the batch.
    pub fn hard_failures(&self) -> impl Iterator<Item = &(String, OrarError)> {
        self.failures.iter().filter(|(_, e)| !e.is_benign())
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Runs `op` for every URL, `batch_size` at a time.
///
/// A failing URL never aborts its siblings: each result is recorded under
/// its URL and the run continues. Results keep the input order.
pub async fn run_in_batches<T, F, Fut>(urls: &[String], options: BatchOptions, op: F) -> BatchReport<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, OrarError>>,
{
    let mut report = BatchReport::new();
    let batch_size = options.batch_size.max(1);
    let batch_count = urls.len().div_ceil(batch_size);

    for (index, batch) in urls.chunks(batch_size).enumerate() {
        debug!(batch = index + 1, of = batch_count, size = batch.len(), "Starting batch");

        let results = join_all(batch.iter().map(|url| op(url.clone()))).await;

        for (url, result) in batch.iter().zip(results) {
            match result {
                Ok(value) => report.successes.push((url.clone(), value)),
                Err(e) => {
                    if e.is_benign() {
                        debug!(url = %url, error = %e, "Skipping page");
                    } else {
                        warn!(url = %url, error = %e, "Page failed");
                    }
                    report.failures.push((url.clone(), e));
                }
            }
        }

        if index + 1 < batch_count && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    info!(
        total = report.total(),
        succeeded = report.successes.len(),
        failed = report.failures.len(),
        "Batch run finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.test/{i}.html")).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded_by_batch_size() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let options = BatchOptions {
            batch_size: 3,
            delay: Duration::from_millis(500),
        };
        let report = run_in_batches(&urls(7), options, |url| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(url.len())
            }
        })
        .await;

        assert_eq!(report.successes.len(), 7);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_abort_siblings() {
        let options = BatchOptions {
            batch_size: 2,
            delay: Duration::ZERO,
        };
        let report = run_in_batches(&urls(4), options, |url| async move {
            if url.ends_with("1.html") {
                Err(OrarError::Network {
                    message: "timed out".to_string(),
                })
            } else if url.ends_with("2.html") {
                Err(OrarError::EmptyDocument { bytes: 120 })
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(report.successes.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.benign_failures().count(), 1);
        assert_eq!(report.hard_failures().count(), 1);
        assert_eq!(report.successes[0].0, "https://example.test/0.html");
        assert_eq!(report.successes[1].0, "https://example.test/3.html");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_batches_only() {
        let start = tokio::time::Instant::now();
        let options = BatchOptions {
            batch_size: 2,
            delay: Duration::from_secs(1),
        };
        run_in_batches(&urls(5), options, |_| async { Ok(()) }).await;
        // three batches, two pauses
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
