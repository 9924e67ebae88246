//! Batch ingestion: a bounded work queue drained by a fixed worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::bounded;
use log::warn;
use parking_lot::Mutex;

use crate::error::{LumenError, Result};

/// Cancellation handle for a running batch.
///
/// Cancelling stops the producer from enqueueing further payloads. Payloads
/// already admitted to the queue are still inserted, so everything counted in
/// [`BatchReport::inserted`] is fully indexed when the batch returns.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    cancelled: Arc<AtomicBool>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Outcome of a batch insert.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Payloads stored and indexed.
    pub inserted: usize,
    /// Payloads never attempted because the batch was cancelled.
    pub skipped: usize,
    /// One error per failed payload, in no particular order.
    pub errors: Vec<LumenError>,
}

impl BatchReport {
    /// True when every payload was inserted.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.errors.is_empty()
    }

    fn record(&mut self, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.inserted += 1,
            Err(e) => {
                warn!("batch insert failed: {e}");
                self.errors.push(e);
            }
        }
    }
}

/// Feed `payloads` through `workers` threads calling `insert` on each.
///
/// The calling thread is the producer; it blocks when the queue of
/// `capacity` slots is full and stops early once `control` is cancelled.
/// Returns after every worker has drained the queue.
pub(crate) fn run<P, F>(
    payloads: Vec<P>,
    workers: usize,
    capacity: usize,
    control: &BatchControl,
    insert: F,
) -> BatchReport
where
    P: Send,
    F: Fn(P) -> Result<()> + Sync,
{
    let total = payloads.len();
    let (tx, rx) = bounded::<P>(capacity.max(1));
    let report = Mutex::new(BatchReport::default());
    let mut admitted = 0;

    thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            let rx = rx.clone();
            let insert = &insert;
            let report = &report;
            scope.spawn(move || {
                let mut local = BatchReport::default();
                for payload in rx.iter() {
                    local.record(insert(payload));
                }
                let mut report = report.lock();
                report.inserted += local.inserted;
                report.errors.append(&mut local.errors);
            });
        }
        drop(rx);

        for payload in payloads {
            if control.is_cancelled() {
                break;
            }
            if tx.send(payload).is_err() {
                break;
            }
            admitted += 1;
        }
        // Closing the queue lets workers exit once it is drained.
        drop(tx);
    });

    let mut report = report.into_inner();
    report.skipped = total - admitted;
    report
}

/// Insert `payloads` one at a time on the calling thread.
pub(crate) fn run_sequential<P, F>(payloads: Vec<P>, insert: F) -> BatchReport
where
    F: Fn(P) -> Result<()>,
{
    let mut report = BatchReport::default();
    for payload in payloads {
        report.record(insert(payload));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_run_processes_everything() {
        let sum = AtomicUsize::new(0);
        let report = run((1..=100).collect(), 4, 8, &BatchControl::new(), |n: usize| {
            sum.fetch_add(n, Ordering::Relaxed);
            Ok(())
        });
        assert_eq!(report.inserted, 100);
        assert!(report.is_complete());
        assert_eq!(sum.load(Ordering::Relaxed), 5050);
    }

    #[test]
    fn test_run_collects_errors_without_aborting() {
        let report = run((0..50).collect(), 3, 4, &BatchControl::new(), |n: u32| {
            if n % 10 == 0 {
                Err(LumenError::invalid_input(format!("rejected {n}")))
            } else {
                Ok(())
            }
        });
        assert_eq!(report.inserted, 45);
        assert_eq!(report.errors.len(), 5);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_cancel_before_start_skips_everything() {
        let control = BatchControl::new();
        control.cancel();
        let report = run(vec![1, 2, 3], 2, 1, &control, |_: i32| Ok(()));
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped, 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_cancel_midway_accounts_for_every_payload() {
        let control = BatchControl::new();
        let seen = AtomicUsize::new(0);
        let report = run((0..1000).collect(), 2, 1, &control, |_: i32| {
            if seen.fetch_add(1, Ordering::Relaxed) == 10 {
                control.cancel();
            }
            Ok(())
        });
        assert!(report.skipped > 0);
        assert_eq!(report.inserted + report.skipped, 1000);
        assert_eq!(report.inserted, seen.load(Ordering::Relaxed));
    }

    #[test]
    fn test_run_sequential() {
        let report = run_sequential(vec![1, 2, 3], |n: i32| {
            if n == 2 {
                Err(LumenError::internal("boom"))
            } else {
                Ok(())
            }
        });
        assert_eq!(report.inserted, 2);
        assert_eq!(report.errors.len(), 1);
    }
}
