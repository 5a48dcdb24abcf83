//! Worker pool for bounded concurrent processing.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results are sent to an unbounded channel for consumption
//! by the caller.
//!
//! `async-channel`'s `Receiver` is `Clone`, so each worker gets its own
//! handle and no worker can starve the others by holding a lock while
//! waiting on `recv()`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Fixed-width fan-out over a list of work items.
///
/// At most `n` items are in flight at once; the submitter blocks once the
/// work channel is full. Results arrive in completion order, not
/// submission order. The cache refresh runs its per-platform startup tasks
/// through one of these.
///
/// # Example
///
/// ```ignore
/// let mut pool = WorkerPool::start(8, platforms, None, |p| async move {
///     validate(p).await
/// });
///
/// while let Some(result) = pool.recv().await {
///     handle(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn N workers, submit all items, and return a pool for receiving results.
    ///
    /// Items are submitted via a bounded channel (capacity N). Each worker
    /// pulls items one at a time and invokes `process_fn`. When
    /// `item_timeout` is set and a call exceeds it, the future is dropped,
    /// no result is sent for that item, and the worker moves on.
    pub fn start<W, F, Fut>(
        n: usize,
        items: Vec<W>,
        item_timeout: Option<Duration>,
        process_fn: F,
    ) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        let result = match item_timeout {
                            Some(limit) => match tokio::time::timeout(limit, process_fn(item)).await {
                                Ok(r) => r,
                                Err(_) => {
                                    log::debug!("Worker pool: item timed out after {limit:?}, skipping");
                                    continue;
                                }
                            },
                            None => process_fn(item).await,
                        };
                        if result_tx.send(result).is_err() {
                            break; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // Channel closes once every worker has dropped its sender
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Self {
            result_rx,
            _handles: handles,
        }
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }

    /// Wait for every result, in completion order.
    pub async fn collect(mut self) -> Vec<R> {
        let mut results = Vec::new();
        while let Some(r) = self.recv().await {
            results.push(r);
        }
        results
    }
}
