//! Background worker pool.
//!
//! Fire-and-forget database work is submitted to a bounded pool of named
//! threads draining a channel. The completion callback runs on the pool
//! thread, not the caller's: callers needing thread affinity must
//! re-dispatch themselves.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use once_cell::sync::Lazy;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of worker threads.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns a pool with `size` workers (at least one).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let workers = (0..size.max(1))
            .map(|i| {
                let receiver = receiver.clone();
                std::thread::Builder::new()
                    .name(format!("embersql-worker-{i}"))
                    .spawn(move || {
                        while let Ok(job) = receiver.recv() {
                            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                                tracing::error!("worker job panicked");
                            }
                        }
                    })
                    .expect("failed to spawn embersql worker thread")
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// The process-wide pool used by the async DAO entry points. A single
    /// worker keeps background writes serialized among themselves.
    #[must_use]
    pub fn global() -> &'static WorkerPool {
        static GLOBAL: Lazy<WorkerPool> = Lazy::new(|| WorkerPool::new(1));
        &GLOBAL
    }

    /// Runs `block` on a pool thread, then hands its result to `callback`
    /// on the same thread.
    pub fn execute<T, F, C>(&self, block: F, callback: C)
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Box::new(move || callback(block())));
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Disconnect the channel; workers drain what was queued and exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_callback_receives_block_result() {
        let pool = WorkerPool::new(1);
        let (tx, rx) = mpsc::channel();
        pool.execute(
            || 21 * 2,
            move |result| {
                tx.send(result).unwrap();
            },
        );
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn test_callback_runs_on_pool_thread() {
        let pool = WorkerPool::new(1);
        let (tx, rx) = mpsc::channel();
        pool.execute(
            || (),
            move |()| {
                let name = std::thread::current().name().map(String::from);
                tx.send(name).unwrap();
            },
        );
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("embersql-worker-0"));
    }

    #[test]
    fn test_panicking_job_does_not_kill_the_worker() {
        let pool = WorkerPool::new(1);
        pool.execute(|| panic!("boom"), |()| {});
        let (tx, rx) = mpsc::channel();
        pool.execute(
            || 7,
            move |result| {
                tx.send(result).unwrap();
            },
        );
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_drop_drains_queued_jobs() {
        let (tx, rx) = mpsc::channel();
        {
            let pool = WorkerPool::new(2);
            for i in 0..8 {
                let tx = tx.clone();
                pool.execute(
                    move || i,
                    move |result| {
                        tx.send(result).unwrap();
                    },
                );
            }
        }
        let mut received: Vec<i32> = rx.try_iter().collect();
        received.sort_unstable();
        assert_eq!(received, (0..8).collect::<Vec<_>>());
    }
}
