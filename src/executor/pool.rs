//! Bounded Worker Pool
//!
//! Runs submitted futures on a fixed number of long-lived workers.
//!
//! ## Hand-off
//! Submission is a rendezvous: `submit` only returns once an idle worker has
//! taken the task off the queue. With every worker busy, the caller waits, so no
//! more than `size` tasks are ever running at once and none pile up in a backlog.

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Type-erased unit of work executed by a pool worker.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Job {
    task: Task,
    /// Signalled by the worker the moment it takes the job.
    taken: oneshot::Sender<()>,
}

/// Fixed-size pool of workers sharing one rendezvous queue.
///
/// Lifecycle is `new` → `start` → any number of `submit` → `stop`. `stop`
/// consumes the pool, so it cannot be reused afterwards.
pub struct WorkerPool {
    size: usize,
    sender: mpsc::Sender<Job>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool of `size` workers. A size of zero is raised to one.
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(1);
        Self {
            size: size.max(1),
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            workers: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawns the workers. Calling it again on a started pool does nothing.
    pub fn start(&mut self) {
        if !self.workers.is_empty() {
            tracing::warn!("Worker pool already started");
            return;
        }

        for worker_id in 0..self.size {
            let receiver = self.receiver.clone();
            self.workers.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver).await;
            }));
        }

        tracing::debug!("Started worker pool with {} workers", self.size);
    }

    /// Hands `task` to an idle worker, waiting until one has picked it up.
    pub async fn submit<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.workers.is_empty() {
            return Err(anyhow::anyhow!("Worker pool is not started"));
        }

        let (taken, picked_up) = oneshot::channel();
        let job = Job {
            task: Box::pin(task),
            taken,
        };

        self.sender
            .send(job)
            .await
            .map_err(|_| anyhow::anyhow!("Worker pool is closed"))?;

        picked_up
            .await
            .map_err(|_| anyhow::anyhow!("Worker exited before taking the task"))
    }

    /// Closes the queue and waits for every worker to finish its current task and exit.
    pub async fn stop(self) {
        let Self {
            sender, workers, ..
        } = self;
        drop(sender);

        for (worker_id, handle) in workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", worker_id, e);
            }
        }

        tracing::debug!("Worker pool stopped");
    }
}

async fn worker_loop(worker_id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
    loop {
        // Only the worker holding the lock waits on the queue; the rest wait for the lock.
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            tracing::trace!("Worker {} exiting, queue closed", worker_id);
            return;
        };

        let _ = job.taken.send(());
        job.task.await;
    }
}
