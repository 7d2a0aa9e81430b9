//! Bounded build runtime.
//!
//! A single build is synchronous and short. This module runs many builds on a
//! small pool of threads fed by a bounded queue, so bursts fail fast with
//! `QueueFull` instead of piling up.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::card::CardId;
use crate::deck::{Deck, DeckConstraints};
use crate::error::{DeckError, DeckResult, ExecutionError};
use crate::service::DeckService;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct DeckRuntimeConfig {
    /// Number of build workers.
    pub workers: usize,
    /// Maximum queued builds.
    pub queue_capacity: usize,
    /// Deadline applied by [`DeckRuntime::generate`]. `None` waits forever.
    pub build_timeout: Option<Duration>,
}

impl Default for DeckRuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
            build_timeout: Some(Duration::from_secs(30)),
        }
    }
}

enum Job {
    Build {
        commander_id: CardId,
        constraints: DeckConstraints,
        reply: Sender<DeckResult<Deck>>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

struct WorkerPool {
    tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl WorkerPool {
    fn start(workers: usize, queue_capacity: usize, service: Arc<DeckService>) -> DeckResult<Self> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let service = Arc::clone(&service);
            let handle = thread::Builder::new()
                .name(format!("deckgen-build-{idx}"))
                .spawn(move || loop {
                    match rx.recv() {
                        Ok(Job::Build {
                            commander_id,
                            constraints,
                            reply,
                        }) => {
                            let result = service.generate_deck(&commander_id, &constraints);
                            let _ = reply.send(result);
                        }
                        Err(_) => break,

                        #[cfg(test)]
                        Ok(Job::Sleep { duration, reply }) => {
                            thread::sleep(duration);
                            let _ = reply.send(());
                        }
                    }
                })
                .map_err(|e| DeckError::internal(format!("failed to spawn build worker: {e}")))?;
            handles.push(handle);
        }

        Ok(Self {
            tx,
            workers: handles,
            queue_capacity,
        })
    }

    fn try_submit(&self, job: Job) -> Result<(), DeckError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ExecutionError::QueueFull {
                capacity: self.queue_capacity,
            }
            .into()),
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected.into()),
        }
    }

    fn shutdown(self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Handle to a submitted build.
pub struct BuildHandle {
    commander_id: CardId,
    rx: Receiver<DeckResult<Deck>>,
}

impl BuildHandle {
    /// The commander this build is for.
    #[must_use]
    pub fn commander_id(&self) -> &CardId {
        &self.commander_id
    }

    /// Waits for the build to complete.
    pub fn join(self) -> DeckResult<Deck> {
        self.rx
            .recv()
            .map_err(|_| DeckError::from(ExecutionError::Disconnected))?
    }

    /// Waits for the build with a deadline. The build keeps running if the
    /// deadline passes; only the result is abandoned.
    pub fn join_timeout(self, timeout: Duration) -> DeckResult<Deck> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => DeckError::from(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => DeckError::from(ExecutionError::Disconnected),
        })?
    }
}

/// Runs deck builds on a bounded worker pool.
pub struct DeckRuntime {
    service: Arc<DeckService>,
    pool: WorkerPool,
    build_timeout: Option<Duration>,
}

impl DeckRuntime {
    /// Starts the worker threads.
    pub fn new(service: DeckService, config: DeckRuntimeConfig) -> DeckResult<Self> {
        Self::from_shared(Arc::new(service), config)
    }

    /// Starts the worker threads over an already shared service.
    pub fn from_shared(service: Arc<DeckService>, config: DeckRuntimeConfig) -> DeckResult<Self> {
        let pool = WorkerPool::start(config.workers, config.queue_capacity, Arc::clone(&service))?;
        tracing::info!(
            workers = pool.workers.len(),
            queue_capacity = pool.queue_capacity,
            "deck runtime started"
        );
        Ok(Self {
            service,
            pool,
            build_timeout: config.build_timeout,
        })
    }

    /// Queues a build. Fails immediately with `QueueFull` when the queue is
    /// at capacity.
    pub fn submit(&self, commander_id: CardId, constraints: DeckConstraints) -> DeckResult<BuildHandle> {
        let (tx, rx) = bounded::<DeckResult<Deck>>(1);
        let job = Job::Build {
            commander_id: commander_id.clone(),
            constraints,
            reply: tx,
        };
        self.pool.try_submit(job)?;
        Ok(BuildHandle { commander_id, rx })
    }

    /// Queues a build and waits for it, honoring the configured deadline.
    pub fn generate(&self, commander_id: CardId, constraints: DeckConstraints) -> DeckResult<Deck> {
        let handle = self.submit(commander_id, constraints)?;
        match self.build_timeout {
            Some(timeout) => handle.join_timeout(timeout),
            None => handle.join(),
        }
    }

    /// The service builds run against, for direct lookups.
    #[must_use]
    pub fn service(&self) -> &DeckService {
        &self.service
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> Result<Receiver<()>, DeckError> {
        let (tx, rx) = bounded::<()>(1);
        self.pool.try_submit(Job::Sleep { duration, reply: tx })?;
        Ok(rx)
    }
}

impl Drop for DeckRuntime {
    fn drop(&mut self) {
        let pool = std::mem::replace(
            &mut self.pool,
            WorkerPool {
                tx: bounded::<Job>(1).0,
                workers: Vec::new(),
                queue_capacity: 1,
            },
        );
        pool.shutdown();
    }
}
