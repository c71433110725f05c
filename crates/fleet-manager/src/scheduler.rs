// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small periodic-job runner with bounded total concurrency.
//!
//! Each job reschedules from the completion of its previous run rather
//! than from a fixed cadence, so a slow iteration never overlaps with the
//! next. A shared [`Semaphore`] caps how many jobs may run at once across
//! the whole scheduler; a tick that cannot acquire a permit is skipped and
//! retried on the job's next interval rather than queued.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    token: CancellationToken,
}

impl Scheduler {
    pub fn new(concurrency: usize, token: CancellationToken) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            token,
        }
    }

    /// Spawn `job` to run immediately, then again every `interval` after
    /// each run completes, until the scheduler's token is cancelled.
    pub fn spawn_periodic<F, Fut>(&self, name: &'static str, interval: Duration, mut job: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let semaphore = self.semaphore.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            loop {
                match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => {
                        job().await;
                        drop(permit);
                    }
                    Err(_) => {
                        tracing::warn!(job = name, "scheduler at capacity; rescheduling tick");
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
