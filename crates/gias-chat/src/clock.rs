//! Time source and deferred task scheduling.
//!
//! Every scheduled task hands back a [`ScheduledTask`] handle so that whoever
//! owns the task's target can cancel it before it fires.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gias_core::Timestamp;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AckPhase;

/// Final, synchronous step of a deferred task.
///
/// Runs only if the task has not been cancelled, and cancellation cannot
/// interleave with it.
pub type Commit = Box<dyn FnOnce() + Send + 'static>;

/// Work to run once a scheduled delay has elapsed. It may suspend freely and
/// resolves to the [`Commit`] that applies its effect.
pub type DeferredTask = Pin<Box<dyn Future<Output = Commit> + Send + 'static>>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Supplies timestamps and runs deferred work.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;

    /// Run `task` after `delay`. Dropping the returned handle does not cancel it.
    fn schedule(&self, delay: Duration, task: DeferredTask) -> ScheduledTask;
}

/// Wall-clock time and Tokio timers.
///
/// `schedule` must be called from within a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn schedule(&self, delay: Duration, task: DeferredTask) -> ScheduledTask {
        ScheduledTask::spawn(delay, task)
    }
}

/// Handle to a deferred task: its phase, and the means to cancel it.
#[derive(Debug)]
pub struct ScheduledTask {
    id: u64,
    phase: Arc<watch::Sender<AckPhase>>,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn `task` on the current Tokio runtime behind a `delay` timer.
    pub fn spawn(delay: Duration, task: DeferredTask) -> Self {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let (phase, _) = watch::channel(AckPhase::Waiting);
        let phase = Arc::new(phase);
        let task_phase = Arc::clone(&phase);

        let handle = tokio::spawn(async move {
            // Aborted or panicked runs end up Cancelled.
            let _guard = CancelOnDrop(Arc::clone(&task_phase));
            tokio::time::sleep(delay).await;
            let commit = task.await;
            let committed = task_phase.send_if_modified(|phase| {
                if !phase.can_transition_to(&AckPhase::Fulfilled) {
                    return false;
                }
                commit();
                *phase = AckPhase::Fulfilled;
                true
            });
            if !committed {
                tracing::debug!(task_id = id, "Task cancelled before commit");
            }
        });

        tracing::debug!(task_id = id, delay_ms = delay.as_millis() as u64, "Task scheduled");
        Self { id, phase, handle }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> AckPhase {
        *self.phase.borrow()
    }

    /// Whether the task has committed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Cancel the task if it has not committed yet. Idempotent.
    pub fn cancel(&self) {
        if advance(&self.phase, AckPhase::Cancelled) {
            self.handle.abort();
            tracing::debug!(task_id = self.id, "Task cancelled");
        }
    }

    /// Resolve once the task has committed or been cancelled, without taking
    /// ownership of the handle.
    pub fn finished(&self) -> impl Future<Output = AckPhase> + Send + 'static {
        let mut rx = self.phase.subscribe();
        async move {
            loop {
                let phase = *rx.borrow_and_update();
                if phase.is_terminal() {
                    return phase;
                }
                if rx.changed().await.is_err() {
                    return AckPhase::Cancelled;
                }
            }
        }
    }

    /// Wait for the task to run to completion or be cancelled, returning its
    /// final phase.
    pub async fn join(self) -> AckPhase {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                tracing::error!(task_id = self.id, "Deferred task panicked");
            }
            advance(&self.phase, AckPhase::Cancelled);
        }
        *self.phase.borrow()
    }
}

/// Moves a still-waiting task to Cancelled when its runner goes away.
struct CancelOnDrop(Arc<watch::Sender<AckPhase>>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        advance(&self.0, AckPhase::Cancelled);
    }
}

/// Apply a phase transition if it is valid. Returns whether it was applied.
fn advance(phase: &watch::Sender<AckPhase>, target: AckPhase) -> bool {
    phase.send_if_modified(|current| {
        if current.can_transition_to(&target) {
            *current = target;
            true
        } else {
            false
        }
    })
}
