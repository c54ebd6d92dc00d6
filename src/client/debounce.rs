use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Scheduled,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Single-slot debounce timer.
///
/// At most one job is pending. Scheduling replaces the pending job and
/// restarts the wait. Once a job's wait elapses it is detached from the slot,
/// so later scheduling never cancels work that already started.
#[derive(Debug, Default)]
pub struct Debouncer {
    slot: Mutex<Slot>,
}

impl Debouncer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(self: &Arc<Self>, delay: Duration, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        slot.generation += 1;
        let generation = slot.generation;

        if let Some(previous) = slot.timer.take() {
            previous.abort();
        }

        let this = Arc::clone(self);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A replacement may have been scheduled between the wake-up and
            // this point; only the current generation may run.
            if this.claim(generation) {
                job.await;
            }
        }));
    }

    /// Drops the pending job, if any.
    pub fn cancel(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
    }

    pub fn state(&self) -> DebounceState {
        if self.lock().timer.is_some() {
            DebounceState::Scheduled
        } else {
            DebounceState::Idle
        }
    }

    fn claim(&self, generation: u64) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.timer = None;
        true
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
