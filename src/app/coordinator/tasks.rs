//! In-flight task bookkeeping
//!
//! Each operation family owns a [`TaskSlot`]. Starting an operation bumps the
//! slot's generation and aborts the previous task; the new task receives a
//! [`Ticket`] and publishes through [`Ticket::publish_if_current`], which holds
//! the generation lock for the check and the write together.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;
use tracing::debug;

type Generation = Arc<Mutex<u64>>;

fn lock_generation(generation: &Generation) -> MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Proof that a task was the latest one started in its slot
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: Generation,
    issued: u64,
}

impl Ticket {
    /// False once a newer task has been started in the same slot
    pub fn is_current(&self) -> bool {
        *lock_generation(&self.generation) == self.issued
    }

    /// Run `publish` only if no newer task has started
    ///
    /// The slot cannot issue a new ticket while `publish` runs, so a
    /// superseded task never writes after its successor began.
    pub fn publish_if_current<R>(&self, publish: impl FnOnce() -> R) -> Option<R> {
        let generation = lock_generation(&self.generation);
        if *generation != self.issued {
            return None;
        }
        let published = publish();
        drop(generation);
        Some(published)
    }
}

/// Holds the current task of one operation family
#[derive(Debug)]
pub struct TaskSlot {
    name: &'static str,
    generation: Generation,
    current: Mutex<Option<AbortHandle>>,
}

impl TaskSlot {
    /// Create an empty slot; `name` only shows up in logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: Arc::new(Mutex::new(0)),
            current: Mutex::new(None),
        }
    }

    /// Supersede whatever is in flight and issue a ticket for the next task
    pub fn begin(&self) -> Ticket {
        let issued = self.bump();
        if let Some(previous) = self.lock().take() {
            if !previous.is_finished() {
                debug!("Cancelling in-flight {} task", self.name);
            }
            previous.abort();
        }
        Ticket {
            generation: self.generation.clone(),
            issued,
        }
    }

    /// Record the task started with `ticket`
    ///
    /// If another task began in the meantime this one is already stale and is
    /// aborted on the spot.
    pub fn attach(&self, ticket: &Ticket, handle: AbortHandle) {
        let mut current = self.lock();
        if ticket.is_current() {
            *current = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Cancel the in-flight task, if any, without starting a new one
    pub fn cancel(&self) {
        self.bump();
        if let Some(previous) = self.lock().take() {
            debug!("Cancelling {} task", self.name);
            previous.abort();
        }
    }

    /// Waits for any in-progress publish to finish
    fn bump(&self) -> u64 {
        let mut generation = lock_generation(&self.generation);
        *generation += 1;
        *generation
    }

    fn lock(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
