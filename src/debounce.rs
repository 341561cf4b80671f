//! Single-slot debounced task scheduler
//!
//! A `Debouncer` holds at most one pending task. Arming a new task un-arms the
//! previous one, so only the last task of a burst ever fires, once the delay
//! has elapsed without another trigger. Time is passed in by the caller.

use std::time::{Duration, Instant};

/// Identifies one arming of a debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct PendingTask<T> {
    handle: TimerHandle,
    deadline: Instant,
    task: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<PendingTask<T>>,
    next_handle: u64,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms `task` to fire `delay` after `now`, cancelling any unfired task
    pub fn arm(&mut self, task: T, now: Instant) -> TimerHandle {
        if let Some(previous) = self.pending.take() {
            log::trace!("Re-arming debounce timer, cancelled {:?}", previous.handle);
        }

        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending = Some(PendingTask {
            handle,
            deadline: now + self.delay,
            task,
        });
        handle
    }

    /// Un-arms the pending task and returns it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.task)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle of the currently armed task
    pub fn armed_handle(&self) -> Option<TimerHandle> {
        self.pending.as_ref().map(|pending| pending.handle)
    }

    /// Instant at which the pending task becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Takes the pending task if its deadline has been reached
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);

        if due { self.cancel() } else { None }
    }
}
