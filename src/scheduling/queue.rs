use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::Notify,
    time::{self, Instant},
};

use crate::models::reminder::ReminderEvent;

#[derive(Default)]
struct QueueState {
    entries: VecDeque<ReminderEvent>,
    unfinished: usize,
}

/// Unbounded FIFO between the scanner and the dispatcher.
///
/// Every event pushed counts as unfinished until the consumer calls
/// [`ReminderQueue::mark_done`] for it, whether it is still queued or already
/// taken out for delivery.
#[derive(Default)]
pub struct ReminderQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl ReminderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: ReminderEvent) {
        {
            let mut state = self.lock();
            state.entries.push_back(event);
            state.unfinished += 1;
        }
        self.available.notify_one();
    }

    pub fn try_pop(&self) -> Option<ReminderEvent> {
        self.lock().entries.pop_front()
    }

    pub fn peek(&self) -> Option<ReminderEvent> {
        self.lock().entries.front().cloned()
    }

    /// Pops the head only if it satisfies `predicate`. Inspection and removal
    /// happen under one lock so a concurrent push cannot slip in between.
    pub fn pop_if(&self, predicate: impl FnOnce(&ReminderEvent) -> bool) -> Option<ReminderEvent> {
        let mut state = self.lock();
        if state.entries.front().is_some_and(predicate) {
            state.entries.pop_front()
        } else {
            None
        }
    }

    /// Waits up to `timeout` for an event. `None` means nothing arrived.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<ReminderEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.try_pop() {
                return Some(event);
            }

            if time::timeout_at(deadline, self.available.notified())
                .await
                .is_err()
            {
                return self.try_pop();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn mark_done(&self, count: usize) {
        let mut state = self.lock();
        if count > state.unfinished {
            log::warn!(
                "Marking {count} reminders done but only {} are unfinished",
                state.unfinished
            );
        }
        state.unfinished = state.unfinished.saturating_sub(count);
    }

    /// Events pushed but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }
}
