use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::Context;
use chrono::NaiveDateTime;

use crate::{
    models::{
        prescription::{Prescription, PrescriptionId, TimingParseError},
        reminder::ReminderEvent,
    },
    storage::PrescriptionStore,
};

use super::{queue::ReminderQueue, window::ScanWindow};

/// Finds prescriptions with a timing inside the current window and queues
/// one reminder per due prescription. Never notifies anyone itself.
///
/// Each scan picks up where the last successful one stopped, so a timing is
/// queued once no matter how the scans are spaced around it.
pub struct DueReminderScanner {
    store: Arc<dyn PrescriptionStore>,
    queue: Arc<ReminderQueue>,
    window: ScanWindow,
    covered_until: Mutex<Option<NaiveDateTime>>,
    reported_timings: Mutex<HashSet<(PrescriptionId, String)>>,
}

impl DueReminderScanner {
    pub fn new(
        store: Arc<dyn PrescriptionStore>,
        queue: Arc<ReminderQueue>,
        window: ScanWindow,
    ) -> Self {
        Self {
            store,
            queue,
            window,
            covered_until: Mutex::new(None),
            reported_timings: Mutex::new(HashSet::new()),
        }
    }

    /// Runs one scan cycle at `now` and returns how many reminders were queued.
    ///
    /// A failed cycle leaves the covered span untouched, so the next scan
    /// retries it.
    pub async fn scan(&self, now: NaiveDateTime) -> anyhow::Result<usize> {
        let previous = *lock(&self.covered_until);
        let bounds = self.window.following(previous, now);
        if bounds.is_empty() {
            log::debug!("Clock at {now} is behind the last scan, up to {} is already covered", bounds.end);
            return Ok(0);
        }

        log::debug!("Checking reminders in ({}, {}]", bounds.start, bounds.end);

        let prescriptions = self
            .store
            .list_prescriptions()
            .await
            .context("Could not load prescriptions")?;

        let mut enqueued = 0;
        for prescription in &prescriptions {
            let mut due = false;
            for timing in prescription.timings() {
                match timing {
                    Ok(timing) => due |= bounds.contains(&timing),
                    Err(error) => {
                        self.report_malformed(prescription, &error);
                    }
                }
            }

            if due {
                self.queue.push(ReminderEvent::for_prescription(prescription));
                enqueued += 1;
            }
        }

        *lock(&self.covered_until) = Some(bounds.end);

        if enqueued > 0 {
            log::info!(
                "Queued {enqueued} reminders at {now} [queue_len = {}]",
                self.queue.len()
            );
        }

        Ok(enqueued)
    }

    /// Warns the first time a malformed timing is seen, returns whether it did.
    fn report_malformed(&self, prescription: &Prescription, error: &TimingParseError) -> bool {
        let first = lock(&self.reported_timings).insert((prescription.id, error.raw.clone()));
        if first {
            log::warn!(
                "{error} in prescription {} of user {}, skipping it",
                prescription.id,
                prescription.user.id
            );
        } else {
            log::debug!("Skipping {error} in prescription {}", prescription.id);
        }

        first
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
