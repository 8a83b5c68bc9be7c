use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    delivery::{CallSender, DeliveryError, EmailSender, REMINDER_SUBJECT},
    models::{reminder::ReminderEvent, user::User},
};

use super::queue::ReminderQueue;

/// Contiguous reminders for one user taken from the head of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderBatch {
    pub user: User,
    pub medicines: Vec<String>,
}

impl ReminderBatch {
    fn start(event: ReminderEvent) -> Self {
        Self {
            user: event.user,
            medicines: vec![event.medicine],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn message(&self) -> String {
        format!(
            "Hi {}, it is time to take your medicines: {}",
            self.user.name,
            self.medicines.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    Skipped,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub batch: ReminderBatch,
    pub email: ChannelOutcome,
    pub call: ChannelOutcome,
}

pub struct BatchingDispatcher {
    queue: Arc<ReminderQueue>,
    email_sender: Arc<dyn EmailSender>,
    call_sender: Arc<dyn CallSender>,
    heartbeat: Duration,
}

impl BatchingDispatcher {
    pub fn new(
        queue: Arc<ReminderQueue>,
        email_sender: Arc<dyn EmailSender>,
        call_sender: Arc<dyn CallSender>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            queue,
            email_sender,
            call_sender,
            heartbeat,
        }
    }

    /// Drains the queue until `cancellation_token` fires. Whatever is still
    /// queued at that point is dropped.
    pub async fn run(self, cancellation_token: CancellationToken) {
        log::info!("Reminder dispatcher started");
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!(
                        "Reminder dispatcher shutting down [unfinished = {}]",
                        self.queue.unfinished()
                    );
                    break;
                }
                _ = self.dispatch_next() => {}
            }
        }
    }

    /// One iteration of the loop: wait for a reminder, batch it with the
    /// same user's reminders right behind it and notify. Returns `None` when
    /// the heartbeat elapsed without work.
    pub async fn dispatch_next(&self) -> Option<DispatchReport> {
        let Some(first) = self.queue.pop_timeout(self.heartbeat).await else {
            log::trace!("No reminders within {:?}", self.heartbeat);
            return None;
        };

        let batch = self.collect_batch(first);
        let report = self.deliver(batch).await;
        self.queue.mark_done(report.batch.len());

        Some(report)
    }

    fn collect_batch(&self, first: ReminderEvent) -> ReminderBatch {
        let mut batch = ReminderBatch::start(first);
        let user_id = batch.user.id;
        while let Some(next) = self.queue.pop_if(|head| head.user.id == user_id) {
            batch.medicines.push(next.medicine);
        }

        batch
    }

    async fn deliver(&self, batch: ReminderBatch) -> DispatchReport {
        let message = batch.message();
        let user = &batch.user;
        log::info!(
            "Sending reminder for {} medicines to user {} [reminder_type = {}]",
            batch.len(),
            user.id,
            user.reminder_type
        );

        let email = async {
            if !user.reminder_type.wants_email() {
                return ChannelOutcome::Skipped;
            }
            let result = self
                .email_sender
                .send(&user.email, REMINDER_SUBJECT, &message)
                .await;
            outcome("email", user, result)
        };

        let call = async {
            if !user.reminder_type.wants_call() {
                return ChannelOutcome::Skipped;
            }
            let result = self.call_sender.place_call(&user.phone, &message).await;
            outcome("call", user, result)
        };

        let (email, call) = tokio::join!(email, call);

        DispatchReport { batch, email, call }
    }
}

fn outcome(channel: &str, user: &User, result: Result<(), DeliveryError>) -> ChannelOutcome {
    match result {
        Ok(()) => ChannelOutcome::Delivered,
        Err(error) => {
            log::error!("Reminder {channel} to user {} failed: {error}", user.id);
            ChannelOutcome::Failed
        }
    }
}
