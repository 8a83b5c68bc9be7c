use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    delivery::{CallSender, EmailSender},
    scheduling::{
        BatchingDispatcher, CadenceTrigger, Clock, DueReminderScanner, ReminderQueue, ScanWindow,
    },
    storage::PrescriptionStore,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PipelineConfig {
    pub cadence: Duration,
    pub heartbeat: Duration,
}

/// Scanner and dispatcher running side by side, connected only through the
/// reminder queue.
pub struct ReminderPipeline {
    queue: Arc<ReminderQueue>,
    cancellation_token: CancellationToken,
    scanner_task: JoinHandle<()>,
    dispatcher_task: JoinHandle<()>,
}

impl ReminderPipeline {
    pub fn start(
        config: PipelineConfig,
        store: Arc<dyn PrescriptionStore>,
        email_sender: Arc<dyn EmailSender>,
        call_sender: Arc<dyn CallSender>,
        clock: Arc<dyn Clock>,
        trigger: impl CadenceTrigger,
    ) -> anyhow::Result<Self> {
        let window = ScanWindow::new(config.cadence)?;
        let queue = Arc::new(ReminderQueue::new());
        let cancellation_token = CancellationToken::new();

        let scanner = DueReminderScanner::new(store, Arc::clone(&queue), window);
        let dispatcher = BatchingDispatcher::new(
            Arc::clone(&queue),
            email_sender,
            call_sender,
            config.heartbeat,
        );

        let scanner_task = tokio::spawn(run_scanner(
            scanner,
            clock,
            trigger,
            cancellation_token.child_token(),
        ));
        let dispatcher_task = tokio::spawn(dispatcher.run(cancellation_token.child_token()));

        log::info!(
            "Reminder pipeline started [cadence = {:?}, heartbeat = {:?}]",
            config.cadence,
            config.heartbeat
        );

        Ok(Self {
            queue,
            cancellation_token,
            scanner_task,
            dispatcher_task,
        })
    }

    /// Reminders queued or being delivered right now.
    pub fn queue_depth(&self) -> usize {
        self.queue.unfinished()
    }

    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        for (name, task) in [
            ("scanner", self.scanner_task),
            ("dispatcher", self.dispatcher_task),
        ] {
            match time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => log::error!("Reminder {name} task failed: {error}"),
                Err(_) => log::warn!("Reminder {name} task did not stop in {SHUTDOWN_TIMEOUT:?}"),
            }
        }
    }
}

async fn run_scanner(
    scanner: DueReminderScanner,
    clock: Arc<dyn Clock>,
    mut trigger: impl CadenceTrigger,
    cancellation_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::info!("Reminder scanner shutting down");
                break;
            }
            _ = trigger.next_tick() => {
                if let Err(error) = scanner.scan(clock.now()).await {
                    log::error!("Reminder scan failed, retrying on next tick: {error:#}");
                }
            }
        }
    }
}
