mod dispatcher;
mod queue;
mod scanner;
mod trigger;
mod window;

pub use dispatcher::{BatchingDispatcher, ChannelOutcome, DispatchReport, ReminderBatch};
pub use queue::ReminderQueue;
pub use scanner::DueReminderScanner;
pub use trigger::{CadenceTrigger, Clock, IntervalTrigger, ZonedClock};
pub use window::{ScanBounds, ScanWindow};
